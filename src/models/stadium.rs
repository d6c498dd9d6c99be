//! stadium.rs
//!
//! Модель стадиона: трибуны (stands), секторы и места.
//! Данные приходят только для чтения из ответа `GET /events/:id`,
//! локально вычисляется лишь флаг `visible` у сектора.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use super::seat::Seat;

/// Сторона поля, к которой примыкает трибуна.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    #[serde(rename = "N")]
    North,
    #[serde(rename = "S")]
    South,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "O")]
    West,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::South,
        Orientation::East,
        Orientation::West,
    ];

    /// Угловые трибуны (`codo_*`) бывают только с востока и запада.
    pub fn allows_corners(self) -> bool {
        matches!(self, Orientation::East | Orientation::West)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::North => "N",
            Orientation::South => "S",
            Orientation::East => "E",
            Orientation::West => "O",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ярус трибуны.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TierType {
    #[serde(rename = "1_bandeja")]
    First,
    #[serde(rename = "2_bandeja")]
    Second,
    #[serde(rename = "3_bandeja")]
    Third,
    #[serde(rename = "codo_norte")]
    CornerNorth,
    #[serde(rename = "codo_sur")]
    CornerSouth,
}

impl TierType {
    /// Номер яруса (1..=3); у угловых трибун уровня нет.
    pub fn level(self) -> Option<usize> {
        match self {
            TierType::First => Some(1),
            TierType::Second => Some(2),
            TierType::Third => Some(3),
            TierType::CornerNorth | TierType::CornerSouth => None,
        }
    }

    pub fn is_corner(self) -> bool {
        self.level().is_none()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TierType::First => "1_bandeja",
            TierType::Second => "2_bandeja",
            TierType::Third => "3_bandeja",
            TierType::CornerNorth => "codo_norte",
            TierType::CornerSouth => "codo_sur",
        }
    }
}

impl fmt::Display for TierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sector {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub numerated: bool,
    #[serde(default)]
    pub seats: Vec<Seat>,
    /// Вычисляется локально: есть ли в каталоге позиция с этим `sectorId`.
    #[serde(default)]
    pub visible: bool,
}

impl Sector {
    /// Места, сгруппированные по рядам в порядке первого появления ряда.
    pub fn rows(&self) -> Vec<(&str, Vec<&Seat>)> {
        let mut rows: Vec<(&str, Vec<&Seat>)> = Vec::new();
        for seat in &self.seats {
            match rows.iter_mut().find(|(label, _)| *label == seat.row_label) {
                Some((_, seats)) => seats.push(seat),
                None => rows.push((seat.row_label.as_str(), vec![seat])),
            }
        }
        rows
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stand {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub orientation: Orientation,
    #[serde(rename = "type")]
    pub tier: TierType,
    #[serde(default)]
    pub sectors: Vec<Sector>,
}

impl Stand {
    pub fn has_visible_sector(&self) -> bool {
        self.sectors.iter().any(|s| s.visible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stadium {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub stands: Vec<Stand>,
}

impl Stadium {
    pub fn validate(&self) -> Result<(), StadiumError> {
        validate_stands(&self.stands)
    }

    pub fn find_sector(&self, sector_id: &str) -> Option<(&Stand, &Sector)> {
        self.stands.iter().find_map(|stand| {
            stand
                .sectors
                .iter()
                .find(|sector| sector.id == sector_id)
                .map(|sector| (stand, sector))
        })
    }

    /// Проставляет `visible` всем секторам по набору id из каталога.
    pub fn mark_visible_sectors(&mut self, referenced: &HashSet<&str>) {
        for stand in &mut self.stands {
            for sector in &mut stand.sectors {
                sector.visible = referenced.contains(sector.id.as_str());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StadiumError {
    #[error("stand {orientation}/{tier} is declared more than once")]
    DuplicateStand { orientation: Orientation, tier: TierType },
    #[error("stand {orientation}/{tier} has no lower tier on the same side")]
    MissingLowerTier { orientation: Orientation, tier: TierType },
    #[error("corner stand {tier} is not allowed on side {orientation}")]
    CornerNotAllowed { orientation: Orientation, tier: TierType },
}

/// Проверка набора трибун на уровне ввода.
///
/// - не больше одной трибуны на пару (сторона, ярус);
/// - 2-й ярус требует 1-го, 3-й требует 2-го на той же стороне;
/// - угловые трибуны только для E/O.
pub fn validate_stands(stands: &[Stand]) -> Result<(), StadiumError> {
    let mut seen: HashSet<(Orientation, TierType)> = HashSet::new();

    for stand in stands {
        if !seen.insert((stand.orientation, stand.tier)) {
            return Err(StadiumError::DuplicateStand {
                orientation: stand.orientation,
                tier: stand.tier,
            });
        }
        if stand.tier.is_corner() && !stand.orientation.allows_corners() {
            return Err(StadiumError::CornerNotAllowed {
                orientation: stand.orientation,
                tier: stand.tier,
            });
        }
    }

    for stand in stands {
        let lower = match stand.tier {
            TierType::Second => TierType::First,
            TierType::Third => TierType::Second,
            _ => continue,
        };
        if !seen.contains(&(stand.orientation, lower)) {
            return Err(StadiumError::MissingLowerTier {
                orientation: stand.orientation,
                tier: stand.tier,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stand(orientation: Orientation, tier: TierType) -> Stand {
        Stand {
            id: format!("{}-{}", orientation, tier),
            name: None,
            orientation,
            tier,
            sectors: vec![],
        }
    }

    #[test]
    fn accepts_stacked_tiers_and_side_corners() {
        let stands = vec![
            stand(Orientation::North, TierType::First),
            stand(Orientation::North, TierType::Second),
            stand(Orientation::East, TierType::First),
            stand(Orientation::East, TierType::CornerNorth),
            stand(Orientation::West, TierType::CornerSouth),
        ];
        assert_eq!(validate_stands(&stands), Ok(()));
    }

    #[test]
    fn rejects_duplicate_pair() {
        let stands = vec![
            stand(Orientation::South, TierType::First),
            stand(Orientation::South, TierType::First),
        ];
        assert!(matches!(
            validate_stands(&stands),
            Err(StadiumError::DuplicateStand { orientation: Orientation::South, .. })
        ));
    }

    #[test]
    fn rejects_second_tier_without_first() {
        let stands = vec![stand(Orientation::West, TierType::Second)];
        assert!(matches!(validate_stands(&stands), Err(StadiumError::MissingLowerTier { .. })));
    }

    #[test]
    fn rejects_third_tier_over_missing_second() {
        let stands = vec![
            stand(Orientation::East, TierType::First),
            stand(Orientation::East, TierType::Third),
        ];
        assert!(matches!(
            validate_stands(&stands),
            Err(StadiumError::MissingLowerTier { tier: TierType::Third, .. })
        ));
    }

    #[test]
    fn rejects_corner_on_north() {
        let stands = vec![stand(Orientation::North, TierType::CornerNorth)];
        assert!(matches!(validate_stands(&stands), Err(StadiumError::CornerNotAllowed { .. })));
    }

    #[test]
    fn decodes_wire_names() {
        let json = r#"{"id":"s1","orientation":"O","type":"codo_sur","sectors":[]}"#;
        let stand: Stand = serde_json::from_str(json).unwrap();
        assert_eq!(stand.orientation, Orientation::West);
        assert_eq!(stand.tier, TierType::CornerSouth);
    }

    #[test]
    fn rows_keep_first_appearance_order() {
        use crate::models::seat::SeatStatus;
        let seat = |row: &str, n: u32| Seat { row_label: row.into(), seat_number: n, status: SeatStatus::Available };
        let sector = Sector {
            id: "x".into(),
            name: "Platea".into(),
            numerated: true,
            seats: vec![seat("B", 1), seat("A", 1), seat("B", 2)],
            visible: true,
        };
        let rows = sector.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "B");
        assert_eq!(rows[0].1.len(), 2);
        assert_eq!(rows[1].0, "A");
    }
}
