//! layout
//!
//! Расчёт геометрии схемы стадиона для SVG.
//!
//! Поле фиксированного размера стоит в центре, трибуны раскладываются вокруг
//! него по сторонам N/S/E/O. Для каждой стороны отступ от края поля
//! накапливается по присутствующим ярусам: `PADDING` у поля, затем
//! `STAND_DEPTH` на каждый ярус с `TIER_GAP` между ярусами и `PADDING` снаружи.
//! Пустая сторона даёт только базовый `PADDING`. Угловая трибуна добавляет
//! `CORNER_SIZE` к обеим примыкающим сторонам.
//!
//! Ярусы складываются строго: 2-й учитывается только при наличии 1-го,
//! 3-й только при наличии 2-го. «Висящие» ярусы и углы на N/S в результат
//! не попадают.
//!
//! Расчёт чистый и детерминированный; кеширование см. в [`memo`].

pub mod memo;

use serde::Serialize;
use tracing::debug;

use crate::models::{Orientation, Stand, TierType};

pub use memo::LayoutMemo;

pub const FIELD_WIDTH: f64 = 400.0;
pub const FIELD_HEIGHT: f64 = 250.0;
pub const STAND_DEPTH: f64 = 40.0;
pub const TIER_GAP: f64 = 8.0;
pub const CORNER_SIZE: f64 = 60.0;
pub const PADDING: f64 = 20.0;

pub mod palette {
    pub const FIRST_TIER: &str = "#1e88e5";
    pub const SECOND_TIER: &str = "#43a047";
    pub const THIRD_TIER: &str = "#fb8c00";
    pub const CORNER: &str = "#8e24aa";
    pub const DISABLED: &str = "#bdbdbd";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorRect {
    pub sector_id: String,
    pub name: String,
    pub numerated: bool,
    pub visible: bool,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandRect {
    pub stand_id: String,
    pub orientation: Orientation,
    pub tier: TierType,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: &'static str,
    pub sectors: Vec<SectorRect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub total_width: f64,
    pub total_height: f64,
    pub field_x: f64,
    pub field_y: f64,
    pub field_width: f64,
    pub field_height: f64,
    pub stands: Vec<StandRect>,
}

impl Layout {
    pub fn stand(&self, stand_id: &str) -> Option<&StandRect> {
        self.stands.iter().find(|s| s.stand_id == stand_id)
    }
}

/// Трибуны одной стороны, разложенные по ярусам.
#[derive(Default)]
struct Side<'a> {
    tiers: [Option<&'a Stand>; 3],
    corner_north: Option<&'a Stand>,
    corner_south: Option<&'a Stand>,
}

impl<'a> Side<'a> {
    // Сколько ярусов реально участвует: 1-й, 2-й, 3-й подряд без пропусков.
    fn stacked(&self) -> usize {
        self.tiers.iter().take_while(|t| t.is_some()).count()
    }

    fn has_corner(&self) -> bool {
        self.corner_north.is_some() || self.corner_south.is_some()
    }
}

struct Sides<'a> {
    north: Side<'a>,
    south: Side<'a>,
    east: Side<'a>,
    west: Side<'a>,
}

impl<'a> Sides<'a> {
    fn collect(stands: &'a [Stand]) -> Self {
        let mut sides = Sides {
            north: Side::default(),
            south: Side::default(),
            east: Side::default(),
            west: Side::default(),
        };

        for stand in stands {
            let side = sides.side_mut(stand.orientation);
            match stand.tier.level() {
                // при дублях берём первую трибуну
                Some(level) => {
                    side.tiers[level - 1].get_or_insert(stand);
                }
                None if !stand.orientation.allows_corners() => {
                    debug!(stand_id = %stand.id, orientation = %stand.orientation, "corner stand ignored");
                }
                None if stand.tier == TierType::CornerNorth => {
                    side.corner_north.get_or_insert(stand);
                }
                None => {
                    side.corner_south.get_or_insert(stand);
                }
            }
        }

        sides
    }

    fn side_mut(&mut self, orientation: Orientation) -> &mut Side<'a> {
        match orientation {
            Orientation::North => &mut self.north,
            Orientation::South => &mut self.south,
            Orientation::East => &mut self.east,
            Orientation::West => &mut self.west,
        }
    }

    fn any_corner_north(&self) -> bool {
        self.east.corner_north.is_some() || self.west.corner_north.is_some()
    }

    fn any_corner_south(&self) -> bool {
        self.east.corner_south.is_some() || self.west.corner_south.is_some()
    }
}

/// Отступ от края поля до края холста для стороны с `tiers` ярусами.
pub fn side_extent(tiers: usize) -> f64 {
    if tiers == 0 {
        return PADDING;
    }
    let n = tiers as f64;
    PADDING + n * STAND_DEPTH + (n - 1.0) * TIER_GAP + PADDING
}

// Расстояние от края поля до ближней грани яруса `level` (1-based).
fn tier_offset(level: usize) -> f64 {
    PADDING + (level - 1) as f64 * (STAND_DEPTH + TIER_GAP)
}

fn tier_fill(tier: TierType) -> &'static str {
    match tier {
        TierType::First => palette::FIRST_TIER,
        TierType::Second => palette::SECOND_TIER,
        TierType::Third => palette::THIRD_TIER,
        TierType::CornerNorth | TierType::CornerSouth => palette::CORNER,
    }
}

pub fn compute_layout(stands: &[Stand]) -> Layout {
    let sides = Sides::collect(stands);

    let corner = |present: bool| if present { CORNER_SIZE } else { 0.0 };
    let top = side_extent(sides.north.stacked()) + corner(sides.any_corner_north());
    let bottom = side_extent(sides.south.stacked()) + corner(sides.any_corner_south());
    let right = side_extent(sides.east.stacked()) + corner(sides.east.has_corner());
    let left = side_extent(sides.west.stacked()) + corner(sides.west.has_corner());

    let field_x = left;
    let field_y = top;
    let field_right = field_x + FIELD_WIDTH;
    let field_bottom = field_y + FIELD_HEIGHT;

    let mut rects = Vec::new();

    for orientation in Orientation::ALL {
        let side = match orientation {
            Orientation::North => &sides.north,
            Orientation::South => &sides.south,
            Orientation::East => &sides.east,
            Orientation::West => &sides.west,
        };

        for level in 1..=side.stacked() {
            let Some(stand) = side.tiers[level - 1] else { break };
            let offset = tier_offset(level);
            let (x, y, width, height) = match orientation {
                Orientation::North => (field_x, field_y - offset - STAND_DEPTH, FIELD_WIDTH, STAND_DEPTH),
                Orientation::South => (field_x, field_bottom + offset, FIELD_WIDTH, STAND_DEPTH),
                Orientation::East => (field_right + offset, field_y, STAND_DEPTH, FIELD_HEIGHT),
                Orientation::West => (field_x - offset - STAND_DEPTH, field_y, STAND_DEPTH, FIELD_HEIGHT),
            };
            rects.push(place(stand, x, y, width, height));
        }

        let corner_x = match orientation {
            Orientation::East => field_right + PADDING,
            Orientation::West => field_x - PADDING - CORNER_SIZE,
            Orientation::North | Orientation::South => continue,
        };
        if let Some(stand) = side.corner_north {
            let y = field_y - PADDING - CORNER_SIZE;
            rects.push(place(stand, corner_x, y, CORNER_SIZE, CORNER_SIZE));
        }
        if let Some(stand) = side.corner_south {
            let y = field_bottom + PADDING;
            rects.push(place(stand, corner_x, y, CORNER_SIZE, CORNER_SIZE));
        }
    }

    Layout {
        total_width: left + FIELD_WIDTH + right,
        total_height: top + FIELD_HEIGHT + bottom,
        field_x,
        field_y,
        field_width: FIELD_WIDTH,
        field_height: FIELD_HEIGHT,
        stands: rects,
    }
}

fn place(stand: &Stand, x: f64, y: f64, width: f64, height: f64) -> StandRect {
    let fill = if stand.has_visible_sector() {
        tier_fill(stand.tier)
    } else {
        palette::DISABLED
    };

    // Горизонтальные полосы (N/S) делим по ширине, остальные по высоте.
    let horizontal = matches!(stand.orientation, Orientation::North | Orientation::South)
        && !stand.tier.is_corner();
    let count = stand.sectors.len().max(1) as f64;

    let sectors = stand
        .sectors
        .iter()
        .enumerate()
        .map(|(i, sector)| {
            let i = i as f64;
            let (sx, sy, sw, sh) = if horizontal {
                let w = width / count;
                (x + i * w, y, w, height)
            } else {
                let h = height / count;
                (x, y + i * h, width, h)
            };
            SectorRect {
                sector_id: sector.id.clone(),
                name: sector.name.clone(),
                numerated: sector.numerated,
                visible: sector.visible,
                x: sx,
                y: sy,
                width: sw,
                height: sh,
            }
        })
        .collect();

    StandRect {
        stand_id: stand.id.clone(),
        orientation: stand.orientation,
        tier: stand.tier,
        x,
        y,
        width,
        height,
        fill,
        sectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sector;

    fn stand(orientation: Orientation, tier: TierType) -> Stand {
        Stand {
            id: format!("{}-{}", orientation, tier),
            name: None,
            orientation,
            tier,
            sectors: vec![],
        }
    }

    fn sector(id: &str, visible: bool) -> Sector {
        Sector { id: id.into(), name: id.to_uppercase(), numerated: false, seats: vec![], visible }
    }

    #[test]
    fn empty_stadium_is_field_plus_padding() {
        let layout = compute_layout(&[]);
        assert_eq!(layout.field_x, PADDING);
        assert_eq!(layout.field_y, PADDING);
        assert_eq!(layout.total_width, FIELD_WIDTH + 2.0 * PADDING);
        assert_eq!(layout.total_height, FIELD_HEIGHT + 2.0 * PADDING);
        assert!(layout.stands.is_empty());
    }

    #[test]
    fn single_north_tier_offsets_top() {
        let layout = compute_layout(&[stand(Orientation::North, TierType::First)]);
        assert_eq!(layout.field_y, PADDING + STAND_DEPTH + PADDING);
        assert_eq!(layout.field_x, PADDING);

        let rect = &layout.stands[0];
        assert_eq!(rect.y, PADDING);
        assert_eq!(rect.height, STAND_DEPTH);
        assert_eq!(rect.width, FIELD_WIDTH);
        assert_eq!(rect.y + rect.height + PADDING, layout.field_y);
    }

    #[test]
    fn second_tier_adds_depth_and_gap() {
        let layout = compute_layout(&[
            stand(Orientation::South, TierType::First),
            stand(Orientation::South, TierType::Second),
        ]);
        let bottom = layout.total_height - layout.field_y - FIELD_HEIGHT;
        assert_eq!(bottom, 2.0 * PADDING + 2.0 * STAND_DEPTH + TIER_GAP);

        let first = layout.stand("S-1_bandeja").unwrap();
        let second = layout.stand("S-2_bandeja").unwrap();
        assert_eq!(second.y - (first.y + first.height), TIER_GAP);
    }

    #[test]
    fn orphan_tiers_are_dropped() {
        let layout = compute_layout(&[
            stand(Orientation::East, TierType::Second),
            stand(Orientation::East, TierType::Third),
        ]);
        assert!(layout.stands.is_empty());
        assert_eq!(layout.total_width, FIELD_WIDTH + 2.0 * PADDING);
    }

    #[test]
    fn third_tier_needs_second() {
        let layout = compute_layout(&[
            stand(Orientation::West, TierType::First),
            stand(Orientation::West, TierType::Third),
        ]);
        assert_eq!(layout.stands.len(), 1);
        assert_eq!(layout.field_x, side_extent(1));
    }

    #[test]
    fn corner_adds_allowance_to_both_sides() {
        let layout = compute_layout(&[stand(Orientation::East, TierType::CornerNorth)]);
        assert_eq!(layout.field_y, PADDING + CORNER_SIZE);
        assert_eq!(layout.total_width, PADDING + FIELD_WIDTH + PADDING + CORNER_SIZE);

        let rect = &layout.stands[0];
        assert_eq!(rect.x, layout.field_x + FIELD_WIDTH + PADDING);
        assert_eq!(rect.y, 0.0);
        assert!(rect.x + rect.width <= layout.total_width);
    }

    #[test]
    fn two_corners_on_one_side_count_once() {
        let one = compute_layout(&[stand(Orientation::West, TierType::CornerNorth)]);
        let both = compute_layout(&[
            stand(Orientation::West, TierType::CornerNorth),
            stand(Orientation::East, TierType::CornerNorth),
        ]);
        assert_eq!(one.field_y, both.field_y);
    }

    #[test]
    fn north_corner_never_rendered() {
        let layout = compute_layout(&[stand(Orientation::North, TierType::CornerSouth)]);
        assert!(layout.stands.is_empty());
        assert_eq!(layout.field_y, PADDING);
    }

    #[test]
    fn fill_depends_on_visible_sectors() {
        let mut lit = stand(Orientation::North, TierType::First);
        lit.sectors = vec![sector("a", true), sector("b", false)];
        let dark = stand(Orientation::South, TierType::First);

        let layout = compute_layout(&[lit, dark]);
        assert_eq!(layout.stand("N-1_bandeja").unwrap().fill, palette::FIRST_TIER);
        assert_eq!(layout.stand("S-1_bandeja").unwrap().fill, palette::DISABLED);
    }

    #[test]
    fn sectors_split_along_long_axis() {
        let mut north = stand(Orientation::North, TierType::First);
        north.sectors = vec![sector("a", true), sector("b", true)];
        let mut east = stand(Orientation::East, TierType::First);
        east.sectors = vec![sector("c", true), sector("d", true)];

        let layout = compute_layout(&[north, east]);
        let n = layout.stand("N-1_bandeja").unwrap();
        assert_eq!(n.sectors[0].width, FIELD_WIDTH / 2.0);
        assert_eq!(n.sectors[1].x, n.x + FIELD_WIDTH / 2.0);

        let e = layout.stand("E-1_bandeja").unwrap();
        assert_eq!(e.sectors[1].height, FIELD_HEIGHT / 2.0);
        assert_eq!(e.sectors[1].y, e.y + FIELD_HEIGHT / 2.0);
    }
}
