use serde::{Deserialize, Serialize};

/// Статус места, как его отдаёт API стадиона.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Reserved,
    Sold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub row_label: String,
    pub seat_number: u32,
    pub status: SeatStatus,
}

impl Seat {
    // Составной код места: "A" + 12 = "A12"
    pub fn code(&self) -> String {
        format!("{}{}", self.row_label, self.seat_number)
    }

    /// Проданные и зарезервированные места в новый выбор не попадают.
    pub fn is_selectable(&self) -> bool {
        self.status == SeatStatus::Available
    }
}
