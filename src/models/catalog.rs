use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogItemType {
    Ticket,
    Combo,
    Sector,
}

/// Счётчики остатков. Имя `aviable` задано upstream API, менять нельзя.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub aviable: u32,
    pub reserved: u32,
    pub sold: u32,
}

impl Stock {
    /// Счётчики приходят с сервера как есть, сумма считается в u64.
    pub fn capacity(&self) -> u64 {
        u64::from(self.aviable) + u64::from(self.reserved) + u64::from(self.sold)
    }
}

/// Билет внутри комбо.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboTicket {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CatalogItemType,
    pub price: f64,
    pub stock: Stock,
    #[serde(default)]
    pub sector_id: Option<String>,
    #[serde(default)]
    pub max_per_person: Option<u32>,
    #[serde(default)]
    pub tickets: Vec<ComboTicket>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_of_huge_stock_does_not_overflow() {
        let stock = Stock { aviable: u32::MAX, reserved: 1, sold: u32::MAX };
        assert_eq!(stock.capacity(), 2 * u64::from(u32::MAX) + 1);
    }
}
