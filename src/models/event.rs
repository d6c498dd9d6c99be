use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use validator::Validate;

use super::catalog::CatalogItem;
use super::stadium::Stadium;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub club_id: Option<String>,
    /// Сервисный сбор в процентах от подытога.
    #[serde(default)]
    pub service_charge: f64,
    #[serde(default)]
    pub catalog_items: Vec<CatalogItem>,
    #[serde(default)]
    pub stadium: Option<Stadium>,
}

impl Event {
    pub fn item_for_sector(&self, sector_id: &str) -> Option<&CatalogItem> {
        self.catalog_items
            .iter()
            .find(|i| i.sector_id.as_deref() == Some(sector_id))
    }

    /// Сектор видим, только если на него ссылается хотя бы одна позиция каталога.
    pub fn derive_sector_visibility(&mut self) {
        let referenced: HashSet<&str> = self
            .catalog_items
            .iter()
            .filter_map(|i| i.sector_id.as_deref())
            .collect();
        if let Some(stadium) = self.stadium.as_mut() {
            stadium.mark_visible_sectors(&referenced);
        }
    }
}

// Форма создания события (дашборд клуба)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 120, message = "El nombre es obligatorio"))]
    pub name: String,
    pub date: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 3, max = 200, message = "Dirección inválida"))]
    pub address: Option<String>,
    #[validate(range(min = 0.0, max = 100.0, message = "El cargo debe estar entre 0 y 100"))]
    pub service_charge: f64,
    pub stadium_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVENT_JSON: &str = r#"{
        "id": "ev1",
        "name": "Clásico",
        "date": "2026-11-02T20:00:00Z",
        "serviceCharge": 10,
        "catalogItems": [
            {"id": "it1", "name": "Platea Norte", "type": "sector", "price": 15000,
             "stock": {"aviable": 10, "reserved": 2, "sold": 3}, "sectorId": "sec-a", "maxPerPerson": 4}
        ],
        "stadium": {"id": "st", "name": "Monumental", "stands": [
            {"id": "n1", "orientation": "N", "type": "1_bandeja", "sectors": [
                {"id": "sec-a", "name": "A", "numerated": true, "seats": []},
                {"id": "sec-b", "name": "B", "seats": []}
            ]}
        ]}
    }"#;

    #[test]
    fn visibility_follows_catalog_references() {
        let mut event: Event = serde_json::from_str(EVENT_JSON).unwrap();
        event.derive_sector_visibility();
        let stadium = event.stadium.as_ref().unwrap();
        let (_, a) = stadium.find_sector("sec-a").unwrap();
        let (_, b) = stadium.find_sector("sec-b").unwrap();
        assert!(a.visible);
        assert!(!b.visible);
        assert_eq!(event.item_for_sector("sec-a").unwrap().max_per_person, Some(4));
    }

    #[test]
    fn create_request_rejects_out_of_range_charge() {
        let req = CreateEventRequest {
            name: "Final".into(),
            date: Utc::now(),
            description: None,
            address: None,
            service_charge: 140.0,
            stadium_id: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("service_charge"));
    }
}
