//! dashboard.rs
//!
//! Статистика продаж для панели клуба.
//!
//! - По событию: места свободные/в резерве/проданные, выручка, заполняемость.
//! - По клубу: сумма по всем его событиям.
//!
//! Всё считается из `stock` позиций каталога, отдельных запросов нет.

use serde::Serialize;

use crate::models::{CatalogItem, CatalogItemType, Event};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemStats {
    pub item_id: String,
    pub name: String,
    pub kind: CatalogItemType,
    pub capacity: u64,
    pub available: u32,
    pub reserved: u32,
    pub sold: u32,
    pub revenue: f64,
    /// Доля проданного от ёмкости, в процентах с одним знаком.
    pub occupancy: f64,
}

impl ItemStats {
    pub fn from_item(item: &CatalogItem) -> Self {
        let capacity = item.stock.capacity();
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            kind: item.kind,
            capacity,
            available: item.stock.aviable,
            reserved: item.stock.reserved,
            sold: item.stock.sold,
            revenue: item.price * item.stock.sold as f64,
            occupancy: occupancy(u64::from(item.stock.sold), capacity),
        }
    }
}

fn occupancy(sold: u64, capacity: u64) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    (sold as f64 * 1000.0 / capacity as f64).round() / 10.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDashboard {
    pub event_id: String,
    pub name: String,
    pub total_capacity: u64,
    pub available: u64,
    pub reserved: u64,
    pub sold: u64,
    pub occupancy: f64,
    /// Строкой с двумя знаками, как в отчётах кассы.
    pub total_revenue: String,
    pub items: Vec<ItemStats>,
}

impl EventDashboard {
    pub fn for_event(event: &Event) -> Self {
        let items: Vec<ItemStats> = event.catalog_items.iter().map(ItemStats::from_item).collect();

        let total_capacity = items.iter().map(|i| i.capacity).sum();
        let available = items.iter().map(|i| u64::from(i.available)).sum();
        let reserved = items.iter().map(|i| u64::from(i.reserved)).sum();
        let sold = items.iter().map(|i| u64::from(i.sold)).sum();
        let revenue: f64 = items.iter().map(|i| i.revenue).sum();

        Self {
            event_id: event.id.clone(),
            name: event.name.clone(),
            total_capacity,
            available,
            reserved,
            sold,
            occupancy: occupancy(sold, total_capacity),
            total_revenue: format!("{:.2}", revenue),
            items,
        }
    }

    fn revenue(&self) -> f64 {
        self.items.iter().map(|i| i.revenue).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubDashboard {
    pub club_id: String,
    pub events_count: usize,
    pub sold: u64,
    pub reserved: u64,
    pub total_revenue: String,
    pub events: Vec<EventDashboard>,
}

impl ClubDashboard {
    /// Собирает панель клуба из событий, принадлежащих `club_id`.
    pub fn for_club(club_id: &str, events: &[Event]) -> Self {
        let events: Vec<EventDashboard> = events
            .iter()
            .filter(|e| e.club_id.as_deref() == Some(club_id))
            .map(EventDashboard::for_event)
            .collect();

        let revenue: f64 = events.iter().map(EventDashboard::revenue).sum();

        Self {
            club_id: club_id.to_string(),
            events_count: events.len(),
            sold: events.iter().map(|e| e.sold).sum(),
            reserved: events.iter().map(|e| e.reserved).sum(),
            total_revenue: format!("{:.2}", revenue),
            events,
        }
    }
}
