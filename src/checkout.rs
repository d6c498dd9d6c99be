//! checkout.rs
//!
//! Корзина: строки с ценой и количеством, сервисный сбор события и
//! необязательная скидка по промокоду RRPP. Итоги пересчитываются синхронно
//! после каждой мутации.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::payment::{CreatePreferenceRequest, FreeCheckoutRequest, PaymentItem};
use crate::models::rrpp::RrppPromo;
use crate::models::{CatalogItem, CatalogItemType, Event};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub item_id: String,
    pub name: String,
    pub kind: CatalogItemType,
    pub unit_price: f64,
    pub quantity: u32,
    pub available: u32,
    pub max_per_person: Option<u32>,
    /// Позиция нумерованного сектора: количество равно числу зарезервированных мест.
    #[serde(default)]
    pub numbered: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub seats: Vec<String>,
}

impl CheckoutLine {
    pub fn amount(&self) -> f64 {
        self.unit_price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutTotals {
    pub subtotal: f64,
    pub service_fee: f64,
    pub discount: f64,
    pub total: f64,
}

/// `round(amount * pct / 100)`
pub fn percent_of(amount: f64, pct: f64) -> f64 {
    (amount * pct / 100.0).round()
}

/// Итоги корзины: сбор и скидка считаются от подытога, итог не ниже нуля.
pub fn compute_totals(lines: &[CheckoutLine], fee_pct: f64, discount_pct: f64) -> CheckoutTotals {
    let subtotal: f64 = lines.iter().map(CheckoutLine::amount).sum();
    let service_fee = percent_of(subtotal, fee_pct);
    let discount = percent_of(subtotal, discount_pct);
    let total = (subtotal + service_fee - discount).max(0.0);

    CheckoutTotals { subtotal, service_fee, discount, total }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckoutError {
    #[error("catalog item {0} is not part of this event")]
    UnknownItem(String),
    #[error("at most {max} per person")]
    LimitExceeded { max: u32 },
    #[error("only {available} left in stock")]
    OutOfStock { available: u32 },
    #[error("promo code {0} is not active")]
    InactivePromo(String),
    #[error("catalog item {0} is sold by seat")]
    SeatsRequired(String),
    #[error("checkout is empty")]
    Empty,
}

impl CheckoutError {
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::UnknownItem(_) => "La entrada no pertenece a este evento".to_string(),
            CheckoutError::LimitExceeded { max } => format!("Podés comprar hasta {} por persona", max),
            CheckoutError::OutOfStock { available } => format!("Quedan solo {} disponibles", available),
            CheckoutError::InactivePromo(_) => "El código no está activo".to_string(),
            CheckoutError::SeatsRequired(_) => "Elegí tus asientos en el mapa del estadio".to_string(),
            CheckoutError::Empty => "No seleccionaste ninguna entrada".to_string(),
        }
    }
}

fn is_numbered(event: &Event, item: &CatalogItem) -> bool {
    if item.kind != CatalogItemType::Sector {
        return false;
    }
    let sector = item
        .sector_id
        .as_deref()
        .zip(event.stadium.as_ref())
        .and_then(|(id, stadium)| stadium.find_sector(id));
    matches!(sector, Some((_, s)) if s.numerated)
}

/// Как оплачивать текущую корзину.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentPlan {
    /// Итог ноль: бесплатное оформление без платёжного шлюза.
    Free(FreeCheckoutRequest),
    Paid(CreatePreferenceRequest),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutState {
    event_id: String,
    service_charge_pct: f64,
    lines: Vec<CheckoutLine>,
    promo: Option<RrppPromo>,
    totals: CheckoutTotals,
}

impl CheckoutState {
    pub fn for_event(event: &Event) -> Self {
        let lines = event
            .catalog_items
            .iter()
            .map(|item| CheckoutLine {
                item_id: item.id.clone(),
                name: item.name.clone(),
                kind: item.kind,
                unit_price: item.price,
                quantity: 0,
                available: item.stock.aviable,
                max_per_person: item.max_per_person,
                numbered: is_numbered(event, item),
                selected: false,
                seats: Vec::new(),
            })
            .collect();

        let mut state = Self {
            event_id: event.id.clone(),
            service_charge_pct: event.service_charge,
            lines,
            promo: None,
            totals: CheckoutTotals::default(),
        };
        state.recalculate();
        state
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn lines(&self) -> &[CheckoutLine] {
        &self.lines
    }

    pub fn line(&self, item_id: &str) -> Option<&CheckoutLine> {
        self.lines.iter().find(|l| l.item_id == item_id)
    }

    pub fn totals(&self) -> CheckoutTotals {
        self.totals
    }

    pub fn promo(&self) -> Option<&RrppPromo> {
        self.promo.as_ref()
    }

    fn line_mut(&mut self, item_id: &str) -> Result<&mut CheckoutLine, CheckoutError> {
        self.lines
            .iter_mut()
            .find(|l| l.item_id == item_id)
            .ok_or_else(|| CheckoutError::UnknownItem(item_id.to_string()))
    }

    fn checked_line(&mut self, item_id: &str, quantity: u32) -> Result<&mut CheckoutLine, CheckoutError> {
        let line = self.line_mut(item_id)?;
        if let Some(max) = line.max_per_person {
            if quantity > max {
                warn!(item_id, quantity, max, "quantity over per-person limit");
                return Err(CheckoutError::LimitExceeded { max });
            }
        }
        if quantity > line.available {
            return Err(CheckoutError::OutOfStock { available: line.available });
        }
        Ok(line)
    }

    /// Количество позиции в корзине. Для нумерованного сектора количество
    /// задаётся только резервом мест ([`CheckoutState::set_seats`]).
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> Result<CheckoutTotals, CheckoutError> {
        let line = self.checked_line(item_id, quantity)?;
        if line.numbered {
            return Err(CheckoutError::SeatsRequired(item_id.to_string()));
        }
        line.quantity = quantity;
        self.recalculate();
        Ok(self.totals)
    }

    /// Количество для расчёта цены без сессии: нумерованные позиции
    /// считаются по числу мест, сами места не нужны.
    pub fn quote_quantity(&mut self, item_id: &str, quantity: u32) -> Result<CheckoutTotals, CheckoutError> {
        let line = self.checked_line(item_id, quantity)?;
        line.quantity = quantity;
        self.recalculate();
        Ok(self.totals)
    }

    /// Помечает позицию выбранной и обнуляет её количество
    /// (переход из ненумерованного сектора в общий checkout).
    pub fn select_item(&mut self, item_id: &str) -> Result<(), CheckoutError> {
        self.line_mut(item_id)?;
        for line in &mut self.lines {
            line.selected = line.item_id == item_id;
            if line.selected {
                line.quantity = 0;
                line.seats.clear();
            }
        }
        self.recalculate();
        Ok(())
    }

    /// Зарезервированные места нумерованного сектора: количество = число мест.
    pub fn set_seats(&mut self, item_id: &str, seats: Vec<String>) -> Result<(), CheckoutError> {
        let line = self.line_mut(item_id)?;
        line.quantity = seats.len() as u32;
        line.seats = seats;
        line.selected = true;
        self.recalculate();
        Ok(())
    }

    pub fn apply_promo(&mut self, promo: RrppPromo) -> Result<CheckoutTotals, CheckoutError> {
        if !promo.active {
            return Err(CheckoutError::InactivePromo(promo.code));
        }
        self.promo = Some(promo);
        self.recalculate();
        Ok(self.totals)
    }

    pub fn clear_promo(&mut self) {
        self.promo = None;
        self.recalculate();
    }

    fn recalculate(&mut self) {
        let discount_pct = self.promo.as_ref().map_or(0.0, |p| p.discount_percent);
        self.totals = compute_totals(&self.lines, self.service_charge_pct, discount_pct);
        debug!(event_id = %self.event_id, total = self.totals.total, "checkout recalculated");
    }

    pub fn payment_items(&self) -> Vec<PaymentItem> {
        self.lines
            .iter()
            .filter(|l| l.quantity > 0)
            .map(|l| PaymentItem {
                catalog_item_id: l.item_id.clone(),
                quantity: l.quantity,
                unit_price: l.unit_price,
                seats: l.seats.clone(),
            })
            .collect()
    }

    pub fn payment_plan(&self) -> Result<PaymentPlan, CheckoutError> {
        let items = self.payment_items();
        if items.is_empty() {
            return Err(CheckoutError::Empty);
        }
        let rrpp_code = self.promo.as_ref().map(|p| p.code.clone());

        if self.totals.total == 0.0 {
            Ok(PaymentPlan::Free(FreeCheckoutRequest {
                event_id: self.event_id.clone(),
                items,
                rrpp_code,
            }))
        } else {
            Ok(PaymentPlan::Paid(CreatePreferenceRequest {
                event_id: self.event_id.clone(),
                items,
                rrpp_code,
                total: self.totals.total,
            }))
        }
    }
}
