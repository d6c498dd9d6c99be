//! selection.rs
//!
//! Машина состояний выбора сектора и мест.
//!
//! ```text
//! SectorUnselected -> SectorSelected (ненумерованный) -> Redirected(GeneralCheckout)
//! SectorUnselected -> SeatPicking (нумерованный) -> Submitting -> Redirected(Payment)
//!                                                        \-> SeatPicking + ошибка
//! ```
//!
//! Доступность мест решает только сервер: локально ничего не блокируем
//! и после отказа автоматически не повторяем.

use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use crate::checkout::{CheckoutError, CheckoutState};
use crate::error::ApiError;
use crate::models::payment::ReserveSeatsResponse;
use crate::models::{Event, Seat, SeatStatus};

pub const WIDE_PAGE_SIZE: usize = 10;
pub const NARROW_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Redirect {
    GeneralCheckout { path: String },
    Payment { path: String },
}

impl Redirect {
    pub fn path(&self) -> &str {
        match self {
            Redirect::GeneralCheckout { path } | Redirect::Payment { path } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum SelectionState {
    SectorUnselected,
    #[serde(rename_all = "camelCase")]
    SectorSelected { sector_id: String, item_id: String },
    #[serde(rename_all = "camelCase")]
    SeatPicking {
        sector_id: String,
        item_id: String,
        last_error: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Submitting { sector_id: String, item_id: String },
    Redirected { redirect: Redirect },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Лимит `maxPerPerson` уже набран: состояние не меняется.
    LimitReached { max: u32 },
}

/// Что делать после «Continuar».
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContinueOutcome {
    Redirect(Redirect),
    Reserve(ReservationRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub event_id: String,
    pub item_id: String,
    pub seats: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("event has no stadium map")]
    NoStadium,
    #[error("sector {0} does not exist")]
    UnknownSector(String),
    #[error("sector {0} is not on sale")]
    SectorNotForSale(String),
    #[error("seat {0} does not exist in this sector")]
    UnknownSeat(String),
    #[error("seat {0} is not available")]
    SeatUnavailable(String),
    #[error("no seats selected")]
    EmptySelection,
    #[error("action not allowed while {0}")]
    InvalidTransition(&'static str),
    #[error("seat was already reserved")]
    SeatAlreadyReserved,
    #[error(transparent)]
    Checkout(#[from] CheckoutError),
    #[error(transparent)]
    Upstream(#[from] ApiError),
}

impl SelectionError {
    pub fn user_message(&self) -> String {
        match self {
            SelectionError::NoStadium => "El evento no tiene mapa de estadio".to_string(),
            SelectionError::UnknownSector(_) => "Sector inexistente".to_string(),
            SelectionError::SectorNotForSale(_) => "El sector no está a la venta".to_string(),
            SelectionError::UnknownSeat(_) => "Asiento inexistente".to_string(),
            SelectionError::SeatUnavailable(code) => format!("El asiento {} no está disponible", code),
            SelectionError::EmptySelection => "Seleccioná al menos un asiento".to_string(),
            SelectionError::InvalidTransition(_) => "Acción no permitida en este paso".to_string(),
            SelectionError::SeatAlreadyReserved => "El asiento ya fue reservado".to_string(),
            SelectionError::Checkout(e) => e.user_message(),
            SelectionError::Upstream(e) => e.user_message(),
        }
    }
}

/// Контекст выбранного сектора, собранный из события.
#[derive(Debug, Clone)]
struct SectorContext {
    sector_id: String,
    item_id: String,
    numerated: bool,
    max_per_person: Option<u32>,
    /// Код места -> можно ли его выбрать.
    seats: HashMap<String, bool>,
}

#[derive(Debug, Clone)]
pub struct SelectionMachine {
    event_id: String,
    state: SelectionState,
    sector: Option<SectorContext>,
    selected: Vec<String>,
}

impl SelectionMachine {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            state: SelectionState::SectorUnselected,
            sector: None,
            selected: Vec::new(),
        }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn sector_id(&self) -> Option<&str> {
        self.sector.as_ref().map(|s| s.sector_id.as_str())
    }

    pub fn item_id(&self) -> Option<&str> {
        self.sector.as_ref().map(|s| s.item_id.as_str())
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SelectionState::Submitting { .. })
    }

    fn state_name(&self) -> &'static str {
        match self.state {
            SelectionState::SectorUnselected => "no sector is selected",
            SelectionState::SectorSelected { .. } => "a general sector is selected",
            SelectionState::SeatPicking { .. } => "picking seats",
            SelectionState::Submitting { .. } => "a reservation is in flight",
            SelectionState::Redirected { .. } => "already redirected",
        }
    }

    /// Выбор сектора. Смена сектора или его типа сбрасывает выбранные места.
    pub fn select_sector(&mut self, event: &Event, sector_id: &str) -> Result<&SelectionState, SelectionError> {
        if self.is_submitting() {
            return Err(SelectionError::InvalidTransition(self.state_name()));
        }

        let stadium = event.stadium.as_ref().ok_or(SelectionError::NoStadium)?;
        let (_, sector) = stadium
            .find_sector(sector_id)
            .ok_or_else(|| SelectionError::UnknownSector(sector_id.to_string()))?;
        let item = event
            .item_for_sector(sector_id)
            .ok_or_else(|| SelectionError::SectorNotForSale(sector_id.to_string()))?;

        let changed = self
            .sector
            .as_ref()
            .map_or(true, |cur| cur.sector_id != sector.id || cur.numerated != sector.numerated);
        if changed {
            self.selected.clear();
        }

        self.sector = Some(SectorContext {
            sector_id: sector.id.clone(),
            item_id: item.id.clone(),
            numerated: sector.numerated,
            max_per_person: item.max_per_person,
            seats: sector.seats.iter().map(|s| (s.code(), s.is_selectable())).collect(),
        });

        self.state = if sector.numerated {
            SelectionState::SeatPicking {
                sector_id: sector.id.clone(),
                item_id: item.id.clone(),
                last_error: None,
            }
        } else {
            SelectionState::SectorSelected {
                sector_id: sector.id.clone(),
                item_id: item.id.clone(),
            }
        };

        Ok(&self.state)
    }

    /// Снимает выбор сектора. Пока резерв в полёте, выбор не трогаем:
    /// ответ сервера должен найти машину в `Submitting`.
    pub fn clear_sector(&mut self) -> Result<(), SelectionError> {
        if self.is_submitting() {
            return Err(SelectionError::InvalidTransition(self.state_name()));
        }
        self.sector = None;
        self.selected.clear();
        self.state = SelectionState::SectorUnselected;
        Ok(())
    }

    /// Переключение места по коду. Повторный toggle того же кода возвращает
    /// набор к исходному.
    pub fn toggle_seat(&mut self, code: &str) -> Result<ToggleOutcome, SelectionError> {
        if !matches!(self.state, SelectionState::SeatPicking { .. }) {
            return Err(SelectionError::InvalidTransition(self.state_name()));
        }
        let Some(sector) = self.sector.as_ref() else {
            return Err(SelectionError::InvalidTransition(self.state_name()));
        };

        if let Some(pos) = self.selected.iter().position(|c| c == code) {
            self.selected.remove(pos);
            return Ok(ToggleOutcome::Removed);
        }

        match sector.seats.get(code) {
            None => return Err(SelectionError::UnknownSeat(code.to_string())),
            Some(true) => {}
            Some(false) => return Err(SelectionError::SeatUnavailable(code.to_string())),
        }

        if let Some(max) = sector.max_per_person {
            if self.selected.len() as u32 >= max {
                warn!(event_id = %self.event_id, sector_id = %sector.sector_id, max, "seat limit reached");
                return Ok(ToggleOutcome::LimitReached { max });
            }
        }

        self.selected.push(code.to_string());
        Ok(ToggleOutcome::Added)
    }

    /// «Continuar».
    ///
    /// Ненумерованный сектор: позиция каталога помечается выбранной с нулевым
    /// количеством, сразу редирект в общий checkout. Нумерованный: нужен хотя бы
    /// один выбранный код, машина уходит в `Submitting` и возвращает запрос
    /// на резерв.
    pub fn continue_flow(&mut self, checkout: &mut CheckoutState) -> Result<ContinueOutcome, SelectionError> {
        match &self.state {
            SelectionState::SectorSelected { item_id, .. } => {
                let item_id = item_id.clone();
                checkout.select_item(&item_id)?;
                let redirect = Redirect::GeneralCheckout {
                    path: format!("/events/{}/checkout?item={}", self.event_id, item_id),
                };
                info!(event_id = %self.event_id, item_id = %item_id, "redirecting to general checkout");
                self.state = SelectionState::Redirected { redirect: redirect.clone() };
                Ok(ContinueOutcome::Redirect(redirect))
            }
            SelectionState::SeatPicking { sector_id, item_id, .. } => {
                if self.selected.is_empty() {
                    return Err(SelectionError::EmptySelection);
                }
                let request = ReservationRequest {
                    event_id: self.event_id.clone(),
                    item_id: item_id.clone(),
                    seats: self.selected.clone(),
                };
                self.state = SelectionState::Submitting {
                    sector_id: sector_id.clone(),
                    item_id: item_id.clone(),
                };
                Ok(ContinueOutcome::Reserve(request))
            }
            _ => Err(SelectionError::InvalidTransition(self.state_name())),
        }
    }

    /// Применяет ответ сервера на резерв.
    ///
    /// `success` -> редирект на оплату; иначе обратно в выбор мест с ошибкой.
    pub fn complete_reservation(
        &mut self,
        result: Result<ReserveSeatsResponse, ApiError>,
    ) -> Result<Redirect, SelectionError> {
        let SelectionState::Submitting { sector_id, item_id } = &self.state else {
            return Err(SelectionError::InvalidTransition(self.state_name()));
        };
        let (sector_id, item_id) = (sector_id.clone(), item_id.clone());

        let error = match result {
            Ok(response) if response.is_success() => {
                let redirect = Redirect::Payment {
                    path: format!(
                        "/events/{}/payment?item={}&seats={}",
                        self.event_id,
                        item_id,
                        self.selected.join(",")
                    ),
                };
                info!(event_id = %self.event_id, seats = self.selected.len(), "seats reserved");
                self.state = SelectionState::Redirected { redirect: redirect.clone() };
                return Ok(redirect);
            }
            Ok(response) => {
                warn!(event_id = %self.event_id, status = %response.status, "seat reservation rejected");
                SelectionError::SeatAlreadyReserved
            }
            Err(e) => {
                warn!(event_id = %self.event_id, error = %e, "seat reservation failed");
                SelectionError::Upstream(e)
            }
        };

        self.state = SelectionState::SeatPicking {
            sector_id,
            item_id,
            last_error: Some(error.user_message()),
        };
        Err(error)
    }
}

/// Постраничный вывод мест в ряду. Влияет только на отображение.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatPager {
    page_size: usize,
}

impl SeatPager {
    pub fn new(page_size: usize) -> Self {
        Self { page_size: page_size.max(1) }
    }

    pub fn for_viewport(narrow: bool) -> Self {
        Self::new(if narrow { NARROW_PAGE_SIZE } else { WIDE_PAGE_SIZE })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size).max(1)
    }

    /// Страница `page` (с нуля); за пределами отдаётся последняя.
    pub fn page<'a, T>(&self, items: &'a [T], page: usize) -> &'a [T] {
        let page = page.min(self.page_count(items.len()) - 1);
        let start = (page * self.page_size).min(items.len());
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}

/// Место в представлении для выбора.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatView {
    pub code: String,
    pub status: SeatStatus,
    pub selected: bool,
}

impl SeatView {
    pub fn from_seat(seat: &Seat, selected: &[String]) -> Self {
        let code = seat.code();
        let selected = selected.contains(&code);
        Self { code, status: seat.status, selected }
    }
}
