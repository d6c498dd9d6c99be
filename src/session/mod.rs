//! session
//!
//! Состояние одного покупателя: событие, выбор мест, корзина, профиль и
//! уведомления. Каждая часть хранится в своём сторе и меняется только
//! через методы [`Session`]; наружу отдаются ссылки и снимки.
//!
//! Сетевые вызовы сессия сама не делает: обработчик берёт из неё запрос,
//! отпускает блокировку, ждёт upstream и возвращает результат обратно.

pub mod registry;
pub mod scope;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::checkout::{CheckoutError, CheckoutState, CheckoutTotals, PaymentPlan};
use crate::error::ApiError;
use crate::models::payment::ReserveSeatsResponse;
use crate::models::rrpp::RrppPromo;
use crate::models::{Event, UserProfile};
use crate::selection::{
    ContinueOutcome, Redirect, SeatPager, SeatView, SelectionError, SelectionMachine, SelectionState,
    ToggleOutcome,
};
use crate::services::ApiClient;

pub use registry::{InFlight, SessionHandle, SessionRegistry};
pub use scope::ViewScope;

#[derive(Debug, Clone)]
pub struct EventStore {
    event: Event,
    fetched_at: DateTime<Utc>,
}

impl EventStore {
    fn new(event: Event) -> Self {
        Self { event, fetched_at: Utc::now() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserStore {
    profile: Option<UserProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct UiStore {
    toasts: Vec<Toast>,
}

impl UiStore {
    fn push(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toasts.push(Toast { level, message: message.into() });
    }
}

/// Ряд с местами текущей страницы.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowView {
    pub label: String,
    pub seats: Vec<SeatView>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatsPage {
    pub sector_id: String,
    pub page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub rows: Vec<RowView>,
}

/// Короткий ряд на дальних страницах пуст, а не повторяет свою последнюю.
fn page_of<'a, T>(pager: SeatPager, items: &'a [T], page: usize) -> &'a [T] {
    if page < pager.page_count(items.len()) {
        pager.page(items, page)
    } else {
        &[]
    }
}

/// Снимок сессии для клиента.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub event_id: String,
    pub event_name: String,
    pub fetched_at: DateTime<Utc>,
    pub selection: SelectionState,
    pub selected_seats: Vec<String>,
    pub checkout: CheckoutState,
    pub user: Option<UserProfile>,
    pub toasts: Vec<Toast>,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    cookie: Option<String>,
    events: EventStore,
    selection: SelectionMachine,
    checkout: CheckoutState,
    user: UserStore,
    ui: UiStore,
    scope: ViewScope,
    last_seen: Instant,
}

impl Session {
    pub fn new(event: Event, cookie: Option<String>) -> Self {
        let id = Uuid::new_v4();
        info!(session_id = %id, event_id = %event.id, "session opened");
        Self {
            id,
            cookie,
            selection: SelectionMachine::new(event.id.clone()),
            checkout: CheckoutState::for_event(&event),
            events: EventStore::new(event),
            user: UserStore::default(),
            ui: UiStore::default(),
            scope: ViewScope::new(),
            last_seen: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn event(&self) -> &Event {
        &self.events.event
    }

    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    pub fn checkout(&self) -> &CheckoutState {
        &self.checkout
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.profile.as_ref()
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    /// Клиент upstream от имени владельца сессии.
    pub fn client(&self, api: &ApiClient) -> ApiClient {
        api.with_session(self.cookie.clone())
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }

    pub fn set_user(&mut self, profile: Option<UserProfile>) {
        self.user.profile = profile;
    }

    /// Резерв мест ушёл на сервер и ответа ещё нет.
    pub fn reservation_in_flight(&self) -> bool {
        self.selection.is_submitting()
    }

    /// Свежая версия события с сервера. Корзина и выбор строятся заново,
    /// поэтому во время резерва замена запрещена.
    pub fn replace_event(&mut self, event: Event) -> Result<(), SelectionError> {
        if self.reservation_in_flight() {
            return self.report(Err(SelectionError::InvalidTransition("a reservation is in flight")));
        }
        debug!(session_id = %self.id, event_id = %event.id, "event refreshed");
        self.selection = SelectionMachine::new(event.id.clone());
        self.checkout = CheckoutState::for_event(&event);
        self.events = EventStore::new(event);
        Ok(())
    }

    pub fn select_sector(&mut self, sector_id: &str) -> Result<SelectionState, SelectionError> {
        let result = self
            .selection
            .select_sector(&self.events.event, sector_id)
            .map(Clone::clone);
        self.report(result)
    }

    pub fn clear_sector(&mut self) -> Result<(), SelectionError> {
        let result = self.selection.clear_sector();
        self.report(result)
    }

    pub fn toggle_seat(&mut self, code: &str) -> Result<ToggleOutcome, SelectionError> {
        let outcome = self.selection.toggle_seat(code);
        if let Ok(ToggleOutcome::LimitReached { max }) = &outcome {
            self.ui
                .push(ToastLevel::Warning, format!("Podés elegir hasta {} asientos", max));
        }
        self.report(outcome)
    }

    /// Места выбранного сектора, по рядам, страница `page`.
    pub fn seats_view(&self, pager: SeatPager, page: usize) -> Result<SeatsPage, SelectionError> {
        let sector_id = self
            .selection
            .sector_id()
            .ok_or(SelectionError::InvalidTransition("no sector is selected"))?;
        let stadium = self.event().stadium.as_ref().ok_or(SelectionError::NoStadium)?;
        let (_, sector) = stadium
            .find_sector(sector_id)
            .ok_or_else(|| SelectionError::UnknownSector(sector_id.to_string()))?;

        let rows = sector.rows();
        let page_count = rows
            .iter()
            .map(|(_, seats)| pager.page_count(seats.len()))
            .max()
            .unwrap_or(1);
        let page = page.min(page_count - 1);
        let selected = self.selection.selected();

        let rows = rows
            .iter()
            .map(|(label, seats)| RowView {
                label: label.to_string(),
                seats: page_of(pager, seats, page)
                    .iter()
                    .map(|seat| SeatView::from_seat(seat, selected))
                    .collect(),
            })
            .collect();

        Ok(SeatsPage {
            sector_id: sector.id.clone(),
            page,
            page_count,
            page_size: pager.page_size(),
            rows,
        })
    }

    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) -> Result<CheckoutTotals, CheckoutError> {
        let result = self.checkout.set_quantity(item_id, quantity);
        if let Err(e) = &result {
            self.ui.push(ToastLevel::Error, e.user_message());
        }
        result
    }

    pub fn apply_promo(&mut self, promo: RrppPromo) -> Result<CheckoutTotals, CheckoutError> {
        let code = promo.code.clone();
        let result = self.checkout.apply_promo(promo);
        match &result {
            Ok(_) => self.ui.push(ToastLevel::Info, format!("Código {} aplicado", code)),
            Err(e) => self.ui.push(ToastLevel::Error, e.user_message()),
        }
        result
    }

    pub fn clear_promo(&mut self) {
        self.checkout.clear_promo();
    }

    pub fn continue_flow(&mut self) -> Result<ContinueOutcome, SelectionError> {
        let result = self.selection.continue_flow(&mut self.checkout);
        self.report(result)
    }

    /// Ответ на резерв. Успех переносит места в корзину.
    pub fn complete_reservation(
        &mut self,
        result: Result<ReserveSeatsResponse, ApiError>,
    ) -> Result<Redirect, SelectionError> {
        let seats = self.selection.selected().to_vec();
        let item_id = self.selection.item_id().map(str::to_string);

        let outcome = self.selection.complete_reservation(result);
        let redirect = self.report(outcome)?;
        if let Some(item_id) = item_id {
            self.checkout.set_seats(&item_id, seats)?;
        }
        Ok(redirect)
    }

    pub fn payment_plan(&self) -> Result<PaymentPlan, CheckoutError> {
        self.checkout.payment_plan()
    }

    /// Забирает накопленные уведомления.
    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.ui.toasts)
    }

    /// Снимок состояния; уведомления отдаются один раз.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            event_id: self.events.event.id.clone(),
            event_name: self.events.event.name.clone(),
            fetched_at: self.events.fetched_at,
            selection: self.selection.state().clone(),
            selected_seats: self.selection.selected().to_vec(),
            checkout: self.checkout.clone(),
            user: self.user.profile.clone(),
            toasts: self.take_toasts(),
        }
    }

    fn report<T>(&mut self, result: Result<T, SelectionError>) -> Result<T, SelectionError> {
        if let Err(e) = &result {
            if !matches!(e, SelectionError::Upstream(ApiError::Cancelled)) {
                self.ui.push(ToastLevel::Error, e.user_message());
            }
        }
        result
    }
}
