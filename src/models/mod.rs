pub mod access;
pub mod catalog;
pub mod event;
pub mod list;
pub mod payment;
pub mod rrpp;
pub mod seat;
pub mod stadium;
pub mod user;

pub use catalog::{CatalogItem, CatalogItemType, Stock};
pub use event::{CreateEventRequest, Event};
pub use seat::{Seat, SeatStatus};
pub use stadium::{Orientation, Sector, Stadium, Stand, TierType};
pub use user::UserProfile;
