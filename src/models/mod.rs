//! Data models for pinharvest.

mod item;
mod seen;

pub use item::HarvestedItem;
pub use seen::SeenRecord;
