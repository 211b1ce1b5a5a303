//! pinharvest: harvest Pinterest search results into an Eagle library.
//!
//! A pass searches each keyword in a real browser, collects pin candidates,
//! skips anything already in the SQLite ledger and imports the rest through
//! Eagle's add-from-URL API.

pub mod browser;
pub mod catalog;
pub mod config;
pub mod harvest;
pub mod models;
pub mod navigator;
pub mod pacing;
pub mod repository;
