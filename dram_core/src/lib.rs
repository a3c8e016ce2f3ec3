#![forbid(unsafe_code)]

//! Core domain model and consumption analytics for dram.
//!
//! This crate provides:
//! - Domain types (events, presets, physiology, buckets)
//! - Pharmacokinetic calculator (ethanol mass, BAC, sobering time, risk)
//! - Financial projection calculator
//! - Calendar-bucketed aggregation engine
//! - Persistence (event journal, state file, CSV export)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod pharmacokinetics;
pub mod finance;
pub mod aggregation;
pub mod status;
pub mod journal;
pub mod state;
pub mod store;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_presets, default_presets};
pub use config::Config;
pub use aggregation::{category_breakdown, most_frequent_category, Aggregator, DayWindow};
pub use finance::{projected_savings, SavingsProjection};
pub use status::ConsumptionStatus;
pub use store::{EventStore, FileStore};
