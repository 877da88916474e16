//! perk-core
//!
//! Business logic and services for the voucher tracker.
//! Depends on perk-domain. No terminal I/O; persistence goes through [`TrackerStore`].

pub mod aggregation;
pub mod auth;
pub mod card_service;
pub mod dataset;
pub mod error;
pub mod memory;
pub mod profile_service;
pub mod stats_service;
pub mod storage;
pub mod time;
pub mod voucher_service;

pub use aggregation::*;
pub use auth::*;
pub use card_service::*;
pub use dataset::TrackerDataset;
pub use error::CoreError;
pub use memory::MemoryTrackerStore;
pub use profile_service::*;
pub use stats_service::*;
pub use storage::{dataset_warnings, TrackerStore};
pub use time::*;
pub use voucher_service::*;
