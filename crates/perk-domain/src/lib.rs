//! perk-domain
//!
//! Pure domain models (Card, Voucher, VoucherPeriod, UserProfile) and the period generator.
//! No I/O, no storage. Only data types, core enums and pure helpers.

pub mod card;
pub mod common;
pub mod period;
pub mod profile;
pub mod voucher;

pub use card::*;
pub use common::*;
pub use period::*;
pub use profile::*;
pub use voucher::*;
