//! Market data models
//!
//! This module contains the canonical data types every provider normalizes into:
//! - `types` - Exchange identifiers and well-known exchange constants
//! - `snapshot` - The canonical company response (`CompanySnapshot`)
//! - `profile` - Company profile and peer records
//! - `numeric` - Lenient parsing of vendor numbers that arrive as text

mod numeric;
mod profile;
mod snapshot;
mod types;

pub use numeric::{clean_text, decimal_from_value, lenient, parse_decimal};
pub use profile::{CompanyProfile, PeerCompany};
pub use snapshot::CompanySnapshot;
pub use types::{exchange_from_symbol, ExchangeId, BSE, NSE};
