//! Data models for the portfolio content.
//!
//! Field names serialize in camelCase, matching the site's JSON dataset and
//! export files.

mod about;
mod dataset;
mod signal;
mod work;

pub use about::*;
pub use dataset::*;
pub use signal::*;
pub use work::*;
