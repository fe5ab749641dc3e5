//! ruídos atmosféricos content engine
//!
//! Local content store for the portfolio site: works, signals and about
//! records in an embedded SQLite object store, a version-gated seed sync,
//! export/import, the backoffice password gate and the block editor behind
//! signal authoring.

pub mod auth;
pub mod backoffice;
pub mod catalog;
pub mod config;
pub mod dates;
pub mod db;
pub mod editor;
pub mod errors;
pub mod models;
pub mod seed;
pub mod transfer;

pub use errors::AppError;
