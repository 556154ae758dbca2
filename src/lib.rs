//! Marching band operations: student roster, compliance and eligibility,
//! inventory of instruments, uniforms and shakos, checkouts, and section
//! leaders. Backed by SQLite, driven from a terminal UI.
pub mod config;
pub mod db;
pub mod eligibility;
pub mod error;
pub mod export;
pub mod models;
pub mod ui;

pub use config::Config;
pub use db::Store;
pub use error::{BandError, Result};
pub use ui::{run_app, App};
