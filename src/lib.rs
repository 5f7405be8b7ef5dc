//! ironlog - Personal workout log with cached per-exercise statistics
//!
//! Sessions are logged against workout options; each option keeps a stat
//! aggregate that is recomputed lazily when its watermark moves.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod monthly;
pub mod ops;
pub mod routines;
pub mod stats;
pub mod units;

pub use db::Database;
pub use error::{Result, TrackerError};
pub use ops::Tracker;
