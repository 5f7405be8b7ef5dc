//! Runtime settings - command line flags with environment fallbacks

use std::path::PathBuf;

use chrono::{FixedOffset, Local, Offset};
use clap::Args;

use crate::error::{Result, TrackerError};
use crate::units::WeightUnit;

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// SQLite database file
    #[arg(long = "db", env = "IRONLOG_DB", default_value = "ironlog.db", global = true)]
    pub db_path: PathBuf,

    /// Calendar offset from UTC in hours (defaults to the host's local offset)
    #[arg(long, env = "IRONLOG_UTC_OFFSET", allow_hyphen_values = true, global = true)]
    pub utc_offset: Option<i32>,

    /// Unit weights are typed in
    #[arg(long, env = "IRONLOG_UNIT", value_enum, default_value_t = WeightUnit::Pounds, global = true)]
    pub unit: WeightUnit,
}

impl Settings {
    pub fn timezone(&self) -> Result<FixedOffset> {
        match self.utc_offset {
            Some(hours) => hours
                .checked_mul(3600)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| TrackerError::InvalidInput(format!("UTC offset {} hours", hours))),
            None => Ok(Local::now().offset().fix()),
        }
    }
}
