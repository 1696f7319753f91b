//! Startup configuration: command line flags with environment fallbacks.

use std::path::PathBuf;

use clap::Parser;

use crate::data::clean::NumericPolicy;

/// File read when neither `--data` nor `LASTMILE_DATA` is given.
pub const DEFAULT_DATA_PATH: &str = "Last mile Delivery Data.csv";

#[derive(Debug, Clone, Parser)]
#[command(name = "lastmile-dash")]
#[command(about = "Interactive dashboard over last-mile delivery performance data", long_about = None)]
pub struct Config {
    /// Delivery table to load (.csv, .json or .parquet)
    #[arg(short, long, value_name = "PATH", env = "LASTMILE_DATA", default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Drop (strict) or keep as null (lenient) rows whose numeric cells do not parse
    #[arg(
        long,
        value_enum,
        env = "LASTMILE_NUMERIC_POLICY",
        default_value_t = NumericPolicy::Strict
    )]
    pub numeric_policy: NumericPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cfg = Config::try_parse_from([
            "lastmile-dash",
            "--data",
            "deliveries.parquet",
            "--numeric-policy",
            "lenient",
        ])
        .expect("parse");
        assert_eq!(cfg.data, PathBuf::from("deliveries.parquet"));
        assert_eq!(cfg.numeric_policy, NumericPolicy::Lenient);
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(Config::try_parse_from(["lastmile-dash", "--numeric-policy", "fuzzy"]).is_err());
    }
}
