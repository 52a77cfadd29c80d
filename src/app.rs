//! High-level application orchestration layer.
//!
//! `App::run` owns the run steps in order:
//!   1. Input path existence check (before anything is read)
//!   2. Config load / validation
//!   3. Table read (format dispatched on the input extension)
//!   4. Enrichment through the blocking AbuseIPDB client
//!   5. Table write to the destination (`input_file` under `--update`)
//!
//! Every failure it returns is one of the fatal classes; the per-row and
//! per-lookup warning classes are handled inside the driver and never
//! abort the run.

use std::path::Path;

use crate::cli::Cli;
use crate::config::Config;
use crate::enrich::enrich_table;
use crate::errors::{EnricherError, Result};
use crate::formats;
use crate::reputation::AbuseIpDbClient;

/// CLI-facing façade; one instance per run.
pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn run(&self) -> Result<()> {
        let input = Path::new(&self.cli.input_file);
        if !input.is_file() {
            return Err(EnricherError::missing_input_file(&self.cli.input_file));
        }

        let config = Config::from_env();
        config.validate()?;

        if self.cli.is_trace() {
            eprintln!(
                "Reading {} (lookback {} days, endpoint {})",
                self.cli.input_file, config.max_age_days, config.endpoint
            );
        }

        let mut table = formats::read_table(input)?;
        let client = AbuseIpDbClient::new(&self.cli.api_key, &config)?;
        let stats = enrich_table(&mut table, &self.cli.ip_column, &client, &self.cli)?;

        let destination = Path::new(self.cli.destination());
        formats::write_table(&table, destination)?;

        println!("Enriched data has been saved to {}", destination.display());
        if self.cli.is_trace() {
            eprintln!(
                "Processed {} rows: {} lookups ({} failed), {} rows skipped",
                stats.rows, stats.lookups, stats.failed_lookups, stats.skipped_rows
            );
        }
        Ok(())
    }
}
