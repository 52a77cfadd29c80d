//! ipenricher library
//!
//! Enriches a tabular dataset (CSV or Excel) by adding, for each row's IP
//! address, the registered country code and an abuse-confidence score
//! fetched from the AbuseIPDB check endpoint. The crate provides:
//!
//! - A row-oriented `Table` model over a closed set of file formats
//! - A blocking reputation client behind the `ReputationLookup` seam
//! - A memoizing enrichment driver (one lookup per distinct IP per run)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ipenricher::config::Config;
//! use ipenricher::formats::read_table;
//! use ipenricher::reputation::AbuseIpDbClient;
//!
//! let table = read_table(Path::new("hosts.csv"))?;
//! let client = AbuseIpDbClient::new("api-key", &Config::default())?;
//! // enrich_table needs a verbosity environment; the CLI provides one.
//! # let _ = (table, client);
//! # Ok::<(), ipenricher::errors::EnricherError>(())
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod enrich;
pub mod errors;
pub mod formats;
pub mod reputation;
pub mod table;

// Re-export commonly used types and functions for convenience
pub use enrich::{ABUSE_SCORE_COLUMN, COUNTRY_CODE_COLUMN, EnrichStats, enrich_table};
pub use errors::{EnricherError, ErrorCategory, Result};
pub use formats::{FileFormat, read_table, write_table};
pub use reputation::{AbuseIpDbClient, Reputation, ReputationLookup};
pub use table::{Cell, Table};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
