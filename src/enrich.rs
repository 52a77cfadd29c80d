//! The enrichment driver.
//!
//! Walks the table row by row, resolving each row's IP value through a
//! run-scoped memo backed by the reputation client, and writes the outcome
//! into the two target columns. The memo is owned by one invocation and
//! never leaks across runs, so repeated calls (tests included) start cold.
//!
//! Failure policy: a missing IP cell or a failed lookup is a warning and
//! the run continues; only a missing IP column aborts, and it aborts before
//! the table is mutated at all. Failed lookups are memoized as
//! `Unavailable`, so a recurring bad IP is not retried within the run.

use std::collections::HashMap;

use crate::errors::{EnricherError, Result};
use crate::reputation::{Reputation, ReputationLookup};
use crate::table::{Cell, Table};

/// Target column for the registered country.
pub const COUNTRY_CODE_COLUMN: &str = "CountryCode";

/// Target column for the abuse-confidence score.
pub const ABUSE_SCORE_COLUMN: &str = "AbuseConfidenceScore";

/// Verbosity environment for the driver. Mirrors the CLI's levels but keeps
/// the driver independent of the concrete CLI type.
pub trait EnrichEnv {
    fn warn_enabled(&self) -> bool;
    fn is_trace(&self) -> bool;
}

impl EnrichEnv for crate::cli::Cli {
    fn warn_enabled(&self) -> bool {
        self.warn_enabled()
    }
    fn is_trace(&self) -> bool {
        self.is_trace()
    }
}

/// Memo entry: a completed lookup or one that failed. Both render as
/// absent cells, but downstream code can tell "failed" from "no data".
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Reputation),
    Unavailable,
}

impl LookupOutcome {
    /// The pair of cells written into the target columns.
    fn cells(&self) -> (Cell, Cell) {
        match self {
            LookupOutcome::Found(rep) => (
                rep.country_code
                    .clone()
                    .map_or(Cell::Empty, Cell::Text),
                rep.abuse_confidence_score
                    .map_or(Cell::Empty, Cell::Number),
            ),
            LookupOutcome::Unavailable => (Cell::Empty, Cell::Empty),
        }
    }
}

/// Per-run accounting, reported by the command surface after a run.
#[derive(Debug, Clone, Default)]
pub struct EnrichStats {
    pub rows: usize,
    pub skipped_rows: usize,
    pub lookups: usize,
    pub failed_lookups: usize,
    pub warnings: Vec<String>,
}

/// Enrich `table` in place.
///
/// Precondition: `ip_column` must name an existing column; otherwise a
/// typed error is returned and the table is left untouched. The target
/// columns are created (`Empty`-filled) when missing; rows whose IP cell is
/// absent keep whatever those columns already held.
pub fn enrich_table<L, E>(
    table: &mut Table,
    ip_column: &str,
    client: &L,
    env: &E,
) -> Result<EnrichStats>
where
    L: ReputationLookup + ?Sized,
    E: EnrichEnv + ?Sized,
{
    let ip_idx = table
        .column_index(ip_column)
        .ok_or_else(|| EnricherError::missing_column(ip_column))?;

    let country_idx = table.ensure_column(COUNTRY_CODE_COLUMN);
    let score_idx = table.ensure_column(ABUSE_SCORE_COLUMN);

    let mut memo: HashMap<String, LookupOutcome> = HashMap::new();
    let mut stats = EnrichStats {
        rows: table.row_count(),
        ..Default::default()
    };

    for row in 0..table.row_count() {
        // The exact cell text is the memo key; no trimming, no validation.
        let Some(key) = table.cell(row, ip_idx).as_key() else {
            let message = format!("Missing IP address at row {row}. Skipping.");
            if env.warn_enabled() {
                eprintln!("Warning: {message}");
            }
            stats.warnings.push(message);
            stats.skipped_rows += 1;
            continue;
        };

        if !memo.contains_key(&key) {
            if env.is_trace() {
                eprintln!("Looking up reputation for {key}");
            }
            stats.lookups += 1;
            let outcome = match client.lookup(&key) {
                Ok(reputation) => LookupOutcome::Found(reputation),
                Err(e) => {
                    let message = format!("Error fetching data for IP {key}: {e}");
                    if env.warn_enabled() {
                        eprintln!("Warning: {message}");
                    }
                    stats.warnings.push(message);
                    stats.failed_lookups += 1;
                    LookupOutcome::Unavailable
                }
            };
            memo.insert(key.clone(), outcome);
        }

        let (country, score) = memo[&key].cells();
        table.set_cell(row, country_idx, country);
        table.set_cell(row, score_idx, score);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashSet;

    /// In-process lookup fake with a call counter, per the driver's
    /// at-most-one-call-per-distinct-IP guarantee.
    struct FakeLookup {
        results: HashMap<String, Reputation>,
        failing: HashSet<String>,
        calls: RefCell<usize>,
    }

    impl FakeLookup {
        fn new() -> Self {
            Self {
                results: HashMap::new(),
                failing: HashSet::new(),
                calls: RefCell::new(0),
            }
        }

        fn with(mut self, ip: &str, country: &str, score: f64) -> Self {
            self.results.insert(
                ip.to_string(),
                Reputation {
                    country_code: Some(country.to_string()),
                    abuse_confidence_score: Some(score),
                },
            );
            self
        }

        fn failing_on(mut self, ip: &str) -> Self {
            self.failing.insert(ip.to_string());
            self
        }

        fn call_count(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl ReputationLookup for FakeLookup {
        fn lookup(&self, ip: &str) -> Result<Reputation> {
            *self.calls.borrow_mut() += 1;
            if self.failing.contains(ip) {
                return Err(EnricherError::lookup(ip, "connection refused"));
            }
            Ok(self.results.get(ip).cloned().unwrap_or_default())
        }
    }

    struct Quiet;
    impl EnrichEnv for Quiet {
        fn warn_enabled(&self) -> bool {
            false
        }
        fn is_trace(&self) -> bool {
            false
        }
    }

    fn ip_table(ips: &[Option<&str>]) -> Table {
        let mut t = Table::new(vec!["ip".into()]);
        for ip in ips {
            t.push_row(vec![match ip {
                Some(s) => Cell::Text((*s).to_string()),
                None => Cell::Empty,
            }]);
        }
        t
    }

    #[test]
    fn duplicate_ips_trigger_one_lookup_each() {
        let mut table = ip_table(&[Some("1.1.1.1"), Some("1.1.1.1"), Some("8.8.8.8")]);
        let fake = FakeLookup::new()
            .with("1.1.1.1", "AU", 10.0)
            .with("8.8.8.8", "US", 0.0);

        let stats = enrich_table(&mut table, "ip", &fake, &Quiet).unwrap();

        assert_eq!(fake.call_count(), 2);
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.rows, 3);

        let country = table.column_index(COUNTRY_CODE_COLUMN).unwrap();
        let score = table.column_index(ABUSE_SCORE_COLUMN).unwrap();
        let expect = [("AU", 10.0), ("AU", 10.0), ("US", 0.0)];
        for (row, (cc, sc)) in expect.iter().enumerate() {
            assert_eq!(table.cell(row, country), &Cell::Text((*cc).to_string()));
            assert_eq!(table.cell(row, score), &Cell::Number(*sc));
        }
    }

    #[test]
    fn missing_ip_rows_keep_prior_target_values() {
        let mut table = Table::new(vec![
            "ip".into(),
            COUNTRY_CODE_COLUMN.into(),
            ABUSE_SCORE_COLUMN.into(),
        ]);
        table.push_row(vec![Cell::Empty, Cell::Text("XX".into()), Cell::Number(7.0)]);
        table.push_row(vec![
            Cell::Text("8.8.8.8".into()),
            Cell::Text("stale".into()),
            Cell::Empty,
        ]);
        let fake = FakeLookup::new().with("8.8.8.8", "US", 0.0);

        let stats = enrich_table(&mut table, "ip", &fake, &Quiet).unwrap();

        // Skipped row: untouched. Looked-up row: prior values overwritten.
        assert_eq!(table.cell(0, 1), &Cell::Text("XX".into()));
        assert_eq!(table.cell(0, 2), &Cell::Number(7.0));
        assert_eq!(table.cell(1, 1), &Cell::Text("US".into()));
        assert_eq!(table.cell(1, 2), &Cell::Number(0.0));

        assert_eq!(stats.skipped_rows, 1);
        assert!(stats.warnings[0].contains("row 0"));
        assert_eq!(fake.call_count(), 1);
    }

    #[test]
    fn failed_lookup_writes_absent_and_is_not_retried() {
        let mut table = ip_table(&[Some("9.9.9.9"), Some("9.9.9.9")]);
        let fake = FakeLookup::new().failing_on("9.9.9.9");

        let stats = enrich_table(&mut table, "ip", &fake, &Quiet).unwrap();

        assert_eq!(fake.call_count(), 1);
        assert_eq!(stats.failed_lookups, 1);
        assert!(stats.warnings.iter().any(|w| w.contains("9.9.9.9")));

        let country = table.column_index(COUNTRY_CODE_COLUMN).unwrap();
        let score = table.column_index(ABUSE_SCORE_COLUMN).unwrap();
        for row in 0..2 {
            assert!(table.cell(row, country).is_empty());
            assert!(table.cell(row, score).is_empty());
        }
    }

    #[test]
    fn missing_column_aborts_without_mutation() {
        let mut table = ip_table(&[Some("1.1.1.1")]);
        let fake = FakeLookup::new();

        let err = enrich_table(&mut table, "src_ip", &fake, &Quiet).unwrap_err();
        assert!(matches!(err, EnricherError::MissingColumn { .. }));
        assert!(err.to_string().contains("src_ip"));

        // Precondition failure mutates nothing.
        assert_eq!(table.columns(), &["ip".to_string()]);
        assert_eq!(fake.call_count(), 0);
    }

    #[test]
    fn memo_keys_are_not_normalized() {
        let mut table = ip_table(&[Some("1.2.3.4"), Some("1.2.3.4 ")]);
        let fake = FakeLookup::new().with("1.2.3.4", "DE", 5.0);

        enrich_table(&mut table, "ip", &fake, &Quiet).unwrap();
        assert_eq!(fake.call_count(), 2);
    }

    #[test]
    fn partially_absent_reputation_fills_only_known_fields() {
        let mut table = ip_table(&[Some("5.5.5.5")]);
        let mut fake = FakeLookup::new();
        fake.results.insert(
            "5.5.5.5".into(),
            Reputation {
                country_code: None,
                abuse_confidence_score: Some(42.0),
            },
        );

        enrich_table(&mut table, "ip", &fake, &Quiet).unwrap();
        let country = table.column_index(COUNTRY_CODE_COLUMN).unwrap();
        let score = table.column_index(ABUSE_SCORE_COLUMN).unwrap();
        assert!(table.cell(0, country).is_empty());
        assert_eq!(table.cell(0, score), &Cell::Number(42.0));
    }

    #[test]
    fn enrichment_is_idempotent_for_a_fixed_client() {
        let fake = FakeLookup::new()
            .with("1.1.1.1", "AU", 10.0)
            .with("8.8.8.8", "US", 0.0);

        let mut first = ip_table(&[Some("1.1.1.1"), None, Some("8.8.8.8")]);
        enrich_table(&mut first, "ip", &fake, &Quiet).unwrap();

        let mut second = first.clone();
        enrich_table(&mut second, "ip", &fake, &Quiet).unwrap();

        assert_eq!(first, second);
    }
}
