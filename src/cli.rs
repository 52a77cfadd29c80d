use clap::Parser;

/// Command-line interface definition.
/// Provides command-line options for tabular IP reputation enrichment.
///
/// Verbosity levels:
/// 0 - silent (only final output)
/// 1 - errors
/// 2 - warnings + errors (default)
/// 5 - trace/debug
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Enrich a CSV or Excel file with IP country codes and abuse-confidence scores from AbuseIPDB"
)]
pub struct Cli {
    /// Path to the input table (.csv, .xlsx or .xls).
    pub input_file: String,

    /// Path to the enriched output table; ignored when --update is set.
    pub output_file: String,

    /// Name of the column containing IP addresses.
    pub ip_column: String,

    /// AbuseIPDB API key, sent as the `Key` request header.
    pub api_key: String,

    /// Write results back into the input file instead of output_file.
    #[arg(long)]
    pub update: bool,

    /// Verbosity level (0,1,2,5)
    #[arg(long, default_value_t = 2)]
    pub verbose: u8,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Convenience: are we in very verbose/debug mode?
    pub fn is_trace(&self) -> bool {
        self.verbose >= 5
    }

    /// Are warning-level messages enabled?
    pub fn warn_enabled(&self) -> bool {
        self.verbose >= 2
    }

    /// Are error-level messages enabled?
    pub fn error_enabled(&self) -> bool {
        self.verbose >= 1
    }

    /// Destination path for the enriched table.
    pub fn destination(&self) -> &str {
        if self.update {
            &self.input_file
        } else {
            &self.output_file
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn positional_arguments() {
        let cli = parse(&["ipenricher", "in.csv", "out.csv", "ip", "secret"]);
        assert_eq!(cli.input_file, "in.csv");
        assert_eq!(cli.output_file, "out.csv");
        assert_eq!(cli.ip_column, "ip");
        assert_eq!(cli.api_key, "secret");
        assert!(!cli.update);
        assert_eq!(cli.destination(), "out.csv");
    }

    #[test]
    fn update_flag_redirects_destination() {
        let cli = parse(&["ipenricher", "in.xlsx", "out.xlsx", "ip", "k", "--update"]);
        assert!(cli.update);
        assert_eq!(cli.destination(), "in.xlsx");
    }

    #[test]
    fn verbosity_predicates() {
        let cli = parse(&["ipenricher", "a", "b", "c", "d"]);
        assert!(cli.warn_enabled());
        assert!(cli.error_enabled());
        assert!(!cli.is_trace());

        let silent = parse(&["ipenricher", "a", "b", "c", "d", "--verbose", "0"]);
        assert!(!silent.error_enabled());
    }
}
