//! recsv CLI - convert CSV files between dialects

use anyhow::{Context, Result};
use clap::Parser;
use recsv::{reformat, Dialect, QuotingPolicy, ReformatOptions};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recsv")]
#[command(
    author,
    version,
    about = "Convert a CSV file to a different dialect (delimiter, quoting, escaping, line endings)"
)]
struct Cli {
    /// Input CSV file (default: stdin; `-` also means stdin)
    input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input field delimiter
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// Input is tab-delimited (overrides --delimiter)
    #[arg(short, long, conflicts_with = "delimiter")]
    tabs: bool,

    /// Input quote character
    #[arg(short, long, default_value = "\"")]
    quotechar: char,

    /// Input quoting style: 0 = minimal, 1 = all, 2 = non-numeric, 3 = none
    #[arg(short = 'u', long, value_parser = clap::value_parser!(u8).range(0..=3))]
    quoting: Option<u8>,

    /// Input does not double quote characters inside quoted fields
    #[arg(short = 'b', long)]
    no_doublequote: bool,

    /// Input escape character
    #[arg(short = 'p', long)]
    escapechar: Option<char>,

    /// Ignore whitespace immediately following the input delimiter
    #[arg(short = 'S', long)]
    skipinitialspace: bool,

    /// Reject stray quote characters in the input
    #[arg(long)]
    strict: bool,

    /// The input has no header row; the first row is data
    #[arg(short = 'H', long)]
    no_header_row: bool,

    /// Number of leading input lines to discard before parsing
    #[arg(short = 'K', long, default_value = "0")]
    skip_lines: usize,

    /// Prepend a line_number column
    #[arg(short = 'l', long)]
    linenumbers: bool,

    /// Output field delimiter
    #[arg(short = 'D', long, default_value = ",")]
    out_delimiter: char,

    /// Output is tab-delimited (overrides --out-delimiter)
    #[arg(short = 'T', long, conflicts_with = "out_delimiter")]
    out_tabs: bool,

    /// Output quote character
    #[arg(short = 'Q', long, default_value = "\"")]
    out_quotechar: char,

    /// Output quoting style: 0 = minimal, 1 = all, 2 = non-numeric, 3 = none
    #[arg(short = 'U', long, value_parser = clap::value_parser!(u8).range(0..=3))]
    out_quoting: Option<u8>,

    /// Escape quote characters in output with the escape character instead of doubling them
    #[arg(short = 'B', long)]
    out_no_doublequote: bool,

    /// Output escape character
    #[arg(short = 'P', long)]
    out_escapechar: Option<char>,

    /// Output line terminator, written verbatim after every row (default: LF)
    #[arg(short = 'M', long, default_value = "\n", hide_default_value = true)]
    out_lineterminator: String,

    /// Log level (trace, debug, info, warn, error), used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Cli {
    fn source_dialect(&self) -> Result<Dialect> {
        let delimiter = if self.tabs { '\t' } else { self.delimiter };
        let quoting = QuotingPolicy::try_from(self.quoting.unwrap_or(0))?;

        Dialect::builder()
            .delimiter(delimiter)
            .quote_char(self.quotechar)
            .quoting(quoting)
            .double_quote(!self.no_doublequote)
            .escape_char(self.escapechar)
            .skip_initial_space(self.skipinitialspace)
            .strict(self.strict)
            .has_header_row(!self.no_header_row)
            .skip_lines(self.skip_lines)
            .add_line_numbers(self.linenumbers)
            .build()
            .context("Invalid input dialect")
    }

    fn target_dialect(&self) -> Result<Dialect> {
        let delimiter = if self.out_tabs { '\t' } else { self.out_delimiter };
        let quoting = QuotingPolicy::try_from(self.out_quoting.unwrap_or(0))?;

        Dialect::builder()
            .delimiter(delimiter)
            .quote_char(self.out_quotechar)
            .quoting(quoting)
            .double_quote(!self.out_no_doublequote)
            .escape_char(self.out_escapechar)
            .line_terminator(self.out_lineterminator.as_str())
            .build()
            .context("Invalid output dialect")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let source = cli.source_dialect()?;
    let target = cli.target_dialect()?;
    let options = ReformatOptions::from_dialect(&source);

    let input: Box<dyn Read> = match cli.input.as_deref() {
        Some(path) if path.as_os_str() != "-" => Box::new(
            File::open(path).with_context(|| format!("Failed to open '{}'", path.display()))?,
        ),
        _ => Box::new(io::stdin().lock()),
    };

    let output: Box<dyn Write> = match cli.output.as_deref() {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create '{}'", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    reformat(input, BufWriter::new(output), &source, &target, &options)
        .context("Failed to reformat CSV")?;

    if let Some(path) = &cli.output {
        info!("Wrote '{}'", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use recsv::LineTerminator;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("recsv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert_eq!(cli.source_dialect().unwrap(), Dialect::default());
        assert_eq!(
            cli.target_dialect().unwrap(),
            Dialect::builder()
                .line_terminator(LineTerminator::LF)
                .build()
                .unwrap()
        );
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_crlf_terminator_on_request() {
        let cli = parse(&["-M", "\r\n"]);
        assert_eq!(
            cli.target_dialect().unwrap().line_terminator(),
            &LineTerminator::CRLF
        );
    }

    #[test]
    fn test_input_options() {
        let cli = parse(&[
            "-t", "-q", "'", "-u", "3", "-b", "-p", "\\", "-S", "--strict", "-H", "-K", "3",
            "-l", "data.csv",
        ]);
        let source = cli.source_dialect().unwrap();
        assert_eq!(source.delimiter(), '\t');
        assert_eq!(source.quote_char(), '\'');
        assert_eq!(source.quoting(), QuotingPolicy::None);
        assert!(!source.double_quote());
        assert_eq!(source.escape_char(), Some('\\'));
        assert!(source.skip_initial_space());
        assert!(source.strict());
        assert!(!source.has_header_row());
        assert_eq!(source.skip_lines(), 3);
        assert!(source.add_line_numbers());
        assert_eq!(cli.input, Some(PathBuf::from("data.csv")));

        let options = ReformatOptions::from_dialect(&source);
        assert!(options.add_line_numbers);
        assert!(!options.has_header_row);
    }

    #[test]
    fn test_output_options_do_not_inherit_input() {
        let cli = parse(&["-d", ";", "-D", "|", "-Q", "*", "-U", "2", "-M", "XYZ"]);
        let target = cli.target_dialect().unwrap();
        assert_eq!(target.delimiter(), '|');
        assert_eq!(target.quote_char(), '*');
        assert_eq!(target.quoting(), QuotingPolicy::NonNumeric);
        assert_eq!(
            target.line_terminator(),
            &LineTerminator::Custom("XYZ".into())
        );
        assert_eq!(cli.source_dialect().unwrap().delimiter(), ';');
    }

    #[test]
    fn test_out_tabs_and_escape() {
        let cli = parse(&["-T", "-B", "-P", "#"]);
        let target = cli.target_dialect().unwrap();
        assert_eq!(target.delimiter(), '\t');
        assert!(!target.double_quote());
        assert_eq!(target.escape_char(), Some('#'));
    }

    #[test]
    fn test_contradictory_output_dialect_rejected() {
        let cli = parse(&["-B"]);
        assert!(cli.target_dialect().is_err());
    }

    #[test]
    fn test_quoting_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["recsv", "-U", "4"]).is_err());
    }

    #[test]
    fn test_tabs_conflicts_with_delimiter() {
        assert!(Cli::try_parse_from(["recsv", "-t", "-d", ";"]).is_err());
    }
}
