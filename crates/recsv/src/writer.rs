//! CSV writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lazy_regex::regex_is_match;
use tracing::trace;

use crate::dialect::{Dialect, QuotingPolicy};
use crate::error::{CsvError, CsvResult};

/// Streaming CSV row writer
///
/// Every row is serialized in full before any byte of it reaches the
/// underlying writer, so a field that cannot be represented leaves the
/// output ending at the previous row.
pub struct RowWriter<W: Write> {
    inner: W,
    dialect: Dialect,
    buf: String,
    rows_written: u64,
}

impl RowWriter<BufWriter<File>> {
    /// Create (or truncate) a CSV file for writing
    pub fn from_path<P: AsRef<Path>>(path: P, dialect: &Dialect) -> CsvResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), dialect))
    }
}

impl<W: Write> RowWriter<W> {
    /// Write CSV to any byte sink
    pub fn new(inner: W, dialect: &Dialect) -> Self {
        Self {
            inner,
            dialect: dialect.clone(),
            buf: String::new(),
            rows_written: 0,
        }
    }

    /// Number of rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Write a header row. Header fields are labels, so `QUOTE_NONNUMERIC`
    /// quotes all of them.
    pub fn write_header<S: AsRef<str>>(&mut self, row: &[S]) -> CsvResult<()> {
        self.write_record(row, true)
    }

    /// Write a data row
    pub fn write_row<S: AsRef<str>>(&mut self, row: &[S]) -> CsvResult<()> {
        self.write_record(row, false)
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> CsvResult<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Flush and return the underlying writer
    pub fn into_inner(mut self) -> CsvResult<W> {
        self.flush()?;
        Ok(self.inner)
    }

    fn write_record<S: AsRef<str>>(&mut self, row: &[S], is_header: bool) -> CsvResult<()> {
        let row_number = self.rows_written + 1;
        self.buf.clear();

        match row {
            // A lone empty field would otherwise be a blank line
            [only] if only.as_ref().is_empty() => {
                if self.dialect.quoting() == QuotingPolicy::None {
                    return Err(CsvError::UnescapableField {
                        row: row_number,
                        column: 1,
                        field: String::new(),
                    });
                }
                self.buf.push(self.dialect.quote_char());
                self.buf.push(self.dialect.quote_char());
            }
            _ => {
                for (i, field) in row.iter().enumerate() {
                    if i > 0 {
                        self.buf.push(self.dialect.delimiter());
                    }
                    let field = field.as_ref();
                    if !encode_field(&self.dialect, field, is_header, &mut self.buf) {
                        return Err(CsvError::UnescapableField {
                            row: row_number,
                            column: i + 1,
                            field: field.to_string(),
                        });
                    }
                }
            }
        }

        self.buf.push_str(self.dialect.line_terminator().as_str());
        self.inner.write_all(self.buf.as_bytes())?;
        self.rows_written = row_number;

        trace!(row = row_number, fields = row.len(), header = is_header, "wrote row");
        Ok(())
    }
}

/// Plain decimal numbers only: optional sign, digits with an optional
/// fraction, or a bare fraction. No exponents, separators, or NaN/inf.
fn is_numeric(field: &str) -> bool {
    regex_is_match!(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$", field)
}

/// Append `field` to `out`, quoted and escaped as the dialect requires.
///
/// Returns false when the field holds a character that can only be written
/// with an escape character and the dialect has none.
fn encode_field(dialect: &Dialect, field: &str, is_label: bool, out: &mut String) -> bool {
    let quote = dialect.quote_char();
    let mut quoted = match dialect.quoting() {
        QuotingPolicy::All => true,
        QuotingPolicy::NonNumeric => is_label || !is_numeric(field),
        QuotingPolicy::Minimal | QuotingPolicy::None => false,
    };

    let start = out.len();
    for c in field.chars() {
        if dialect.is_structural(c) {
            let mut escape = false;

            if dialect.quoting() == QuotingPolicy::None {
                escape = true;
            } else if c == quote {
                if dialect.double_quote() {
                    out.push(quote);
                    quoted = true;
                } else {
                    escape = true;
                }
            } else if Some(c) == dialect.escape_char() {
                escape = true;
            } else {
                quoted = true;
            }

            if escape {
                match dialect.escape_char() {
                    Some(e) => out.push(e),
                    None => return false,
                }
            }
        }
        out.push(c);
    }

    if quoted {
        out.insert(start, quote);
        out.push(quote);
    }
    true
}
