//! CSV reader
//!
//! [`RowReader`] turns a byte stream into logical rows. The stream is split
//! into physical lines on `\n`, `\r\n` or a lone `\r`, and each line is fed
//! through a small state machine. A logical row ends only at a line break
//! seen outside a quoted region, so one row may span many physical lines.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use tracing::{debug, trace};

use crate::dialect::{Dialect, QuotingPolicy};
use crate::error::{CsvError, CsvResult};
use crate::Row;

/// One physical line, without its terminator
struct PhysicalLine<'a> {
    bytes: &'a [u8],
    terminator: &'static str,
    number: u64,
}

/// Splits a byte stream on universal newlines
struct LineSource<R> {
    inner: BufReader<R>,
    buf: Vec<u8>,
    line: u64,
}

impl<R: Read> LineSource<R> {
    fn new(inner: R) -> Self {
        Self {
            inner: BufReader::new(inner),
            buf: Vec::new(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> CsvResult<Option<PhysicalLine<'_>>> {
        self.buf.clear();
        let mut terminator = "";

        loop {
            let available = self.inner.fill_buf()?;
            if available.is_empty() {
                break;
            }

            match available.iter().position(|&b| b == b'\n' || b == b'\r') {
                Some(i) => {
                    let newline = available[i];
                    self.buf.extend_from_slice(&available[..i]);
                    self.inner.consume(i + 1);

                    terminator = if newline == b'\n' {
                        "\n"
                    } else if self.inner.fill_buf()?.first() == Some(&b'\n') {
                        self.inner.consume(1);
                        "\r\n"
                    } else {
                        "\r"
                    };
                    break;
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.inner.consume(len);
                }
            }
        }

        if self.buf.is_empty() && terminator.is_empty() {
            return Ok(None);
        }

        self.line += 1;
        Ok(Some(PhysicalLine {
            bytes: &self.buf,
            terminator,
            number: self.line,
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// No row in progress
    RowEnd,
    FieldStart,
    InField,
    InQuotedField,
    /// A quote seen inside a quoted field: either a closing quote or the
    /// first half of a doubled quote
    QuoteInQuotedField,
    EscapeInField,
    EscapeInQuotedField,
}

/// Character-level parser for one dialect
struct RowParser {
    delimiter: char,
    quote: Option<char>,
    escape: Option<char>,
    double_quote: bool,
    skip_initial_space: bool,
    strict: bool,
    state: ParseState,
    field: String,
    fields: Row,
}

impl RowParser {
    fn new(dialect: &Dialect) -> Self {
        // Under QUOTE_NONE the quote character is ordinary text
        let quote = (dialect.quoting() != QuotingPolicy::None).then_some(dialect.quote_char());

        Self {
            delimiter: dialect.delimiter(),
            quote,
            escape: dialect.escape_char(),
            double_quote: dialect.double_quote(),
            skip_initial_space: dialect.skip_initial_space(),
            strict: dialect.strict(),
            state: ParseState::RowEnd,
            field: String::new(),
            fields: Vec::new(),
        }
    }

    /// Feed one physical line; returns a row if the line completed one
    fn feed_line(&mut self, line: &str, terminator: &str, number: u64) -> CsvResult<Option<Row>> {
        for c in line.chars() {
            self.feed_char(c, number)?;
        }

        // Last line of the stream without a terminator: `finish` closes it
        if terminator.is_empty() {
            return Ok(None);
        }

        Ok(self.end_of_line(terminator))
    }

    fn feed_char(&mut self, c: char, number: u64) -> CsvResult<()> {
        use ParseState::*;

        match self.state {
            RowEnd | FieldStart => {
                if Some(c) == self.quote {
                    self.state = InQuotedField;
                } else if Some(c) == self.escape {
                    self.state = EscapeInField;
                } else if c == ' ' && self.skip_initial_space {
                    self.state = FieldStart;
                } else if c == self.delimiter {
                    self.save_field();
                } else {
                    self.field.push(c);
                    self.state = InField;
                }
            }
            InField => {
                if c == self.delimiter {
                    self.save_field();
                } else if Some(c) == self.escape {
                    self.state = EscapeInField;
                } else if Some(c) == self.quote && self.strict {
                    return Err(CsvError::malformed(
                        number,
                        format!("quote character {c:?} inside unquoted field"),
                    ));
                } else {
                    self.field.push(c);
                }
            }
            InQuotedField => {
                if Some(c) == self.escape {
                    self.state = EscapeInQuotedField;
                } else if Some(c) == self.quote {
                    self.state = QuoteInQuotedField;
                } else {
                    self.field.push(c);
                }
            }
            QuoteInQuotedField => {
                if Some(c) == self.quote && self.double_quote {
                    self.field.push(c);
                    self.state = InQuotedField;
                } else if c == self.delimiter {
                    self.save_field();
                } else if self.strict {
                    return Err(CsvError::malformed(
                        number,
                        format!("expected delimiter after closing quote, found {c:?}"),
                    ));
                } else {
                    self.field.push(c);
                    self.state = InField;
                }
            }
            EscapeInField => {
                self.field.push(c);
                self.state = InField;
            }
            EscapeInQuotedField => {
                self.field.push(c);
                self.state = InQuotedField;
            }
        }

        Ok(())
    }

    fn end_of_line(&mut self, terminator: &str) -> Option<Row> {
        use ParseState::*;

        match self.state {
            // Blank line
            RowEnd => None,
            InQuotedField => {
                self.field.push_str(terminator);
                None
            }
            // An escape covers one character: the `\n` of an escaped `\r\n`
            // is still a line break
            EscapeInField | EscapeInQuotedField => {
                let (escaped, rest) = terminator.split_at(1);
                self.field.push_str(escaped);
                self.state = if self.state == EscapeInField {
                    InField
                } else {
                    InQuotedField
                };
                if rest.is_empty() {
                    None
                } else {
                    self.end_of_line(rest)
                }
            }
            FieldStart | InField | QuoteInQuotedField => Some(self.finish_row()),
        }
    }

    /// Close out the stream
    fn finish(&mut self, number: u64) -> CsvResult<Option<Row>> {
        use ParseState::*;

        match self.state {
            RowEnd => Ok(None),
            InQuotedField | EscapeInQuotedField => Err(CsvError::malformed(
                number,
                "unexpected end of data inside quoted field",
            )),
            EscapeInField => Err(CsvError::malformed(
                number,
                "unexpected end of data after escape character",
            )),
            FieldStart | InField | QuoteInQuotedField => Ok(Some(self.finish_row())),
        }
    }

    fn save_field(&mut self) {
        self.fields.push(std::mem::take(&mut self.field));
        self.state = ParseState::FieldStart;
    }

    fn finish_row(&mut self) -> Row {
        self.save_field();
        self.state = ParseState::RowEnd;
        std::mem::take(&mut self.fields)
    }
}

/// Streaming CSV row reader
///
/// Rows are produced one at a time, either through [`RowReader::read_row`]
/// or by iterating. The sequence is consumed once; after the end of input or
/// the first error it yields nothing further.
pub struct RowReader<R> {
    lines: LineSource<R>,
    parser: RowParser,
    skip_lines: usize,
    rows_read: u64,
    done: bool,
}

impl RowReader<File> {
    /// Open a CSV file for reading
    pub fn from_path<P: AsRef<Path>>(path: P, dialect: &Dialect) -> CsvResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file, dialect))
    }
}

impl<R: Read> RowReader<R> {
    /// Read CSV from any byte source
    pub fn new(reader: R, dialect: &Dialect) -> Self {
        Self {
            lines: LineSource::new(reader),
            parser: RowParser::new(dialect),
            skip_lines: dialect.skip_lines(),
            rows_read: 0,
            done: false,
        }
    }

    /// Number of rows produced so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Read the next logical row, or `None` at end of input
    pub fn read_row(&mut self) -> CsvResult<Option<Row>> {
        if self.done {
            return Ok(None);
        }

        let result = self.next_row();
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    fn next_row(&mut self) -> CsvResult<Option<Row>> {
        if self.skip_lines > 0 {
            self.discard_leading_lines()?;
        }

        loop {
            // At end of input this is the number of the last line
            let last_line = self.lines.line;

            let row = match self.lines.next_line()? {
                Some(line) => {
                    let text = std::str::from_utf8(line.bytes).map_err(|e| {
                        CsvError::malformed(line.number, format!("invalid UTF-8: {e}"))
                    })?;
                    self.parser.feed_line(text, line.terminator, line.number)?
                }
                None => match self.parser.finish(last_line)? {
                    Some(row) => Some(row),
                    None => return Ok(None),
                },
            };

            if let Some(row) = row {
                self.rows_read += 1;
                trace!(row = self.rows_read, fields = row.len(), "read row");
                return Ok(Some(row));
            }
        }
    }

    /// Drop the leading physical lines without decoding them
    fn discard_leading_lines(&mut self) -> CsvResult<()> {
        let requested = std::mem::take(&mut self.skip_lines);
        let mut discarded = 0;

        while discarded < requested {
            if self.lines.next_line()?.is_none() {
                break;
            }
            discarded += 1;
        }

        debug!(requested, discarded, "skipped leading lines");
        Ok(())
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = CsvResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}
