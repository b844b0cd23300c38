//! CSV dialects
//!
//! A [`Dialect`] bundles every syntactic parameter needed to parse or
//! serialize delimited text. Dialects are validated once, when they are
//! built, and are read-only afterwards.

use crate::error::{CsvError, CsvResult};

/// Which fields the writer wraps in quote characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotingPolicy {
    /// Quote only fields containing the delimiter, quote char, or a line terminator char
    #[default]
    Minimal,
    /// Quote every field
    All,
    /// Quote every field that does not look like a plain decimal number
    NonNumeric,
    /// Never quote; special characters are escaped instead
    None,
}

/// Conventional numeric codes: 0 = minimal, 1 = all, 2 = non-numeric, 3 = none
impl TryFrom<u8> for QuotingPolicy {
    type Error = CsvError;

    fn try_from(code: u8) -> CsvResult<Self> {
        match code {
            0 => Ok(QuotingPolicy::Minimal),
            1 => Ok(QuotingPolicy::All),
            2 => Ok(QuotingPolicy::NonNumeric),
            3 => Ok(QuotingPolicy::None),
            other => Err(CsvError::invalid_dialect(format!(
                "quoting policy must be 0-3, got {other}"
            ))),
        }
    }
}

/// Line terminator written after every output row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    #[default]
    CRLF,
    /// Mac classic (CR)
    CR,
    /// Any other non-empty sequence, written verbatim
    Custom(String),
}

impl LineTerminator {
    /// The terminator text
    pub fn as_str(&self) -> &str {
        match self {
            LineTerminator::LF => "\n",
            LineTerminator::CRLF => "\r\n",
            LineTerminator::CR => "\r",
            LineTerminator::Custom(s) => s,
        }
    }

    /// Whether `c` appears anywhere in the terminator
    pub fn contains(&self, c: char) -> bool {
        self.as_str().contains(c)
    }
}

impl From<&str> for LineTerminator {
    fn from(s: &str) -> Self {
        match s {
            "\n" => LineTerminator::LF,
            "\r\n" => LineTerminator::CRLF,
            "\r" => LineTerminator::CR,
            other => LineTerminator::Custom(other.to_string()),
        }
    }
}

/// A validated, immutable set of CSV syntax parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    delimiter: char,
    quote_char: char,
    escape_char: Option<char>,
    double_quote: bool,
    line_terminator: LineTerminator,
    skip_initial_space: bool,
    quoting: QuotingPolicy,
    strict: bool,
    has_header_row: bool,
    skip_lines: usize,
    add_line_numbers: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_char: '"',
            escape_char: None,
            double_quote: true,
            line_terminator: LineTerminator::CRLF,
            skip_initial_space: false,
            quoting: QuotingPolicy::Minimal,
            strict: false,
            has_header_row: true,
            skip_lines: 0,
            add_line_numbers: false,
        }
    }
}

impl Dialect {
    /// Start building a dialect from the defaults
    pub fn builder() -> DialectBuilder {
        DialectBuilder {
            dialect: Dialect::default(),
        }
    }

    /// Field delimiter (default: comma)
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Quote character (default: double quote)
    pub fn quote_char(&self) -> char {
        self.quote_char
    }

    /// Escape character, if any
    pub fn escape_char(&self) -> Option<char> {
        self.escape_char
    }

    /// Whether a literal quote inside a quoted field is written as two quotes
    pub fn double_quote(&self) -> bool {
        self.double_quote
    }

    /// Terminator appended after each written row
    pub fn line_terminator(&self) -> &LineTerminator {
        &self.line_terminator
    }

    /// Whether spaces directly after a delimiter are ignored when reading
    pub fn skip_initial_space(&self) -> bool {
        self.skip_initial_space
    }

    /// Output quoting policy
    pub fn quoting(&self) -> QuotingPolicy {
        self.quoting
    }

    /// Whether stray quote characters are rejected when reading
    pub fn strict(&self) -> bool {
        self.strict
    }

    /// Whether the first row is a header
    pub fn has_header_row(&self) -> bool {
        self.has_header_row
    }

    /// Number of physical lines discarded before parsing
    pub fn skip_lines(&self) -> usize {
        self.skip_lines
    }

    /// Whether a `line_number` column is prepended
    pub fn add_line_numbers(&self) -> bool {
        self.add_line_numbers
    }

    /// Characters that force quoting (or escaping) on output
    pub(crate) fn is_structural(&self, c: char) -> bool {
        c == self.delimiter
            || c == self.quote_char
            || Some(c) == self.escape_char
            || c == '\r'
            || c == '\n'
            || self.line_terminator.contains(c)
    }

    fn validate(&self) -> CsvResult<()> {
        for (name, c) in [
            ("delimiter", Some(self.delimiter)),
            ("quote character", Some(self.quote_char)),
            ("escape character", self.escape_char),
        ] {
            if matches!(c, Some('\r') | Some('\n')) {
                return Err(CsvError::invalid_dialect(format!(
                    "{name} cannot be a newline character"
                )));
            }
        }

        if self.delimiter == self.quote_char {
            return Err(CsvError::invalid_dialect(
                "delimiter and quote character must differ",
            ));
        }

        if let Some(escape) = self.escape_char {
            if escape == self.delimiter {
                return Err(CsvError::invalid_dialect(
                    "delimiter and escape character must differ",
                ));
            }
            if escape == self.quote_char {
                return Err(CsvError::invalid_dialect(
                    "quote character and escape character must differ",
                ));
            }
        }

        if self.line_terminator.as_str().is_empty() {
            return Err(CsvError::invalid_dialect("line terminator cannot be empty"));
        }

        if !self.double_quote
            && self.escape_char.is_none()
            && self.quoting != QuotingPolicy::None
        {
            return Err(CsvError::invalid_dialect(
                "an escape character is required when double quoting is disabled",
            ));
        }

        Ok(())
    }
}

/// Builder for [`Dialect`]; `build` validates the combination
#[derive(Debug, Clone)]
pub struct DialectBuilder {
    dialect: Dialect,
}

impl DialectBuilder {
    /// Set the field delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.dialect.delimiter = delimiter;
        self
    }

    /// Set the quote character
    pub fn quote_char(mut self, quote_char: char) -> Self {
        self.dialect.quote_char = quote_char;
        self
    }

    /// Set or clear the escape character
    pub fn escape_char(mut self, escape_char: Option<char>) -> Self {
        self.dialect.escape_char = escape_char;
        self
    }

    /// Enable or disable quote doubling
    pub fn double_quote(mut self, double_quote: bool) -> Self {
        self.dialect.double_quote = double_quote;
        self
    }

    /// Set the output line terminator
    pub fn line_terminator<T: Into<LineTerminator>>(mut self, terminator: T) -> Self {
        self.dialect.line_terminator = terminator.into();
        self
    }

    /// Ignore spaces following a delimiter
    pub fn skip_initial_space(mut self, skip: bool) -> Self {
        self.dialect.skip_initial_space = skip;
        self
    }

    /// Set the quoting policy
    pub fn quoting(mut self, quoting: QuotingPolicy) -> Self {
        self.dialect.quoting = quoting;
        self
    }

    /// Reject stray quote characters when reading
    pub fn strict(mut self, strict: bool) -> Self {
        self.dialect.strict = strict;
        self
    }

    /// Treat the first row as a header
    pub fn has_header_row(mut self, has_header_row: bool) -> Self {
        self.dialect.has_header_row = has_header_row;
        self
    }

    /// Discard this many physical lines before parsing
    pub fn skip_lines(mut self, skip_lines: usize) -> Self {
        self.dialect.skip_lines = skip_lines;
        self
    }

    /// Prepend a `line_number` column
    pub fn add_line_numbers(mut self, add_line_numbers: bool) -> Self {
        self.dialect.add_line_numbers = add_line_numbers;
        self
    }

    /// Validate and return the dialect
    pub fn build(self) -> CsvResult<Dialect> {
        self.dialect.validate()?;
        Ok(self.dialect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dialect_is_valid() {
        let built = Dialect::builder().build().unwrap();
        assert_eq!(built, Dialect::default());
        assert_eq!(built.delimiter(), ',');
        assert_eq!(built.quote_char(), '"');
        assert_eq!(built.line_terminator().as_str(), "\r\n");
        assert_eq!(built.quoting(), QuotingPolicy::Minimal);
        assert!(built.has_header_row());
    }

    #[test]
    fn test_quoting_codes() {
        let expected = [
            (0, QuotingPolicy::Minimal),
            (1, QuotingPolicy::All),
            (2, QuotingPolicy::NonNumeric),
            (3, QuotingPolicy::None),
        ];
        for (code, policy) in expected {
            assert_eq!(QuotingPolicy::try_from(code).unwrap(), policy);
        }
        assert!(matches!(
            QuotingPolicy::try_from(4),
            Err(CsvError::InvalidDialect(_))
        ));
    }

    #[test]
    fn test_line_terminator_from_str() {
        assert_eq!(LineTerminator::from("\n"), LineTerminator::LF);
        assert_eq!(LineTerminator::from("\r\n"), LineTerminator::CRLF);
        assert_eq!(LineTerminator::from("\r"), LineTerminator::CR);
        assert_eq!(
            LineTerminator::from("XYZ"),
            LineTerminator::Custom("XYZ".into())
        );
        assert!(LineTerminator::from("XYZ").contains('Y'));
    }

    #[test]
    fn test_no_doublequote_requires_escape() {
        let err = Dialect::builder().double_quote(false).build().unwrap_err();
        assert!(matches!(err, CsvError::InvalidDialect(_)));

        Dialect::builder()
            .double_quote(false)
            .escape_char(Some('#'))
            .build()
            .unwrap();

        // Nothing is ever quoted, so there is nothing to double
        Dialect::builder()
            .double_quote(false)
            .quoting(QuotingPolicy::None)
            .build()
            .unwrap();
    }

    #[test]
    fn test_conflicting_characters_rejected() {
        let cases = [
            Dialect::builder().delimiter('"'),
            Dialect::builder().escape_char(Some(',')),
            Dialect::builder().escape_char(Some('"')),
            Dialect::builder().delimiter('\n'),
            Dialect::builder().quote_char('\r'),
            Dialect::builder().line_terminator(""),
        ];
        for builder in cases {
            assert!(matches!(builder.build(), Err(CsvError::InvalidDialect(_))));
        }
    }

    #[test]
    fn test_structural_characters() {
        let dialect = Dialect::builder()
            .delimiter('|')
            .escape_char(Some('#'))
            .line_terminator("XYZ")
            .build()
            .unwrap();
        for c in ['|', '"', '#', 'X', 'Y', 'Z', '\r', '\n'] {
            assert!(dialect.is_structural(c), "{c:?} should be structural");
        }
        assert!(!dialect.is_structural(','));
        assert!(!dialect.is_structural('a'));
    }
}
