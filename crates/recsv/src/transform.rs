//! Row transformer
//!
//! Sits between the reader and the writer: labels the header row and
//! optionally prepends a line-number column. Rows are never dropped,
//! reordered, or merged.

use crate::reformat::ReformatOptions;
use crate::Row;

/// Header label of the injected line-number column
pub const LINE_NUMBER_COLUMN: &str = "line_number";

/// A row tagged with its role in the output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// The first row when the input has a header; its fields are labels
    Header(Row),
    /// Any other row, numbered when line numbers are enabled
    Data(Row),
}

impl Record {
    /// The row's fields
    pub fn fields(&self) -> &Row {
        match self {
            Record::Header(row) | Record::Data(row) => row,
        }
    }

    /// Whether this is the header row
    pub fn is_header(&self) -> bool {
        matches!(self, Record::Header(_))
    }
}

/// Per-run row mapping; the line counter lives and dies with one instance
#[derive(Debug)]
pub struct RowTransformer {
    has_header_row: bool,
    add_line_numbers: bool,
    rows_seen: u64,
    next_line_number: u64,
}

impl RowTransformer {
    /// Start a fresh run; line numbering begins at 1
    pub fn new(options: &ReformatOptions) -> Self {
        Self {
            has_header_row: options.has_header_row,
            add_line_numbers: options.add_line_numbers,
            rows_seen: 0,
            next_line_number: 1,
        }
    }

    /// Map the next row read from the input
    pub fn apply(&mut self, mut row: Row) -> Record {
        let is_header = self.has_header_row && self.rows_seen == 0;
        self.rows_seen += 1;

        if is_header {
            if self.add_line_numbers {
                row.insert(0, LINE_NUMBER_COLUMN.to_string());
            }
            return Record::Header(row);
        }

        if self.add_line_numbers {
            row.insert(0, self.next_line_number.to_string());
            self.next_line_number += 1;
        }
        Record::Data(row)
    }
}
