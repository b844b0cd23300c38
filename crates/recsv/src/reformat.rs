//! Read-transform-write pipeline

use std::io::{Read, Write};

use tracing::debug;

use crate::dialect::Dialect;
use crate::error::CsvResult;
use crate::reader::RowReader;
use crate::transform::{Record, RowTransformer};
use crate::writer::RowWriter;

/// Per-run options for [`reformat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReformatOptions {
    /// Whether the first input row is a header
    pub has_header_row: bool,
    /// Prepend a `line_number` column
    pub add_line_numbers: bool,
}

impl Default for ReformatOptions {
    fn default() -> Self {
        Self {
            has_header_row: true,
            add_line_numbers: false,
        }
    }
}

impl ReformatOptions {
    /// Take the header and line-number settings from a dialect
    pub fn from_dialect(dialect: &Dialect) -> Self {
        Self {
            has_header_row: dialect.has_header_row(),
            add_line_numbers: dialect.add_line_numbers(),
        }
    }
}

/// Re-emit CSV read under `source` using the `target` dialect.
///
/// Streams one row at a time. On failure, rows already written stay in
/// `output`; the output is flushed only on success.
pub fn reformat<R: Read, W: Write>(
    input: R,
    output: W,
    source: &Dialect,
    target: &Dialect,
    options: &ReformatOptions,
) -> CsvResult<()> {
    let mut reader = RowReader::new(input, source);
    let mut transformer = RowTransformer::new(options);
    let mut writer = RowWriter::new(output, target);

    while let Some(row) = reader.read_row()? {
        match transformer.apply(row) {
            Record::Header(row) => writer.write_header(&row)?,
            Record::Data(row) => writer.write_row(&row)?,
        }
    }

    writer.flush()?;
    debug!(
        rows_read = reader.rows_read(),
        rows_written = writer.rows_written(),
        "reformat complete"
    );
    Ok(())
}
