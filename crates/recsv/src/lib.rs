//! # recsv
//!
//! Streaming translation of CSV text between dialects.
//!
//! Input is parsed into logical rows under a source [`Dialect`], optionally
//! passed through a [`RowTransformer`] that labels the header and numbers
//! the rows, and serialized again under a target [`Dialect`]. Field content
//! survives unchanged, including embedded delimiters, quotes and newlines.
//!
//! ## Example
//!
//! ```rust
//! use recsv::{reformat, Dialect, LineTerminator, QuotingPolicy, ReformatOptions};
//!
//! let source = Dialect::default();
//! let target = Dialect::builder()
//!     .delimiter('|')
//!     .quoting(QuotingPolicy::NonNumeric)
//!     .line_terminator(LineTerminator::LF)
//!     .build()
//!     .unwrap();
//!
//! let mut out = Vec::new();
//! reformat(
//!     "name,qty\nwidget,3\n".as_bytes(),
//!     &mut out,
//!     &source,
//!     &target,
//!     &ReformatOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(String::from_utf8(out).unwrap(), "\"name\"|\"qty\"\n\"widget\"|3\n");
//! ```

mod dialect;
mod error;
mod reader;
mod reformat;
mod transform;
mod writer;

pub use dialect::{Dialect, DialectBuilder, LineTerminator, QuotingPolicy};
pub use error::{CsvError, CsvResult};
pub use reader::RowReader;
pub use reformat::{reformat, ReformatOptions};
pub use transform::{Record, RowTransformer, LINE_NUMBER_COLUMN};
pub use writer::RowWriter;

/// One logical row: an ordered sequence of field values
pub type Row = Vec<String>;
