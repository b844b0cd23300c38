//! Property tests: write -> read round trips, cross-checked against the
//! `csv` crate's reader.

use proptest::prelude::*;
use recsv::{CsvResult, Dialect, LineTerminator, QuotingPolicy, Row, RowReader, RowWriter};

fn write_all(rows: &[Row], dialect: &Dialect) -> Vec<u8> {
    let mut writer = RowWriter::new(Vec::new(), dialect);
    for row in rows {
        writer.write_row(row).unwrap();
    }
    writer.into_inner().unwrap()
}

fn read_all(bytes: &[u8], dialect: &Dialect) -> Vec<Row> {
    RowReader::new(bytes, dialect)
        .collect::<CsvResult<_>>()
        .unwrap()
}

fn read_with_csv_crate(bytes: &[u8], delimiter: u8) -> Vec<Row> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes)
        .records()
        .map(|record| record.unwrap().iter().map(String::from).collect())
        .collect()
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    let field = "[ab1. ,;\"\r\n\t-]{0,6}";
    prop::collection::vec(prop::collection::vec(field, 1..5), 0..8)
}

fn dialect_strategy() -> impl Strategy<Value = Dialect> {
    (
        prop_oneof![Just(','), Just(';'), Just('\t')],
        prop_oneof![
            Just(QuotingPolicy::Minimal),
            Just(QuotingPolicy::All),
            Just(QuotingPolicy::NonNumeric),
        ],
        prop_oneof![
            Just(LineTerminator::CRLF),
            Just(LineTerminator::LF),
            Just(LineTerminator::CR),
        ],
    )
        .prop_map(|(delimiter, quoting, terminator)| {
            Dialect::builder()
                .delimiter(delimiter)
                .quoting(quoting)
                .line_terminator(terminator)
                .build()
                .unwrap()
        })
}

proptest! {
    #[test]
    fn prop_write_then_read_preserves_rows(rows in rows_strategy(), dialect in dialect_strategy()) {
        let bytes = write_all(&rows, &dialect);
        prop_assert_eq!(read_all(&bytes, &dialect), rows);
    }

    #[test]
    fn prop_csv_crate_agrees(rows in rows_strategy(), dialect in dialect_strategy()) {
        let bytes = write_all(&rows, &dialect);
        let delimiter = dialect.delimiter() as u8;
        prop_assert_eq!(read_with_csv_crate(&bytes, delimiter), read_all(&bytes, &dialect));
    }

    #[test]
    fn prop_rewriting_is_idempotent(rows in rows_strategy(), dialect in dialect_strategy()) {
        let first = write_all(&rows, &dialect);
        let reread = read_all(&first, &dialect);
        prop_assert_eq!(write_all(&reread, &dialect), first);
    }

    #[test]
    fn prop_escaped_quote_none_round_trip(rows in rows_strategy()) {
        // A lone empty field has no unquoted form
        let rows: Vec<Row> = rows
            .into_iter()
            .filter(|row| !(row.len() == 1 && row[0].is_empty()))
            .collect();
        let dialect = Dialect::builder()
            .quoting(QuotingPolicy::None)
            .escape_char(Some('\\'))
            .line_terminator(LineTerminator::LF)
            .build()
            .unwrap();
        let bytes = write_all(&rows, &dialect);
        prop_assert_eq!(read_all(&bytes, &dialect), rows);
    }
}
