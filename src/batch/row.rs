//! Tabular input: ordered rows with required `name` and `emails` columns.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::StringRecord;

use crate::error::FilterError;

const NAME_COLUMN: &str = "name";
const EMAILS_COLUMN: &str = "emails";

/// One input row, keeping its original column order and absolute index.
#[derive(Debug, Clone)]
pub struct Row {
    pub index: usize,
    pub fields: StringRecord,
}

/// The whole input held in memory, with the required column positions
/// resolved up front. Missing required columns abort before any row is
/// processed.
#[derive(Debug)]
pub struct RowSet {
    headers: StringRecord,
    rows: Vec<Row>,
    name_idx: usize,
    emails_idx: usize,
}

impl RowSet {
    pub fn from_path(path: &Path) -> Result<Self, FilterError> {
        let file = File::open(path)
            .map_err(|source| FilterError::read(csv::Error::from(source)))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, FilterError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let headers = csv_reader.headers().map_err(FilterError::read)?.clone();
        let name_idx = column_index(&headers, NAME_COLUMN)?;
        let emails_idx = column_index(&headers, EMAILS_COLUMN)?;

        let mut rows = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let fields = record.map_err(FilterError::read)?;
            rows.push(Row { index, fields });
        }

        Ok(Self {
            headers,
            rows,
            name_idx,
            emails_idx,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows from absolute index `start` on; used for checkpoint resumption.
    pub fn rows_from(&self, start: usize) -> &[Row] {
        &self.rows[start.min(self.rows.len())..]
    }

    pub fn name_of<'a>(&self, row: &'a Row) -> &'a str {
        row.fields.get(self.name_idx).unwrap_or("").trim()
    }

    /// The addresses of a row: the `emails` cell split on `;`, trimmed,
    /// empties dropped.
    pub fn emails_of<'a>(&self, row: &'a Row) -> Vec<&'a str> {
        row.fields
            .get(self.emails_idx)
            .map(split_emails)
            .unwrap_or_default()
    }
}

fn column_index(headers: &StringRecord, name: &'static str) -> Result<usize, FilterError> {
    headers
        .iter()
        .position(|header| header.trim() == name)
        .ok_or(FilterError::MissingColumn { name })
}

fn split_emails(cell: &str) -> Vec<&str> {
    cell.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "name,emails,notes\nAlice,a@example.com,first\nBob,b@example.com; c@example.com,second\n";

    #[test]
    fn reads_rows_and_preserves_order() {
        let set = RowSet::from_reader(INPUT.as_bytes()).expect("rows");
        assert_eq!(set.len(), 2);
        assert_eq!(set.headers().iter().collect::<Vec<_>>(), ["name", "emails", "notes"]);
        assert_eq!(set.rows()[0].index, 0);
        assert_eq!(set.name_of(&set.rows()[1]), "Bob");
    }

    #[test]
    fn splits_semicolon_separated_addresses() {
        let set = RowSet::from_reader(INPUT.as_bytes()).expect("rows");
        assert_eq!(set.emails_of(&set.rows()[0]), ["a@example.com"]);
        assert_eq!(
            set.emails_of(&set.rows()[1]),
            ["b@example.com", "c@example.com"]
        );
    }

    #[test]
    fn empty_and_blank_parts_are_dropped() {
        let set =
            RowSet::from_reader("name,emails\nX,\" a@example.com ;; \"\n".as_bytes()).expect("rows");
        assert_eq!(set.emails_of(&set.rows()[0]), ["a@example.com"]);
    }

    #[test]
    fn missing_emails_column_is_fatal() {
        let err = RowSet::from_reader("name,mail\nA,a@example.com\n".as_bytes())
            .expect_err("missing column");
        assert!(matches!(
            err,
            FilterError::MissingColumn { name: "emails" }
        ));
    }

    #[test]
    fn missing_name_column_is_fatal() {
        let err = RowSet::from_reader("emails\na@example.com\n".as_bytes())
            .expect_err("missing column");
        assert!(matches!(err, FilterError::MissingColumn { name: "name" }));
    }

    #[test]
    fn rows_from_clamps_to_length() {
        let set = RowSet::from_reader(INPUT.as_bytes()).expect("rows");
        assert_eq!(set.rows_from(1).len(), 1);
        assert_eq!(set.rows_from(10).len(), 0);
    }
}
