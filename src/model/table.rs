//! Tables passed through from the extraction layer.

use super::BoundingBox;
use serde::{Deserialize, Serialize};

/// A table found on a page, carried into the report unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Where the table sits on its page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<BoundingBox>,

    /// Table rows, top to bottom
    #[serde(default)]
    pub rows: Vec<TableRow>,

    /// Leading rows that form the header
    #[serde(default)]
    pub header_rows: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Table {
    /// Build a table from rows of cell text.
    pub fn from_rows<R, S>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows.into_iter().map(TableRow::from_strings).collect(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, header_rows: u8) -> Self {
        self.header_rows = header_rows;
        self
    }

    /// Width of the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0)
    }

    /// Rows joined by newlines, cells by tabs.
    pub fn plain_text(&self) -> String {
        let rows: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                row.cells
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect();
        rows.join("\n")
    }
}

/// One table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self {
            cells: values.into_iter().map(TableCell::new).collect(),
        }
    }
}

/// One table cell and its span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableCell {
    pub text: String,

    #[serde(default = "single_span")]
    pub rowspan: u8,

    #[serde(default = "single_span")]
    pub colspan: u8,
}

fn single_span() -> u8 {
    1
}

impl TableCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rowspan: 1,
            colspan: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let table = Table::from_rows([vec!["Name", "Key"], vec!["a", "SGVsbG8="], vec!["b"]])
            .with_header(1);

        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.plain_text(), "Name\tKey\na\tSGVsbG8=\nb");
    }

    #[test]
    fn test_cell_spans_default_from_json() {
        let table: Table =
            serde_json::from_str(r#"{ "rows": [ { "cells": [ { "text": "x" } ] } ] }"#).unwrap();
        assert_eq!(table.rows[0].cells[0].rowspan, 1);
        assert_eq!(table.rows[0].cells[0].colspan, 1);
        assert_eq!(table.header_rows, 0);
        assert!(table.bbox.is_none());
    }
}
