use crate::utils::format_cell;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of every preview cell.
pub const PREVIEW_CELL_WIDTH: usize = 16;

/// The first rows of a table, rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetPreview {
    /// Column names in table order.
    pub columns: Vec<String>,
    /// Rendered cells, one vector per row. Missing values are empty strings.
    pub rows: Vec<Vec<String>>,
    /// Total rows in the table.
    pub total_rows: usize,
}

impl DatasetPreview {
    /// Capture up to `max_rows` rows of `df`.
    pub fn from_frame(df: &DataFrame, max_rows: usize) -> PolarsResult<Self> {
        let shown = max_rows.min(df.height());
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();

        let mut rows = Vec::with_capacity(shown);
        for row_idx in 0..shown {
            let mut row = Vec::with_capacity(columns.len());
            for column in df.get_columns() {
                let value = column.as_materialized_series().get(row_idx)?;
                row.push(format_cell(&value));
            }
            rows.push(row);
        }

        Ok(Self {
            columns,
            rows,
            total_rows: df.height(),
        })
    }

    /// Number of rows captured.
    pub fn shown_rows(&self) -> usize {
        self.rows.len()
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String]) -> fmt::Result {
    for cell in cells {
        write!(f, "{:<width$}", cell, width = PREVIEW_CELL_WIDTH)?;
    }
    writeln!(f)
}

impl fmt::Display for DatasetPreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset Preview ({}/{})", self.shown_rows(), self.total_rows)?;
        writeln!(f)?;
        write_line(f, &self.columns)?;
        for row in &self.rows {
            write_line(f, row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preview_captures_head() {
        let df = df![
            "age" => ["25-34", "35-44", "45-54"],
            "income" => [Some(4980i64), None, Some(9480)],
            "status" => [true, false, true],
        ]
        .unwrap();

        let preview = DatasetPreview::from_frame(&df, 2).unwrap();

        assert_eq!(preview.columns, vec!["age", "income", "status"]);
        assert_eq!(preview.total_rows, 3);
        assert_eq!(
            preview.rows,
            vec![
                vec!["25-34".to_string(), "4980".to_string(), "true".to_string()],
                vec!["35-44".to_string(), String::new(), "false".to_string()],
            ]
        );
    }

    #[test]
    fn test_preview_display_layout() {
        let df = df![
            "region" => ["south", "north"],
            "term" => [360i64, 180],
        ]
        .unwrap();

        let rendered = DatasetPreview::from_frame(&df, 5).unwrap().to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Dataset Preview (2/2)");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], format!("{:<16}{:<16}", "region", "term"));
        assert_eq!(lines[3], format!("{:<16}{:<16}", "south", "360"));
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_preview_of_empty_table() {
        let df = df!["age" => Vec::<i64>::new()].unwrap();
        let preview = DatasetPreview::from_frame(&df, 5).unwrap();

        assert_eq!(preview.shown_rows(), 0);
        assert!(preview.to_string().starts_with("Dataset Preview (0/0)"));
    }
}
