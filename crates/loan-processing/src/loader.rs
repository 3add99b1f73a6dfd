//! CSV loading with fallback strategies.
//!
//! The reader infers dtypes from the first 100 rows. When the standard parse
//! fails the file is retried without quote handling and then with pre-cleaned
//! content before giving up.

use crate::error::{PreprocessingError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Rows used for dtype inference.
pub const INFER_SCHEMA_ROWS: usize = 100;

/// Load a delimited file with a header row into a DataFrame.
///
/// Every failure is reported as [`PreprocessingError::LoadFailed`].
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    let load_failed = |reason: String| PreprocessingError::LoadFailed {
        path: path.display().to_string(),
        reason,
    };

    if !path.is_file() {
        return Err(load_failed("file does not exist".to_string()));
    }

    // Strategy 1: Standard loading with quote handling
    match read_with_quote_char(path, Some(b'"')) {
        Ok(df) => return Ok(loaded(path, df)),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    // Strategy 2: Without quote handling
    match read_with_quote_char(path, None) {
        Ok(df) => return Ok(loaded(path, df)),
        Err(e) => debug!("Loading without quotes failed: {}", e),
    }

    // Strategy 3: Pre-clean content
    let content = std::fs::read_to_string(path).map_err(|e| load_failed(e.to_string()))?;
    let cleaned = clean_csv_content(&content);
    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(cleaned))
        .finish()
        .map(|df| loaded(path, df))
        .map_err(|e| load_failed(e.to_string()))
}

fn read_with_quote_char(path: &Path, quote_char: Option<u8>) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(quote_char))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
}

fn loaded(path: &Path, df: DataFrame) -> DataFrame {
    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    df
}

/// Collapse doubled quotes and drop blank lines.
pub fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load_csv("/definitely/not/here/loans.csv").unwrap_err();
        assert_eq!(err.error_code(), "LOAD_FAILED");
        assert!(err.to_string().contains("loans.csv"));
    }

    #[test]
    fn test_clean_csv_content() {
        let raw = "a,b\n\n\"\"x\"\",1\n   \nz,2\n";
        assert_eq!(clean_csv_content(raw), "a,b\n\"x\",1\nz,2");
    }
}
