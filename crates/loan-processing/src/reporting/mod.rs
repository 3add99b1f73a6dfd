//! Console reporting.
//!
//! [`DatasetPreview`] renders the head of a table as fixed-width text for the
//! step-by-step console output, and serializes for JSON run reports.
//!
//! # Example
//!
//! ```rust,ignore
//! use loan_processing::reporting::DatasetPreview;
//!
//! let preview = DatasetPreview::from_frame(&prepared.train, 5)?;
//! print!("{}", preview);
//! ```

mod preview;

pub use preview::{DatasetPreview, PREVIEW_CELL_WIDTH};
