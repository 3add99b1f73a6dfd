//! Imputation module for handling missing values.
//!
//! - Modal imputation for numeric and boolean columns
//! - Sentinel filling for categorical columns

mod frequency;
mod modal;

pub use frequency::ValueFrequencyTable;
pub use modal::{ModalImputer, boolean_mode, numeric_mode};
