//! State module for tracking cascade progress
//!
//! # Components
//!
//! - `CascadeState`: where one company's query cascade stands
//! - `Outcome`: the single terminal record produced per company
//! - `ReportType`: which kind of report a tier (and a success) refers to

mod cascade_state;
mod outcome;

// Re-export main types
pub use cascade_state::CascadeState;
pub use outcome::{Outcome, ReportType, FAILURE_REASON};
