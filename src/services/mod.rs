//! Presentation services
//!
//! Rendering is kept apart from extraction so the pipeline can be tested
//! without caring how its results are printed.

pub mod report;

pub use report::ReportFormatter;
