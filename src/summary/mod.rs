//! Portfolio summary pipeline

mod service;

pub use service::{SummaryRequest, SummaryService, SummarySubmission};
