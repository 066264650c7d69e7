//! Iterative portfolio feedback

mod service;

pub use service::{FeedbackService, FeedbackView};
