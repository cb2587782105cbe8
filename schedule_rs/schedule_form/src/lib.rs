//! Core of the schedule analyzer form, free of any DOM dependency.
//!
//! The browser frontend and the CLI both drive the same pure state machine:
//! [`FormState`] holds what the user typed, [`build_submission`] turns it into
//! exactly one request shape, [`interpret_response`] classifies what came back
//! and [`render_results`] produces an immutable [`ResultsView`] to apply.

use thiserror::Error;

mod analysis;
mod form;
mod markdown;
mod page;
mod render;
mod report;
mod submit;

pub use analysis::{AnalysisResult, CourseAnalysis};
pub use form::{CourseRow, FormState, FormView, InputMode, RowView, SelectedImage};
pub use markdown::{escape_html, render_markdown};
pub use page::PageState;
pub use render::{
    error_html, failure_message, format_grade, render_results, strip_grade_line, CourseCard,
    CoursesView, GradeDisplay, ResearchDepth, ResultsView, ANALYSIS_FALLBACK, NO_COURSES_MESSAGE,
};
pub use report::{parse_overall_grade, text_report};
pub use submit::{
    build_submission, interpret_response, CourseEntry, ImageSubmission, ManualRequest, Submission,
};

/// Path of the backend endpoint every submission is posted to.
pub const ANALYZE_ENDPOINT: &str = "/analyze";
/// Term used when nothing else is selected (Fall 2025).
pub const DEFAULT_TERM_ID: &str = "202508";

pub const FIELD_SCHEDULE_IMAGE: &str = "scheduleImage";
pub const FIELD_API_KEY: &str = "apiKey";
pub const FIELD_TERM_ID: &str = "termId";

pub const SUBMIT_LABEL: &str = "Analyze Schedule";
pub const SUBMIT_LABEL_BUSY: &str = "Analyzing...";
pub const FILE_LABEL_EMPTY: &str = "Click or drag to upload schedule image";

/// Client-side checks that block a submission before any network I/O.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("missing image")]
    MissingImage,
    #[error("incomplete course list")]
    IncompleteCourses,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{}{}", .message, detail_suffix(.detail))]
    Server {
        status: Option<u16>,
        message: String,
        detail: Option<String>,
    },
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(text) if !text.is_empty() => format!("\n\nServer Error Details:\n{text}"),
        _ => String::new(),
    }
}
