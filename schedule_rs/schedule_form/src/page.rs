use tracing::{debug, error, warn};

use crate::analysis::AnalysisResult;
use crate::form::{FormState, InputMode};
use crate::render::{error_html, failure_message, render_results, ResultsView};
use crate::submit::{build_submission, Submission};
use crate::{AnalyzeError, SUBMIT_LABEL, SUBMIT_LABEL_BUSY};

/// Whole-page state: the form plus the outcome of the latest submission.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageState {
    pub form: FormState,
    in_flight: bool,
    error: Option<String>,
    results: Option<ResultsView>,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.form.set_mode(mode);
        self.error = None;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn loading_visible(&self) -> bool {
        self.in_flight
    }

    pub fn submit_disabled(&self) -> bool {
        self.in_flight
    }

    pub fn submit_label(&self) -> &'static str {
        if self.in_flight {
            SUBMIT_LABEL_BUSY
        } else {
            SUBMIT_LABEL
        }
    }

    /// Raw banner text, if an error is showing.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_html(&self) -> Option<String> {
        self.error.as_deref().map(error_html)
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    /// Starts a submission. Returns the request to send, or `None` when one is
    /// already in flight or validation failed (the banner then shows why and
    /// the loading state is never entered).
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if self.in_flight {
            warn!("submission ignored: a request is already in flight");
            return None;
        }
        self.error = None;
        self.results = None;
        match build_submission(&self.form) {
            Ok(submission) => {
                self.in_flight = true;
                debug!(mode = %submission.mode(), "submission started");
                Some(submission)
            }
            Err(err) => {
                self.show_failure(&err.into());
                None
            }
        }
    }

    /// Applies the outcome of the request. Always leaves the loading state.
    pub fn complete(&mut self, outcome: Result<AnalysisResult, AnalyzeError>) {
        self.in_flight = false;
        match outcome {
            Ok(result) => {
                self.error = None;
                self.results = Some(render_results(&result));
                debug!(courses = result.courses().len(), "analysis rendered");
            }
            Err(err) => self.show_failure(&err),
        }
    }

    fn show_failure(&mut self, err: &AnalyzeError) {
        error!(error = ?err, "error during analysis");
        self.results = None;
        self.error = Some(failure_message(err));
    }
}
