use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analysis::AnalysisResult;
use crate::form::{FormState, InputMode};
use crate::{AnalyzeError, ValidationError, FIELD_API_KEY, FIELD_TERM_ID};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseEntry {
    pub course_id: String,
    pub section: String,
}

/// JSON body sent in manual mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualRequest {
    pub api_key: String,
    pub term_id: String,
    pub courses: Vec<CourseEntry>,
}

/// Text parts of the multipart body sent in image mode. The file itself is
/// attached by the caller under [`crate::FIELD_SCHEDULE_IMAGE`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageSubmission {
    pub file_name: String,
    pub api_key: String,
    pub term_id: String,
}

impl ImageSubmission {
    pub fn text_fields(&self) -> [(&'static str, &str); 2] {
        [
            (FIELD_API_KEY, self.api_key.as_str()),
            (FIELD_TERM_ID, self.term_id.as_str()),
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Image(ImageSubmission),
    Manual(ManualRequest),
}

impl Submission {
    pub fn mode(&self) -> InputMode {
        match self {
            Submission::Image(_) => InputMode::Image,
            Submission::Manual(_) => InputMode::Manual,
        }
    }

    /// Explicit content type, if any. Multipart bodies leave it to the
    /// browser so the boundary is filled in.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Submission::Image(_) => None,
            Submission::Manual(_) => Some("application/json"),
        }
    }
}

/// Validates the form and picks the one request shape for its mode.
pub fn build_submission(form: &FormState) -> Result<Submission, ValidationError> {
    let api_key = form.api_key.trim();
    if api_key.is_empty() {
        return Err(ValidationError::MissingApiKey);
    }
    let submission = match form.mode() {
        InputMode::Image => {
            let image = form.image().ok_or(ValidationError::MissingImage)?;
            Submission::Image(ImageSubmission {
                file_name: image.name.clone(),
                api_key: api_key.to_string(),
                term_id: form.term_id.clone(),
            })
        }
        InputMode::Manual => Submission::Manual(ManualRequest {
            api_key: api_key.to_string(),
            term_id: form.term_id.clone(),
            courses: form.collect_courses()?,
        }),
    };
    debug!(mode = %submission.mode(), "submission built");
    Ok(submission)
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
}

/// Classifies an `/analyze` response by status code and body.
pub fn interpret_response(status: u16, body: &str) -> Result<AnalysisResult, AnalyzeError> {
    if !(200..300).contains(&status) {
        let parsed = serde_json::from_str::<ErrorBody>(body).ok();
        let (error, stderr) = parsed.map_or((None, None), |b| (b.error, b.stderr));
        return Err(AnalyzeError::Server {
            status: Some(status),
            message: error
                .filter(|msg| !msg.is_empty())
                .unwrap_or_else(|| format!("server error {status}")),
            detail: stderr,
        });
    }

    let result: AnalysisResult = serde_json::from_str(body)
        .map_err(|err| AnalyzeError::Unexpected(format!("invalid response body: {err}")))?;
    if let Some(message) = result.error.clone().filter(|msg| !msg.is_empty()) {
        return Err(AnalyzeError::Server {
            status: Some(status),
            message,
            detail: result.stderr.clone(),
        });
    }
    Ok(result)
}
