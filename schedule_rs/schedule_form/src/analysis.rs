use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by `POST /analyze`.
///
/// Every field is optional: the backend either reports an `error` (with an
/// optional `stderr` trace) or the schedule-level grade and per-course results.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_grade: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courses: Option<Vec<CourseAnalysis>>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseAnalysis {
    #[serde(default)]
    pub course_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u64>,
    /// Kept loose: the analyzer dumps whatever research it gathered here, and
    /// only the lengths of a few list-valued keys are ever displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_stats: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl AnalysisResult {
    pub fn courses(&self) -> &[CourseAnalysis] {
        self.courses.as_deref().unwrap_or(&[])
    }
}

/// Length of `stats[key]` when it is a JSON array, otherwise 0.
pub(crate) fn list_len(stats: &Value, key: &str) -> usize {
    stats
        .get(key)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Mirrors JavaScript truthiness so `{}` and `[]` still count as present.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |v| v != 0.0 && !v.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
