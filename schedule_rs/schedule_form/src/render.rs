//! Turns an [`AnalysisResult`] into an immutable description of the results area.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::{is_truthy, list_len, AnalysisResult, CourseAnalysis};
use crate::markdown::{escape_html, render_markdown};
use crate::AnalyzeError;

pub const NOT_AVAILABLE: &str = "N/A";
pub const GRADE_PLACEHOLDER: &str = "--";
pub const ANALYSIS_FALLBACK: &str = "Overall analysis not available.";
pub const NO_COURSES_MESSAGE: &str = "No analyses available for individual courses.";

fn grade_line_pattern() -> &'static Regex {
    static GRADE_LINE: OnceLock<Regex> = OnceLock::new();
    GRADE_LINE.get_or_init(|| {
        Regex::new(r"^Overall Schedule Grade:\s*(?:100|[1-9]?[0-9])\s*/\s*100\s*\n?")
            .expect("grade line pattern is valid")
    })
}

/// Drops a leading `Overall Schedule Grade: N/100` line, which the grade badge
/// already shows. Text in any other shape is returned untouched.
pub fn strip_grade_line(text: &str) -> Cow<'_, str> {
    grade_line_pattern().replace(text, "")
}

/// Prints a grade the way the badge shows it: `87`, not `87.0`.
pub fn format_grade(grade: f64) -> String {
    if grade.fract() == 0.0 && grade.abs() < 1e15 {
        format!("{}", grade as i64)
    } else {
        grade.to_string()
    }
}

pub fn failure_message(err: &AnalyzeError) -> String {
    format!("Analysis failed: {err}. Check console for details.")
}

/// Error banner markup: escaped, with line breaks preserved.
pub fn error_html(message: &str) -> String {
    escape_html(message).replace('\n', "<br>")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GradeDisplay {
    pub visible: bool,
    pub value: String,
}

impl Default for GradeDisplay {
    fn default() -> Self {
        Self {
            visible: false,
            value: GRADE_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResearchDepth {
    pub direct: usize,
    pub professor_other: usize,
    pub course_other: usize,
    pub professor_other_courses: usize,
    pub course_other_professors: usize,
}

impl ResearchDepth {
    pub fn summary(&self) -> String {
        format!(
            "Research Depth: {} direct, {} prof-other, {} course-other",
            self.direct, self.professor_other, self.course_other
        )
    }
}

/// One course card. Text fields are plain text; `*_html` fields are already
/// safe markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CourseCard {
    pub title: String,
    pub section: String,
    pub professor: String,
    pub schedule: String,
    pub rating: String,
    pub review_count: u64,
    pub research: Option<ResearchDepth>,
    pub summary_html: String,
}

impl CourseCard {
    pub fn from_analysis(course: &CourseAnalysis) -> Self {
        Self {
            title: format!(
                "{} - {}",
                course.course_id,
                or_na(course.course_title.as_deref())
            ),
            section: or_na(course.section_id.as_deref()),
            professor: or_na(course.professor.as_deref()),
            schedule: or_na(course.schedule.as_deref()),
            rating: course
                .avg_rating
                .map_or_else(|| NOT_AVAILABLE.to_string(), |r| format!("{r:.2}/5")),
            review_count: course.review_count.unwrap_or(0),
            research: course
                .research_stats
                .as_ref()
                .filter(|stats| is_truthy(stats))
                .map(|stats| ResearchDepth {
                    direct: list_len(stats, "direct_reviews"),
                    professor_other: list_len(stats, "professor_other_reviews"),
                    course_other: list_len(stats, "course_other_reviews"),
                    professor_other_courses: list_len(stats, "professor_other_courses"),
                    course_other_professors: list_len(stats, "course_other_professors"),
                }),
            summary_html: render_markdown(course.summary.as_deref().unwrap_or_default()),
        }
    }

    pub fn meta_html(&self) -> String {
        let mut html = format!(
            "<span>Section: <strong>{}</strong></span> \
             <span>Professor: <strong>{}</strong></span><br>\
             <span>Schedule: <strong>{}</strong></span> \
             <span>Avg Rating: <strong>{} ({} reviews)</strong></span>",
            escape_html(&self.section),
            escape_html(&self.professor),
            escape_html(&self.schedule),
            escape_html(&self.rating),
            self.review_count,
        );
        if let Some(depth) = &self.research {
            html.push_str(&format!(
                "<p class=\"research-depth\"><i>{}</i></p>",
                depth.summary()
            ));
        }
        html
    }

    pub fn to_html(&self) -> String {
        format!(
            "<div class=\"course-card\"><h4>{}</h4><div class=\"course-meta\">{}</div>\
             <div class=\"analysis-summary\">{}</div></div>",
            escape_html(&self.title),
            self.meta_html(),
            self.summary_html
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoursesView {
    Cards(Vec<CourseCard>),
    Placeholder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsView {
    pub grade: GradeDisplay,
    pub analysis_html: String,
    pub courses: CoursesView,
}

impl ResultsView {
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        if self.grade.visible {
            html.push_str(&format!(
                "<div id=\"overall-grade-display\"><span class=\"grade-value\">{}</span></div>",
                escape_html(&self.grade.value)
            ));
        }
        html.push_str(&format!(
            "<div id=\"overall-analysis-content\">{}</div>",
            self.analysis_html
        ));
        html.push_str("<div id=\"individual-courses-content\">");
        match &self.courses {
            CoursesView::Cards(cards) => {
                for card in cards {
                    html.push_str(&card.to_html());
                }
            }
            CoursesView::Placeholder => {
                html.push_str(&format!("<p>{NO_COURSES_MESSAGE}</p>"));
            }
        }
        html.push_str("</div>");
        html
    }
}

/// Builds the results area from scratch; nothing from a previous render carries over.
pub fn render_results(result: &AnalysisResult) -> ResultsView {
    let mut grade = GradeDisplay::default();
    if let Some(value) = result.overall_grade.filter(|g| g.is_finite()) {
        grade.value = format_grade(value);
        grade.visible = true;
    }

    let analysis = result
        .overall_analysis
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(ANALYSIS_FALLBACK);
    let analysis_html = render_markdown(&strip_grade_line(analysis));

    let courses = result.courses();
    let courses = if courses.is_empty() {
        CoursesView::Placeholder
    } else {
        CoursesView::Cards(courses.iter().map(CourseCard::from_analysis).collect())
    };

    ResultsView {
        grade,
        analysis_html,
        courses,
    }
}

fn or_na(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result_from(value: serde_json::Value) -> AnalysisResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn strips_grade_line_and_shows_placeholder() {
        let result = result_from(json!({
            "overall_grade": 87,
            "overall_analysis": "Overall Schedule Grade: 87/100\nGood balance.",
            "courses": []
        }));
        let view = render_results(&result);
        assert_eq!(view.analysis_html, "Good balance.");
        assert_eq!(
            view.grade,
            GradeDisplay {
                visible: true,
                value: "87".into()
            }
        );
        assert_eq!(view.courses, CoursesView::Placeholder);
        assert!(view.to_html().contains(NO_COURSES_MESSAGE));
    }

    #[test]
    fn grade_line_tolerates_spacing() {
        assert_eq!(
            strip_grade_line("Overall Schedule Grade:  72 / 100  \nRest"),
            "Rest"
        );
        assert_eq!(strip_grade_line("Overall Schedule Grade: 100/100"), "");
    }

    #[test]
    fn unexpected_grade_text_is_left_alone() {
        for text in [
            "Grade: 87/100\nBody",
            "Intro\nOverall Schedule Grade: 87/100\nBody",
            "Overall Schedule Grade: 187/100\nBody",
            "Overall Schedule Grade: B+\nBody",
        ] {
            assert_eq!(strip_grade_line(text), text);
        }
    }

    #[test]
    fn missing_grade_keeps_badge_hidden() {
        let view = render_results(&result_from(json!({ "overall_analysis": "ok" })));
        assert_eq!(view.grade, GradeDisplay::default());
        assert!(!view.to_html().contains("grade-value"));
    }

    #[test]
    fn missing_analysis_uses_fallback_text() {
        let view = render_results(&AnalysisResult::default());
        assert_eq!(view.analysis_html, ANALYSIS_FALLBACK);
    }

    #[test]
    fn fractional_grades_keep_their_decimals() {
        assert_eq!(format_grade(87.0), "87");
        assert_eq!(format_grade(87.5), "87.5");
    }

    #[test]
    fn card_defaults_missing_fields() {
        let view = render_results(&result_from(json!({
            "courses": [{ "course_id": "ENGL101", "course_title": "" }]
        })));
        let CoursesView::Cards(cards) = view.courses else {
            panic!("expected cards");
        };
        let card = &cards[0];
        assert_eq!(card.title, "ENGL101 - N/A");
        assert_eq!(card.section, "N/A");
        assert_eq!(card.professor, "N/A");
        assert_eq!(card.schedule, "N/A");
        assert_eq!(card.rating, "N/A");
        assert_eq!(card.review_count, 0);
        assert!(card.research.is_none());
        assert_eq!(card.summary_html, "");
    }

    #[test]
    fn card_formats_rating_and_research() {
        let view = render_results(&result_from(json!({
            "courses": [{
                "course_id": "CMSC216",
                "course_title": "Intro to Computer Systems",
                "avg_rating": 3.456,
                "review_count": 12,
                "research_stats": {
                    "direct_reviews": [{}, {}],
                    "professor_other_reviews": [{}],
                    "course_other_reviews": null
                },
                "summary": "**Hard** but fair"
            }]
        })));
        let CoursesView::Cards(cards) = view.courses else {
            panic!("expected cards");
        };
        let card = &cards[0];
        assert_eq!(card.rating, "3.46/5");
        assert_eq!(
            card.research.map(|d| d.summary()),
            Some("Research Depth: 2 direct, 1 prof-other, 0 course-other".to_string())
        );
        assert!(card.meta_html().contains("3.46/5 (12 reviews)"));
        assert_eq!(card.summary_html, "<strong>Hard</strong> but fair");
    }

    #[test]
    fn card_text_is_escaped() {
        let card = CourseCard::from_analysis(&CourseAnalysis {
            course_id: "<img src=x>".into(),
            professor: Some("O'Brien & Co".into()),
            ..CourseAnalysis::default()
        });
        let html = card.to_html();
        assert!(html.contains("&lt;img src=x&gt; - N/A"));
        assert!(html.contains("O&#039;Brien &amp; Co"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn rendering_twice_is_identical() {
        let result = result_from(json!({
            "overall_grade": 91,
            "overall_analysis": "Nice **mix**",
            "courses": [{ "course_id": "HIST200", "summary": "fine" }]
        }));
        let first = render_results(&result);
        let second = render_results(&result);
        assert_eq!(first, second);
        assert_eq!(first.to_html(), second.to_html());
        assert_eq!(first.to_html().matches("course-card").count(), 1);
    }

    #[test]
    fn failure_banner_is_escaped_with_breaks() {
        let err = AnalyzeError::Server {
            status: Some(500),
            message: "<boom>".into(),
            detail: Some("line".into()),
        };
        let message = failure_message(&err);
        assert_eq!(
            message,
            "Analysis failed: <boom>\n\nServer Error Details:\nline. Check console for details."
        );
        assert_eq!(
            error_html(&message),
            "Analysis failed: &lt;boom&gt;<br><br>Server Error Details:<br>line. Check console for details."
        );
    }
}
