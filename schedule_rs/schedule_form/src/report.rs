//! Plain-text rendering of an analysis, for terminals and saved reports.

use std::sync::OnceLock;

use regex::Regex;

use crate::analysis::AnalysisResult;
use crate::render::{format_grade, CourseCard, ANALYSIS_FALLBACK, NOT_AVAILABLE};

const RULE_WIDTH: usize = 50;

fn grade_pattern() -> &'static Regex {
    static GRADE: OnceLock<Regex> = OnceLock::new();
    GRADE.get_or_init(|| {
        Regex::new(r"Overall Schedule Grade:\s*(\d{1,3})\s*/\s*100").expect("grade pattern is valid")
    })
}

/// Grade stated anywhere in the analysis text, e.g. `Overall Schedule Grade: 78/100`.
pub fn parse_overall_grade(text: &str) -> Option<u32> {
    grade_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn text_report(result: &AnalysisResult) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let analysis = result
        .overall_analysis
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(ANALYSIS_FALLBACK);
    let grade = result
        .overall_grade
        .map(format_grade)
        .or_else(|| parse_overall_grade(analysis).map(|g| g.to_string()));

    let mut out = String::new();
    out.push_str(&format!("OVERALL SCHEDULE ANALYSIS\n{rule}\n\n"));
    match grade {
        Some(grade) => out.push_str(&format!("Grade: {grade}/100\n\n")),
        None => out.push_str(&format!("Grade: {NOT_AVAILABLE}\n\n")),
    }
    out.push_str(analysis);
    out.push_str(&format!(
        "\n\n{rule}\n\nINDIVIDUAL COURSE ANALYSES\n{rule}\n\n"
    ));

    let courses = result.courses();
    if courses.is_empty() {
        out.push_str("No individual course analyses were generated.\n");
    }
    for (idx, course) in courses.iter().enumerate() {
        let card = CourseCard::from_analysis(course);
        out.push_str(&format!("COURSE {}: {}\n", idx + 1, card.title));
        out.push_str(&format!(
            "Section: {}\nProfessor: {}\nSchedule: {}\n",
            card.section, card.professor, card.schedule
        ));
        out.push_str(&format!(
            "Average Rating: {} ({} reviews)\n",
            card.rating, card.review_count
        ));
        if let Some(depth) = card.research {
            out.push_str(&depth.summary());
            out.push('\n');
            if depth.professor_other_courses > 0 {
                out.push_str(&format!(
                    "  Professor teaches {} other courses\n",
                    depth.professor_other_courses
                ));
            }
            if depth.course_other_professors > 0 {
                out.push_str(&format!(
                    "  Course is taught by {} other professors\n",
                    depth.course_other_professors
                ));
            }
        }
        out.push_str("\nANALYSIS:\n");
        out.push_str(course.summary.as_deref().unwrap_or("Summary not available."));
        out.push_str(&format!("\n\n{}\n\n", "-".repeat(RULE_WIDTH)));
    }
    out
}
