use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::submit::CourseEntry;
use crate::{ValidationError, DEFAULT_TERM_ID, FILE_LABEL_EMPTY};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Image,
    Manual,
}

impl InputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::Image => "image",
            InputMode::Manual => "manual",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(InputMode::Image),
            "manual" => Ok(InputMode::Manual),
            other => Err(format!("unknown input mode: {other}")),
        }
    }
}

/// One manual-entry row, holding the raw text as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CourseRow {
    pub id: u32,
    pub course_id: String,
    pub section: String,
}

impl CourseRow {
    /// Normalized entry, or `None` when either field is blank.
    pub fn entry(&self) -> Option<CourseEntry> {
        let course_id = self.course_id.trim().to_uppercase();
        let section = self.section.trim();
        if course_id.is_empty() || section.is_empty() {
            return None;
        }
        Some(CourseEntry {
            course_id,
            section: section.to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectedImage {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormState {
    mode: InputMode,
    pub api_key: String,
    pub term_id: String,
    image: Option<SelectedImage>,
    rows: Vec<CourseRow>,
    next_row_id: u32,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        let mut state = Self {
            mode: InputMode::Image,
            api_key: String::new(),
            term_id: DEFAULT_TERM_ID.to_string(),
            image: None,
            rows: Vec::new(),
            next_row_id: 0,
        };
        state.set_mode(InputMode::default());
        state
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn rows(&self) -> &[CourseRow] {
        &self.rows
    }

    pub fn row(&self, id: u32) -> Option<&CourseRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    /// Switches the active input method. Entering manual mode guarantees at
    /// least one row to type into.
    pub fn set_mode(&mut self, mode: InputMode) {
        debug!(from = %self.mode, to = %mode, "input mode changed");
        self.mode = mode;
        if mode == InputMode::Manual && self.rows.is_empty() {
            self.add_row();
        }
    }

    pub fn add_row(&mut self) -> u32 {
        let id = self.next_row_id;
        self.next_row_id += 1;
        self.rows.push(CourseRow {
            id,
            ..CourseRow::default()
        });
        debug!(row = id, rows = self.rows.len(), "course row added");
        id
    }

    /// Removes the row unless it is the last one left.
    pub fn remove_row(&mut self, id: u32) -> bool {
        if self.remove_disabled() {
            warn!(row = id, "refusing to remove the last course row");
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|row| row.id != id);
        before != self.rows.len()
    }

    pub fn remove_disabled(&self) -> bool {
        self.rows.len() <= 1
    }

    pub fn set_course_id(&mut self, id: u32, value: impl Into<String>) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            row.course_id = value.into();
        }
    }

    pub fn set_section(&mut self, id: u32, value: impl Into<String>) {
        if let Some(row) = self.rows.iter_mut().find(|row| row.id == id) {
            row.section = value.into();
        }
    }

    pub fn select_image(&mut self, image: Option<SelectedImage>) {
        self.image = image;
    }

    /// Every row as a normalized entry, in row order.
    pub fn collect_courses(&self) -> Result<Vec<CourseEntry>, ValidationError> {
        let courses: Option<Vec<CourseEntry>> = self.rows.iter().map(CourseRow::entry).collect();
        match courses {
            Some(courses) if !courses.is_empty() => Ok(courses),
            _ => Err(ValidationError::IncompleteCourses),
        }
    }

    pub fn view(&self) -> FormView {
        let manual = self.mode == InputMode::Manual;
        let remove_disabled = self.remove_disabled();
        FormView {
            mode: self.mode,
            image_section_visible: !manual,
            manual_section_visible: manual,
            image_required: !manual,
            manual_inputs_required: manual,
            file_label: self
                .image
                .as_ref()
                .map_or_else(|| FILE_LABEL_EMPTY.to_string(), |img| img.name.clone()),
            rows: self
                .rows
                .iter()
                .map(|row| RowView {
                    id: row.id,
                    course_id: row.course_id.clone(),
                    section: row.section.clone(),
                    remove_disabled,
                })
                .collect(),
        }
    }
}

/// What the form section of the page should currently look like.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormView {
    pub mode: InputMode,
    pub image_section_visible: bool,
    pub manual_section_visible: bool,
    pub image_required: bool,
    pub manual_inputs_required: bool,
    pub file_label: String,
    pub rows: Vec<RowView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowView {
    pub id: u32,
    pub course_id: String,
    pub section: String,
    pub remove_disabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_with(rows: &[(&str, &str)]) -> FormState {
        let mut form = FormState::new();
        form.set_mode(InputMode::Manual);
        for (idx, (course, section)) in rows.iter().enumerate() {
            let id = if idx == 0 {
                form.rows()[0].id
            } else {
                form.add_row()
            };
            form.set_course_id(id, *course);
            form.set_section(id, *section);
        }
        form
    }

    #[test]
    fn starts_in_image_mode_without_rows() {
        let form = FormState::new();
        assert_eq!(form.mode(), InputMode::Image);
        assert!(form.rows().is_empty());
        assert_eq!(form.term_id, DEFAULT_TERM_ID);
    }

    #[test]
    fn exactly_one_section_visible() {
        let mut form = FormState::new();
        for mode in [InputMode::Image, InputMode::Manual, InputMode::Image] {
            form.set_mode(mode);
            let view = form.view();
            assert!(view.image_section_visible ^ view.manual_section_visible);
            assert_eq!(view.image_required, view.image_section_visible);
            assert_eq!(view.manual_inputs_required, view.manual_section_visible);
        }
    }

    #[test]
    fn manual_mode_creates_a_row_once() {
        let mut form = FormState::new();
        form.set_mode(InputMode::Manual);
        assert_eq!(form.rows().len(), 1);
        form.set_mode(InputMode::Image);
        form.set_mode(InputMode::Manual);
        assert_eq!(form.rows().len(), 1);
    }

    #[test]
    fn last_row_cannot_be_removed() {
        let mut form = FormState::new();
        form.set_mode(InputMode::Manual);
        let second = form.add_row();
        let third = form.add_row();
        assert!(!form.view().rows.iter().any(|r| r.remove_disabled));

        assert!(form.remove_row(second));
        assert!(form.remove_row(third));
        assert_eq!(form.rows().len(), 1);
        assert!(form.view().rows[0].remove_disabled);

        let only = form.rows()[0].id;
        assert!(!form.remove_row(only));
        assert_eq!(form.rows().len(), 1);
    }

    #[test]
    fn removing_unknown_row_is_a_no_op() {
        let mut form = FormState::new();
        form.set_mode(InputMode::Manual);
        form.add_row();
        assert!(!form.remove_row(99));
        assert_eq!(form.rows().len(), 2);
    }

    #[test]
    fn row_ids_are_not_reused() {
        let mut form = FormState::new();
        form.set_mode(InputMode::Manual);
        let a = form.add_row();
        form.remove_row(a);
        let b = form.add_row();
        assert_ne!(a, b);
    }

    #[test]
    fn collects_normalized_entries() {
        let form = manual_with(&[(" cmsc132 ", " 0101 "), ("math140", "0201")]);
        let courses = form.collect_courses().unwrap();
        assert_eq!(courses.len(), 2);
        assert_eq!(courses[0].course_id, "CMSC132");
        assert_eq!(courses[0].section, "0101");
        assert_eq!(courses[1].course_id, "MATH140");
    }

    #[test]
    fn incomplete_row_fails_collection() {
        let form = manual_with(&[("CMSC132", "0101"), ("", "0201")]);
        assert_eq!(
            form.collect_courses(),
            Err(ValidationError::IncompleteCourses)
        );
    }

    #[test]
    fn whitespace_only_fields_are_incomplete() {
        let form = manual_with(&[("CMSC132", "   ")]);
        assert!(form.collect_courses().is_err());
    }

    #[test]
    fn file_label_tracks_selection() {
        let mut form = FormState::new();
        assert_eq!(form.view().file_label, FILE_LABEL_EMPTY);
        form.select_image(Some(SelectedImage {
            name: "spring.png".into(),
        }));
        assert_eq!(form.view().file_label, "spring.png");
        form.select_image(None);
        assert_eq!(form.view().file_label, FILE_LABEL_EMPTY);
    }

    #[test]
    fn mode_round_trips_through_radio_values() {
        assert_eq!("manual".parse::<InputMode>(), Ok(InputMode::Manual));
        assert_eq!(InputMode::Image.to_string(), "image");
        assert!("camera".parse::<InputMode>().is_err());
    }
}
