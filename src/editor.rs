use crate::model::{Todo, TodoId, MAX_DESCRIPTION_LEN, MAX_TITLE_LEN};
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
        }
    }
}

/// What the form will do on commit. Edits carry the target's identity, not
/// a handle into any cached list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Navigation,
    Add { date: Option<NaiveDate> },
    Edit { id: TodoId, date: Option<NaiveDate> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    SwitchField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: FormField,
    pub message: &'static str,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.label(), self.message)
    }
}

/// Single-line text with a byte cursor kept on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    pub fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn move_left(&mut self) {
        self.cursor = prev_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        self.cursor = next_boundary(self.cursor, &self.value);
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.value.len();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn delete_forward(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        let next = next_boundary(self.cursor, &self.value);
        self.value.drain(self.cursor..next);
    }

    fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    pub fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert(self.cursor, '│');
        text
    }
}

#[derive(Debug, Clone)]
pub struct InputEditor {
    mode: EditorMode,
    title: FieldValue,
    description: FieldValue,
    field: FormField,
}

impl Default for InputEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl InputEditor {
    pub fn new() -> Self {
        InputEditor {
            mode: EditorMode::Navigation,
            title: FieldValue::default(),
            description: FieldValue::default(),
            field: FormField::Title,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode != EditorMode::Navigation
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn title(&self) -> &FieldValue {
        &self.title
    }

    pub fn description(&self) -> &FieldValue {
        &self.description
    }

    pub fn active_field(&self) -> FormField {
        self.field
    }

    pub fn start_add(&mut self, date: Option<NaiveDate>) {
        self.mode = EditorMode::Add { date };
        self.title = FieldValue::default();
        self.description = FieldValue::default();
        self.field = FormField::Title;
    }

    pub fn start_edit(&mut self, todo: &Todo) {
        self.mode = EditorMode::Edit {
            id: todo.id.clone(),
            date: todo.date,
        };
        self.title = FieldValue::new(&todo.title);
        self.description = FieldValue::new(&todo.description);
        self.field = FormField::Title;
    }

    pub fn close(&mut self) {
        *self = InputEditor::new();
    }

    pub fn apply(&mut self, key: EditKey) {
        if key == EditKey::SwitchField {
            self.switch_field();
            return;
        }
        let field = self.active_field_mut();
        match key {
            EditKey::Insert(ch) => field.insert_char(ch),
            EditKey::Backspace => field.backspace(),
            EditKey::Delete => field.delete_forward(),
            EditKey::Left => field.move_left(),
            EditKey::Right => field.move_right(),
            EditKey::Home => field.home(),
            EditKey::End => field.end(),
            EditKey::SwitchField => {}
        }
    }

    pub fn switch_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Title,
        };
        self.active_field_mut().end();
    }

    /// Normalized `(title, description)` if both fields pass validation.
    pub fn validated(&self) -> Result<(String, String), Vec<ValidationError>> {
        validate(self.title.value(), self.description.value())
    }

    fn active_field_mut(&mut self) -> &mut FieldValue {
        match self.field {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
        }
    }
}

/// Trims and collapses whitespace runs to single spaces.
pub fn normalize(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn validate(title: &str, description: &str) -> Result<(String, String), Vec<ValidationError>> {
    let title = normalize(title);
    let description = normalize(description);
    let mut errors = Vec::new();

    let title_len = title.chars().count();
    if title_len == 0 {
        errors.push(ValidationError {
            field: FormField::Title,
            message: "cannot be empty",
        });
    } else if title_len > MAX_TITLE_LEN {
        errors.push(ValidationError {
            field: FormField::Title,
            message: "cannot exceed 100 characters",
        });
    } else if !is_valid_text(&title) {
        errors.push(ValidationError {
            field: FormField::Title,
            message: "contains invalid characters",
        });
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(ValidationError {
            field: FormField::Description,
            message: "cannot exceed 500 characters",
        });
    } else if !is_valid_text(&description) {
        errors.push(ValidationError {
            field: FormField::Description,
            message: "contains invalid characters",
        });
    }

    if errors.is_empty() {
        Ok((title, description))
    } else {
        Err(errors)
    }
}

pub fn format_errors(errors: &[ValidationError]) -> String {
    let joined = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    format!("Validation errors: {}", joined)
}

fn is_valid_text(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || !c.is_control())
}

fn prev_boundary(cursor: usize, text: &str) -> usize {
    text[..cursor]
        .char_indices()
        .next_back()
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn next_boundary(cursor: usize, text: &str) -> usize {
    text[cursor..]
        .chars()
        .next()
        .map(|ch| cursor + ch.len_utf8())
        .unwrap_or(text.len())
}
