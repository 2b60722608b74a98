use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type TodoId = String;

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 500;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    /// `None` for general todos.
    #[serde(default, alias = "data", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// On-disk document for one bucket.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TodoFile {
    #[serde(default)]
    pub todos: Vec<Todo>,
}

#[derive(thiserror::Error, Debug)]
pub enum TodoError {
    #[error("todo {0} not found")]
    NotFound(TodoId),
    #[error("storage failure at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt todo file {path:?}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Todo {
    pub fn new(title: String, description: String, date: Option<NaiveDate>) -> Self {
        Todo {
            id: generate_id(),
            title,
            description,
            completed: false,
            created_at: Utc::now(),
            date,
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

pub fn generate_id() -> TodoId {
    let bytes: [u8; 4] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_todo_is_open() {
        let todo = Todo::new("Buy milk".into(), String::new(), None);
        assert!(!todo.completed);
        assert_eq!(todo.date, None);
        assert_eq!(todo.id.len(), 8);
        assert!(todo.id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_toggle_twice_restores() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut todo = Todo::new("Standup".into(), String::new(), Some(date));
        todo.toggle();
        assert!(todo.completed);
        todo.toggle();
        assert!(!todo.completed);
        assert_eq!(todo.date, Some(date));
    }

    #[test]
    fn test_date_serializes_as_plain_string() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        let todo = Todo::new("Dentist".into(), String::new(), Some(date));
        let json = serde_json::to_string(&todo).unwrap();
        assert!(json.contains("\"date\":\"2026-03-07\""));
    }

    #[test]
    fn test_general_todo_omits_date() {
        let todo = Todo::new("Read".into(), String::new(), None);
        let json = serde_json::to_string(&todo).unwrap();
        assert!(!json.contains("date"));
    }

    #[test]
    fn test_legacy_data_key_is_accepted() {
        let json = r#"{
            "id": "0a1b2c3d",
            "title": "Old entry",
            "description": "",
            "completed": true,
            "created_at": "2025-01-02T03:04:05Z",
            "data": "2025-01-02"
        }"#;
        let todo: Todo = serde_json::from_str(json).unwrap();
        assert_eq!(todo.date, NaiveDate::from_ymd_opt(2025, 1, 2));
        assert!(todo.completed);
    }
}
