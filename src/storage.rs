use crate::calendar::format_date;
use crate::model::{Todo, TodoError, TodoFile};
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const GENERAL_FILE: &str = "general.json";

/// Durable CRUD over date buckets plus the general bucket.
pub trait TodoStore {
    fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Todo>, TodoError>;

    fn list_general(&self) -> Result<Vec<Todo>, TodoError>;

    fn count_by_date(&self, date: NaiveDate) -> Result<usize, TodoError> {
        Ok(self.list_by_date(date)?.len())
    }

    /// Appends to the todo's own bucket.
    fn create(&self, todo: &Todo) -> Result<(), TodoError>;

    /// Replaces the record sharing `todo.id` within `todo.date`'s bucket.
    fn update(&self, todo: &Todo) -> Result<(), TodoError>;

    fn delete(&self, id: &str, date: Option<NaiveDate>) -> Result<(), TodoError>;
}

/// One pretty-printed JSON document per bucket inside `dir`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn bucket_path(&self, date: Option<NaiveDate>) -> PathBuf {
        match date {
            Some(d) => self.dir.join(format!("{}.json", format_date(d))),
            None => self.dir.join(GENERAL_FILE),
        }
    }

    fn load(&self, date: Option<NaiveDate>) -> Result<Vec<Todo>, TodoError> {
        let path = self.bucket_path(date);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(TodoError::Storage { path, source }),
        };
        let file: TodoFile =
            serde_json::from_str(&data).map_err(|source| TodoError::Corrupt {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), count = file.todos.len(), "loaded bucket");
        Ok(file.todos)
    }

    fn save(&self, date: Option<NaiveDate>, todos: Vec<Todo>) -> Result<(), TodoError> {
        fs::create_dir_all(&self.dir).map_err(|source| TodoError::Storage {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.bucket_path(date);
        let count = todos.len();
        let serialized = serde_json::to_string_pretty(&TodoFile { todos }).map_err(|source| {
            TodoError::Corrupt {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(&path, serialized).map_err(|source| TodoError::Storage {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), count, "saved bucket");
        Ok(())
    }
}

impl TodoStore for JsonStore {
    fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Todo>, TodoError> {
        self.load(Some(date))
    }

    fn list_general(&self) -> Result<Vec<Todo>, TodoError> {
        self.load(None)
    }

    fn create(&self, todo: &Todo) -> Result<(), TodoError> {
        let mut todos = self.load(todo.date)?;
        todos.push(todo.clone());
        self.save(todo.date, todos)
    }

    fn update(&self, todo: &Todo) -> Result<(), TodoError> {
        let mut todos = self.load(todo.date)?;
        let slot = todos
            .iter_mut()
            .find(|t| t.id == todo.id)
            .ok_or_else(|| TodoError::NotFound(todo.id.clone()))?;
        *slot = todo.clone();
        self.save(todo.date, todos)
    }

    fn delete(&self, id: &str, date: Option<NaiveDate>) -> Result<(), TodoError> {
        let mut todos = self.load(date)?;
        let idx = todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        todos.remove(idx);
        self.save(date, todos)
    }
}
