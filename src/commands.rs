use crate::calendar::{format_date, parse_date};
use crate::cli::BucketArgs;
use crate::editor::{format_errors, validate};
use crate::model::Todo;
use crate::navigator::{Navigator, NavigatorOptions, View};
use crate::storage::TodoStore;
use crate::ui;
use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use std::io::Write;
use tracing::info;

pub fn list(
    store: &impl TodoStore,
    out: &mut impl Write,
    today: NaiveDate,
    bucket: BucketArgs,
    upcoming: bool,
    options: NavigatorOptions,
) -> Result<()> {
    if upcoming {
        let days = options.upcoming_days;
        let navigator = Navigator::load(store, today, options).context("loading upcoming todos")?;
        let todos = navigator
            .list(View::Upcoming)
            .map(|list| list.items())
            .unwrap_or_default();
        writeln!(out, "Upcoming (next {} days)", days)?;
        return print_todos(out, todos, true);
    }

    let date = bucket_date(&bucket, today)?;
    let todos = match date {
        Some(d) => store.list_by_date(d)?,
        None => store.list_general()?,
    };
    match date {
        Some(d) => writeln!(out, "{}", format_date(d))?,
        None => writeln!(out, "General")?,
    }
    print_todos(out, &todos, false)
}

pub fn add(
    store: &impl TodoStore,
    out: &mut impl Write,
    today: NaiveDate,
    title: String,
    description: Option<String>,
    bucket: BucketArgs,
) -> Result<()> {
    let date = bucket_date(&bucket, today)?;
    let (title, description) = validate(&title, description.as_deref().unwrap_or(""))
        .map_err(|errors| anyhow!(format_errors(&errors)))?;
    let todo = Todo::new(title, description, date);
    store.create(&todo).context("saving todo")?;
    info!(id = %todo.id, date = ?todo.date, "created todo from cli");
    writeln!(out, "Added todo {} to {}", todo.id, bucket_label(date))?;
    Ok(())
}

pub fn done(
    store: &impl TodoStore,
    out: &mut impl Write,
    today: NaiveDate,
    id: String,
    bucket: BucketArgs,
) -> Result<()> {
    let date = bucket_date(&bucket, today)?;
    let todos = match date {
        Some(d) => store.list_by_date(d)?,
        None => store.list_general()?,
    };
    let mut todo = todos
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow!("todo {} not found in {}", id, bucket_label(date)))?;
    todo.toggle();
    store
        .update(&todo)
        .with_context(|| format!("updating todo {}", id))?;
    let state = if todo.completed { "done" } else { "open" };
    writeln!(out, "Marked {} as {}", id, state)?;
    Ok(())
}

pub fn remove(
    store: &impl TodoStore,
    out: &mut impl Write,
    today: NaiveDate,
    id: String,
    bucket: BucketArgs,
) -> Result<()> {
    let date = bucket_date(&bucket, today)?;
    store
        .delete(&id, date)
        .with_context(|| format!("removing todo {} from {}", id, bucket_label(date)))?;
    writeln!(out, "Removed todo {}", id)?;
    Ok(())
}

pub fn tui(store: &impl TodoStore, today: NaiveDate, options: NavigatorOptions) -> Result<()> {
    let navigator = Navigator::load(store, today, options).context("loading todos")?;
    info!(%today, "starting tui");
    ui::run(navigator, store)
}

fn bucket_date(bucket: &BucketArgs, today: NaiveDate) -> Result<Option<NaiveDate>> {
    if bucket.general {
        return Ok(None);
    }
    match bucket.date.as_deref() {
        Some(raw) => parse_date(raw)
            .map(Some)
            .map_err(|_| anyhow!("invalid date format (use YYYY-MM-DD): {}", raw)),
        None => Ok(Some(today)),
    }
}

fn bucket_label(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format_date(d),
        None => "general".to_string(),
    }
}

fn print_todos(out: &mut impl Write, todos: &[Todo], show_date: bool) -> Result<()> {
    if todos.is_empty() {
        writeln!(out, "  (empty)")?;
    }
    for todo in todos {
        let mark = if todo.completed { "x" } else { " " };
        write!(out, "  [{}] {}: {}", mark, todo.id, todo.title)?;
        if let (true, Some(date)) = (show_date, todo.date) {
            write!(out, "  ({})", format_date(date))?;
        }
        writeln!(out)?;
        if !todo.description.is_empty() {
            writeln!(out, "      {}", todo.description)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, JsonStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::new(temp_dir.path().join("todos"));
        (temp_dir, store)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn general() -> BucketArgs {
        BucketArgs {
            date: None,
            general: true,
        }
    }

    #[test]
    fn test_add_defaults_to_today() {
        let (_tmp, store) = setup_store();
        let mut out = Vec::new();
        add(&store, &mut out, today(), "  Call   mom ".into(), None, BucketArgs::default()).unwrap();

        let todos = store.list_by_date(today()).unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].title, "Call mom");
        assert!(String::from_utf8(out).unwrap().contains("2026-10-19"));
    }

    #[test]
    fn test_add_rejects_invalid_title() {
        let (_tmp, store) = setup_store();
        let mut out = Vec::new();
        let err = add(&store, &mut out, today(), "   ".into(), None, general()).unwrap_err();
        assert_eq!(err.to_string(), "Validation errors: Title: cannot be empty");
        assert!(store.list_general().unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_bad_date() {
        let (_tmp, store) = setup_store();
        let bucket = BucketArgs {
            date: Some("19/10/2026".into()),
            general: false,
        };
        let mut out = Vec::new();
        assert!(add(&store, &mut out, today(), "x".into(), None, bucket).is_err());
    }

    #[test]
    fn test_done_toggles_and_remove_deletes() {
        let (_tmp, store) = setup_store();
        let todo = Todo::new("Stretch".into(), String::new(), None);
        store.create(&todo).unwrap();
        let mut out = Vec::new();

        done(&store, &mut out, today(), todo.id.clone(), general()).unwrap();
        assert!(store.list_general().unwrap()[0].completed);

        remove(&store, &mut out, today(), todo.id.clone(), general()).unwrap();
        assert!(store.list_general().unwrap().is_empty());
        assert!(remove(&store, &mut out, today(), todo.id, general()).is_err());
    }

    #[test]
    fn test_list_upcoming_shows_dates() {
        let (_tmp, store) = setup_store();
        let tomorrow = today().succ_opt().unwrap();
        store
            .create(&Todo::new("Dentist".into(), String::new(), Some(tomorrow)))
            .unwrap();
        store
            .create(&Todo::new("Now".into(), String::new(), Some(today())))
            .unwrap();

        let mut out = Vec::new();
        list(
            &store,
            &mut out,
            today(),
            BucketArgs::default(),
            true,
            NavigatorOptions::default(),
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Dentist"));
        assert!(text.contains("(2026-10-20)"));
        assert!(!text.contains("Now"));
    }

    #[test]
    fn test_list_empty_general() {
        let (_tmp, store) = setup_store();
        let mut out = Vec::new();
        list(&store, &mut out, today(), general(), false, NavigatorOptions::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "General\n  (empty)\n");
    }
}
