//! View navigation and CRUD orchestration.
//!
//! The navigator owns the per-view cached lists and their pagination, the
//! calendar cursor and the add/edit form. It is the only component that
//! mutates the store, and every successful mutation is followed by a full
//! reload of all cached lists.

use crate::calendar::CalendarCursor;
use crate::editor::{self, EditKey, EditorMode, FieldValue, FormField, InputEditor};
use crate::model::{Todo, TodoError};
use crate::storage::TodoStore;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const PAGE_SIZE: usize = 10;
pub const DEFAULT_UPCOMING_DAYS: u32 = 30;
pub const DEFAULT_NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Today,
    Upcoming,
    Calendar,
    General,
}

impl View {
    /// Cycle order for next/previous view.
    pub const ALL: [View; 4] = [View::Today, View::Upcoming, View::Calendar, View::General];

    pub fn next(self) -> View {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> View {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Today => "Today",
            View::Upcoming => "Upcoming",
            View::Calendar => "Calendar",
            View::General => "General",
        }
    }

    fn position(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }
}

/// Page index plus row within the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCursor {
    page: usize,
    row: usize,
}

impl PageCursor {
    pub fn total_pages(len: usize) -> usize {
        len.div_ceil(PAGE_SIZE).max(1)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn absolute(&self) -> usize {
        self.page * PAGE_SIZE + self.row
    }

    pub fn page_range(&self, len: usize) -> Range<usize> {
        let start = (self.page * PAGE_SIZE).min(len);
        let end = (start + PAGE_SIZE).min(len);
        start..end
    }

    pub fn visible_len(&self, len: usize) -> usize {
        self.page_range(len).len()
    }

    fn move_down(&mut self, len: usize) {
        let visible = self.visible_len(len);
        if visible == 0 {
            return;
        }
        if self.row + 1 < visible {
            self.row += 1;
        } else if self.page + 1 < Self::total_pages(len) {
            self.page += 1;
            self.row = 0;
        }
    }

    fn move_up(&mut self, len: usize) {
        if self.row > 0 {
            self.row -= 1;
        } else if self.page > 0 {
            self.page -= 1;
            self.row = self.visible_len(len).saturating_sub(1);
        }
    }

    fn page_forward(&mut self, len: usize) {
        if self.page + 1 < Self::total_pages(len) {
            self.page += 1;
            self.row = 0;
        }
    }

    fn page_backward(&mut self) {
        if self.page > 0 {
            self.page -= 1;
            self.row = 0;
        }
    }

    /// Pulls page and row back inside a list of `len` items.
    fn normalize(&mut self, len: usize) {
        let last_page = Self::total_pages(len) - 1;
        if self.page > last_page {
            self.page = last_page;
            self.row = 0;
        }
        let visible = self.visible_len(len);
        if self.row >= visible {
            self.row = visible.saturating_sub(1);
        }
    }
}

/// A cached list with its pagination cursor. Shared by every list view.
#[derive(Debug, Clone, Default)]
pub struct PagedList {
    items: Vec<Todo>,
    cursor: PageCursor,
}

impl PagedList {
    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn cursor(&self) -> PageCursor {
        self.cursor
    }

    pub fn total_pages(&self) -> usize {
        PageCursor::total_pages(self.items.len())
    }

    pub fn visible(&self) -> &[Todo] {
        &self.items[self.cursor.page_range(self.items.len())]
    }

    pub fn selected(&self) -> Option<&Todo> {
        if self.cursor.row >= self.visible().len() {
            return None;
        }
        self.items.get(self.cursor.absolute())
    }

    fn replace(&mut self, items: Vec<Todo>) {
        self.items = items;
        self.cursor.normalize(self.items.len());
    }

    fn reset_row(&mut self) {
        self.cursor.row = 0;
        self.cursor.normalize(self.items.len());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    raised_at: Instant,
}

#[derive(Debug, Clone)]
pub struct NavigatorOptions {
    pub upcoming_days: u32,
    pub notice_timeout: Duration,
}

impl Default for NavigatorOptions {
    fn default() -> Self {
        NavigatorOptions {
            upcoming_days: DEFAULT_UPCOMING_DAYS,
            notice_timeout: DEFAULT_NOTICE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NextView,
    PrevView,
    ShowView(View),
    MoveDown,
    MoveUp,
    PageForward,
    PageBackward,
    ToggleSelected,
    BeginAdd,
    BeginEdit,
    DeleteSelected,
    CalendarMove { rows: i32, cols: i32 },
    NextMonth,
    PrevMonth,
    CalendarToday,
    Edit(EditKey),
    Commit,
    Cancel,
}

/// One visible list row, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView<'a> {
    pub number: usize,
    pub selected: bool,
    pub completed: bool,
    pub title: &'a str,
    pub description: &'a str,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FormView<'a> {
    pub adding: bool,
    pub date: Option<NaiveDate>,
    pub title: &'a FieldValue,
    pub description: &'a FieldValue,
    pub active: FormField,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    view: View,
    today: NaiveDate,
    options: NavigatorOptions,
    today_list: PagedList,
    upcoming: PagedList,
    general: PagedList,
    calendar: CalendarCursor,
    editor: InputEditor,
    notice: Option<Notice>,
}

impl Navigator {
    pub fn new(today: NaiveDate, options: NavigatorOptions) -> Self {
        Navigator {
            view: View::Today,
            today,
            options,
            today_list: PagedList::default(),
            upcoming: PagedList::default(),
            general: PagedList::default(),
            calendar: CalendarCursor::new(today),
            editor: InputEditor::new(),
            notice: None,
        }
    }

    pub fn load(
        store: &impl TodoStore,
        today: NaiveDate,
        options: NavigatorOptions,
    ) -> Result<Self, TodoError> {
        let mut navigator = Navigator::new(today, options);
        navigator.reload(store)?;
        Ok(navigator)
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn calendar(&self) -> &CalendarCursor {
        &self.calendar
    }

    pub fn editor(&self) -> &InputEditor {
        &self.editor
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn list(&self, view: View) -> Option<&PagedList> {
        match view {
            View::Today => Some(&self.today_list),
            View::Upcoming => Some(&self.upcoming),
            View::General => Some(&self.general),
            View::Calendar => None,
        }
    }

    fn list_mut(&mut self, view: View) -> Option<&mut PagedList> {
        match view {
            View::Today => Some(&mut self.today_list),
            View::Upcoming => Some(&mut self.upcoming),
            View::General => Some(&mut self.general),
            View::Calendar => None,
        }
    }

    pub fn active_list(&self) -> Option<&PagedList> {
        self.list(self.view)
    }

    pub fn selected(&self) -> Option<&Todo> {
        self.active_list().and_then(PagedList::selected)
    }

    /// Handles one event and hands the resulting state back.
    pub fn update(mut self, action: Action, store: &impl TodoStore) -> Self {
        self.dispatch(action, store);
        self
    }

    fn dispatch(&mut self, action: Action, store: &impl TodoStore) {
        self.notice = None;

        if self.editor.is_open() {
            match action {
                Action::Edit(key) => self.editor.apply(key),
                Action::Commit => self.commit(store),
                Action::Cancel => self.cancel(),
                _ => {}
            }
            return;
        }

        match action {
            Action::NextView => self.show_view(self.view.next()),
            Action::PrevView => self.show_view(self.view.prev()),
            Action::ShowView(view) => self.show_view(view),
            Action::MoveDown => self.move_down(),
            Action::MoveUp => self.move_up(),
            Action::PageForward => self.page_forward(),
            Action::PageBackward => self.page_backward(),
            Action::ToggleSelected => self.toggle_selected(store),
            Action::BeginAdd => self.begin_add(),
            Action::BeginEdit => self.begin_edit(),
            Action::DeleteSelected => self.delete_selected(store),
            Action::CalendarMove { rows, cols } => {
                if self.view == View::Calendar {
                    self.calendar.move_cursor(rows, cols);
                }
            }
            Action::NextMonth => {
                if self.view == View::Calendar {
                    self.calendar.next_month();
                }
            }
            Action::PrevMonth => {
                if self.view == View::Calendar {
                    self.calendar.prev_month();
                }
            }
            Action::CalendarToday => {
                if self.view == View::Calendar {
                    self.calendar.move_to_today(self.today);
                }
            }
            Action::Edit(_) | Action::Commit | Action::Cancel => {}
        }
    }

    pub fn show_view(&mut self, view: View) {
        self.view = view;
        if let Some(list) = self.list_mut(view) {
            list.reset_row();
        }
    }

    pub fn move_down(&mut self) {
        if let Some(list) = self.list_mut(self.view) {
            list.cursor.move_down(list.items.len());
        }
    }

    pub fn move_up(&mut self) {
        if let Some(list) = self.list_mut(self.view) {
            list.cursor.move_up(list.items.len());
        }
    }

    pub fn page_forward(&mut self) {
        if let Some(list) = self.list_mut(self.view) {
            list.cursor.page_forward(list.items.len());
        }
    }

    pub fn page_backward(&mut self) {
        if let Some(list) = self.list_mut(self.view) {
            list.cursor.page_backward();
        }
    }

    pub fn toggle_selected(&mut self, store: &impl TodoStore) {
        let Some(mut todo) = self.selected().cloned() else {
            return;
        };
        todo.toggle();
        match store.update(&todo) {
            Ok(()) => {
                info!(id = %todo.id, completed = todo.completed, "toggled todo");
                self.reload_after_mutation(store, None);
            }
            Err(err) => self.fail("Toggle failed", err),
        }
    }

    /// Opens an empty form. The date it will save with follows the view.
    pub fn begin_add(&mut self) {
        let date = match self.view {
            View::Today | View::Upcoming => Some(self.today),
            View::Calendar => Some(self.calendar.selected_date()),
            View::General => None,
        };
        self.editor.start_add(date);
    }

    pub fn begin_edit(&mut self) {
        match self.selected().cloned() {
            Some(todo) => self.editor.start_edit(&todo),
            None => self.raise(NoticeKind::Info, "Nothing selected to edit"),
        }
    }

    pub fn delete_selected(&mut self, store: &impl TodoStore) {
        let Some(todo) = self.selected().cloned() else {
            return;
        };
        match store.delete(&todo.id, todo.date) {
            Ok(()) => {
                info!(id = %todo.id, "deleted todo");
                self.reload_after_mutation(store, Some(format!("Deleted \"{}\"", todo.title)));
            }
            Err(err) => self.fail("Delete failed", err),
        }
    }

    pub fn cancel(&mut self) {
        self.editor.close();
    }

    /// Validates and persists the open form. The form stays open, input
    /// intact, if validation or the store rejects it.
    pub fn commit(&mut self, store: &impl TodoStore) {
        let (title, description) = match self.editor.validated() {
            Ok(fields) => fields,
            Err(errors) => {
                let message = editor::format_errors(&errors);
                debug!(%message, "form rejected");
                self.raise(NoticeKind::Error, message);
                return;
            }
        };

        let saved = match self.editor.mode().clone() {
            EditorMode::Navigation => return,
            EditorMode::Add { date } => {
                let todo = Todo::new(title, description, date);
                store.create(&todo).map(|()| {
                    info!(id = %todo.id, date = ?todo.date, "created todo");
                    format!("Added \"{}\"", todo.title)
                })
            }
            EditorMode::Edit { id, date } => resolve(store, &id, date).and_then(|mut todo| {
                todo.title = title;
                todo.description = description;
                store.update(&todo).map(|()| {
                    info!(id = %todo.id, "updated todo");
                    format!("Updated \"{}\"", todo.title)
                })
            }),
        };

        match saved {
            Ok(message) => {
                self.editor.close();
                self.reload_after_mutation(store, Some(message));
            }
            Err(err) => self.fail("Save failed", err),
        }
    }

    /// Replaces all three cached lists, or none of them on error.
    pub fn reload(&mut self, store: &impl TodoStore) -> Result<(), TodoError> {
        let today = store.list_by_date(self.today)?;
        let general = store.list_general()?;
        let mut upcoming = Vec::new();
        for offset in 1..=u64::from(self.options.upcoming_days) {
            let Some(date) = self.today.checked_add_days(Days::new(offset)) else {
                break;
            };
            upcoming.extend(store.list_by_date(date)?);
        }
        debug!(
            today = today.len(),
            upcoming = upcoming.len(),
            general = general.len(),
            "reloaded lists"
        );
        self.today_list.replace(today);
        self.upcoming.replace(upcoming);
        self.general.replace(general);
        Ok(())
    }

    fn reload_after_mutation(&mut self, store: &impl TodoStore, message: Option<String>) {
        match self.reload(store) {
            Ok(()) => {
                if let Some(message) = message {
                    self.raise(NoticeKind::Info, message);
                }
            }
            Err(err) => self.fail("Reload failed", err),
        }
    }

    /// Todo counts for each day of the displayed calendar month.
    pub fn calendar_counts(
        &self,
        store: &impl TodoStore,
    ) -> Result<HashMap<NaiveDate, usize>, TodoError> {
        let start = self.calendar.month_start();
        let mut counts = HashMap::new();
        for offset in 0..self.calendar.days_in_month() {
            let Some(date) = start.checked_add_days(Days::new(u64::from(offset))) else {
                break;
            };
            let count = store.count_by_date(date)?;
            if count > 0 {
                counts.insert(date, count);
            }
        }
        Ok(counts)
    }

    pub fn rows(&self) -> Vec<RowView<'_>> {
        let Some(list) = self.active_list() else {
            return Vec::new();
        };
        let cursor = list.cursor();
        let first = cursor.page_range(list.items().len()).start;
        let show_date = self.view == View::Upcoming;
        list.visible()
            .iter()
            .enumerate()
            .map(|(row, todo)| RowView {
                number: first + row + 1,
                selected: row == cursor.row(),
                completed: todo.completed,
                title: &todo.title,
                description: &todo.description,
                date: if show_date { todo.date } else { None },
            })
            .collect()
    }

    pub fn page_info(&self) -> Option<PageInfo> {
        self.active_list().map(|list| PageInfo {
            page: list.cursor().page(),
            total_pages: list.total_pages(),
            total_items: list.items().len(),
        })
    }

    pub fn form(&self) -> Option<FormView<'_>> {
        let (adding, date) = match self.editor.mode() {
            EditorMode::Navigation => return None,
            EditorMode::Add { date } => (true, *date),
            EditorMode::Edit { date, .. } => (false, *date),
        };
        Some(FormView {
            adding,
            date,
            title: self.editor.title(),
            description: self.editor.description(),
            active: self.editor.active_field(),
        })
    }

    /// Drops the notice once it has been visible for the configured timeout.
    pub fn expire_notice(&mut self, now: Instant) {
        let expired = self.notice.as_ref().is_some_and(|notice| {
            now.saturating_duration_since(notice.raised_at) >= self.options.notice_timeout
        });
        if expired {
            self.notice = None;
        }
    }

    fn raise(&mut self, kind: NoticeKind, text: impl Into<String>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
            raised_at: Instant::now(),
        });
    }

    fn fail(&mut self, context: &str, err: TodoError) {
        warn!(error = %err, "{}", context);
        self.raise(NoticeKind::Error, format!("{}: {}", context, err));
    }
}

/// Looks the edit target up by id in its own bucket.
fn resolve(store: &impl TodoStore, id: &str, date: Option<NaiveDate>) -> Result<Todo, TodoError> {
    let bucket = match date {
        Some(date) => store.list_by_date(date)?,
        None => store.list_general()?,
    };
    bucket
        .into_iter()
        .find(|todo| todo.id == id)
        .ok_or_else(|| TodoError::NotFound(id.to_string()))
}
