use chrono::{Datelike, Months, NaiveDate};

pub const GRID_ROWS: usize = 6;
pub const GRID_COLS: usize = 7;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(input: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Weekday of the 1st, Sunday = 0.
pub fn first_weekday(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// Cursor over a Sunday-first 6x7 month grid.
///
/// The selected day only follows the cursor while the cursor sits on a cell
/// that holds a date of the displayed month; blank cells move the cursor but
/// leave the selection alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarCursor {
    month: NaiveDate,
    selected_day: u32,
    row: usize,
    col: usize,
}

impl CalendarCursor {
    pub fn new(selected: NaiveDate) -> Self {
        let mut cursor = CalendarCursor {
            month: selected.with_day(1).unwrap_or(selected),
            selected_day: selected.day(),
            row: 0,
            col: 0,
        };
        cursor.sync_position();
        cursor
    }

    pub fn year(&self) -> i32 {
        self.month.year()
    }

    pub fn month(&self) -> u32 {
        self.month.month()
    }

    pub fn month_start(&self) -> NaiveDate {
        self.month
    }

    pub fn selected_day(&self) -> u32 {
        self.selected_day
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn first_weekday(&self) -> u32 {
        first_weekday(self.year(), self.month())
    }

    pub fn selected_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year(), self.month(), self.selected_day).unwrap_or(self.month)
    }

    /// Day of the month shown in a grid cell, if any.
    pub fn day_at(&self, row: usize, col: usize) -> Option<u32> {
        let index = (row * GRID_COLS + col) as i64 - self.first_weekday() as i64 + 1;
        if index >= 1 && index <= self.days_in_month() as i64 {
            Some(index as u32)
        } else {
            None
        }
    }

    pub fn date_at(&self, row: usize, col: usize) -> Option<NaiveDate> {
        self.day_at(row, col)
            .and_then(|day| NaiveDate::from_ymd_opt(self.year(), self.month(), day))
    }

    pub fn is_cursor(&self, row: usize, col: usize) -> bool {
        self.row == row && self.col == col
    }

    pub fn move_cursor(&mut self, delta_row: i32, delta_col: i32) {
        let mut row = self.row as i32 + delta_row;
        let mut col = self.col as i32 + delta_col;

        if col < 0 {
            col = GRID_COLS as i32 - 1;
            row -= 1;
        } else if col >= GRID_COLS as i32 {
            col = 0;
            row += 1;
        }

        if row < 0 {
            row = 0;
            col = self.first_weekday() as i32;
        } else if row >= GRID_ROWS as i32 {
            row = GRID_ROWS as i32 - 1;
            col = GRID_COLS as i32 - 1;
        }

        self.row = row as usize;
        self.col = col as usize;
        if let Some(day) = self.day_at(self.row, self.col) {
            self.selected_day = day;
        }
    }

    pub fn next_month(&mut self) {
        if let Some(month) = self.month.checked_add_months(Months::new(1)) {
            self.enter_month(month);
        }
    }

    pub fn prev_month(&mut self) {
        if let Some(month) = self.month.checked_sub_months(Months::new(1)) {
            self.enter_month(month);
        }
    }

    /// No-op unless `today` falls in the displayed month.
    pub fn move_to_today(&mut self, today: NaiveDate) {
        if today.year() == self.year() && today.month() == self.month() {
            self.selected_day = today.day();
            self.sync_position();
        }
    }

    fn enter_month(&mut self, month: NaiveDate) {
        self.month = month;
        self.selected_day = 1;
        self.row = 0;
        self.col = self.first_weekday() as usize;
    }

    fn sync_position(&mut self) {
        let index = (self.selected_day - 1 + self.first_weekday()) as usize;
        self.row = index / GRID_COLS;
        self.col = index % GRID_COLS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn assert_consistent(cursor: &CalendarCursor) {
        assert_eq!(cursor.day_at(cursor.row(), cursor.col()), Some(cursor.selected_day()));
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2026, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2026, 4), 30);
        assert_eq!(days_in_month(2026, 12), 31);
    }

    #[test]
    fn test_first_weekday_sunday_based() {
        // 2026-02-01 is a Sunday, 2026-04-01 a Wednesday.
        assert_eq!(first_weekday(2026, 2), 0);
        assert_eq!(first_weekday(2026, 4), 3);
    }

    #[test]
    fn test_format_and_parse() {
        let d = date(2026, 1, 9);
        assert_eq!(format_date(d), "2026-01-09");
        assert_eq!(parse_date(" 2026-01-09 ").unwrap(), d);
        assert!(parse_date("2026-13-01").is_err());
        assert!(parse_date("09/01/2026").is_err());
    }

    #[test]
    fn test_new_places_cursor_on_selected_day() {
        let cursor = CalendarCursor::new(date(2026, 4, 15));
        assert_eq!(cursor.selected_day(), 15);
        // (15 - 1 + 3) = 17 -> row 2, col 3
        assert_eq!((cursor.row(), cursor.col()), (2, 3));
        assert_consistent(&cursor);
    }

    #[test]
    fn test_blank_cell_keeps_selection() {
        // April 2026: 30 days, first weekday 3.
        let mut cursor = CalendarCursor::new(date(2026, 4, 30));
        assert_eq!((cursor.row(), cursor.col()), (4, 4));
        cursor.move_cursor(0, 1);
        cursor.move_cursor(0, 1);
        assert_eq!((cursor.row(), cursor.col()), (4, 6));
        assert_eq!(cursor.day_at(4, 6), None);
        assert_eq!(cursor.selected_day(), 30);
    }

    #[test]
    fn test_left_wraps_to_previous_row() {
        let mut cursor = CalendarCursor::new(date(2026, 4, 12));
        assert_eq!((cursor.row(), cursor.col()), (2, 0));
        cursor.move_cursor(0, -1);
        assert_eq!((cursor.row(), cursor.col()), (1, 6));
        assert_eq!(cursor.selected_day(), 11);
        assert_consistent(&cursor);
    }

    #[test]
    fn test_right_wraps_to_next_row() {
        let mut cursor = CalendarCursor::new(date(2026, 4, 11));
        cursor.move_cursor(0, 1);
        assert_eq!((cursor.row(), cursor.col()), (2, 0));
        assert_eq!(cursor.selected_day(), 12);
    }

    #[test]
    fn test_left_wrap_on_top_row_clamps_to_first_weekday() {
        // February 2026 starts on Sunday, so day 1 sits at (0, 0).
        let mut cursor = CalendarCursor::new(date(2026, 2, 1));
        assert_eq!((cursor.row(), cursor.col()), (0, 0));
        cursor.move_cursor(0, -1);
        assert_eq!((cursor.row(), cursor.col()), (0, 0));
        assert_eq!(cursor.selected_day(), 1);

        let mut april = CalendarCursor::new(date(2026, 4, 2));
        april.move_cursor(-1, 0);
        assert_eq!((april.row(), april.col()), (0, 3));
        assert_eq!(april.selected_day(), 1);
    }

    #[test]
    fn test_bottom_row_clamps_to_last_column() {
        let mut cursor = CalendarCursor::new(date(2026, 4, 30));
        cursor.move_cursor(1, 0);
        assert_eq!((cursor.row(), cursor.col()), (5, 4));
        cursor.move_cursor(1, 0);
        assert_eq!((cursor.row(), cursor.col()), (5, 6));
        assert_eq!(cursor.selected_day(), 30);
    }

    #[test]
    fn test_vertical_move_selects_same_weekday() {
        let mut cursor = CalendarCursor::new(date(2026, 4, 8));
        cursor.move_cursor(1, 0);
        assert_eq!(cursor.selected_day(), 15);
        cursor.move_cursor(-1, 0);
        assert_eq!(cursor.selected_day(), 8);
    }

    #[test]
    fn test_month_navigation_resets_selection() {
        let mut cursor = CalendarCursor::new(date(2026, 3, 20));
        cursor.next_month();
        assert_eq!((cursor.year(), cursor.month()), (2026, 4));
        assert_eq!(cursor.selected_day(), 1);
        assert_eq!((cursor.row(), cursor.col()), (0, 3));

        cursor.prev_month();
        cursor.prev_month();
        assert_eq!((cursor.year(), cursor.month()), (2026, 2));
        assert_eq!((cursor.row(), cursor.col()), (0, 0));
        assert_consistent(&cursor);
    }

    #[test]
    fn test_month_navigation_crosses_year() {
        let mut cursor = CalendarCursor::new(date(2026, 12, 31));
        cursor.next_month();
        assert_eq!(cursor.selected_date(), date(2027, 1, 1));
        cursor.prev_month();
        cursor.prev_month();
        assert_eq!(cursor.selected_date(), date(2026, 11, 1));
    }

    #[test]
    fn test_move_to_today_only_within_month() {
        let today = date(2026, 10, 19);
        let mut cursor = CalendarCursor::new(date(2026, 10, 2));
        cursor.move_to_today(today);
        assert_eq!(cursor.selected_date(), today);
        assert_consistent(&cursor);

        cursor.next_month();
        cursor.move_to_today(today);
        assert_eq!(cursor.selected_date(), date(2026, 11, 1));
    }
}
