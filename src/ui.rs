use crate::calendar::{format_date, CalendarCursor, GRID_COLS, GRID_ROWS};
use crate::editor::{FieldValue, FormField};
use crate::keys::{self, KeyOutcome};
use crate::model::Todo;
use crate::navigator::{Navigator, NoticeKind, View};
use crate::storage::TodoStore;
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::collections::HashMap;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::{info, warn};

const PREVIEW_LIMIT: usize = 3;

pub fn run(navigator: Navigator, store: &impl TodoStore) -> Result<()> {
    install_panic_hook();
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, navigator, store);
    teardown_terminal(&mut terminal)?;
    result
}

/// Store-derived data for the calendar panel, refreshed after each event.
#[derive(Default)]
struct CalendarPanel {
    counts: HashMap<NaiveDate, usize>,
    preview: Vec<Todo>,
}

impl CalendarPanel {
    fn refresh(&mut self, navigator: &Navigator, store: &impl TodoStore) {
        if navigator.view() != View::Calendar {
            return;
        }
        self.counts = navigator.calendar_counts(store).unwrap_or_else(|err| {
            warn!(error = %err, "could not count calendar todos");
            HashMap::new()
        });
        let date = navigator.calendar().selected_date();
        self.preview = store.list_by_date(date).unwrap_or_else(|err| {
            warn!(error = %err, %date, "could not load calendar preview");
            Vec::new()
        });
    }
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut navigator: Navigator,
    store: &impl TodoStore,
) -> Result<()> {
    let mut panel = CalendarPanel::default();
    panel.refresh(&navigator, store);
    loop {
        navigator.expire_notice(Instant::now());
        terminal.draw(|f| draw(f, &navigator, &panel))?;
        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let editing = navigator.editor().is_open();
                match keys::translate(key, navigator.view(), editing) {
                    Some(KeyOutcome::Quit) => break,
                    Some(KeyOutcome::Action(action)) => {
                        navigator = navigator.update(action, store);
                        panel.refresh(&navigator, store);
                    }
                    None => {}
                }
            }
            Event::Resize(width, height) => {
                tracing::debug!(width, height, "terminal resized");
            }
            _ => {}
        }
    }
    info!("leaving tui");
    Ok(())
}

fn draw(f: &mut ratatui::Frame<'_>, navigator: &Navigator, panel: &CalendarPanel) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(f.size());

    draw_header(f, layout[0], navigator);
    match navigator.view() {
        View::Calendar => draw_calendar(f, layout[1], navigator, panel),
        _ => draw_list(f, layout[1], navigator),
    }
    draw_footer(f, layout[2], navigator);

    if navigator.editor().is_open() {
        draw_form(f, navigator);
    }
}

fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, navigator: &Navigator) {
    let mut spans = vec![
        Span::styled(
            "dayboard ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format_date(navigator.today()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("   "),
    ];
    for (idx, view) in View::ALL.iter().enumerate() {
        let style = if *view == navigator.view() {
            Style::default()
                .fg(Color::Black)
                .bg(Color::LightCyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} {} ", idx + 1, view.label()), style));
        spans.push(Span::raw(" "));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

fn list_title(navigator: &Navigator) -> String {
    let view = navigator.view();
    let label = match view {
        View::Today => format!("Today · {}", format_date(navigator.today())),
        _ => view.label().to_string(),
    };
    match navigator.page_info() {
        Some(info) if info.total_pages > 1 => format!(
            "{} (Page {}/{} - {} total)",
            label,
            info.page + 1,
            info.total_pages,
            info.total_items
        ),
        Some(info) => format!("{} ({} todos)", label, info.total_items),
        None => label,
    }
}

fn draw_list(f: &mut ratatui::Frame<'_>, area: Rect, navigator: &Navigator) {
    let accent = view_color(navigator.view());
    let block = Block::default()
        .title(Span::styled(
            list_title(navigator),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent));

    let rows = navigator.rows();
    if rows.is_empty() {
        let msg = Paragraph::new("No todos here. Press i to add one.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let width = area.width.saturating_sub(12) as usize;
    let mut state = ListState::default();
    let items = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            if row.selected {
                state.select(Some(idx));
            }
            let title_style = if row.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            };
            let mut spans = vec![
                Span::styled(
                    format!("{:>3}. ", row.number),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    if row.completed { "[x] " } else { "[ ] " },
                    Style::default().fg(if row.completed {
                        Color::Green
                    } else {
                        Color::Gray
                    }),
                ),
                Span::styled(truncate_text(row.title, width), title_style),
            ];
            if let Some(date) = row.date {
                spans.push(Span::styled(
                    format!("  ({})", format_date(date)),
                    Style::default().fg(Color::LightYellow),
                ));
            }
            let mut lines = vec![Line::from(spans)];
            if !row.description.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("         {}", truncate_text(row.description, width)),
                    Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
                )));
            }
            ListItem::new(lines)
        })
        .collect::<Vec<_>>();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::Rgb(40, 44, 56))
            .add_modifier(Modifier::BOLD),
    );
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_calendar(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    navigator: &Navigator,
    panel: &CalendarPanel,
) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);
    draw_month_grid(f, chunks[0], navigator.calendar(), navigator.today(), &panel.counts);
    draw_day_preview(f, chunks[1], navigator.calendar().selected_date(), &panel.preview);
}

fn draw_month_grid(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    cursor: &CalendarCursor,
    today: NaiveDate,
    counts: &HashMap<NaiveDate, usize>,
) {
    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        cursor.month_start().format("%B %Y").to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    let headings = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];
    let header_spans: Vec<Span<'static>> = headings
        .iter()
        .map(|h| Span::styled(format!("{:^7}", h), Style::default().fg(Color::Gray)))
        .collect();
    lines.push(Line::from(header_spans));

    for row in 0..GRID_ROWS {
        let mut spans = Vec::new();
        for col in 0..GRID_COLS {
            let on_cursor = cursor.is_cursor(row, col);
            let Some(date) = cursor.date_at(row, col) else {
                let style = if on_cursor {
                    Style::default().bg(Color::DarkGray)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(" ".repeat(7), style));
                continue;
            };
            let count = counts.get(&date).copied().unwrap_or(0);
            let text = if count > 0 {
                format!("{:>2}•{:<2}", cursor.day_at(row, col).unwrap_or(0), count)
            } else {
                format!("{:>2}   ", cursor.day_at(row, col).unwrap_or(0))
            };
            let mut style = Style::default().fg(if count > 0 {
                Color::LightYellow
            } else {
                Color::Gray
            });
            if date == today {
                style = style.fg(Color::LightGreen).add_modifier(Modifier::BOLD);
            }
            if on_cursor {
                style = style
                    .bg(Color::Cyan)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD);
            }
            spans.push(Span::styled(format!("{:^7}", text), style));
        }
        lines.push(Line::from(spans));
    }

    let block = Block::default()
        .title(Span::styled(
            "Calendar",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

fn draw_day_preview(f: &mut ratatui::Frame<'_>, area: Rect, date: NaiveDate, todos: &[Todo]) {
    let mut lines = vec![Line::from(Span::styled(
        date.format("%A, %B %-d").to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))];
    lines.push(Line::from(""));
    if todos.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing planned",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let width = area.width.saturating_sub(8) as usize;
    for todo in todos.iter().take(PREVIEW_LIMIT) {
        let mark = if todo.completed { "[x] " } else { "[ ] " };
        lines.push(Line::from(vec![
            Span::styled(mark, Style::default().fg(Color::Gray)),
            Span::raw(truncate_text(&todo.title, width)),
        ]));
    }
    if todos.len() > PREVIEW_LIMIT {
        lines.push(Line::from(Span::styled(
            format!("... and {} more", todos.len() - PREVIEW_LIMIT),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let block = Block::default()
        .title(Span::styled(
            format_date(date),
            Style::default().fg(Color::Gray),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(paragraph, area);
}

fn draw_footer(f: &mut ratatui::Frame<'_>, area: Rect, navigator: &Navigator) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .split(area);

    let help_bar = Paragraph::new(Span::styled(
        keys::help_line(navigator.view(), navigator.editor().is_open()),
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(help_bar, rows[0]);

    if let Some(notice) = navigator.notice() {
        let color = match notice.kind {
            NoticeKind::Info => Color::LightGreen,
            NoticeKind::Error => Color::LightRed,
        };
        let status = Paragraph::new(Span::styled(notice.text.clone(), Style::default().fg(color)))
            .alignment(Alignment::Center);
        f.render_widget(status, rows[1]);
    }
}

fn draw_form(f: &mut ratatui::Frame<'_>, navigator: &Navigator) {
    let Some(form) = navigator.form() else {
        return;
    };
    let area = centered_rect(60, 35, f.size());
    let title = match (form.adding, form.date) {
        (true, Some(date)) => format!("New todo · {}", format_date(date)),
        (true, None) => "New general todo".to_string(),
        (false, _) => "Edit todo".to_string(),
    };

    let mut lines = Vec::new();
    lines.push(field_line(
        FormField::Title,
        form.title,
        form.active == FormField::Title,
    ));
    lines.push(Line::from(""));
    lines.push(field_line(
        FormField::Description,
        form.description,
        form.active == FormField::Description,
    ));
    lines.push(Line::from(""));
    if let Some(notice) = navigator.notice().filter(|n| n.kind == NoticeKind::Error) {
        lines.push(Line::from(Span::styled(
            notice.text.clone(),
            Style::default().fg(Color::LightRed),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Enter/Ctrl+S save • Esc cancel • Tab switch field",
        Style::default().fg(Color::Gray),
    )));

    let dialog = Paragraph::new(lines)
        .block(
            Block::default()
                .title(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn field_line(field: FormField, value: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        value.with_caret()
    } else {
        value.value().to_string()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", field.label()), label_style),
        Span::styled(text, value_style),
    ])
}

fn view_color(view: View) -> Color {
    match view {
        View::Today => Color::LightCyan,
        View::Upcoming => Color::LightMagenta,
        View::Calendar => Color::Cyan,
        View::General => Color::LightBlue,
    }
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn truncate_text(text: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::NavigatorOptions;
    use crate::storage::JsonStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a longer title", 8), "a lon...");
        assert_eq!(truncate_text("anything", 0), "");
    }

    #[test]
    fn test_list_title_formats() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonStore::new(temp_dir.path());
        for i in 0..12 {
            store
                .create(&Todo::new(format!("g{}", i), String::new(), None))
                .unwrap();
        }
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let navigator = Navigator::load(&store, today, NavigatorOptions::default()).unwrap();
        assert_eq!(list_title(&navigator), "Today · 2026-10-19 (0 todos)");

        let navigator = navigator.update(crate::navigator::Action::ShowView(View::General), &store);
        assert_eq!(list_title(&navigator), "General (Page 1/2 - 12 total)");
    }

    #[test]
    fn test_centered_rect_stays_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect(60, 50, outer);
        assert!(inner.x >= outer.x && inner.right() <= outer.right());
        assert!(inner.y >= outer.y && inner.bottom() <= outer.bottom());
        assert_eq!(inner.width, 60);
    }
}
