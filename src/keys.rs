use crate::editor::EditKey;
use crate::navigator::{Action, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Quit,
    Action(Action),
}

/// Maps a key press to what the event loop should do. An open form takes
/// every key before any view binding is considered.
pub fn translate(key: KeyEvent, view: View, editing: bool) -> Option<KeyOutcome> {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    if control && key.code == KeyCode::Char('c') {
        return Some(KeyOutcome::Quit);
    }
    if editing {
        return form_key(key, control).map(KeyOutcome::Action);
    }
    if key.code == KeyCode::Char('q') {
        return Some(KeyOutcome::Quit);
    }
    global_key(key)
        .or_else(|| {
            if view == View::Calendar {
                calendar_key(key)
            } else {
                list_key(key, control)
            }
        })
        .map(KeyOutcome::Action)
}

fn form_key(key: KeyEvent, control: bool) -> Option<Action> {
    let action = match key.code {
        KeyCode::Esc => Action::Cancel,
        KeyCode::Enter => Action::Commit,
        KeyCode::Char('s') if control => Action::Commit,
        KeyCode::Char('a') if control => Action::Edit(EditKey::End),
        KeyCode::Tab | KeyCode::BackTab => Action::Edit(EditKey::SwitchField),
        KeyCode::Backspace => Action::Edit(EditKey::Backspace),
        KeyCode::Delete => Action::Edit(EditKey::Delete),
        KeyCode::Left => Action::Edit(EditKey::Left),
        KeyCode::Right => Action::Edit(EditKey::Right),
        KeyCode::Home => Action::Edit(EditKey::Home),
        KeyCode::End => Action::Edit(EditKey::End),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Action::Edit(EditKey::Insert(c))
        }
        _ => return None,
    };
    Some(action)
}

fn global_key(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Right | KeyCode::Tab => Action::NextView,
        KeyCode::Left | KeyCode::BackTab => Action::PrevView,
        KeyCode::Char('1') => Action::ShowView(View::Today),
        KeyCode::Char('2') => Action::ShowView(View::Upcoming),
        KeyCode::Char('3') => Action::ShowView(View::Calendar),
        KeyCode::Char('4') => Action::ShowView(View::General),
        KeyCode::Char('c') => Action::ShowView(View::Calendar),
        _ => return None,
    };
    Some(action)
}

fn list_key(key: KeyEvent, control: bool) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('f') if control => Action::PageForward,
        KeyCode::Char('b') if control => Action::PageBackward,
        KeyCode::PageDown => Action::PageForward,
        KeyCode::PageUp => Action::PageBackward,
        KeyCode::Down | KeyCode::Char('j') => Action::MoveDown,
        KeyCode::Up | KeyCode::Char('k') => Action::MoveUp,
        KeyCode::Char('x') | KeyCode::Char(' ') => Action::ToggleSelected,
        KeyCode::Char('i') | KeyCode::Char('a') => Action::BeginAdd,
        KeyCode::Char('e') | KeyCode::Enter => Action::BeginEdit,
        KeyCode::Char('d') => Action::DeleteSelected,
        _ => return None,
    };
    Some(action)
}

fn calendar_key(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('h') => Action::CalendarMove { rows: 0, cols: -1 },
        KeyCode::Char('l') => Action::CalendarMove { rows: 0, cols: 1 },
        KeyCode::Char('k') | KeyCode::Up => Action::CalendarMove { rows: -1, cols: 0 },
        KeyCode::Char('j') | KeyCode::Down => Action::CalendarMove { rows: 1, cols: 0 },
        KeyCode::Char('n') | KeyCode::Char('>') => Action::NextMonth,
        KeyCode::Char('p') | KeyCode::Char('<') => Action::PrevMonth,
        KeyCode::Char('t') => Action::CalendarToday,
        KeyCode::Char('i') | KeyCode::Char('a') => Action::BeginAdd,
        _ => return None,
    };
    Some(action)
}

pub fn help_line(view: View, editing: bool) -> &'static str {
    if editing {
        return "tab switch field  enter/ctrl+s save  esc cancel  ctrl+a end of field";
    }
    match view {
        View::Calendar => {
            "hjkl move  n/p month  t today  i add  ←/→ views  q quit"
        }
        View::General => {
            "j/k move  x toggle  i add  e edit  d delete  ctrl+f/b page  c calendar  q quit"
        }
        View::Today | View::Upcoming => {
            "j/k move  x toggle  i add  e edit  d delete  ctrl+f/b page  ←/→ views  q quit"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn action(outcome: Option<KeyOutcome>) -> Option<Action> {
        match outcome {
            Some(KeyOutcome::Action(action)) => Some(action),
            _ => None,
        }
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(translate(press(KeyCode::Char('q')), View::Today, false), Some(KeyOutcome::Quit));
        assert_eq!(translate(ctrl('c'), View::Calendar, false), Some(KeyOutcome::Quit));
        assert_eq!(translate(ctrl('c'), View::Today, true), Some(KeyOutcome::Quit));
    }

    #[test]
    fn test_form_takes_precedence() {
        assert_eq!(
            action(translate(press(KeyCode::Char('q')), View::Today, true)),
            Some(Action::Edit(EditKey::Insert('q')))
        );
        assert_eq!(
            action(translate(press(KeyCode::Char('j')), View::Today, true)),
            Some(Action::Edit(EditKey::Insert('j')))
        );
        assert_eq!(
            action(translate(press(KeyCode::Right), View::Today, true)),
            Some(Action::Edit(EditKey::Right))
        );
        assert_eq!(
            action(translate(press(KeyCode::Tab), View::Today, true)),
            Some(Action::Edit(EditKey::SwitchField))
        );
    }

    #[test]
    fn test_form_commit_and_cancel() {
        assert_eq!(action(translate(press(KeyCode::Enter), View::General, true)), Some(Action::Commit));
        assert_eq!(action(translate(ctrl('s'), View::General, true)), Some(Action::Commit));
        assert_eq!(action(translate(press(KeyCode::Esc), View::General, true)), Some(Action::Cancel));
        assert_eq!(
            action(translate(ctrl('a'), View::General, true)),
            Some(Action::Edit(EditKey::End))
        );
        assert_eq!(translate(ctrl('x'), View::General, true), None);
    }

    #[test]
    fn test_view_switching() {
        assert_eq!(action(translate(press(KeyCode::Right), View::Today, false)), Some(Action::NextView));
        assert_eq!(action(translate(press(KeyCode::BackTab), View::Today, false)), Some(Action::PrevView));
        assert_eq!(
            action(translate(press(KeyCode::Char('4')), View::Today, false)),
            Some(Action::ShowView(View::General))
        );
        assert_eq!(
            action(translate(press(KeyCode::Char('c')), View::Upcoming, false)),
            Some(Action::ShowView(View::Calendar))
        );
    }

    #[test]
    fn test_list_bindings() {
        assert_eq!(action(translate(press(KeyCode::Char('j')), View::Today, false)), Some(Action::MoveDown));
        assert_eq!(action(translate(ctrl('f'), View::Upcoming, false)), Some(Action::PageForward));
        assert_eq!(action(translate(ctrl('b'), View::General, false)), Some(Action::PageBackward));
        assert_eq!(action(translate(press(KeyCode::Char('x')), View::General, false)), Some(Action::ToggleSelected));
        assert_eq!(action(translate(press(KeyCode::Char('d')), View::Today, false)), Some(Action::DeleteSelected));
        assert_eq!(action(translate(press(KeyCode::Char('n')), View::Today, false)), None);
    }

    #[test]
    fn test_calendar_bindings() {
        assert_eq!(
            action(translate(press(KeyCode::Char('h')), View::Calendar, false)),
            Some(Action::CalendarMove { rows: 0, cols: -1 })
        );
        assert_eq!(
            action(translate(press(KeyCode::Char('j')), View::Calendar, false)),
            Some(Action::CalendarMove { rows: 1, cols: 0 })
        );
        assert_eq!(action(translate(press(KeyCode::Char('>')), View::Calendar, false)), Some(Action::NextMonth));
        assert_eq!(action(translate(press(KeyCode::Char('t')), View::Calendar, false)), Some(Action::CalendarToday));
        assert_eq!(action(translate(press(KeyCode::Char('x')), View::Calendar, false)), None);
    }
}
