use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Char(char),
    Backspace,
    Submit,
    Cancel,
    Interrupt,
    None,
}

pub fn map_event(ev: Event) -> Action {
    if let Event::Key(KeyEvent {
        code, modifiers, kind, ..
    }) = ev
    {
        if kind == KeyEventKind::Release {
            return Action::None;
        }
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Interrupt,
            (KeyCode::Esc, _) => Action::Cancel,
            (KeyCode::Enter, _) => Action::Submit,
            (KeyCode::Backspace, _) => Action::Backspace,
            (KeyCode::Char(c), _) => Action::Char(c),
            _ => Action::None,
        }
    } else {
        Action::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_typing_and_control_keys() {
        let key = |code, modifiers| Event::Key(KeyEvent::new(code, modifiers));
        assert_eq!(map_event(key(KeyCode::Char('a'), KeyModifiers::NONE)), Action::Char('a'));
        assert_eq!(map_event(key(KeyCode::Char('A'), KeyModifiers::SHIFT)), Action::Char('A'));
        assert_eq!(map_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::Interrupt);
        assert_eq!(map_event(key(KeyCode::Enter, KeyModifiers::NONE)), Action::Submit);
        assert_eq!(map_event(key(KeyCode::Esc, KeyModifiers::NONE)), Action::Cancel);
        assert_eq!(map_event(key(KeyCode::Tab, KeyModifiers::NONE)), Action::None);
    }
}
