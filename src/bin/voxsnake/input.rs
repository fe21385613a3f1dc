//! Keyboard handling for the game front-end.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    DumpCapture,
}

/// Map a key press to an action. Releases and repeats are ignored so a held
/// key fires once.
pub(crate) fn action_for(key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::DumpCapture),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        key(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    #[test]
    fn quit_keys() {
        assert_eq!(action_for(press(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(action_for(press(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            action_for(key(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
                KeyEventKind::Press
            )),
            Some(Action::Quit)
        );
    }

    #[test]
    fn r_dumps_but_ctrl_r_does_not() {
        assert_eq!(
            action_for(press(KeyCode::Char('r'))),
            Some(Action::DumpCapture)
        );
        assert_eq!(
            action_for(key(
                KeyCode::Char('r'),
                KeyModifiers::CONTROL,
                KeyEventKind::Press
            )),
            None
        );
    }

    #[test]
    fn releases_and_other_keys_are_ignored() {
        assert_eq!(
            action_for(key(
                KeyCode::Char('q'),
                KeyModifiers::NONE,
                KeyEventKind::Release
            )),
            None
        );
        // Arrow keys do not steer; only voice does.
        assert_eq!(action_for(press(KeyCode::Left)), None);
        assert_eq!(action_for(press(KeyCode::Char('c'))), None);
    }
}
