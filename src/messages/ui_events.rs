//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::models::FormField;

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Table navigation
    SelectNext,
    SelectPrev,

    // Record actions
    OpenCreate,
    OpenEdit,
    OpenView,
    RequestDelete,
    ConfirmDelete,
    DeclineDelete,
    Refresh,
    CancelFetch,

    // Compose dialog
    NextField,
    PrevField,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    Submit,

    // Dialogs and popups
    CloseDialog,
    ToggleHelp,
    DismissNotification,

    // System
    Quit,
}

/// Which overlay is active (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DialogKind {
    #[default]
    None,
    Compose,
    View,
    ConfirmDelete,
    Help,
}

/// Convert a key event to a UiEvent based on the active overlay
pub fn key_to_ui_event(key: KeyEvent, dialog: DialogKind, field: FormField) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('x') => return Some(UiEvent::CancelFetch),
            KeyCode::Char('s') if dialog == DialogKind::Compose => return Some(UiEvent::Submit),
            _ => {}
        }
    }

    match dialog {
        DialogKind::None => handle_table_keys(key),
        DialogKind::Compose => handle_compose_keys(key, field),
        DialogKind::View => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('v') => {
                Some(UiEvent::CloseDialog)
            }
            _ => None,
        },
        DialogKind::ConfirmDelete => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => Some(UiEvent::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                Some(UiEvent::DeclineDelete)
            }
            _ => None,
        },
        DialogKind::Help => Some(UiEvent::CloseDialog),
    }
}

fn handle_table_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Char('n') | KeyCode::Char('a') => Some(UiEvent::OpenCreate),
        KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::OpenEdit),
        KeyCode::Char('v') => Some(UiEvent::OpenView),
        KeyCode::Char('d') | KeyCode::Delete => Some(UiEvent::RequestDelete),
        KeyCode::Char('r') => Some(UiEvent::Refresh),
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::SelectPrev),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::SelectNext),
        KeyCode::Esc => Some(UiEvent::DismissNotification),
        _ => None,
    }
}

fn handle_compose_keys(key: KeyEvent, field: FormField) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::CloseDialog),
        KeyCode::Tab => Some(UiEvent::NextField),
        KeyCode::BackTab => Some(UiEvent::PrevField),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        // Content is multi-line; other fields advance on Enter
        KeyCode::Enter if field == FormField::Content => Some(UiEvent::CharInput('\n')),
        KeyCode::Enter => Some(UiEvent::NextField),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_table_keys() {
        let map = |c| key_to_ui_event(press(KeyCode::Char(c)), DialogKind::None, FormField::Title);
        assert_eq!(map('n'), Some(UiEvent::OpenCreate));
        assert_eq!(map('d'), Some(UiEvent::RequestDelete));
        assert_eq!(map('r'), Some(UiEvent::Refresh));
        assert_eq!(map('q'), Some(UiEvent::Quit));
    }

    #[test]
    fn test_compose_captures_letters() {
        let event = key_to_ui_event(press(KeyCode::Char('q')), DialogKind::Compose, FormField::Title);
        assert_eq!(event, Some(UiEvent::CharInput('q')));

        let submit = key_to_ui_event(
            KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
            DialogKind::Compose,
            FormField::Title,
        );
        assert_eq!(submit, Some(UiEvent::Submit));
    }

    #[test]
    fn test_enter_in_content_inserts_newline() {
        let enter = press(KeyCode::Enter);
        assert_eq!(
            key_to_ui_event(enter, DialogKind::Compose, FormField::Content),
            Some(UiEvent::CharInput('\n'))
        );
        assert_eq!(
            key_to_ui_event(enter, DialogKind::Compose, FormField::Type),
            Some(UiEvent::NextField)
        );
    }

    #[test]
    fn test_confirm_dialog_keys() {
        let map = |code| key_to_ui_event(press(code), DialogKind::ConfirmDelete, FormField::Title);
        assert_eq!(map(KeyCode::Char('y')), Some(UiEvent::ConfirmDelete));
        assert_eq!(map(KeyCode::Esc), Some(UiEvent::DeclineDelete));
        assert_eq!(map(KeyCode::Char('x')), None);
    }
}
