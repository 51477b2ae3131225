//! Conversion from crossterm events, behind the `crossterm` feature.

use crossterm::event as ct;

use crate::input::InputEvent;
use crate::input::KeyCode;
use crate::input::KeyEvent;
use crate::input::KeyModifiers;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;

/// `None` for key releases/repeats and for events the tables do not handle.
pub fn input_event_from_crossterm(ev: ct::Event) -> Option<InputEvent> {
    match ev {
        ct::Event::Key(key) => {
            if key.kind != ct::KeyEventKind::Press {
                return None;
            }
            key_event_from_crossterm(key).map(InputEvent::Key)
        }
        ct::Event::Mouse(m) => mouse_event_from_crossterm(m).map(InputEvent::Mouse),
        _ => None,
    }
}

pub fn key_event_from_crossterm(key: ct::KeyEvent) -> Option<KeyEvent> {
    let code = match key.code {
        ct::KeyCode::Char(c) => KeyCode::Char(c),
        ct::KeyCode::Enter => KeyCode::Enter,
        ct::KeyCode::Esc => KeyCode::Esc,
        ct::KeyCode::Left => KeyCode::Left,
        ct::KeyCode::Right => KeyCode::Right,
        ct::KeyCode::Up => KeyCode::Up,
        ct::KeyCode::Down => KeyCode::Down,
        ct::KeyCode::Home => KeyCode::Home,
        ct::KeyCode::End => KeyCode::End,
        ct::KeyCode::PageUp => KeyCode::PageUp,
        ct::KeyCode::PageDown => KeyCode::PageDown,
        _ => return None,
    };
    let mut modifiers = modifiers_from_crossterm(key.modifiers);
    // Terminals report `G` as shift+`G`; the character already carries the case.
    if matches!(code, KeyCode::Char(_)) {
        modifiers.shift = false;
    }
    Some(KeyEvent::new(code).with_modifiers(modifiers))
}

pub fn mouse_event_from_crossterm(m: ct::MouseEvent) -> Option<MouseEvent> {
    let kind = match m.kind {
        ct::MouseEventKind::ScrollUp => MouseEventKind::ScrollUp,
        ct::MouseEventKind::ScrollDown => MouseEventKind::ScrollDown,
        _ => return None,
    };
    Some(MouseEvent {
        x: m.column,
        y: m.row,
        kind,
    })
}

fn modifiers_from_crossterm(m: ct::KeyModifiers) -> KeyModifiers {
    KeyModifiers {
        shift: m.contains(ct::KeyModifiers::SHIFT),
        ctrl: m.contains(ct::KeyModifiers::CONTROL),
        alt: m.contains(ct::KeyModifiers::ALT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_chars_drop_shift() {
        let key = ct::KeyEvent::new(ct::KeyCode::Char('G'), ct::KeyModifiers::SHIFT);
        let ev = key_event_from_crossterm(key).expect("mapped");
        assert_eq!(ev, KeyEvent::new(KeyCode::Char('G')));
    }

    #[test]
    fn ctrl_is_kept() {
        let key = ct::KeyEvent::new(ct::KeyCode::Char('d'), ct::KeyModifiers::CONTROL);
        let ev = key_event_from_crossterm(key).expect("mapped");
        assert!(ev.modifiers.ctrl);
    }

    #[test]
    fn releases_are_ignored() {
        let mut key = ct::KeyEvent::new(ct::KeyCode::Enter, ct::KeyModifiers::NONE);
        key.kind = ct::KeyEventKind::Release;
        assert_eq!(input_event_from_crossterm(ct::Event::Key(key)), None);
    }
}
