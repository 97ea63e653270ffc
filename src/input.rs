use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::snake::Direction::{self, *};

/// What a key press asks of the host loop. Any input source that can
/// produce these plugs in; the keyboard mapping below is the only one the
/// terminal host has.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    Steer(Direction),
    ToggleRun,
    Quit,
}

pub fn map_key(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Steer(Up)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Steer(Down)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Steer(Left)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Steer(Right)),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Command::ToggleRun),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent { code, modifiers: KeyModifiers::NONE }
    }

    #[test]
    fn arrows_and_wasd_both_steer() {
        assert_eq!(map_key(&key(KeyCode::Up)), Some(Command::Steer(Up)));
        assert_eq!(map_key(&key(KeyCode::Char('w'))), Some(Command::Steer(Up)));
        assert_eq!(map_key(&key(KeyCode::Left)), Some(Command::Steer(Left)));
        assert_eq!(map_key(&key(KeyCode::Char('d'))), Some(Command::Steer(Right)));
    }

    #[test]
    fn toggle_quit_and_unmapped_keys() {
        assert_eq!(map_key(&key(KeyCode::Char(' '))), Some(Command::ToggleRun));
        assert_eq!(map_key(&key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(
            map_key(&KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL }),
            Some(Command::Quit)
        );
        assert_eq!(map_key(&key(KeyCode::Char('x'))), None);
        assert_eq!(map_key(&key(KeyCode::Tab)), None);
    }
}
