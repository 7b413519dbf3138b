// Copyright (c) 2026 rezky_nightky

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};

use crate::surface::CellMetrics;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    PointerMoved,
    ButtonPressed,
    KeyPressed,
}

impl CloseReason {
    pub fn as_str(self) -> &'static str {
        match self {
            CloseReason::PointerMoved => "pointer moved",
            CloseReason::ButtonPressed => "button pressed",
            CloseReason::KeyPressed => "key pressed",
        }
    }
}

/// Decides which input events end the screensaver.
///
/// The first pointer report only anchors the position; later reports close
/// once they stray more than `jitter_px` from it on either axis.
#[derive(Clone, Debug)]
pub struct InputPolicy {
    cell: CellMetrics,
    jitter_px: i32,
    exit_on_input: bool,
    anchor: Option<(i32, i32)>,
}

impl InputPolicy {
    pub fn new(cell: CellMetrics, jitter_px: i32, exit_on_input: bool) -> Self {
        Self {
            cell,
            jitter_px,
            exit_on_input,
            anchor: None,
        }
    }

    pub fn observe(&mut self, ev: &Event) -> Option<CloseReason> {
        match ev {
            Event::Key(k) if k.kind == KeyEventKind::Press => self.on_key(k),
            Event::Mouse(m) if self.exit_on_input => match m.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                    self.on_pointer(m.column, m.row)
                }
                MouseEventKind::Down(_)
                | MouseEventKind::ScrollUp
                | MouseEventKind::ScrollDown
                | MouseEventKind::ScrollLeft
                | MouseEventKind::ScrollRight => Some(CloseReason::ButtonPressed),
                _ => None,
            },
            _ => None,
        }
    }

    fn on_key(&self, k: &KeyEvent) -> Option<CloseReason> {
        if self.exit_on_input {
            return Some(CloseReason::KeyPressed);
        }
        match (k.code, k.modifiers) {
            (KeyCode::Esc, _) | (KeyCode::Char('q'), _) => Some(CloseReason::KeyPressed),
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                Some(CloseReason::KeyPressed)
            }
            _ => None,
        }
    }

    fn on_pointer(&mut self, col: u16, row: u16) -> Option<CloseReason> {
        let x = col as i32 * self.cell.width;
        let y = row as i32 * self.cell.height;
        let Some((ax, ay)) = self.anchor else {
            self.anchor = Some((x, y));
            return None;
        };
        if (x - ax).abs() > self.jitter_px || (y - ay).abs() > self.jitter_px {
            Some(CloseReason::PointerMoved)
        } else {
            None
        }
    }
}
