//! Erase policy for in-place redraws.
//!
//! Before drawing a frame, the terminal renderer removes whatever the
//! previous frame left on screen. How it does that depends on how tall the
//! previous frame still is compared to the visible rows:
//!
//! | Previous frame | Action |
//! |---|---|
//! | none (first frame) | nothing |
//! | height 0 after drawing something | newline, so the next frame starts below it |
//! | fits on screen | clear each line, moving up |
//! | taller than the screen | clear the screen and the scrollback |
//!
//! Lines below the top of the screen cannot be reached by moving the cursor
//! up, which is why tall frames fall back to a full clear.

use std::io::{self, Write};

use crossterm::cursor::{MoveTo, MoveToColumn, MoveUp};
use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};

use super::PreviousFrame;

/// What to do with the previous frame before drawing the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseAction {
    Nothing,
    /// Move to a fresh line below fully pruned output.
    Newline,
    /// Clear this many lines, starting at the cursor and moving up.
    Lines(usize),
    /// Clear the screen and scrollback and home the cursor.
    Screen,
}

/// Pick the erase action for `prev` on a terminal with `rows` visible rows.
pub fn erase_action(prev: Option<&PreviousFrame<'_>>, rows: u16) -> EraseAction {
    let Some(prev) = prev else {
        return EraseAction::Nothing;
    };

    match prev.height {
        0 if prev.drawn > 0 => EraseAction::Newline,
        0 => EraseAction::Nothing,
        h if h <= rows as usize => EraseAction::Lines(h),
        _ => EraseAction::Screen,
    }
}

/// Queue the escape sequences for `action` into `out`.
pub fn write_erase(out: &mut impl Write, action: EraseAction) -> io::Result<()> {
    match action {
        EraseAction::Nothing => {}
        EraseAction::Newline => out.write_all(b"\n")?,
        EraseAction::Lines(lines) => {
            queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            for _ in 1..lines {
                queue!(out, MoveUp(1), MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            }
        }
        EraseAction::Screen => {
            queue!(out, Clear(ClearType::All), Clear(ClearType::Purge), MoveTo(0, 0))?;
        }
    }
    Ok(())
}
