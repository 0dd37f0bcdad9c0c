// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into Action commands for the orchestrator,
// or into local ViewState mutations (rewrite editing, path prompts, reset
// confirmation).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{Mode, PromptPurpose, ViewState};

/// A user intent that must be carried out by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Save,
    Skip,
    Import(PathBuf),
    Export(PathBuf),
    Reset,
    Quit,
}

/// Handle a keyboard event.
///
/// Returns `Some(Action)` when the key press should be forwarded to the
/// orchestrator. Returns `None` when the key press was handled locally by
/// mutating `ViewState` (text editing, mode changes) or ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<Action> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(Action::Quit);
    }

    match view_state.mode {
        Mode::ConfirmReset => handle_confirm_reset(key_event, view_state),
        Mode::Prompt(purpose) => handle_prompt(key_event, view_state, purpose),
        Mode::Edit => handle_edit(key_event, view_state),
    }
}

/// Reset confirmation mode: only y confirms, n/Esc cancel, everything else
/// is blocked.
fn handle_confirm_reset(key_event: KeyEvent, view_state: &mut ViewState) -> Option<Action> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.mode = Mode::Edit;
            Some(Action::Reset)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.mode = Mode::Edit;
            None
        }
        _ => None,
    }
}

/// Path prompt mode: capture printable characters into the prompt buffer;
/// Enter submits, Esc cancels. A blank path on Enter cancels as well, the
/// same as dismissing a file dialog.
fn handle_prompt(
    key_event: KeyEvent,
    view_state: &mut ViewState,
    purpose: PromptPurpose,
) -> Option<Action> {
    match key_event.code {
        KeyCode::Enter => {
            let path = view_state.prompt_input.trim().to_string();
            view_state.prompt_input.clear();
            view_state.mode = Mode::Edit;
            if path.is_empty() {
                return None;
            }
            match purpose {
                PromptPurpose::Import => Some(Action::Import(PathBuf::from(path))),
                PromptPurpose::Export => Some(Action::Export(PathBuf::from(path))),
            }
        }
        KeyCode::Esc => {
            view_state.prompt_input.clear();
            view_state.mode = Mode::Edit;
            None
        }
        KeyCode::Backspace => {
            view_state.prompt_input.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.prompt_input.push(c);
            None
        }
        _ => None,
    }
}

/// Normal editing mode: printable characters go into the rewrite buffer,
/// Ctrl combinations trigger commands or mode changes.
fn handle_edit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<Action> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('k') => Some(Action::Skip),
            KeyCode::Char('o') => {
                view_state.mode = Mode::Prompt(PromptPurpose::Import);
                None
            }
            KeyCode::Char('e') => {
                view_state.mode = Mode::Prompt(PromptPurpose::Export);
                None
            }
            KeyCode::Char('r') => {
                view_state.mode = Mode::ConfirmReset;
                None
            }
            _ => None,
        };
    }

    match key_event.code {
        KeyCode::Char(c) => {
            view_state.rewrite_input.push(c);
            None
        }
        KeyCode::Enter => {
            view_state.rewrite_input.push('\n');
            None
        }
        KeyCode::Backspace => {
            view_state.rewrite_input.pop();
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
