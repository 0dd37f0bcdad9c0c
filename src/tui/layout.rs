// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the practice screen:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Original Sentence (40%)                           |
// |                                                   |
// +--------------------------------------------------+
// | Your Rewrite (fill)                               |
// |                                                   |
// +--------------------------------------------------+
// | Prompt / Notice Line (1 row)                      |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: progress counter.
    pub status_bar: Rect,
    /// The sentence being practiced.
    pub sentence: Rect,
    /// The user's rewrite in progress.
    pub rewrite: Rect,
    /// Path prompts, reset confirmation, and operation notices.
    pub prompt_line: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the practice-screen layout from the available terminal area.
///
/// Fixed single-row bars at the top and bottom; the remaining space is
/// split between the sentence panel and the (larger) rewrite panel.
pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // status bar
            Constraint::Percentage(40), // original sentence
            Constraint::Min(5),         // rewrite input
            Constraint::Length(1),      // prompt / notice line
            Constraint::Length(1),      // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        sentence: vertical[1],
        rewrite: vertical[2],
        prompt_line: vertical[3],
        help_bar: vertical[4],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
