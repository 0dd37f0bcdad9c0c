// Terminal UI: rendering and the main event loop.
//
// The TUI owns a `ViewState` holding only editing state (the rewrite buffer,
// the path-prompt buffer, and the input mode). Everything else it renders —
// the current sentence, progress counts, notices — is read from the
// orchestrator each frame and pushed back as plain `Action` values.

pub mod input;
pub mod layout;

use crossterm::event::{Event, KeyEventKind};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{App, NoticeKind};

use input::Action;
use layout::{build_layout, AppLayout};

/// Placeholder shown when the practice pool is exhausted or empty.
const NO_SENTENCE_TEXT: &str =
    "No more sentences to practice! Import more or reset the session.";

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// What a path prompt is collecting a path for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    Import,
    Export,
}

/// Input mode for key dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Typing edits the rewrite buffer; Ctrl combinations issue commands.
    Edit,
    /// Typing edits the path-prompt buffer.
    Prompt(PromptPurpose),
    /// Awaiting y/n before resetting the session.
    ConfirmReset,
}

/// TUI-local editing state.
#[derive(Debug)]
pub struct ViewState {
    pub mode: Mode,
    /// The rewrite being composed for the current sentence.
    pub rewrite_input: String,
    /// The path being typed into an import/export prompt.
    pub prompt_input: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            mode: Mode::Edit,
            rewrite_input: String::new(),
            prompt_input: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete practice frame.
fn render_frame(frame: &mut Frame, app: &App, state: &ViewState) {
    let layout = build_layout(frame.area());

    render_status_bar(frame, &layout, app);
    render_sentence(frame, &layout, app);
    render_rewrite(frame, &layout, state);
    render_prompt_line(frame, &layout, app, state);
    render_help_bar(frame, &layout);
}

fn render_status_bar(frame: &mut Frame, layout: &AppLayout, app: &App) {
    let progress = app.progress();
    let text = format!(
        " Rewrite Practice | Progress: {}/{}",
        progress.completed, progress.total
    );
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.status_bar);
}

fn render_sentence(frame: &mut Frame, layout: &AppLayout, app: &App) {
    let content = match app.current() {
        Some(current) => current.original.as_str(),
        None => NO_SENTENCE_TEXT,
    };
    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Original Sentence"));
    frame.render_widget(paragraph, layout.sentence);
}

fn render_rewrite(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    // A trailing marker stands in for the cursor; the buffer is append-only.
    let content = format!("{}\u{2590}", state.rewrite_input);
    let border_style = if state.mode == Mode::Edit {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let paragraph = Paragraph::new(content).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Your Rewrite"),
    );
    frame.render_widget(paragraph, layout.rewrite);
}

fn render_prompt_line(frame: &mut Frame, layout: &AppLayout, app: &App, state: &ViewState) {
    let (text, style) = prompt_line_content(app, state);
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(text, style)]));
    frame.render_widget(paragraph, layout.prompt_line);
}

/// The prompt line shows, in priority order: an active path prompt, the
/// reset confirmation, or the latest operation notice.
fn prompt_line_content(app: &App, state: &ViewState) -> (String, Style) {
    match state.mode {
        Mode::Prompt(PromptPurpose::Import) => (
            format!(" Import CSV path: {}\u{2590}", state.prompt_input),
            Style::default().fg(Color::Yellow),
        ),
        Mode::Prompt(PromptPurpose::Export) => (
            format!(" Export CSV path: {}\u{2590}", state.prompt_input),
            Style::default().fg(Color::Yellow),
        ),
        Mode::ConfirmReset => (
            " Reset the session? All rewrites are cleared and every sentence becomes unseen. (y/n)"
                .to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Mode::Edit => match app.notice() {
            Some(notice) => {
                let color = match notice.kind {
                    NoticeKind::Info => Color::Green,
                    NoticeKind::Error => Color::Red,
                };
                (format!(" {}", notice.text), Style::default().fg(color))
            }
            None => (String::new(), Style::default()),
        },
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout) {
    let text = " ^S:Save & Next | ^K:Skip | ^O:Import | ^E:Export | ^R:Reset | ^C:Quit";
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (enters raw mode, enables alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Blocks on input events, re-rendering after each one.
/// 4. Restores the terminal on clean exit.
pub fn run(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Set panic hook to restore the terminal on crash. The original hook is
    // captured and chained after ours.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let result = event_loop(&mut terminal, app, &mut view_state);

    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    view_state: &mut ViewState,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| render_frame(frame, app, view_state))?;

        // No background work exists, so the loop simply blocks until the
        // next input (or resize) event and re-renders afterwards.
        let Event::Key(key_event) = crossterm::event::read()? else {
            continue;
        };

        // The previous operation's notice is dismissed by the next keypress.
        if key_event.kind == KeyEventKind::Press {
            app.clear_notice();
        }

        match input::handle_key(key_event, view_state) {
            Some(Action::Quit) => break,
            Some(Action::Save) => {
                if app.save(&view_state.rewrite_input) {
                    view_state.rewrite_input.clear();
                }
            }
            Some(Action::Skip) => {
                if app.skip() {
                    view_state.rewrite_input.clear();
                }
            }
            Some(Action::Import(path)) => app.import(&path),
            Some(Action::Export(path)) => app.export(&path),
            Some(Action::Reset) => {
                app.reset();
                view_state.rewrite_input.clear();
            }
            None => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
