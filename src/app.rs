// Application state and orchestration logic.
//
// Wires user intents from the TUI to session operations, keeps the current
// sentence and progress counts cached for rendering, and translates session
// errors into user-facing notices. Only plain values cross the boundary in
// either direction; the orchestrator knows nothing about widgets.

use std::path::Path;

use tracing::error;

use crate::session::{Progress, Session, SessionError};

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

/// The sentence currently being practiced.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSentence {
    pub id: i64,
    pub original: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A short user-facing message produced by the latest operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn info(text: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Orchestrator state: the session plus what the view needs to render.
pub struct App {
    session: Session,
    current: Option<CurrentSentence>,
    progress: Progress,
    notice: Option<Notice>,
}

impl App {
    /// Build the orchestrator and load the first sentence and progress
    /// counts from the session.
    pub fn new(session: Session) -> Result<Self, SessionError> {
        let current = session
            .next_sentence()?
            .map(|(id, original)| CurrentSentence { id, original });
        let progress = session.progress()?;
        Ok(App {
            session,
            current,
            progress,
            notice: None,
        })
    }

    pub fn current(&self) -> Option<&CurrentSentence> {
        self.current.as_ref()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Load the next random unseen sentence and refresh progress counts.
    /// A failing refresh surfaces as an error notice; the previous values
    /// stay on screen.
    fn refresh(&mut self) {
        match self.session.next_sentence() {
            Ok(next) => {
                self.current = next.map(|(id, original)| CurrentSentence { id, original });
            }
            Err(err) => self.report(err),
        }
        match self.session.progress() {
            Ok(progress) => self.progress = progress,
            Err(err) => self.report(err),
        }
    }

    /// Import sentences from a CSV file, then move on to a fresh sentence.
    pub fn import(&mut self, path: &Path) {
        match self.session.import_sentences(path) {
            Ok(count) => {
                self.notice = Some(Notice::info(format!(
                    "Imported {count} new sentence{}.",
                    plural(count)
                )));
                self.refresh();
            }
            Err(err) => self.report(err),
        }
    }

    /// Save the rewrite for the current sentence and advance. Returns
    /// whether the save happened (so the view can clear its input buffer).
    pub fn save(&mut self, text: &str) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        match self.session.submit_rewrite(current.id, text) {
            Ok(()) => {
                self.notice = Some(Notice::info("Rewrite saved."));
                self.refresh();
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Mark the current sentence as seen without a rewrite and advance.
    /// Returns whether anything was skipped.
    pub fn skip(&mut self) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        match self.session.skip_current(current.id) {
            Ok(()) => {
                self.refresh();
                true
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Export all completed rewrites to a CSV file.
    pub fn export(&mut self, path: &Path) {
        match self.session.export_completed(path) {
            Ok(count) => {
                self.notice = Some(Notice::info(format!(
                    "Exported {count} rewrite{} to {}.",
                    plural(count),
                    path.display()
                )));
            }
            Err(err) => self.report(err),
        }
    }

    /// Reset the session: everything back in the practice pool.
    pub fn reset(&mut self) {
        match self.session.reset() {
            Ok(()) => {
                self.notice = Some(Notice::info("Session reset."));
                self.refresh();
            }
            Err(err) => self.report(err),
        }
    }

    fn report(&mut self, err: SessionError) {
        error!("operation failed: {err}");
        self.notice = Some(Notice::error(user_message(&err)));
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

// ---------------------------------------------------------------------------
// Error translation
// ---------------------------------------------------------------------------

/// Map an error kind to the message shown to the user. Raw fault text stays
/// in the log; the notice names the kind of problem and what to do about it.
pub fn user_message(err: &SessionError) -> String {
    match err {
        SessionError::Storage(e) if e.is_locked() => {
            "The practice database is busy. Please try again.".to_string()
        }
        SessionError::Storage(e) => {
            format!("Storage operation failed ({}). Please try again.", e.op)
        }
        SessionError::ImportFormat { column } => {
            format!("The CSV file must contain a '{column}' column.")
        }
        SessionError::EmptyRewrite => "Please write something before saving.".to_string(),
        SessionError::FileAccess { path, .. } => format!("Cannot access {path}."),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
