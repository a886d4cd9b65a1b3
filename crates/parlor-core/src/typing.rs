//! Typing animation for assistant replies
//!
//! A [`Typewriter`] reveals a finished reply one grapheme per tick. It does
//! not own a timer: the front end schedules ticks and feeds them back tagged
//! with the session generation, so ticks left over from a cancelled session
//! are ignored.

use std::time::Duration;
use unicode_segmentation::UnicodeSegmentation;

/// Default delay between revealed characters
pub const DEFAULT_CHAR_DELAY: Duration = Duration::from_millis(12);

/// Outcome of a single reveal tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypingStep {
    /// One more grapheme is visible
    Revealed,
    /// The whole reply is visible and the session is over
    Finished(String),
}

#[derive(Debug)]
struct TypingSession {
    source: String,
    /// Byte offset where each grapheme ends
    boundaries: Vec<usize>,
    cursor: usize,
}

impl TypingSession {
    fn new(source: String) -> Self {
        let boundaries = source
            .grapheme_indices(true)
            .map(|(start, grapheme)| start + grapheme.len())
            .collect();
        Self {
            source,
            boundaries,
            cursor: 0,
        }
    }

    fn revealed(&self) -> &str {
        match self.cursor {
            0 => "",
            n => &self.source[..self.boundaries[n - 1]],
        }
    }
}

/// Incremental reveal of one reply at a time
#[derive(Debug, Default)]
pub struct Typewriter {
    session: Option<TypingSession>,
    generation: u64,
}

impl Typewriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin revealing `full_text`. Ignored while another session is active.
    pub fn start(&mut self, full_text: impl Into<String>) -> bool {
        if self.session.is_some() {
            return false;
        }
        self.generation += 1;
        self.session = Some(TypingSession::new(full_text.into()));
        true
    }

    /// Advance the session tagged `generation` by one grapheme.
    ///
    /// Returns `None` when no session is active or the tick belongs to an
    /// earlier session.
    pub fn tick(&mut self, generation: u64) -> Option<TypingStep> {
        if generation != self.generation {
            return None;
        }
        let session = self.session.as_mut()?;

        if session.cursor < session.boundaries.len() {
            session.cursor += 1;
            return Some(TypingStep::Revealed);
        }

        self.session
            .take()
            .map(|finished| TypingStep::Finished(finished.source))
    }

    /// Drop the active session without committing anything.
    pub fn cancel(&mut self) -> bool {
        self.session.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Generation of the current (or most recent) session
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Text revealed so far, if a session is active
    pub fn revealed(&self) -> Option<&str> {
        self.session.as_ref().map(TypingSession::revealed)
    }
}
