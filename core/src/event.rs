//! Input events.
//!
//! An `Event` is one unit of input pushed into the word composer: a tap on a
//! key, a code point replayed from already-committed text, a gesture point,
//! or a deletion. Events are immutable; combiners that rewrite one build a
//! new event instead of mutating it.

use bitflags::bitflags;

use crate::codes;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EventFlags: u32 {
        /// A dead key: consumed now, combined into a later event.
        const DEAD = 0x1;
        /// Auto-repeat of a held key.
        const REPEAT = 0x2;
        /// Fully handled; carries no text and must not be reprocessed.
        const CONSUMED = 0x4;
    }
}

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A discrete key press from the touch handler.
    KeyPress,
    /// Replayed from text that was already typed or committed (e.g. seeding
    /// the composer from a picked suggestion).
    AlreadyTyped,
    /// A point resolved from a gesture trail.
    GesturePoint,
}

/// One unit of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    /// Unicode code point, or `NOT_A_CODE_POINT` when the event carries
    /// none (deletions), or `CODE_OUTPUT_TEXT` when `text` applies.
    pub code_point: i32,
    /// The key code that produced the event, `CODE_DELETE` for deletions.
    pub key_code: i32,
    /// Touch coordinate, or `NOT_A_COORDINATE` for synthetic events.
    pub x: i32,
    pub y: i32,
    /// Payload for output-text events.
    pub text: Option<String>,
    pub flags: EventFlags,
}

impl Event {
    /// A key press resolved by the touch handler.
    pub fn key_press(code_point: i32, key_code: i32, x: i32, y: i32) -> Self {
        Self {
            kind: EventKind::KeyPress,
            code_point,
            key_code,
            x,
            y,
            text: None,
            flags: EventFlags::empty(),
        }
    }

    /// A code point replayed from already-typed text.
    pub fn already_typed(code_point: i32, x: i32, y: i32) -> Self {
        Self {
            kind: EventKind::AlreadyTyped,
            code_point,
            key_code: codes::CODE_UNSPECIFIED,
            x,
            y,
            text: None,
            flags: EventFlags::empty(),
        }
    }

    /// A point on a gesture trail.
    pub fn gesture_point(code_point: i32, x: i32, y: i32) -> Self {
        Self {
            kind: EventKind::GesturePoint,
            code_point,
            key_code: codes::CODE_UNSPECIFIED,
            x,
            y,
            text: None,
            flags: EventFlags::empty(),
        }
    }

    /// A deletion (backspace).
    pub fn deletion(x: i32, y: i32) -> Self {
        Self {
            kind: EventKind::KeyPress,
            code_point: codes::NOT_A_CODE_POINT,
            key_code: codes::CODE_DELETE,
            x,
            y,
            text: None,
            flags: EventFlags::empty(),
        }
    }

    /// A key that emits a text string rather than a single code point.
    pub fn output_text(text: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            kind: EventKind::KeyPress,
            code_point: codes::CODE_OUTPUT_TEXT,
            key_code: codes::CODE_OUTPUT_TEXT,
            x,
            y,
            text: Some(text.into()),
            flags: EventFlags::empty(),
        }
    }

    /// A dead key waiting to combine with the next base character.
    pub fn dead_key(code_point: i32, x: i32, y: i32) -> Self {
        let mut event = Self::key_press(code_point, code_point, x, y);
        event.flags |= EventFlags::DEAD;
        event
    }

    /// The same event marked as auto-repeat.
    pub fn repeated(mut self) -> Self {
        self.flags |= EventFlags::REPEAT;
        self
    }

    /// The same event marked consumed: fully handled, commits nothing.
    pub fn consumed(mut self) -> Self {
        self.flags |= EventFlags::CONSUMED;
        self
    }

    pub fn is_consumed(&self) -> bool {
        self.flags.contains(EventFlags::CONSUMED)
    }

    pub fn is_dead(&self) -> bool {
        self.flags.contains(EventFlags::DEAD)
    }

    pub fn is_deletion(&self) -> bool {
        self.key_code == codes::CODE_DELETE
    }

    /// The text this event appends to the composing word; empty for
    /// consumed events, deletions and functional keys.
    pub fn text_to_commit(&self) -> String {
        if self.is_consumed() {
            return String::new();
        }
        if self.code_point == codes::CODE_OUTPUT_TEXT {
            return self.text.clone().unwrap_or_default();
        }
        if self.code_point >= 0 {
            if let Some(ch) = char::from_u32(self.code_point as u32) {
                return ch.to_string();
            }
        }
        String::new()
    }
}
