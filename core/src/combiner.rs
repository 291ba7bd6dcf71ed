//! The combiner chain: ordered, stateful transformers between raw input
//! events and committed text.
//!
//! Each combiner may rewrite an event, swallow it while retaining pending
//! state (a dead key waiting for its base character), or pass it through.
//! The chain runs combiners in order and stops at the first one that
//! consumes the event. Pending state that is not yet committed still shows
//! up in the composing word as combining feedback.

use unicode_normalization::UnicodeNormalization;

use crate::codes;
use crate::event::Event;

/// A single stage of the chain.
pub trait Combiner: std::fmt::Debug {
    /// Consume one event. The returned event is what the rest of the chain
    /// (and ultimately the composer) sees; return `event.consumed()` to
    /// swallow it.
    fn process_event(&mut self, previous_events: &[Event], event: Event) -> Event;

    /// Visual feedback for retained state that has not been committed yet,
    /// appended to the composing word for display.
    fn combining_state_feedback(&self) -> String;

    fn reset(&mut self);
}

/// Combines dead keys (combining diacritics) with the following base
/// character via canonical composition.
#[derive(Debug, Default)]
pub struct DeadKeyCombiner {
    /// Pending combining marks, oldest first.
    dead_sequence: String,
}

impl DeadKeyCombiner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Combiner for DeadKeyCombiner {
    fn process_event(&mut self, _previous_events: &[Event], event: Event) -> Event {
        if event.is_dead() {
            if let Some(mark) = char::from_u32(event.code_point as u32) {
                self.dead_sequence.push(mark);
            }
            return event.consumed();
        }
        if self.dead_sequence.is_empty() {
            return event;
        }
        if event.is_deletion() {
            // Deleting with marks pending removes the newest mark.
            self.dead_sequence.pop();
            return event.consumed();
        }
        if event.code_point >= 0 {
            if let Some(base) = char::from_u32(event.code_point as u32) {
                let mut cluster = base.to_string();
                cluster.push_str(&self.dead_sequence);
                self.dead_sequence.clear();
                let composed: String = cluster.nfc().collect();
                let mut chars = composed.chars();
                return match (chars.next(), chars.next()) {
                    (Some(single), None) => Event {
                        code_point: single as i32,
                        text: None,
                        ..event
                    },
                    // No precomposed form; emit the cluster as text.
                    _ => Event {
                        code_point: codes::CODE_OUTPUT_TEXT,
                        text: Some(composed),
                        ..event
                    },
                };
            }
        }
        event
    }

    fn combining_state_feedback(&self) -> String {
        self.dead_sequence.clone()
    }

    fn reset(&mut self) {
        self.dead_sequence.clear();
    }
}

/// The ordered chain plus the text committed through it so far.
#[derive(Debug)]
pub struct CombinerChain {
    combined: String,
    combiners: Vec<Box<dyn Combiner>>,
}

impl CombinerChain {
    /// The default chain: dead-key combination only.
    pub fn new(initial_text: &str) -> Self {
        Self::with_combiners(initial_text, vec![Box::new(DeadKeyCombiner::new())])
    }

    pub fn with_combiners(initial_text: &str, combiners: Vec<Box<dyn Combiner>>) -> Self {
        Self {
            combined: initial_text.to_string(),
            combiners,
        }
    }

    /// Run the event through the chain. Stops at the first combiner that
    /// consumes it; the result is never absent, only possibly consumed.
    pub fn process_event(&mut self, previous_events: &[Event], event: Event) -> Event {
        let mut event = event;
        for combiner in &mut self.combiners {
            event = combiner.process_event(previous_events, event);
            if event.is_consumed() {
                break;
            }
        }
        event
    }

    /// Commit a processed event's effect on the composed text.
    pub fn apply_processed_event(&mut self, event: &Event) {
        let text = event.text_to_commit();
        if !text.is_empty() {
            self.combined.push_str(&text);
        }
        if event.is_deletion() {
            self.combined.pop();
        }
    }

    /// The composing word: committed text plus pending combining feedback.
    pub fn composing_word_with_feedback(&self) -> String {
        let mut word = self.combined.clone();
        for combiner in &self.combiners {
            word.push_str(&combiner.combining_state_feedback());
        }
        word
    }

    pub fn reset(&mut self) {
        self.combined.clear();
        for combiner in &mut self.combiners {
            combiner.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACUTE: i32 = 0x0301;

    #[test]
    fn test_dead_key_is_consumed_and_fed_back() {
        let mut chain = CombinerChain::new("");
        let processed = chain.process_event(&[], Event::dead_key(ACUTE, 0, 0));
        assert!(processed.is_consumed());
        chain.apply_processed_event(&processed);
        // Nothing committed, but the pending mark shows in the feedback.
        assert_eq!(chain.composing_word_with_feedback(), "\u{0301}");
    }

    #[test]
    fn test_dead_key_composes_with_base() {
        let mut chain = CombinerChain::new("");
        let dead = chain.process_event(&[], Event::dead_key(ACUTE, 0, 0));
        chain.apply_processed_event(&dead);
        let processed = chain.process_event(&[], Event::key_press('e' as i32, 'e' as i32, 0, 0));
        assert_eq!(processed.code_point, '\u{00E9}' as i32);
        chain.apply_processed_event(&processed);
        assert_eq!(chain.composing_word_with_feedback(), "\u{00E9}");
    }

    #[test]
    fn test_uncomposable_cluster_becomes_output_text() {
        let mut chain = CombinerChain::new("");
        // There is no precomposed "q with acute".
        let dead = chain.process_event(&[], Event::dead_key(ACUTE, 0, 0));
        chain.apply_processed_event(&dead);
        let processed = chain.process_event(&[], Event::key_press('q' as i32, 'q' as i32, 0, 0));
        assert_eq!(processed.code_point, codes::CODE_OUTPUT_TEXT);
        chain.apply_processed_event(&processed);
        assert_eq!(chain.composing_word_with_feedback(), "q\u{0301}");
    }

    #[test]
    fn test_deletion_removes_pending_mark_first() {
        let mut chain = CombinerChain::new("");
        let dead = chain.process_event(&[], Event::dead_key(ACUTE, 0, 0));
        chain.apply_processed_event(&dead);
        let deletion = chain.process_event(&[], Event::deletion(0, 0));
        assert!(deletion.is_consumed());
        chain.apply_processed_event(&deletion);
        assert_eq!(chain.composing_word_with_feedback(), "");
    }

    #[test]
    fn test_plain_typing_appends_and_deletes() {
        let mut chain = CombinerChain::new("");
        for code_point in ['h' as i32, 'i' as i32] {
            let event = Event::key_press(code_point, code_point, 0, 0);
            let processed = chain.process_event(&[], event);
            chain.apply_processed_event(&processed);
        }
        assert_eq!(chain.composing_word_with_feedback(), "hi");
        let deletion = chain.process_event(&[], Event::deletion(0, 0));
        chain.apply_processed_event(&deletion);
        assert_eq!(chain.composing_word_with_feedback(), "h");
    }

    #[test]
    fn test_reset_clears_committed_and_pending() {
        let mut chain = CombinerChain::new("seed");
        let dead = chain.process_event(&[], Event::dead_key(ACUTE, 0, 0));
        chain.apply_processed_event(&dead);
        chain.reset();
        assert_eq!(chain.composing_word_with_feedback(), "");
    }
}
