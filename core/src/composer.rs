//! The event-sourced word composer.
//!
//! A single-writer state machine fed one event at a time from one input
//! session. Every event flows through the combiner chain (`process_event`),
//! is committed (`apply_processed_event`), and lands in an append-only
//! history; the cached composing word is re-derived from the chain after
//! every step, so there is never a dirty-cache window. Not thread-safe by
//! design.

use tracing::trace;

use crate::codes;
use crate::combiner::CombinerChain;
use crate::event::Event;

/// Longest word the pointer buffer tracks, in code points. Code-point
/// counting continues past this; only coordinate recording stops.
pub const MAX_WORD_LENGTH: usize = 48;

/// Parallel per-keystroke touch data: coordinates, pointer ids, timestamps.
///
/// Bounded by the composer at [`MAX_WORD_LENGTH`]; reset clears the buffers
/// without releasing their allocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputPointers {
    xs: Vec<i32>,
    ys: Vec<i32>,
    pointer_ids: Vec<i32>,
    times: Vec<i32>,
}

impl InputPointers {
    pub fn new(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
            pointer_ids: Vec::with_capacity(capacity),
            times: Vec::with_capacity(capacity),
        }
    }

    /// Record a pointer at `index`, overwriting any previous entry there.
    pub fn add_pointer_at(&mut self, index: usize, x: i32, y: i32, pointer_id: i32, time: i32) {
        if index < self.xs.len() {
            self.xs[index] = x;
            self.ys[index] = y;
            self.pointer_ids[index] = pointer_id;
            self.times[index] = time;
        } else {
            self.xs.push(x);
            self.ys.push(y);
            self.pointer_ids.push(pointer_id);
            self.times.push(time);
        }
    }

    /// Replace the contents with another pointer set (batch input trails).
    pub fn set(&mut self, other: &InputPointers) {
        self.xs.clone_from(&other.xs);
        self.ys.clone_from(&other.ys);
        self.pointer_ids.clone_from(&other.pointer_ids);
        self.times.clone_from(&other.times);
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[i32] {
        &self.xs
    }

    pub fn ys(&self) -> &[i32] {
        &self.ys
    }

    pub fn pointer_ids(&self) -> &[i32] {
        &self.pointer_ids
    }

    pub fn times(&self) -> &[i32] {
        &self.times
    }

    /// Clear without reallocating.
    pub fn reset(&mut self) {
        self.xs.clear();
        self.ys.clear();
        self.pointer_ids.clear();
        self.times.clear();
    }
}

/// Snapshot handed to the suggestion/dictionary collaborator. Opaque to
/// this crate; downstream ranking interprets it.
#[derive(Debug, Clone)]
pub struct ComposedData {
    pub input_pointers: InputPointers,
    pub is_batch_mode: bool,
    pub typed_word: String,
}

/// The currently composing word and the touch data that produced it.
#[derive(Debug)]
pub struct WordComposer {
    combiner_chain: CombinerChain,
    /// The events that served to compose the current word, in order.
    events: Vec<Event>,
    input_pointers: InputPointers,
    is_batch_mode: bool,
    typed_word_cache: String,
    /// Code points entered so far; not limited to `MAX_WORD_LENGTH`.
    code_point_count: usize,
    is_only_first_char_capitalized: bool,
}

impl WordComposer {
    pub fn new() -> Self {
        let mut composer = Self {
            combiner_chain: CombinerChain::new(""),
            events: Vec::new(),
            input_pointers: InputPointers::new(MAX_WORD_LENGTH),
            is_batch_mode: false,
            typed_word_cache: String::new(),
            code_point_count: 0,
            is_only_first_char_capitalized: false,
        };
        composer.refresh_typed_word_cache();
        composer
    }

    /// Return to the empty state. Reuses the pointer buffers; nothing is
    /// reallocated.
    pub fn reset(&mut self) {
        trace!("composer reset");
        self.combiner_chain.reset();
        self.events.clear();
        self.input_pointers.reset();
        self.is_only_first_char_capitalized = false;
        self.is_batch_mode = false;
        self.refresh_typed_word_cache();
    }

    fn refresh_typed_word_cache(&mut self) {
        self.typed_word_cache = self.combiner_chain.composing_word_with_feedback();
        self.code_point_count = self.typed_word_cache.chars().count();
    }

    /// Number of code points in the composing word.
    pub fn size(&self) -> usize {
        self.code_point_count
    }

    pub fn is_composing(&self) -> bool {
        self.code_point_count > 0
    }

    /// The current composing word, combining feedback included.
    pub fn typed_word(&self) -> &str {
        &self.typed_word_cache
    }

    pub fn is_batch_mode(&self) -> bool {
        self.is_batch_mode
    }

    /// True while exactly the first character is capitalized and nothing
    /// after it is.
    pub fn is_only_first_char_capitalized(&self) -> bool {
        self.is_only_first_char_capitalized
    }

    pub fn input_pointers(&self) -> &InputPointers {
        &self.input_pointers
    }

    /// Run an event through the combiner chain and append it to history.
    /// The returned event is never absent; a no-op comes back consumed.
    pub fn process_event(&mut self, event: Event) -> Event {
        let processed = self.combiner_chain.process_event(&self.events, event.clone());
        // The chain's retained state may have changed while processing, so
        // the cache has to be refreshed even before the event is applied.
        self.refresh_typed_word_cache();
        self.events.push(event);
        processed
    }

    /// Commit a processed event: update the chain's committed state, the
    /// cached word, the pointer buffer and the capitalization flag.
    pub fn apply_processed_event(&mut self, event: &Event) {
        self.combiner_chain.apply_processed_event(event);
        let primary_code = event.code_point;
        let key_x = event.x;
        let key_y = event.y;
        // The index this event's coordinate lands at is the size before the
        // cache refresh below picks up the committed text.
        let new_index = self.size();
        self.refresh_typed_word_cache();
        // We may have deleted the last one.
        if self.code_point_count == 0 {
            self.is_only_first_char_capitalized = false;
        }
        if !event.is_deletion() {
            if new_index < MAX_WORD_LENGTH {
                // In batch mode the pointer buffer holds the gesture trail
                // and must not be overridden by per-key coordinates.
                if !self.is_batch_mode {
                    self.input_pointers
                        .add_pointer_at(new_index, key_x, key_y, 0, 0);
                }
            }
            if new_index == 0 {
                self.is_only_first_char_capitalized = is_upper_case(primary_code);
            } else {
                self.is_only_first_char_capitalized =
                    self.is_only_first_char_capitalized && !is_upper_case(primary_code);
            }
        }
    }

    /// Seed the composer as if `code_points` had been typed key by key,
    /// pairing each with its coordinate (or the not-a-coordinate sentinel
    /// when none is supplied).
    pub fn set_composing_word(&mut self, code_points: &[i32], coordinates: &[(i32, i32)]) {
        self.reset();
        for (i, &code_point) in code_points.iter().enumerate() {
            let (x, y) = coordinates
                .get(i)
                .copied()
                .unwrap_or((codes::NOT_A_COORDINATE, codes::NOT_A_COORDINATE));
            let processed = self.process_event(Event::already_typed(code_point, x, y));
            self.apply_processed_event(&processed);
        }
    }

    /// Adopt a gesture trail as the pointer data and switch to batch mode.
    pub fn set_batch_input_pointers(&mut self, pointers: &InputPointers) {
        self.input_pointers.set(pointers);
        self.is_batch_mode = true;
    }

    /// Replace the composing word with a gesture-recognized one. Coordinates
    /// are not recorded per key; the trail arrives separately via
    /// [`Self::set_batch_input_pointers`].
    pub fn set_batch_input_word(&mut self, word: &str) {
        self.reset();
        self.is_batch_mode = true;
        for ch in word.chars() {
            let processed = self.process_event(Event::already_typed(
                ch as i32,
                codes::NOT_A_COORDINATE,
                codes::NOT_A_COORDINATE,
            ));
            self.apply_processed_event(&processed);
        }
    }

    /// The opaque bundle consumed by suggestion ranking.
    pub fn composed_data_snapshot(&self) -> ComposedData {
        ComposedData {
            input_pointers: self.input_pointers.clone(),
            is_batch_mode: self.is_batch_mode,
            typed_word: self.typed_word_cache.clone(),
        }
    }
}

impl Default for WordComposer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_upper_case(code_point: i32) -> bool {
    if code_point < 0 {
        return false;
    }
    char::from_u32(code_point as u32).is_some_and(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_word(composer: &mut WordComposer, word: &str) {
        for ch in word.chars() {
            let event = Event::key_press(ch as i32, ch as i32, 10, 20);
            let processed = composer.process_event(event);
            composer.apply_processed_event(&processed);
        }
    }

    #[test]
    fn test_new_composer_is_empty() {
        let composer = WordComposer::new();
        assert_eq!(composer.size(), 0);
        assert_eq!(composer.typed_word(), "");
        assert!(!composer.is_composing());
    }

    #[test]
    fn test_typing_builds_word_and_pointers() {
        let mut composer = WordComposer::new();
        type_word(&mut composer, "hi");
        assert_eq!(composer.typed_word(), "hi");
        assert_eq!(composer.size(), 2);
        assert_eq!(composer.input_pointers().len(), 2);
        assert_eq!(composer.input_pointers().xs(), &[10, 10]);
    }

    #[test]
    fn test_only_first_char_capitalized() {
        let mut composer = WordComposer::new();
        type_word(&mut composer, "Hi");
        assert!(composer.is_only_first_char_capitalized());
        type_word(&mut composer, "T");
        assert!(!composer.is_only_first_char_capitalized());
    }

    #[test]
    fn test_all_lowercase_is_not_capitalized() {
        let mut composer = WordComposer::new();
        type_word(&mut composer, "hi");
        assert!(!composer.is_only_first_char_capitalized());
    }

    #[test]
    fn test_deleting_sole_char_clears_capitalization() {
        let mut composer = WordComposer::new();
        type_word(&mut composer, "H");
        assert!(composer.is_only_first_char_capitalized());
        let deletion = composer.process_event(Event::deletion(0, 0));
        composer.apply_processed_event(&deletion);
        assert_eq!(composer.size(), 0);
        assert!(!composer.is_only_first_char_capitalized());
        assert_eq!(composer.typed_word(), "");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut composer = WordComposer::new();
        type_word(&mut composer, "Hello");
        composer.reset();
        assert_eq!(composer.size(), 0);
        assert_eq!(composer.typed_word(), "");
        assert!(composer.input_pointers().is_empty());
        assert!(!composer.is_batch_mode());
        assert!(!composer.is_only_first_char_capitalized());
    }

    #[test]
    fn test_set_composing_word_no_leakage_between_sessions() {
        let mut composer = WordComposer::new();
        composer.set_composing_word(&['h' as i32, 'i' as i32], &[(5, 5), (6, 6)]);
        composer.reset();
        composer.set_composing_word(&['o' as i32, 'k' as i32], &[(7, 7), (8, 8)]);
        assert_eq!(composer.size(), 2);
        assert_eq!(composer.typed_word(), "ok");
        assert_eq!(composer.input_pointers().len(), 2);
        assert_eq!(composer.input_pointers().xs(), &[7, 8]);
    }

    #[test]
    fn test_set_composing_word_missing_coordinates_use_sentinel() {
        let mut composer = WordComposer::new();
        composer.set_composing_word(&['o' as i32, 'k' as i32], &[(7, 7)]);
        assert_eq!(
            composer.input_pointers().xs(),
            &[7, codes::NOT_A_COORDINATE]
        );
    }

    #[test]
    fn test_batch_mode_suppresses_pointer_recording() {
        let mut composer = WordComposer::new();
        let mut trail = InputPointers::new(4);
        trail.add_pointer_at(0, 1, 2, 0, 0);
        trail.add_pointer_at(1, 3, 4, 0, 10);
        composer.set_batch_input_pointers(&trail);
        composer.set_batch_input_word("hi");
        // set_batch_input_word resets, so re-adopt the trail as the real
        // flow does after gesture recognition.
        composer.set_batch_input_pointers(&trail);
        assert!(composer.is_batch_mode());
        assert_eq!(composer.typed_word(), "hi");
        assert_eq!(composer.input_pointers(), &trail);
    }

    #[test]
    fn test_pointer_recording_stops_at_max_length() {
        let mut composer = WordComposer::new();
        let long_word: String = std::iter::repeat('a').take(MAX_WORD_LENGTH + 5).collect();
        type_word(&mut composer, &long_word);
        // Counting continues unbounded; recording stops at the bound.
        assert_eq!(composer.size(), MAX_WORD_LENGTH + 5);
        assert_eq!(composer.input_pointers().len(), MAX_WORD_LENGTH);
    }

    #[test]
    fn test_composed_data_snapshot() {
        let mut composer = WordComposer::new();
        type_word(&mut composer, "Hey");
        let snapshot = composer.composed_data_snapshot();
        assert_eq!(snapshot.typed_word, "Hey");
        assert!(!snapshot.is_batch_mode);
        assert_eq!(snapshot.input_pointers.len(), 3);
    }

    #[test]
    fn test_dead_key_word_flow() {
        let mut composer = WordComposer::new();
        let dead = composer.process_event(Event::dead_key(0x0301, 0, 0));
        composer.apply_processed_event(&dead);
        // Pending mark counts toward the word until it combines.
        assert_eq!(composer.size(), 1);
        let base = composer.process_event(Event::key_press('e' as i32, 'e' as i32, 0, 0));
        composer.apply_processed_event(&base);
        assert_eq!(composer.typed_word(), "\u{00E9}");
        assert_eq!(composer.size(), 1);
    }
}
