// core/tests/composer_sessions.rs
//
// Integration tests for the word composer driven through a real keyboard:
// coordinates come from the layout, events flow through the combiner chain.
//
// Tests cover:
// - Keystroke sessions with capitalization tracking
// - Seeding from already-typed text via coordinates_for()
// - Session isolation across reset()
// - Deletions, including deleting the sole character
// - Batch (gesture) mode pointer handling
// - Snapshots handed to the suggestion side

use softkey_core::codes;
use softkey_core::{
    ElementId, Event, Key, KeyLabelFlags, Keyboard, KeyboardId, KeyboardParams, WordComposer,
};

/// One row of letter keys, enough to resolve coordinates.
fn letter_row_keyboard(letters: &str) -> Keyboard {
    let mut params = KeyboardParams::new(KeyboardId::new("en", ElementId::Alphabet));
    let count = letters.chars().count() as i32;
    params.base_width = count * 40;
    params.base_height = 50;
    params.occupied_width = count * 40;
    params.occupied_height = 50;
    params.grid_width = count;
    params.grid_height = 1;
    for (i, ch) in letters.chars().enumerate() {
        let label = ch.to_string();
        params.add_key(Key::popup_key(
            Some(&label),
            ch as i32,
            KeyLabelFlags::empty(),
            i as i32 * 40,
            0,
            40,
            50,
            0,
            0,
        ));
    }
    Keyboard::new(params)
}

fn tap(composer: &mut WordComposer, keyboard: &Keyboard, ch: char) {
    let (x, y) = keyboard.coordinates_for(&[ch as i32])[0];
    let processed = composer.process_event(Event::key_press(ch as i32, ch as i32, x, y));
    composer.apply_processed_event(&processed);
}

#[test]
fn test_keystroke_session_records_key_centers() {
    let keyboard = letter_row_keyboard("hi");
    let mut composer = WordComposer::new();
    tap(&mut composer, &keyboard, 'h');
    tap(&mut composer, &keyboard, 'i');
    assert_eq!(composer.typed_word(), "hi");
    assert_eq!(composer.size(), 2);
    assert_eq!(composer.input_pointers().xs(), &[20, 60]);
    assert_eq!(composer.input_pointers().ys(), &[25, 25]);
}

#[test]
fn test_capitalization_classification() {
    let keyboard = letter_row_keyboard("hi");
    let mut composer = WordComposer::new();
    // "Hi": shifted first tap.
    let (x, y) = keyboard.coordinates_for(&['h' as i32])[0];
    let shifted = composer.process_event(Event::key_press('H' as i32, 'H' as i32, x, y));
    composer.apply_processed_event(&shifted);
    tap(&mut composer, &keyboard, 'i');
    assert_eq!(composer.typed_word(), "Hi");
    assert!(composer.is_only_first_char_capitalized());

    // One more uppercase key un-classifies the word.
    let more = composer.process_event(Event::key_press('I' as i32, 'I' as i32, x, y));
    composer.apply_processed_event(&more);
    assert!(!composer.is_only_first_char_capitalized());
}

#[test]
fn test_seeding_from_picked_suggestion() {
    let keyboard = letter_row_keyboard("ok");
    let mut composer = WordComposer::new();
    let code_points = ['o' as i32, 'k' as i32];
    let coordinates = keyboard.coordinates_for(&code_points);
    composer.set_composing_word(&code_points, &coordinates);
    assert_eq!(composer.typed_word(), "ok");
    assert_eq!(composer.size(), 2);
    // Pointer data mirrors what typing the word would have produced.
    assert_eq!(composer.input_pointers().xs(), &[20, 60]);
}

#[test]
fn test_sessions_do_not_leak() {
    let keyboard = letter_row_keyboard("hiok");
    let mut composer = WordComposer::new();
    let first = ['h' as i32, 'i' as i32];
    composer.set_composing_word(&first, &keyboard.coordinates_for(&first));
    composer.reset();
    let second = ['o' as i32, 'k' as i32];
    composer.set_composing_word(&second, &keyboard.coordinates_for(&second));
    assert_eq!(composer.size(), 2);
    assert_eq!(composer.typed_word(), "ok");
    assert_eq!(composer.input_pointers().len(), 2);
}

#[test]
fn test_unknown_code_points_seed_with_sentinels() {
    let keyboard = letter_row_keyboard("ok");
    let mut composer = WordComposer::new();
    let code_points = ['o' as i32, '!' as i32];
    let coordinates = keyboard.coordinates_for(&code_points);
    composer.set_composing_word(&code_points, &coordinates);
    assert_eq!(composer.typed_word(), "o!");
    assert_eq!(
        composer.input_pointers().xs(),
        &[20, codes::NOT_A_COORDINATE]
    );
}

#[test]
fn test_deleting_back_to_empty() {
    let keyboard = letter_row_keyboard("hi");
    let mut composer = WordComposer::new();
    let (x, y) = keyboard.coordinates_for(&['h' as i32])[0];
    let shifted = composer.process_event(Event::key_press('H' as i32, 'H' as i32, x, y));
    composer.apply_processed_event(&shifted);
    assert!(composer.is_only_first_char_capitalized());

    let deletion = composer.process_event(Event::deletion(x, y));
    composer.apply_processed_event(&deletion);
    assert_eq!(composer.size(), 0);
    assert_eq!(composer.typed_word(), "");
    assert!(!composer.is_only_first_char_capitalized());
    assert!(!composer.is_composing());
}

#[test]
fn test_batch_session_keeps_gesture_trail() {
    let mut composer = WordComposer::new();
    composer.set_batch_input_word("hi");
    assert!(composer.is_batch_mode());
    assert_eq!(composer.typed_word(), "hi");
    // No per-key pointers in batch mode.
    assert!(composer.input_pointers().is_empty());

    // The trail arrives separately, sampled along the gesture.
    let mut trail = softkey_core::InputPointers::new(8);
    for (i, (x, y)) in [(5, 25), (20, 25), (40, 26), (60, 25)].iter().enumerate() {
        trail.add_pointer_at(i, *x, *y, 0, i as i32 * 16);
    }
    composer.set_batch_input_pointers(&trail);
    let snapshot = composer.composed_data_snapshot();
    assert!(snapshot.is_batch_mode);
    assert_eq!(snapshot.input_pointers.len(), 4);
    assert_eq!(snapshot.typed_word, "hi");
}

#[test]
fn test_snapshot_is_independent_of_later_typing() {
    let keyboard = letter_row_keyboard("hi");
    let mut composer = WordComposer::new();
    tap(&mut composer, &keyboard, 'h');
    let snapshot = composer.composed_data_snapshot();
    tap(&mut composer, &keyboard, 'i');
    assert_eq!(snapshot.typed_word, "h");
    assert_eq!(snapshot.input_pointers.len(), 1);
    assert_eq!(composer.typed_word(), "hi");
}
