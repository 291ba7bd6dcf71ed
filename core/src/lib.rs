//! softkey-core
//!
//! Geometry, layout indexing, key-spec parsing and word composition core for
//! software keyboards. The crate owns everything between "a resolved set of
//! layout build parameters" and "a composed word handed to a suggestion
//! engine": key rectangles and hit boxes, the spatial proximity grid used for
//! typo-tolerant touch resolution, and the event-sourced composer that turns
//! taps, gesture points and deletions into the current word.
//!
//! Rendering, XML/asset loading, dictionaries and settings persistence are
//! collaborators, not part of this crate.
//!
//! Public API:
//! - `Key` / `KeyKind` - a placed key (or spacer) with hit-box and ordering
//! - `Keyboard` - immutable key collection with code lookup and coordinates
//! - `KeyboardParams` / `KeyboardRow` - resolved build parameters and row cursor
//! - `ProximityInfo` - grid-based nearest-key index for touch correction
//! - `MoreKeySpec` / `keyspec` - the escaped key-spec mini-language
//! - `WordComposer` / `Event` / `CombinerChain` - the input event pipeline

pub mod casing;

pub mod keyspec;
pub use keyspec::{KeySpecError, MoreKeySpec};

pub mod key;
pub use key::{Key, KeyKind, KeyLabelFlags, Rect};

pub mod params;
pub use params::{
    CorrectionRow, ElementId, KeyboardId, KeyboardParams, KeyboardRow, TouchPositionCorrection,
};

pub mod proximity;
pub use proximity::ProximityInfo;

pub mod keyboard;
pub use keyboard::Keyboard;

pub mod event;
pub use event::{Event, EventFlags, EventKind};

pub mod combiner;
pub use combiner::{Combiner, CombinerChain, DeadKeyCombiner};

pub mod composer;
pub use composer::{ComposedData, InputPointers, WordComposer, MAX_WORD_LENGTH};

/// Key codes shared across the crate.
///
/// Non-negative values are Unicode code points emitted by the key; negative
/// values are semantic actions. `OUTPUT_TEXT` marks a key that emits a string
/// rather than a single code point, `UNSPECIFIED` marks the absence of a code
/// (spacers, unresolved specs).
pub mod codes {
    pub const CODE_ENTER: i32 = '\n' as i32;
    pub const CODE_TAB: i32 = '\t' as i32;
    pub const CODE_SPACE: i32 = ' ' as i32;
    pub const CODE_COMMA: i32 = ',' as i32;

    pub const CODE_SHIFT: i32 = -1;
    pub const CODE_SWITCH_ALPHA_SYMBOL: i32 = -3;
    pub const CODE_OUTPUT_TEXT: i32 = -4;
    pub const CODE_DELETE: i32 = -5;
    pub const CODE_SETTINGS: i32 = -6;
    pub const CODE_LANGUAGE_SWITCH: i32 = -10;
    pub const CODE_SHIFT_ENTER: i32 = -12;
    pub const CODE_UNSPECIFIED: i32 = -15;

    /// Sentinel for events and coordinate lookups that carry no position.
    pub const NOT_A_COORDINATE: i32 = -1;
    /// Sentinel for events that carry no code point (e.g. deletions).
    pub const NOT_A_CODE_POINT: i32 = -1;

    /// Letter codes are the printable range; action codes are all negative.
    pub fn is_letter_code(code: i32) -> bool {
        code >= CODE_SPACE
    }
}
