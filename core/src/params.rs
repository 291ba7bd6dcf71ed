//! Resolved keyboard build parameters.
//!
//! A layout-parsing collaborator (XML, JSON, whatever the platform uses)
//! resolves row heights, gaps and key placement into a `KeyboardParams`
//! value; this crate never reads layout assets itself. `KeyboardParams` is
//! the sole input to [`crate::Keyboard::new`].

use std::path::Path;

use ahash::AHashMap;
use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::codes;
use crate::key::{Key, KeyLabelFlags};

/// Which keyboard variant a layout describes. Upcasing of key labels applies
/// only in the shifted alphabet variants, never in symbol or number modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementId {
    Alphabet,
    AlphabetManualShifted,
    AlphabetAutomaticShifted,
    AlphabetShiftLocked,
    AlphabetShiftLockShifted,
    Symbols,
    SymbolsShifted,
    Phone,
    PhoneSymbols,
    Number,
}

impl ElementId {
    pub fn is_shifted_alphabet(self) -> bool {
        matches!(
            self,
            Self::AlphabetManualShifted
                | Self::AlphabetAutomaticShifted
                | Self::AlphabetShiftLocked
                | Self::AlphabetShiftLockShifted
        )
    }
}

/// Identity of one keyboard variant: locale plus element (mode/shift state).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyboardId {
    /// BCP-47 language tag, e.g. "en", "tr", "de_DE".
    pub locale: String,
    pub element: ElementId,
    /// Label supplied by the editor for the action key, consumed by keys
    /// carrying `KeyLabelFlags::FROM_CUSTOM_ACTION_LABEL`.
    pub custom_action_label: Option<String>,
}

impl KeyboardId {
    pub fn new(locale: impl Into<String>, element: ElementId) -> Self {
        Self {
            locale: locale.into(),
            element,
            custom_action_label: None,
        }
    }
}

/// One row of the device-specific touch position correction profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRow {
    /// Sweet-spot center offset, as a fraction of the key width.
    pub center_x: f32,
    /// Sweet-spot center offset, as a fraction of the key height.
    pub center_y: f32,
    /// Search radius scale, as a fraction of the keyboard's key diagonal.
    pub radius: f32,
}

/// Device-specific touch position correction data, one entry per keyboard
/// row. Ships as a TOML profile per hardware target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchPositionCorrection {
    pub enabled: bool,
    pub rows: Vec<CorrectionRow>,
}

impl TouchPositionCorrection {
    pub fn is_valid(&self) -> bool {
        self.enabled && !self.rows.is_empty()
    }

    /// Load a correction profile from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load a correction profile from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize the profile to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Fully-resolved build parameters for one keyboard variant.
///
/// Fields are public by design: the layout builder populates them directly
/// and hands the whole value to [`crate::Keyboard::new`], which consumes it.
/// `add_key` keeps the derived state (size histograms, shift-key subset)
/// consistent while keys are appended in top-left to bottom-right order.
#[derive(Debug, Clone)]
pub struct KeyboardParams {
    pub id: KeyboardId,

    /// Total size including paddings.
    pub occupied_width: i32,
    pub occupied_height: i32,
    /// Base size used to resolve proportional key widths and row heights.
    pub base_width: i32,
    pub base_height: i32,

    pub top_padding: i32,
    pub bottom_padding: i32,
    pub left_padding: i32,
    pub right_padding: i32,

    pub default_row_height: i32,
    pub horizontal_gap: i32,
    pub vertical_gap: i32,

    /// Proximity grid dimensions, in cells.
    pub grid_width: i32,
    pub grid_height: i32,

    pub most_common_key_width: i32,
    pub most_common_key_height: i32,

    pub touch_position_correction: TouchPositionCorrection,
    pub proximity_chars_correction_enabled: bool,

    /// Keys in top-left to bottom-right order; may interleave spacers.
    pub sorted_keys: Vec<Key>,
    /// Indices into `sorted_keys` of keys with `CODE_SHIFT`.
    pub shift_key_indices: Vec<usize>,
    /// Indices into `sorted_keys` of keys whose code changes while the user
    /// is typing (e.g. a symbol key that emits a period mid-word).
    pub alt_code_key_indices: Vec<usize>,

    width_histogram: AHashMap<i32, u32>,
    height_histogram: AHashMap<i32, u32>,
    max_width_count: u32,
    max_height_count: u32,
}

impl KeyboardParams {
    /// Default proximity grid size; cells stay close to key-sized on
    /// phone-shaped layouts.
    pub const GRID_WIDTH: i32 = 32;
    pub const GRID_HEIGHT: i32 = 16;

    pub fn new(id: KeyboardId) -> Self {
        Self {
            id,
            occupied_width: 0,
            occupied_height: 0,
            base_width: 0,
            base_height: 0,
            top_padding: 0,
            bottom_padding: 0,
            left_padding: 0,
            right_padding: 0,
            default_row_height: 0,
            horizontal_gap: 0,
            vertical_gap: 0,
            grid_width: Self::GRID_WIDTH,
            grid_height: Self::GRID_HEIGHT,
            most_common_key_width: 0,
            most_common_key_height: 0,
            touch_position_correction: TouchPositionCorrection::default(),
            proximity_chars_correction_enabled: false,
            sorted_keys: Vec::new(),
            shift_key_indices: Vec::new(),
            alt_code_key_indices: Vec::new(),
            width_histogram: AHashMap::new(),
            height_histogram: AHashMap::new(),
            max_width_count: 0,
            max_height_count: 0,
        }
    }

    /// Append a key, updating the most-common-size histograms and the
    /// shift-key subset. Spacers reserve room but carry no statistics.
    pub fn add_key(&mut self, key: Key) {
        if !key.is_spacer() {
            self.update_histogram(&key);
            if key.code() == codes::CODE_SHIFT {
                self.shift_key_indices.push(self.sorted_keys.len());
            }
        }
        self.sorted_keys.push(key);
    }

    /// Register the most recently added key as an alt-code-while-typing key.
    pub fn mark_last_key_alt_code(&mut self) {
        if !self.sorted_keys.is_empty() {
            self.alt_code_key_indices.push(self.sorted_keys.len() - 1);
        }
    }

    fn update_histogram(&mut self, key: &Key) {
        let height = key.height() + self.vertical_gap;
        let count = self.height_histogram.entry(height).or_insert(0);
        *count += 1;
        if *count > self.max_height_count {
            self.max_height_count = *count;
            self.most_common_key_height = height;
        }

        let width = key.width() + self.horizontal_gap;
        let count = self.width_histogram.entry(width).or_insert(0);
        *count += 1;
        if *count > self.max_width_count {
            self.max_width_count = *count;
            self.most_common_key_width = width;
        }
    }
}

/// Row context used while building keys from specs.
///
/// Tracks the x cursor that advances as keys are placed, the row's vertical
/// placement, and the defaults keys inherit unless their spec overrides them.
#[derive(Debug, Clone)]
pub struct KeyboardRow {
    y: i32,
    row_height: i32,
    default_key_width: f32,
    default_label_flags: KeyLabelFlags,
    x_pos: f32,
}

impl KeyboardRow {
    pub fn new(params: &KeyboardParams, y: i32, row_height: i32) -> Self {
        Self {
            y,
            row_height,
            default_key_width: params.base_width as f32 / 10.0,
            default_label_flags: KeyLabelFlags::empty(),
            x_pos: params.left_padding as f32,
        }
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn row_height(&self) -> i32 {
        self.row_height
    }

    /// X position the next key will occupy.
    pub fn key_x(&self) -> f32 {
        self.x_pos
    }

    /// Width the next key will consume, including its share of the gap.
    pub fn key_width(&self) -> f32 {
        self.default_key_width
    }

    pub fn default_label_flags(&self) -> KeyLabelFlags {
        self.default_label_flags
    }

    pub fn set_default_key_width(&mut self, width: f32) {
        self.default_key_width = width;
    }

    pub fn set_default_label_flags(&mut self, flags: KeyLabelFlags) {
        self.default_label_flags = flags;
    }

    pub fn set_x_pos(&mut self, x: f32) {
        self.x_pos = x;
    }
}
