//! An immutable keyboard variant: the sorted key list, code lookup, and the
//! shared proximity index.
//!
//! A `Keyboard` never changes after construction. The one mutable field is
//! the code→key memo table, a pure memoization guarded by a single lock so
//! touch handling and background measurement can look keys up concurrently.
//! Cloning produces a derived view (e.g. the shifted variant of the same
//! layout): the key list and proximity index are shared by reference, only
//! the memo starts out empty.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use tracing::debug;

use crate::codes;
use crate::key::Key;
use crate::params::{KeyboardId, KeyboardParams};
use crate::proximity::ProximityInfo;

#[derive(Debug)]
pub struct Keyboard {
    pub id: KeyboardId,

    /// Total size including the paddings.
    pub occupied_width: i32,
    pub occupied_height: i32,
    /// Base size used to resolve proportional dimensions.
    pub base_width: i32,
    pub base_height: i32,

    pub top_padding: i32,
    pub vertical_gap: i32,

    pub most_common_key_width: i32,
    pub most_common_key_height: i32,

    pub proximity_chars_correction_enabled: bool,

    sorted_keys: Arc<Vec<Key>>,
    shift_key_indices: Arc<Vec<usize>>,
    alt_code_key_indices: Arc<Vec<usize>>,
    proximity: Arc<ProximityInfo>,

    /// Memoized code→key lookups, including misses. Guarded by a single
    /// lock; this is the only mutable state in the type.
    key_cache: Mutex<AHashMap<i32, Option<usize>>>,
}

impl Keyboard {
    pub fn new(params: KeyboardParams) -> Self {
        let proximity = ProximityInfo::new(
            params.grid_width,
            params.grid_height,
            params.occupied_width,
            params.occupied_height,
            params.most_common_key_width,
            params.most_common_key_height,
            &params.sorted_keys,
            &params.touch_position_correction,
        );
        debug!(
            locale = %params.id.locale,
            element = ?params.id.element,
            keys = params.sorted_keys.len(),
            "built keyboard"
        );
        Self {
            id: params.id,
            occupied_width: params.occupied_width,
            occupied_height: params.occupied_height,
            base_width: params.base_width,
            base_height: params.base_height,
            top_padding: params.top_padding,
            vertical_gap: params.vertical_gap,
            most_common_key_width: params.most_common_key_width,
            most_common_key_height: params.most_common_key_height,
            proximity_chars_correction_enabled: params.proximity_chars_correction_enabled,
            sorted_keys: Arc::new(params.sorted_keys),
            shift_key_indices: Arc::new(params.shift_key_indices),
            alt_code_key_indices: Arc::new(params.alt_code_key_indices),
            proximity: Arc::new(proximity),
            key_cache: Mutex::new(AHashMap::new()),
        }
    }

    /// Keys in top-left to bottom-right order; may contain spacers.
    pub fn sorted_keys(&self) -> &[Key] {
        &self.sorted_keys
    }

    /// The key generating `code`, if any. The first lookup for a code scans
    /// the key list; the result - hit or miss - is memoized, so repeated
    /// calls return the same key without rescanning. `CODE_UNSPECIFIED`
    /// always yields `None` without searching or caching.
    pub fn key_at(&self, code: i32) -> Option<&Key> {
        if code == codes::CODE_UNSPECIFIED {
            return None;
        }
        let slot = {
            let mut cache = self.key_cache.lock().expect("key cache poisoned");
            match cache.get(&code) {
                Some(&slot) => slot,
                None => {
                    let found = self
                        .sorted_keys
                        .iter()
                        .position(|key| !key.is_spacer() && key.code() == code);
                    cache.insert(code, found);
                    found
                }
            }
        };
        slot.map(|index| &self.sorted_keys[index])
    }

    /// Key-center coordinates for a sequence of code points, used to
    /// synthesize plausible touch positions when text is set
    /// programmatically. Code points with no matching key yield the
    /// `(NOT_A_COORDINATE, NOT_A_COORDINATE)` sentinel pair.
    pub fn coordinates_for(&self, code_points: &[i32]) -> Vec<(i32, i32)> {
        code_points
            .iter()
            .map(|&code_point| match self.key_at(code_point) {
                Some(key) => (
                    key.x() + key.width() / 2,
                    key.y() + key.height() / 2,
                ),
                None => (codes::NOT_A_COORDINATE, codes::NOT_A_COORDINATE),
            })
            .collect()
    }

    pub fn proximity(&self) -> &ProximityInfo {
        &self.proximity
    }

    /// Keys plausibly intended by a touch at `(x, y)`, nearest first.
    pub fn nearest_keys(&self, x: i32, y: i32) -> impl Iterator<Item = &Key> {
        self.proximity
            .nearest_keys(x, y)
            .iter()
            .map(move |&index| &self.sorted_keys[index])
    }

    pub fn shift_keys(&self) -> impl Iterator<Item = &Key> {
        self.shift_key_indices
            .iter()
            .map(move |&index| &self.sorted_keys[index])
    }

    pub fn alt_code_keys_while_typing(&self) -> impl Iterator<Item = &Key> {
        self.alt_code_key_indices
            .iter()
            .map(move |&index| &self.sorted_keys[index])
    }
}

impl Clone for Keyboard {
    /// A derived view sharing the key list and proximity index by
    /// reference. The memo table starts out empty; it refills on demand.
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            occupied_width: self.occupied_width,
            occupied_height: self.occupied_height,
            base_width: self.base_width,
            base_height: self.base_height,
            top_padding: self.top_padding,
            vertical_gap: self.vertical_gap,
            most_common_key_width: self.most_common_key_width,
            most_common_key_height: self.most_common_key_height,
            proximity_chars_correction_enabled: self.proximity_chars_correction_enabled,
            sorted_keys: Arc::clone(&self.sorted_keys),
            shift_key_indices: Arc::clone(&self.shift_key_indices),
            alt_code_key_indices: Arc::clone(&self.alt_code_key_indices),
            proximity: Arc::clone(&self.proximity),
            key_cache: Mutex::new(AHashMap::new()),
        }
    }
}
