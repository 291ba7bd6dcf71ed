//! A single placed key: geometry, hit box, identity.
//!
//! Keys come in two kinds: `Standard` keys that emit a code or text, and
//! `Spacer`s that only reserve room in a row. Callers iterating a key list
//! pattern-match on [`KeyKind`] (or check [`Key::is_spacer`]) before treating
//! an entry as actionable.
//!
//! Identity deliberately covers only `(x, y, width, height, code, label,
//! label_flags)`. Gaps, output text and the hit box are decorative or
//! derived, and two keys differing only in those compare equal.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use bitflags::bitflags;

use crate::casing;
use crate::codes;
use crate::keyspec::{self, KeySpecError};
use crate::params::{ElementId, KeyboardParams, KeyboardRow};

const MIN_SUPPLEMENTARY_CODE_POINT: i32 = 0x10000;

bitflags! {
    /// Flags controlling how a key's label is derived and rendered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyLabelFlags: u32 {
        /// Never upcase this label, even on shifted keyboards.
        const PRESERVE_CASE = 0x10000;
        /// The label comes from the editor's custom action label instead of
        /// the key spec.
        const FROM_CUSTOM_ACTION_LABEL = 0x40000;
    }
}

/// Half-open pixel rectangle: `left..right` x `top..bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// What a key does when hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyKind {
    Standard {
        /// The code this key generates; a negative action code, a Unicode
        /// code point, or `CODE_OUTPUT_TEXT` when `output_text` applies.
        code: i32,
        label: Option<String>,
        label_flags: KeyLabelFlags,
        /// Emitted instead of a single code point when the key produces a
        /// string (multi-code-point labels, upcased sharp-S and friends).
        output_text: Option<String>,
    },
    /// Reserves room in a row; never actionable.
    Spacer,
}

/// A key placed on a keyboard.
#[derive(Debug, Clone)]
pub struct Key {
    kind: KeyKind,
    /// Top-left corner, gap-adjusted (the gap is split evenly to both sides).
    x: i32,
    y: i32,
    /// Size excluding the gap.
    width: i32,
    height: i32,
    horizontal_gap: i32,
    vertical_gap: i32,
    /// Touch target including the gap; may be stretched to the keyboard
    /// boundary by the edge-marking operations.
    hit_box: Rect,
    hash: u64,
}

fn needs_to_upcase(label_flags: KeyLabelFlags, element: ElementId) -> bool {
    !label_flags.contains(KeyLabelFlags::PRESERVE_CASE) && element.is_shifted_alphabet()
}

fn code_point_count(text: &str) -> usize {
    text.chars().count()
}

fn first_code_point(text: &str) -> i32 {
    text.chars().next().map(|ch| ch as i32).unwrap_or(codes::CODE_UNSPECIFIED)
}

impl Key {
    /// Explicit-pixel construction, used for generated popup keys and
    /// suggestion strips. `width`/`height` are gap-inclusive.
    pub fn popup_key(
        label: Option<&str>,
        code: i32,
        label_flags: KeyLabelFlags,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        horizontal_gap: i32,
        vertical_gap: i32,
    ) -> Self {
        let kind = KeyKind::Standard {
            code,
            label: label.map(str::to_string),
            label_flags,
            output_text: None,
        };
        Self::with_geometry(kind, x, y, width, height, horizontal_gap, vertical_gap)
    }

    /// Grid-row construction: explicit pixels, gaps from shared parameters.
    pub fn grid_key(
        label: Option<&str>,
        code: i32,
        label_flags: KeyLabelFlags,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        params: &KeyboardParams,
    ) -> Self {
        let kind = KeyKind::Standard {
            code,
            label: label.map(str::to_string),
            label_flags,
            output_text: None,
        };
        Self::with_geometry(
            kind,
            x,
            y,
            width,
            height,
            params.horizontal_gap,
            params.vertical_gap,
        )
    }

    /// A divider spacer with explicit geometry.
    pub fn spacer(params: &KeyboardParams, x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::with_geometry(
            KeyKind::Spacer,
            x,
            y,
            width,
            height,
            params.horizontal_gap,
            params.vertical_gap,
        )
    }

    fn with_geometry(
        kind: KeyKind,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        horizontal_gap: i32,
        vertical_gap: i32,
    ) -> Self {
        let mut key = Self {
            kind,
            // The horizontal gap is split evenly to both sides of the key.
            x: x + horizontal_gap / 2,
            y,
            width: width - horizontal_gap,
            height: height - vertical_gap,
            horizontal_gap,
            vertical_gap,
            // One extra pixel on the right keeps the shared edge between two
            // adjacent keys targetable.
            hit_box: Rect::new(x, y, x + width + 1, y + height),
            hash: 0,
        };
        key.hash = key.compute_hash();
        key
    }

    /// Spec-driven construction: resolve label/code/output from a key spec
    /// string in the context of a row, and advance the row's x cursor by the
    /// consumed width. `None` builds a spacer occupying the default width.
    pub fn from_spec(
        key_spec: Option<&str>,
        params: &KeyboardParams,
        row: &mut KeyboardRow,
    ) -> Result<Self, KeySpecError> {
        let is_spacer = key_spec.is_none();
        let horizontal_gap = if is_spacer { 0 } else { params.horizontal_gap };
        let vertical_gap = params.vertical_gap;
        let row_height = row.row_height();

        let key_x_pos = row.key_x();
        let key_width = row.key_width();
        let key_y_pos = row.y();

        let x = (key_x_pos + horizontal_gap as f32 / 2.0).round() as i32;
        let y = key_y_pos;
        let width = (key_width - horizontal_gap as f32).round() as i32;
        let height = row_height - vertical_gap;
        let hit_box = Rect::new(
            key_x_pos.round() as i32,
            key_y_pos,
            (key_x_pos + key_width).round() as i32 + 1,
            key_y_pos + row_height,
        );
        // Hand the consumed width back to the row for the next key.
        row.set_x_pos(key_x_pos + key_width);

        let kind = match key_spec {
            None => KeyKind::Spacer,
            Some(spec) => {
                let label_flags = row.default_label_flags();
                let needs_upcase = needs_to_upcase(label_flags, params.id.element);
                let locale = params.id.locale.as_str();

                let code_in_spec = keyspec::get_code(spec)?;
                let label = if label_flags.contains(KeyLabelFlags::FROM_CUSTOM_ACTION_LABEL) {
                    params.id.custom_action_label.clone()
                } else if code_in_spec >= MIN_SUPPLEMENTARY_CODE_POINT {
                    // A supplementary code point cannot be spelled in a spec
                    // label, so the label is derived from the code itself.
                    char::from_u32(code_in_spec as u32).map(|ch| ch.to_string())
                } else {
                    let raw = keyspec::get_label(spec)?;
                    Some(if needs_upcase {
                        casing::to_title_case_of_key_label(&raw, locale)
                    } else {
                        raw
                    })
                };

                let output_text = keyspec::get_output_text(spec)?.map(|text| {
                    if needs_upcase {
                        casing::to_title_case_of_key_label(&text, locale)
                    } else {
                        text
                    }
                });

                // Choose the label's only code point as the code if the spec
                // did not pin one down.
                let code = if code_in_spec == codes::CODE_UNSPECIFIED
                    && output_text.is_none()
                    && label.as_deref().is_some_and(|l| !l.is_empty())
                {
                    let label = label.as_deref().unwrap();
                    if code_point_count(label) == 1 {
                        first_code_point(label)
                    } else {
                        codes::CODE_OUTPUT_TEXT
                    }
                } else if code_in_spec == codes::CODE_UNSPECIFIED && output_text.is_some() {
                    let text = output_text.as_deref().unwrap();
                    if code_point_count(text) == 1 {
                        first_code_point(text)
                    } else {
                        codes::CODE_OUTPUT_TEXT
                    }
                } else if needs_upcase {
                    casing::to_title_case_of_key_code(code_in_spec, locale)
                } else {
                    code_in_spec
                };

                KeyKind::Standard {
                    code,
                    label,
                    label_flags,
                    output_text,
                }
            }
        };

        let mut key = Self {
            kind,
            x,
            y,
            width,
            height,
            horizontal_gap,
            vertical_gap,
            hit_box,
            hash: 0,
        };
        key.hash = key.compute_hash();
        Ok(key)
    }

    pub fn kind(&self) -> &KeyKind {
        &self.kind
    }

    pub fn is_spacer(&self) -> bool {
        matches!(self.kind, KeyKind::Spacer)
    }

    /// The code this key generates; `CODE_UNSPECIFIED` for spacers.
    pub fn code(&self) -> i32 {
        match &self.kind {
            KeyKind::Standard { code, .. } => *code,
            KeyKind::Spacer => codes::CODE_UNSPECIFIED,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            KeyKind::Standard { label, .. } => label.as_deref(),
            KeyKind::Spacer => None,
        }
    }

    pub fn output_text(&self) -> Option<&str> {
        match &self.kind {
            KeyKind::Standard { output_text, .. } => output_text.as_deref(),
            KeyKind::Spacer => None,
        }
    }

    pub fn label_flags(&self) -> KeyLabelFlags {
        match &self.kind {
            KeyKind::Standard { label_flags, .. } => *label_flags,
            KeyKind::Spacer => KeyLabelFlags::empty(),
        }
    }

    /// X of the top-left corner in pixels, excluding the gap.
    pub fn x(&self) -> i32 {
        self.x
    }

    /// Y of the top-left corner in pixels, excluding the gap.
    pub fn y(&self) -> i32 {
        self.y
    }

    /// Width in pixels, excluding the gap.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in pixels, excluding the gap.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Combined left+right gap owned by this key; `width()` plus this is
    /// the total width the key occupies in its row.
    pub fn horizontal_gap(&self) -> i32 {
        self.horizontal_gap
    }

    /// Combined top+bottom gap owned by this key.
    pub fn vertical_gap(&self) -> i32 {
        self.vertical_gap
    }

    pub fn hit_box(&self) -> &Rect {
        &self.hit_box
    }

    /// Stretch the hit box to the keyboard's left boundary so there is no
    /// dead zone between the key and the screen edge. Idempotent.
    pub fn mark_as_left_edge(&mut self, params: &KeyboardParams) {
        self.hit_box.left = params.left_padding;
    }

    /// Stretch the hit box to the keyboard's right boundary. Idempotent.
    pub fn mark_as_right_edge(&mut self, params: &KeyboardParams) {
        self.hit_box.right = params.occupied_width - params.right_padding;
    }

    /// Stretch the hit box to the keyboard's top boundary. Idempotent.
    pub fn mark_as_top_edge(&mut self, params: &KeyboardParams) {
        self.hit_box.top = params.top_padding;
    }

    /// Squared distance from the point to the nearest edge of the key's
    /// visual rectangle; 0 when the point is inside. Squared to avoid the
    /// square root on the touch-correction hot path.
    pub fn squared_distance_to_edge(&self, x: i32, y: i32) -> i32 {
        let left = self.x;
        let right = left + self.width;
        let top = self.y;
        let bottom = top + self.height;
        let edge_x = x.clamp(left, right);
        let edge_y = y.clamp(top, bottom);
        let dx = x - edge_x;
        let dy = y - edge_y;
        dx * dx + dy * dy
    }

    /// Ordering for dedup buckets, derived from the structural hash. Equal
    /// keys order as `Equal`; unequal keys order by hash value, so two
    /// distinct keys that collide on hash also report `Equal`. This is a
    /// strict weak ordering, not a total order on content.
    pub fn rank_order(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        self.hash.cmp(&other.hash)
    }

    fn compute_hash(&self) -> u64 {
        fn mix(hash: u64, value: i64) -> u64 {
            hash.wrapping_mul(31).wrapping_add(value as u64)
        }
        let mut hash = 1u64;
        hash = mix(hash, self.x as i64);
        hash = mix(hash, self.y as i64);
        hash = mix(hash, self.width as i64);
        hash = mix(hash, self.height as i64);
        hash = mix(hash, self.code() as i64);
        hash = match self.label() {
            None => mix(hash, 0),
            Some(label) => label
                .chars()
                .fold(mix(hash, 7), |acc, ch| mix(acc, ch as i64)),
        };
        mix(hash, self.label_flags().bits() as i64)
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.is_spacer() == other.is_spacer()
            && self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
            && self.code() == other.code()
            && self.label() == other.label()
            && self.label_flags() == other.label_flags()
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}
