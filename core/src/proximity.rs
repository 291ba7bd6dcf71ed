//! Grid-based spatial index over a keyboard's keys.
//!
//! The occupied area is divided into a coarse grid; each cell holds the keys
//! plausibly intended by a touch landing in that cell, ranked by distance.
//! Touch resolution and typo correction query this instead of scanning the
//! key list.

use tracing::debug;

use crate::key::Key;
use crate::params::TouchPositionCorrection;

/// Search radius, as a multiple of the most common key width.
const SEARCH_DISTANCE: f32 = 1.2;
/// Cap on nearby keys recorded per cell.
const MAX_NEARBY_KEYS: usize = 16;

/// Immutable nearest-key index, built once per keyboard and shared by all
/// derived keyboard views.
#[derive(Debug)]
pub struct ProximityInfo {
    grid_width: i32,
    grid_height: i32,
    cell_width: i32,
    cell_height: i32,
    occupied_width: i32,
    occupied_height: i32,
    /// Per grid cell, indices into the keyboard's sorted key list, nearest
    /// first. Spacers are never recorded.
    grid_neighbors: Vec<Vec<usize>>,
}

impl ProximityInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        grid_width: i32,
        grid_height: i32,
        occupied_width: i32,
        occupied_height: i32,
        most_common_key_width: i32,
        most_common_key_height: i32,
        keys: &[Key],
        correction: &TouchPositionCorrection,
    ) -> Self {
        let grid_width = grid_width.max(1);
        let grid_height = grid_height.max(1);
        // Round up so the grid always covers the full occupied area.
        let cell_width = ((occupied_width + grid_width - 1) / grid_width).max(1);
        let cell_height = ((occupied_height + grid_height - 1) / grid_height).max(1);

        let default_radius = most_common_key_width as f32 * SEARCH_DISTANCE;
        let key_diagonal = (((most_common_key_width * most_common_key_width)
            + (most_common_key_height * most_common_key_height)) as f32)
            .sqrt();

        let radius_for_key = |key: &Key| -> f32 {
            if correction.is_valid() {
                // The profile is indexed by keyboard row; derive the row from
                // the key's vertical position.
                let row = if most_common_key_height > 0 {
                    (key.y() / most_common_key_height).clamp(0, correction.rows.len() as i32 - 1)
                } else {
                    0
                } as usize;
                correction.rows[row].radius * key_diagonal
            } else {
                default_radius
            }
        };

        let cells = (grid_width * grid_height) as usize;
        let mut grid_neighbors = vec![Vec::new(); cells];
        for (cell, neighbors) in grid_neighbors.iter_mut().enumerate() {
            let center_x = (cell as i32 % grid_width) * cell_width + cell_width / 2;
            let center_y = (cell as i32 / grid_width) * cell_height + cell_height / 2;
            let mut near: Vec<(i32, usize)> = keys
                .iter()
                .enumerate()
                .filter(|(_, key)| !key.is_spacer())
                .filter_map(|(index, key)| {
                    let radius = radius_for_key(key);
                    let distance = key.squared_distance_to_edge(center_x, center_y);
                    ((distance as f32) < radius * radius).then_some((distance, index))
                })
                .collect();
            near.sort_unstable();
            near.truncate(MAX_NEARBY_KEYS);
            neighbors.extend(near.into_iter().map(|(_, index)| index));
        }

        debug!(
            grid_width,
            grid_height,
            cell_width,
            cell_height,
            keys = keys.len(),
            "built proximity grid"
        );

        Self {
            grid_width,
            grid_height,
            cell_width,
            cell_height,
            occupied_width,
            occupied_height,
            grid_neighbors,
        }
    }

    /// Indices of the keys plausibly intended by a touch at `(x, y)`,
    /// nearest first. Empty when the point lies outside the keyboard.
    pub fn nearest_keys(&self, x: i32, y: i32) -> &[usize] {
        if x < 0 || x >= self.occupied_width || y < 0 || y >= self.occupied_height {
            return &[];
        }
        let index = (y / self.cell_height) * self.grid_width + x / self.cell_width;
        match self.grid_neighbors.get(index as usize) {
            Some(neighbors) => neighbors,
            None => &[],
        }
    }

    pub fn grid_width(&self) -> i32 {
        self.grid_width
    }

    pub fn grid_height(&self) -> i32 {
        self.grid_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyLabelFlags;

    fn key_at(label: &str, x: i32, y: i32) -> Key {
        Key::popup_key(
            Some(label),
            label.chars().next().unwrap() as i32,
            KeyLabelFlags::empty(),
            x,
            y,
            40,
            50,
            0,
            0,
        )
    }

    fn build_index(keys: &[Key]) -> ProximityInfo {
        ProximityInfo::new(
            4,
            2,
            160,
            100,
            40,
            50,
            keys,
            &TouchPositionCorrection::default(),
        )
    }

    #[test]
    fn test_nearest_keys_ranked_by_distance() {
        let keys = vec![
            key_at("a", 0, 0),
            key_at("b", 40, 0),
            key_at("c", 80, 0),
            key_at("d", 120, 0),
        ];
        let info = build_index(&keys);
        let near = info.nearest_keys(10, 10);
        assert!(!near.is_empty());
        // The key under the touch ranks first.
        assert_eq!(near[0], 0);
        // Ranking is by distance: the adjacent key precedes the far one.
        let pos_b = near.iter().position(|&i| i == 1);
        let pos_d = near.iter().position(|&i| i == 3);
        match (pos_b, pos_d) {
            (Some(b), Some(d)) => assert!(b < d),
            (Some(_), None) => {}
            other => panic!("unexpected neighbor ranking: {:?}", other),
        }
    }

    #[test]
    fn test_out_of_bounds_touch_has_no_keys() {
        let keys = vec![key_at("a", 0, 0)];
        let info = build_index(&keys);
        assert!(info.nearest_keys(-1, 10).is_empty());
        assert!(info.nearest_keys(10, 500).is_empty());
    }

    #[test]
    fn test_spacers_never_indexed() {
        let params = {
            let mut p = crate::params::KeyboardParams::new(crate::params::KeyboardId::new(
                "en",
                crate::params::ElementId::Alphabet,
            ));
            p.occupied_width = 160;
            p.occupied_height = 100;
            p
        };
        let keys = vec![Key::spacer(&params, 0, 0, 160, 100)];
        let info = build_index(&keys);
        assert!(info.nearest_keys(10, 10).is_empty());
    }

    #[test]
    fn test_correction_profile_scales_radius() {
        let keys = vec![key_at("a", 0, 0), key_at("b", 120, 0)];
        // A tiny radius keeps far keys out of every cell.
        let correction = TouchPositionCorrection {
            enabled: true,
            rows: vec![crate::params::CorrectionRow {
                center_x: 0.0,
                center_y: 0.0,
                radius: 0.1,
            }],
        };
        let info = ProximityInfo::new(4, 2, 160, 100, 40, 50, &keys, &correction);
        let near = info.nearest_keys(10, 10);
        assert!(near.contains(&0));
        assert!(!near.contains(&1));
    }
}
