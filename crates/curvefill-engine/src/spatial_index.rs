//! Uniform-grid spatial index over axis-aligned bounds.
//!
//! Items are registered in every grid cell their bounds overlap. Items that
//! would cover an excessive number of cells are kept in a separate list that
//! every query scans.

use curvefill_core::Bounds;
use smallvec::SmallVec;
use std::collections::HashMap;

/// Items spanning more cells than this skip the grid.
const MAX_CELLS_PER_ITEM: i64 = 4096;

type Cell = (i64, i64);

/// Occupancy statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpatialIndexStats {
    pub total_items: usize,
    /// Non-empty grid cells
    pub total_cells: usize,
    /// Largest number of items in any one cell
    pub max_cell_items: usize,
    /// Items stored outside the grid
    pub oversized_items: usize,
}

/// Grid of square cells keyed by integer cell coordinates
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f64,
    cells: HashMap<Cell, SmallVec<[usize; 4]>>,
    items: HashMap<usize, Bounds>,
    oversized: Vec<usize>,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl SpatialIndex {
    /// Creates an empty index. Non-positive or non-finite sizes fall back to 1.
    pub fn new(cell_size: f64) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            items: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn cell_of(&self, x: f64, y: f64) -> Cell {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }

    fn cell_range(&self, bounds: &Bounds) -> (Cell, Cell) {
        (
            self.cell_of(bounds.min_x, bounds.min_y),
            self.cell_of(bounds.max_x, bounds.max_y),
        )
    }

    fn is_oversized((lo, hi): (Cell, Cell)) -> bool {
        let w = hi.0.saturating_sub(lo.0).saturating_add(1);
        let h = hi.1.saturating_sub(lo.1).saturating_add(1);
        w.saturating_mul(h) > MAX_CELLS_PER_ITEM
    }

    /// Registers `id` with `bounds`, replacing any previous entry for `id`.
    pub fn insert(&mut self, id: usize, bounds: &Bounds) {
        self.remove(id);
        self.items.insert(id, *bounds);
        let range = self.cell_range(bounds);
        if Self::is_oversized(range) {
            self.oversized.push(id);
            return;
        }
        let ((x0, y0), (x1, y1)) = range;
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(id);
            }
        }
    }

    /// Unregisters `id`. Returns whether it was present.
    pub fn remove(&mut self, id: usize) -> bool {
        let Some(bounds) = self.items.remove(&id) else {
            return false;
        };
        let range = self.cell_range(&bounds);
        if Self::is_oversized(range) {
            self.oversized.retain(|&o| o != id);
            return true;
        }
        let ((x0, y0), (x1, y1)) = range;
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(bucket) = self.cells.get_mut(&(cx, cy)) {
                    bucket.retain(|o| *o != id);
                    if bucket.is_empty() {
                        self.cells.remove(&(cx, cy));
                    }
                }
            }
        }
        true
    }

    /// Ids whose bounds intersect `bounds`, ascending.
    pub fn query(&self, bounds: &Bounds) -> Vec<usize> {
        let mut found: Vec<usize> = self
            .oversized
            .iter()
            .copied()
            .filter(|id| self.items.get(id).is_some_and(|b| b.intersects(bounds)))
            .collect();

        let range = self.cell_range(bounds);
        if Self::is_oversized(range) {
            found.extend(
                self.items
                    .iter()
                    .filter(|(_, b)| b.intersects(bounds))
                    .map(|(id, _)| *id),
            );
        } else {
            let ((x0, y0), (x1, y1)) = range;
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    let Some(bucket) = self.cells.get(&(cx, cy)) else {
                        continue;
                    };
                    found.extend(
                        bucket
                            .iter()
                            .copied()
                            .filter(|id| self.items.get(id).is_some_and(|b| b.intersects(bounds))),
                    );
                }
            }
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Ids whose bounds contain the point.
    pub fn query_point(&self, x: f64, y: f64) -> Vec<usize> {
        self.query(&Bounds::new(x, y, x, y))
    }

    pub fn get(&self, id: usize) -> Option<&Bounds> {
        self.items.get(&id)
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.items.clear();
        self.oversized.clear();
    }

    pub fn stats(&self) -> SpatialIndexStats {
        SpatialIndexStats {
            total_items: self.items.len(),
            total_cells: self.cells.len(),
            max_cell_items: self.cells.values().map(|b| b.len()).max().unwrap_or(0),
            oversized_items: self.oversized.len(),
        }
    }
}
