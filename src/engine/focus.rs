use std::collections::BTreeMap;
use std::ops::Bound;

use super::overlay::OverlayId;

/// Ordered map from focus position to an opaque presentation handle.
///
/// Positions are unique within a scope but need not be contiguous: a
/// search or category filter can unregister arbitrary positions between
/// two key events. Callers assign positions that already encode the
/// traversal order (row-major for grids, top-to-bottom for lists).
pub struct FocusRegistry<H> {
    scope: OverlayId,
    entries: BTreeMap<u32, H>,
}

impl<H> FocusRegistry<H> {
    pub fn new(scope: OverlayId) -> Self {
        Self {
            scope,
            entries: BTreeMap::new(),
        }
    }

    pub fn scope(&self) -> &OverlayId {
        &self.scope
    }

    /// Register a handle at a position. Registering the same position
    /// twice replaces the handle.
    pub fn register(&mut self, position: u32, handle: H) {
        if self.entries.insert(position, handle).is_some() {
            log::debug!("focus[{}]: replaced handle at {}", self.scope, position);
        }
    }

    /// Remove a position. Unregistering a missing position is a no-op.
    pub fn unregister(&mut self, position: u32) {
        self.entries.remove(&position);
    }

    pub fn get(&self, position: u32) -> Option<&H> {
        self.entries.get(&position)
    }

    pub fn contains(&self, position: u32) -> bool {
        self.entries.contains_key(&position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// All (position, handle) pairs sorted by position.
    pub fn snapshot(&self) -> Vec<(u32, &H)> {
        self.entries.iter().map(|(p, h)| (*p, h)).collect()
    }

    pub fn positions(&self) -> Vec<u32> {
        self.entries.keys().copied().collect()
    }

    pub fn first_position(&self) -> Option<u32> {
        self.entries.keys().next().copied()
    }

    pub fn last_position(&self) -> Option<u32> {
        self.entries.keys().next_back().copied()
    }

    /// Largest registered position strictly below `position`.
    pub fn prev_before(&self, position: u32) -> Option<u32> {
        self.entries.range(..position).next_back().map(|(p, _)| *p)
    }

    /// Smallest registered position strictly above `position`.
    pub fn next_after(&self, position: u32) -> Option<u32> {
        self.entries
            .range((Bound::Excluded(position), Bound::Unbounded))
            .next()
            .map(|(p, _)| *p)
    }

    /// Registered position closest to `target`, ties broken toward the
    /// lower position index. The target may be out of range (or
    /// negative) after a grid step off the edge.
    pub fn closest_to(&self, target: i64) -> Option<u32> {
        self.entries
            .keys()
            .copied()
            .min_by_key(|&p| ((p as i64 - target).abs(), p))
    }

    /// Like [`closest_to`](Self::closest_to), restricted to positions in
    /// the given row of a `columns`-wide grid.
    pub fn closest_in_row(&self, target: i64, row: u32, columns: u32) -> Option<u32> {
        self.entries
            .keys()
            .copied()
            .filter(|&p| p / columns == row)
            .min_by_key(|&p| ((p as i64 - target).abs(), p))
    }
}
