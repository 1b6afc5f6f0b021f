/*
Davenstein - by David Petnick
*/
use bevy::prelude::*;
use std::ops::ControlFlow;

use crate::error::AutomapError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkedPoint {
    pub origin: Vec3,
}

/// Player Placed Map Markers
/// Indices Stay Stable Until the Whole Store is Cleared
#[derive(Debug, Clone, Default)]
pub struct MarkedPointStore {
    points: Vec<MarkedPoint>,
}

impl MarkedPointStore {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the New Point's Index (0-based)
    pub fn add_point(&mut self, origin: Vec3) -> usize {
        self.points.push(MarkedPoint { origin });
        self.points.len() - 1
    }

    pub fn point(&self, index: usize) -> Result<&MarkedPoint, AutomapError> {
        self.points.get(index).ok_or(AutomapError::UnknownIndex {
            index,
            len: self.points.len(),
        })
    }

    /// Visit in Insertion Order, Stop Early on 'Break'
    pub fn for_all<B>(&self, mut visit: impl FnMut(usize, &MarkedPoint) -> ControlFlow<B>) -> ControlFlow<B> {
        for (i, p) in self.points.iter().enumerate() {
            visit(i, p)?;
        }
        ControlFlow::Continue(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &MarkedPoint)> {
        self.points.iter().enumerate()
    }

    pub fn clear_all(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_insertion_order() {
        let mut store = MarkedPointStore::default();
        assert_eq!(store.add_point(Vec3::new(1.0, 2.0, 0.0)), 0);
        assert_eq!(store.add_point(Vec3::new(3.0, 4.0, 0.0)), 1);
        assert_eq!(store.add_point(Vec3::new(5.0, 6.0, 8.0)), 2);
        assert_eq!(store.point(1).unwrap().origin, Vec3::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_clear_resets_indices() {
        let mut store = MarkedPointStore::default();
        for i in 0..5 {
            store.add_point(Vec3::splat(i as f32));
        }
        store.clear_all();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.add_point(Vec3::ZERO), 0);
    }

    #[test]
    fn test_unknown_index() {
        let mut store = MarkedPointStore::default();
        store.add_point(Vec3::ZERO);
        assert_eq!(
            store.point(3).unwrap_err(),
            AutomapError::UnknownIndex { index: 3, len: 1 }
        );
    }

    #[test]
    fn test_for_all_stops_early() {
        let mut store = MarkedPointStore::default();
        for i in 0..4 {
            store.add_point(Vec3::splat(i as f32));
        }
        let mut seen = Vec::new();
        let flow = store.for_all(|i, _| {
            seen.push(i);
            if i == 1 { ControlFlow::Break(i) } else { ControlFlow::Continue(()) }
        });
        assert_eq!(flow, ControlFlow::Break(1));
        assert_eq!(seen, vec![0, 1]);
    }
}
