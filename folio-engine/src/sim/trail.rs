// trail.rs - Recent jet positions for the exhaust ribbon
//
// Bounded FIFO: pushing past capacity evicts the oldest sample.

use std::collections::VecDeque;

use glam::Vec3;

/// A ribbon needs a few samples before the tube geometry looks like anything.
const MIN_RIBBON_POINTS: usize = 7;

#[derive(Clone, Debug)]
pub struct TrailHistory {
    points: VecDeque<Vec3>,
    capacity: usize,
}

impl TrailHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, point: Vec3) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether there are enough samples to build a ribbon from.
    pub fn ready(&self) -> bool {
        self.points.len() >= MIN_RIBBON_POINTS
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Vec3> {
        self.points.iter()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity() {
        let mut trail = TrailHistory::new(80);
        for i in 0..500 {
            trail.push(Vec3::splat(i as f32));
            assert!(trail.len() <= 80);
        }
        assert_eq!(trail.len(), 80);
    }

    #[test]
    fn evicts_oldest_first() {
        let mut trail = TrailHistory::new(3);
        for i in 0..5 {
            trail.push(Vec3::new(i as f32, 0.0, 0.0));
        }
        let xs: Vec<f32> = trail.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn ribbon_waits_for_more_than_six_points() {
        let mut trail = TrailHistory::new(80);
        for _ in 0..6 {
            trail.push(Vec3::ZERO);
            assert!(!trail.ready());
        }
        trail.push(Vec3::ZERO);
        assert!(trail.ready());
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let mut trail = TrailHistory::new(0);
        trail.push(Vec3::X);
        trail.push(Vec3::Y);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.iter().next(), Some(&Vec3::Y));
    }
}
