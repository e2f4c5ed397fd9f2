// ambient.rs - Background scene motion
//
// Rotations are driven by wall-clock seconds so they are frame-rate
// independent. The parallax group eases toward the pointer with a fixed
// per-frame factor, so it is not.

use glam::{Vec2, Vec3};

// Radians per second
const KNOT_SPIN: Vec2 = Vec2::new(0.25, 0.18);
const ICO_SPIN: Vec2 = Vec2::new(-0.18, 0.22);
const PARTICLE_SPIN: f32 = 0.02;

// Pointer NDC -> group offset
const PARALLAX: Vec2 = Vec2::new(0.5, -0.3);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientPose {
    /// Euler (x, y, 0) for the torus knot.
    pub knot_rotation: Vec3,
    pub ico_rotation: Vec3,
    pub particles_rotation_y: f32,
    pub group_position: Vec2,
}

#[derive(Clone, Debug)]
pub struct AmbientMotion {
    smoothing: f32,
    pointer: Vec2,
    group: Vec2,
}

impl AmbientMotion {
    pub fn new(smoothing: f32) -> Self {
        Self {
            smoothing: smoothing.clamp(0.0, 1.0),
            pointer: Vec2::ZERO,
            group: Vec2::ZERO,
        }
    }

    /// Record the pointer in client pixels against the viewport size.
    pub fn set_pointer(&mut self, client: Vec2, viewport: Vec2) {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return;
        }
        self.pointer = client / viewport * 2.0 - Vec2::ONE;
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn target(&self) -> Vec2 {
        self.pointer * PARALLAX
    }

    /// Advance one frame at `elapsed` seconds since the scene started.
    pub fn step(&mut self, elapsed: f32) -> AmbientPose {
        self.group += (self.target() - self.group) * self.smoothing;
        AmbientPose {
            knot_rotation: (KNOT_SPIN * elapsed).extend(0.0),
            ico_rotation: (ICO_SPIN * elapsed).extend(0.0),
            particles_rotation_y: PARTICLE_SPIN * elapsed,
            group_position: self.group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        let delta = (actual - expected).abs();
        assert!(
            delta <= 1e-5,
            "expected {:.6} got {:.6} (delta {:.6})",
            expected,
            actual,
            delta
        );
    }

    #[test]
    fn pointer_maps_to_ndc() {
        let mut motion = AmbientMotion::new(0.04);
        let viewport = Vec2::new(800.0, 600.0);
        motion.set_pointer(Vec2::new(800.0, 0.0), viewport);
        assert_eq!(motion.pointer(), Vec2::new(1.0, -1.0));
        motion.set_pointer(Vec2::new(400.0, 300.0), viewport);
        assert_eq!(motion.pointer(), Vec2::ZERO);
    }

    #[test]
    fn degenerate_viewport_is_ignored() {
        let mut motion = AmbientMotion::new(0.04);
        motion.set_pointer(Vec2::new(10.0, 10.0), Vec2::ZERO);
        assert_eq!(motion.pointer(), Vec2::ZERO);
    }

    #[test]
    fn first_step_covers_four_percent() {
        let mut motion = AmbientMotion::new(0.04);
        motion.set_pointer(Vec2::new(800.0, 600.0), Vec2::new(800.0, 600.0));
        let target = motion.target();
        assert_eq!(target, Vec2::new(0.5, -0.3));
        let pose = motion.step(0.0);
        assert_close(pose.group_position.x, 0.02);
        assert_close(pose.group_position.y, -0.012);
    }

    #[test]
    fn converges_to_target() {
        let mut motion = AmbientMotion::new(0.04);
        motion.set_pointer(Vec2::ZERO, Vec2::new(100.0, 100.0));
        let mut pose = motion.step(0.0);
        for _ in 0..1000 {
            pose = motion.step(0.0);
        }
        assert_close(pose.group_position.x, -0.5);
        assert_close(pose.group_position.y, 0.3);
    }

    #[test]
    fn rotations_follow_elapsed_time() {
        let mut motion = AmbientMotion::new(0.04);
        let pose = motion.step(10.0);
        assert_close(pose.knot_rotation.x, 2.5);
        assert_close(pose.knot_rotation.y, 1.8);
        assert_close(pose.ico_rotation.x, -1.8);
        assert_close(pose.ico_rotation.y, 2.2);
        assert_close(pose.particles_rotation_y, 0.2);
    }
}
