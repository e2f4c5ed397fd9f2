// path.rs - Intro flight curve
//
// Centripetal Catmull-Rom through three control points, evaluated by raw
// parameter (not arc length). End tangents use reflected phantom points so
// the curve passes through start and end.

use glam::Vec3;

const LOOK_AHEAD: f32 = 0.0025;
const ROLL: f32 = 0.12;
const STARS_SPIN: f32 = 0.6;
const STARS_DRIFT: f32 = 0.3;

#[derive(Clone, Debug, PartialEq)]
pub struct FlightPath {
    points: [Vec3; 3],
}

impl Default for FlightPath {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            Vec3::new(1.6, 0.45, -0.5),
            Vec3::new(5.8, 1.2, -1.6),
        )
    }
}

impl FlightPath {
    pub fn new(start: Vec3, mid: Vec3, end: Vec3) -> Self {
        Self { points: [start, mid, end] }
    }

    pub fn points(&self) -> &[Vec3; 3] {
        &self.points
    }

    /// Position at normalized time `t`, clamped to [0, 1].
    pub fn point_at(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let last = self.points.len() - 1;
        let p = last as f32 * t;
        let mut seg = p.floor() as usize;
        let mut weight = p - seg as f32;
        if seg >= last {
            seg = last - 1;
            weight = 1.0;
        }

        let p1 = self.points[seg];
        let p2 = self.points[seg + 1];
        let p0 = if seg > 0 {
            self.points[seg - 1]
        } else {
            2.0 * self.points[0] - self.points[1]
        };
        let p3 = if seg + 2 <= last {
            self.points[seg + 2]
        } else {
            2.0 * self.points[last] - self.points[last - 1]
        };

        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);
        if dt1 < 1e-4 { dt1 = 1.0; }
        if dt0 < 1e-4 { dt0 = dt1; }
        if dt2 < 1e-4 { dt2 = dt1; }

        // Non-uniform tangents, rescaled to the [0, 1] segment
        let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        hermite(p1, p2, t1, t2, weight)
    }
}

#[inline]
fn hermite(x0: Vec3, x1: Vec3, t0: Vec3, t1: Vec3, w: f32) -> Vec3 {
    let c2 = -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1;
    let c3 = 2.0 * x0 - 2.0 * x1 + t0 + t1;
    x0 + t0 * w + c2 * (w * w) + c3 * (w * w * w)
}

/// Everything the intro scene needs for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntroPose {
    pub position: Vec3,
    /// Point the jet nose aims at.
    pub look_at: Vec3,
    /// Extra roll around the local Z axis, in radians.
    pub roll: f32,
    pub stars_rotation_y: f32,
    pub stars_offset_x: f32,
}

impl IntroPose {
    pub fn at(path: &FlightPath, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let position = path.point_at(t);
        // Nudge so lookAt never degenerates when position == target at t = 1
        let look_at = path.point_at((t + LOOK_AHEAD).min(1.0)) + Vec3::splat(0.0001);
        Self {
            position,
            look_at,
            roll: ROLL,
            stars_rotation_y: t * STARS_SPIN,
            stars_offset_x: -t * STARS_DRIFT,
        }
    }
}
