// field.rs - Point clouds for the star and particle layers
//
// Output is interleaved xyz, ready to hand to a float vertex buffer.

use std::f32::consts::TAU;

use super::rand;

const STAR_RADIUS: f32 = 12.0;
const STAR_FLATTEN: f32 = 0.6;
const STAR_DEPTH_OFFSET: f32 = -2.0;

/// Intro starfield: a flattened box whose extent follows a cube-root radius,
/// pushed slightly behind the origin.
pub fn starfield(count: usize, rng: &mut u32) -> Vec<f32> {
    let mut out = Vec::with_capacity(count * 3);
    for _ in 0..count {
        let r = STAR_RADIUS * rand(rng).cbrt();
        out.push((rand(rng) * 2.0 - 1.0) * r);
        out.push((rand(rng) * 2.0 - 1.0) * r * STAR_FLATTEN);
        out.push((rand(rng) * 2.0 - 1.0) * r + STAR_DEPTH_OFFSET);
    }
    out
}

/// Background particles: random directions, uniform radius in [0, radius).
pub fn particle_sphere(count: usize, radius: f32, rng: &mut u32) -> Vec<f32> {
    let mut out = Vec::with_capacity(count * 3);
    for _ in 0..count {
        let r = radius * rand(rng);
        let theta = rand(rng) * TAU;
        let phi = (2.0 * rand(rng) - 1.0).clamp(-1.0, 1.0).acos();
        out.push(r * phi.sin() * theta.cos());
        out.push(r * phi.sin() * theta.sin());
        out.push(r * phi.cos());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starfield_is_bounded() {
        let mut rng = 0xDEADBEEF;
        let stars = starfield(1500, &mut rng);
        assert_eq!(stars.len(), 4500);
        for p in stars.chunks_exact(3) {
            assert!(p[0].abs() <= STAR_RADIUS);
            assert!(p[1].abs() <= STAR_RADIUS * STAR_FLATTEN);
            assert!((p[2] - STAR_DEPTH_OFFSET).abs() <= STAR_RADIUS);
        }
    }

    #[test]
    fn particles_stay_inside_sphere() {
        let mut rng = 0x12345678;
        let points = particle_sphere(500, 6.0, &mut rng);
        assert_eq!(points.len(), 1500);
        for p in points.chunks_exact(3) {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!(len <= 6.0 + 1e-4, "{len}");
        }
    }

    #[test]
    fn same_seed_same_field() {
        let (mut a, mut b) = (42, 42);
        assert_eq!(starfield(10, &mut a), starfield(10, &mut b));
    }
}
