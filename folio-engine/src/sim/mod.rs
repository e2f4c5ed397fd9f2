// sim/ - Pure motion for the intro and background scenes
//
// No browser types in here: everything is plain math over glam vectors so
// it runs (and is tested) natively. The render layer feeds the results into
// the 3D backend.

mod ambient;
mod field;
mod path;
mod trail;

pub use ambient::{AmbientMotion, AmbientPose};
pub use field::{particle_sphere, starfield};
pub use path::{FlightPath, IntroPose};
pub use trail::TrailHistory;

// Random number generator (xorshift32), returns [0, 1)
#[inline(always)]
pub fn rand(rng: &mut u32) -> f32 {
    *rng ^= *rng << 13;
    *rng ^= *rng >> 17;
    *rng ^= *rng << 5;
    (*rng >> 8) as f32 * (1.0 / 16777216.0)
}

/// Derive a non-zero xorshift seed from an arbitrary float (e.g. a clock).
pub fn seed_from(value: f64) -> u32 {
    let bits = value.to_bits();
    let seed = (bits ^ (bits >> 32)) as u32;
    if seed == 0 { 0xDEADBEEF } else { seed }
}
