//! Seeded randomness for tree generation
//!
//! Every generator draws from a caller-provided `Rng`. `tree_rng` is the
//! canonical source: the same seed always reproduces the same tree.

use glam::{EulerRot, Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic generator for one tree
pub fn tree_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Rotation from Euler angles in degrees
///
/// Applied Z first, then X, then Y.
pub fn euler_degrees(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, y.to_radians(), x.to_radians(), z.to_radians())
}

/// Random tilt around X and Z, each within `±twisting / 2` degrees
pub fn random_twist<R: Rng + ?Sized>(rng: &mut R, twisting: f32) -> Quat {
    let x = (rng.random::<f32>() - 0.5) * twisting;
    let z = (rng.random::<f32>() - 0.5) * twisting;
    euler_degrees(x, 0.0, z)
}

/// Uniformly distributed rotation
pub fn random_rotation<R: Rng + ?Sized>(rng: &mut R) -> Quat {
    use std::f32::consts::TAU;

    let u1: f32 = rng.random();
    let u2: f32 = rng.random();
    let u3: f32 = rng.random();
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::from_xyzw(
        a * (TAU * u2).sin(),
        a * (TAU * u2).cos(),
        b * (TAU * u3).sin(),
        b * (TAU * u3).cos(),
    )
    .normalize()
}

/// Uniform value in `[-magnitude, magnitude)`
pub fn symmetric<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    (rng.random::<f32>() * 2.0 - 1.0) * magnitude
}

/// Random horizontal offset with components in `[-0.5, 0.5)`, scaled
pub fn horizontal_jitter<R: Rng + ?Sized>(rng: &mut R, scale: f32) -> Vec3 {
    let x = rng.random::<f32>() - 0.5;
    let z = rng.random::<f32>() - 0.5;
    Vec3::new(x, 0.0, z) * scale
}
