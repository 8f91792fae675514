//! Contact checks between actors and the lava plane
//!
//! Real character collision belongs to the host's physics. The simulation only
//! needs these coarse tests to decide eliminations deterministically.

use glam::Vec3;

/// True once a point has sunk under the lava surface
#[inline]
pub fn below_hazard(pos: Vec3, hazard_height: f32) -> bool {
    pos.y < hazard_height
}

/// Keep a worm floating on top of the lava
#[inline]
pub fn clamp_above_hazard(pos: Vec3, hazard_height: f32) -> Vec3 {
    Vec3::new(pos.x, pos.y.max(hazard_height), pos.z)
}

/// Sphere-sphere touch test with a shared contact radius
#[inline]
pub fn touching(a: Vec3, b: Vec3, radius: f32) -> bool {
    a.distance_squared(b) <= radius * radius
}
