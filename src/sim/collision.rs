//! Collision detection and response
//!
//! Two narrow phases: cube-vs-wall (per-axis clamp and reflect) and
//! cube-vs-cube. Cube pairs use a circular proxy for box-box overlap -
//! deliberately generous so corners never clip through each other - with
//! half-overlap separation and an equal-mass elastic exchange along the
//! contact normal.

use glam::Vec2;

/// Result of a cube-pair overlap check
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Unit normal from the first cube toward the second
    pub normal: Vec2,
    /// Penetration depth (how far centers are inside the contact distance)
    pub overlap: f32,
}

/// Check two cube centers for contact.
///
/// Contact is declared when the planar center distance drops below the cube
/// edge length. Coincident centers get a canonical `(1, 0)` normal so the
/// pair still separates instead of dividing by zero.
pub fn cube_contact(a: Vec2, b: Vec2, cube_size: f32) -> Option<Contact> {
    let delta = b - a;
    let dist_sq = delta.length_squared();
    if dist_sq >= cube_size * cube_size {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist == 0.0 { Vec2::X } else { delta / dist };

    Some(Contact {
        normal,
        overlap: cube_size - dist,
    })
}

/// Push a contacting pair apart, half the overlap each, along the normal.
pub fn separate(pos_a: &mut Vec2, pos_b: &mut Vec2, contact: &Contact) {
    let push = contact.normal * (contact.overlap * 0.5);
    *pos_a -= push;
    *pos_b += push;
}

/// Elastic exchange for an equal-mass pair.
///
/// Swaps the velocity component along the contact normal, but only when the
/// pair is approaching (positive relative-velocity projection). A pair that
/// is already separating is left untouched so an overlap is never resolved
/// twice.
pub fn exchange_momentum(vel_a: &mut Vec2, vel_b: &mut Vec2, normal: Vec2) {
    let approach = (*vel_a - *vel_b).dot(normal);
    if approach > 0.0 {
        *vel_a -= approach * normal;
        *vel_b += approach * normal;
    }
}

/// Contain a cube inside the inward-shrunk arena bounds.
///
/// Each axis is resolved independently: on crossing, the position is clamped
/// to the boundary and that axis's velocity component is negated (perfect
/// reflection, no energy loss). Independent axes make diagonal approaches
/// reflect correctly off each wall separately.
pub fn contain(pos: &mut Vec2, vel: &mut Vec2, bound_x: f32, bound_z: f32) {
    if pos.x > bound_x {
        pos.x = bound_x;
        vel.x = -vel.x;
    } else if pos.x < -bound_x {
        pos.x = -bound_x;
        vel.x = -vel.x;
    }

    if pos.y > bound_z {
        pos.y = bound_z;
        vel.y = -vel.y;
    } else if pos.y < -bound_z {
        pos.y = -bound_z;
        vel.y = -vel.y;
    }
}
