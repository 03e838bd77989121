//! Collision detection for circular bodies
//!
//! Everything in the simulation is a circle, so collision is a distance test.
//! Pair search is brute force; live projectile counts stay in the tens.

use glam::Vec2;

/// Check whether two circles overlap (touching does not count)
#[inline]
pub fn circles_overlap(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a_pos.distance_squared(b_pos) < reach * reach
}

/// A circle tagged with a group; circles of one group never collide
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub pos: Vec2,
    pub radius: f32,
    pub group: u32,
}

/// All unordered index pairs `(i, j)`, `i < j`, whose circles overlap
///
/// Each index appears in at most one returned pair: once a circle has been
/// paired it is consumed, matching mutual destruction on impact.
pub fn overlapping_pairs(circles: &[Circle]) -> Vec<(usize, usize)> {
    let mut consumed = vec![false; circles.len()];
    let mut pairs = Vec::new();

    for i in 0..circles.len() {
        if consumed[i] {
            continue;
        }
        let a = circles[i];
        for j in (i + 1)..circles.len() {
            let b = circles[j];
            if consumed[j] || a.group == b.group {
                continue;
            }
            if circles_overlap(a.pos, a.radius, b.pos, b.radius) {
                consumed[i] = true;
                consumed[j] = true;
                pairs.push((i, j));
                break;
            }
        }
    }

    pairs
}
