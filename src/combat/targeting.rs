//! Cone/radius target selection.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::Combatant;

/// Arcs at or above this many degrees select all around the actor
pub const FULL_CIRCLE_ARC: f32 = 359.0;

/// Target query: radius, cone width in degrees, and max hits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetQuery {
    pub range: f32,
    pub arc: f32,
    pub limit: usize,
}

impl TargetQuery {
    pub const fn new(range: f32, arc: f32, limit: usize) -> Self {
        Self { range, arc, limit }
    }

    /// Everything inside `range`, all around the actor
    pub const fn around(range: f32, limit: usize) -> Self {
        Self::new(range, 360.0, limit)
    }
}

/// Whether `point` lies in the cone of `arc` degrees opening along `facing`.
pub fn in_cone(origin: Vec2, facing: Vec2, point: Vec2, arc: f32) -> bool {
    if arc >= FULL_CIRCLE_ARC {
        return true;
    }
    let offset = point - origin;
    let dist = offset.length();
    if dist <= f32::EPSILON {
        return true;
    }
    let dir = facing.try_normalize().unwrap_or(Vec2::X);
    let dot = (offset / dist).dot(dir).clamp(-1.0, 1.0);
    dot.acos() <= arc.to_radians() / 2.0
}

/// Indices of living candidates inside the query, nearest first, at most
/// `query.limit` of them.
pub fn pick_targets<A, T>(actor: &A, candidates: &[T], query: &TargetQuery) -> Vec<usize>
where
    A: Combatant + ?Sized,
    T: Combatant,
{
    pick_targets_from(actor.position(), actor.facing(), candidates, query)
}

/// Same as [`pick_targets`] for an explicit origin and facing
pub fn pick_targets_from<T: Combatant>(
    origin: Vec2,
    facing: Vec2,
    candidates: &[T],
    query: &TargetQuery,
) -> Vec<usize> {
    let mut hits: Vec<(usize, f32)> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_alive())
        .filter_map(|(i, c)| {
            let pos = c.position();
            let dist = origin.distance(pos);
            (dist <= query.range && in_cone(origin, facing, pos, query.arc)).then_some((i, dist))
        })
        .collect();

    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits.truncate(query.limit);
    hits.into_iter().map(|(i, _)| i).collect()
}
