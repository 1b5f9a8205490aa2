//! A* pathfinding over continuous arena space.
//!
//! The search lays a uniform grid over the arena with a cell size of half a
//! participant. Grid keys only decide set membership; node positions stay
//! continuous (`start + k * cell`), so the grid disciplines step size without
//! snapping the path onto cell centres.
//!
//! Costs are congestion-aware: every live ally near a node makes it more
//! expensive, while live opponents are hard obstacles. The number of node
//! expansions is capped, which bounds the work one participant can do per
//! tick. Callers must treat `None` as an ordinary outcome.

use crate::config::AiTuning;
use crate::participant::{BattleView, Participant};
use crate::targeting::is_colliding;
use ahash::{AHashMap, AHashSet};
use arena_common::{ParticipantId, Vec2};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f32::consts::SQRT_2;
use tracing::trace;

/// 8-directional moves: (dx, dy, cost in cells).
const DIRECTIONS: [(f32, f32, f32); 8] = [
    (1.0, 0.0, 1.0),
    (-1.0, 0.0, 1.0),
    (0.0, 1.0, 1.0),
    (0.0, -1.0, 1.0),
    (1.0, 1.0, SQRT_2),
    (-1.0, 1.0, SQRT_2),
    (1.0, -1.0, SQRT_2),
    (-1.0, -1.0, SQRT_2),
];

/// Slack added to the arrival tolerance to absorb accumulated float error.
const ARRIVAL_EPSILON: f32 = 1e-3;

/// Quantized grid key used for open/closed membership.
type CellKey = (i32, i32);

/// A path found by [`compute_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathResult {
    /// Node positions from the start to the node that reached the target
    pub waypoints: Vec<Vec2>,
    /// Accumulated cost `g` of the final node (distance plus congestion)
    pub cost: f32,
    /// Node expansions used
    pub iterations: u32,
}

impl PathResult {
    /// The first position after the start, if the path moves at all.
    #[must_use]
    pub fn next_step(&self) -> Option<Vec2> {
        self.waypoints.get(1).copied()
    }
}

/// A search request.
#[derive(Debug, Clone, Copy)]
pub struct PathQuery<'a> {
    /// Who is moving (decides allies and opponents)
    pub mover: &'a Participant,
    /// Where the search starts
    pub start: Vec2,
    /// Where the search should end
    pub target: Vec2,
    /// Opponent that must not block the search (the unit being attacked when
    /// the target is one of its attack slots)
    pub excluded_obstacle: Option<ParticipantId>,
}

impl<'a> PathQuery<'a> {
    /// Path from the mover's current position to `target`.
    #[must_use]
    pub fn new(mover: &'a Participant, target: Vec2) -> Self {
        Self {
            mover,
            start: mover.position,
            target,
            excluded_obstacle: None,
        }
    }

    /// Lets the search end next to `target_id` without it blocking the way.
    #[must_use]
    pub fn to_attack_slot_of(mut self, target_id: ParticipantId) -> Self {
        self.excluded_obstacle = Some(target_id);
        self
    }
}

/// One search node. Positions are continuous.
#[derive(Debug, Clone, Copy)]
struct Node {
    position: Vec2,
    g: f32,
    parent: Option<usize>,
}

/// Open-list entry ordered so that `BinaryHeap` pops the lowest `f` first.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f32,
    h: f32,
    g: f32,
    seq: u32,
    node: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: lower f, then lower h, then older entries win.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.h.total_cmp(&self.h))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manhattan distance heuristic.
fn heuristic(from: Vec2, to: Vec2) -> f32 {
    (to.x - from.x).abs() + (to.y - from.y).abs()
}

fn cell_key(position: Vec2, cell: f32) -> CellKey {
    (
        (position.x / cell).round() as i32,
        (position.y / cell).round() as i32,
    )
}

/// Finds a low-cost path for `query.mover` through the battle snapshot.
///
/// Returns `None` when the open list runs dry or the iteration cap in
/// `tuning` is hit before reaching the target.
#[must_use]
pub fn compute_path(view: &BattleView<'_>, query: &PathQuery<'_>, tuning: &AiTuning) -> Option<PathResult> {
    let size = view.size();
    let cell = size / 2.0;
    if !(cell.is_finite() && cell > 0.0) || !query.start.is_finite() || !query.target.is_finite() {
        return None;
    }

    let mover = query.mover;
    let tolerance = cell / 2.0 + ARRIVAL_EPSILON;
    let obstacle_radius = tuning.path_obstacle_factor * size;
    let congestion_radius = tuning.congestion_radius_factor * size;
    let congestion_radius_sq = congestion_radius * congestion_radius;

    let allies: Vec<&Participant> = view
        .all()
        .filter(|p| mover.is_ally_of(p) && p.is_active())
        .collect();
    let obstacles: Vec<&Participant> = view
        .all()
        .filter(|p| p.team != mover.team && Some(p.id) != query.excluded_obstacle)
        .collect();

    let mut nodes = vec![Node {
        position: query.start,
        g: 0.0,
        parent: None,
    }];
    let mut index: AHashMap<CellKey, usize> = AHashMap::new();
    let mut closed: AHashSet<CellKey> = AHashSet::new();
    let mut open = BinaryHeap::new();
    let mut seq = 0u32;

    index.insert(cell_key(query.start, cell), 0);
    let start_h = heuristic(query.start, query.target);
    open.push(OpenEntry {
        f: start_h,
        h: start_h,
        g: 0.0,
        seq,
        node: 0,
    });

    let mut iterations = 0u32;
    while let Some(entry) = open.pop() {
        let current = nodes[entry.node];
        let current_key = cell_key(current.position, cell);
        // Stale entry left behind by a decrease-key, or already expanded.
        if entry.g > current.g || closed.contains(&current_key) {
            continue;
        }

        if (current.position.x - query.target.x).abs() <= tolerance
            && (current.position.y - query.target.y).abs() <= tolerance
        {
            return Some(PathResult {
                waypoints: reconstruct(&nodes, entry.node),
                cost: current.g,
                iterations,
            });
        }

        if iterations >= tuning.astar_max_iterations {
            trace!(
                mover = %mover.id,
                iterations,
                "A* iteration cap reached"
            );
            return None;
        }
        iterations += 1;
        closed.insert(current_key);

        for (dx, dy, step) in DIRECTIONS {
            let position = current.position + Vec2::new(dx, dy) * cell;
            let key = cell_key(position, cell);
            if closed.contains(&key) || !view.arena.contains(position) {
                continue;
            }
            if is_colliding(
                position,
                obstacle_radius,
                obstacles.iter().copied(),
                mover.id,
                tuning.death_animation_ticks,
            ) {
                closed.insert(key);
                continue;
            }

            let crowding = allies
                .iter()
                .filter(|ally| ally.position.distance_squared(position) < congestion_radius_sq)
                .count() as f32;
            let g = current.g + step * cell + crowding * tuning.congestion_penalty;

            let candidate = Node {
                position,
                g,
                parent: Some(entry.node),
            };
            let Some(node_idx) = relax(&mut nodes, &mut index, key, candidate) else {
                continue;
            };

            seq += 1;
            let h = heuristic(position, query.target);
            open.push(OpenEntry {
                f: g + h,
                h,
                g,
                seq,
                node: node_idx,
            });
        }
    }

    trace!(mover = %mover.id, iterations, "A* open list exhausted");
    None
}

/// Records `candidate` for `key` unless that cell already has a cheaper or
/// equal node. An improved node is updated in place (decrease-key); its older
/// heap entries go stale and are skipped on pop.
fn relax(
    nodes: &mut Vec<Node>,
    index: &mut AHashMap<CellKey, usize>,
    key: CellKey,
    candidate: Node,
) -> Option<usize> {
    match index.get(&key) {
        Some(&existing) if nodes[existing].g <= candidate.g => None,
        Some(&existing) => {
            nodes[existing] = candidate;
            Some(existing)
        },
        None => {
            nodes.push(candidate);
            let idx = nodes.len() - 1;
            index.insert(key, idx);
            Some(idx)
        },
    }
}

/// Walks parent links back to the start.
fn reconstruct(nodes: &[Node], last: usize) -> Vec<Vec2> {
    let mut waypoints = Vec::new();
    let mut cursor = Some(last);
    while let Some(idx) = cursor {
        let node = nodes[idx];
        waypoints.push(node.position);
        cursor = node.parent;
    }
    waypoints.reverse();
    waypoints
}
