//! Queries against shells: a pruned loop over face pairs ordered by their
//! box lower bound.

use std::sync::atomic::{AtomicU64, Ordering};

use prox_core::traits::BoundingBox;
use prox_geometry::curve::Curve;
use prox_math::{Aabb3, Point3};
use prox_topology::{Face, Shell};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::config::ProximityConfig;
use crate::face::{curve_face, face_face};
use crate::point::point_face;
use crate::result::Proximity;

/// Lock-free running minimum of non-negative distances.
///
/// Non-negative `f64` values order the same way as their bit patterns, so
/// an integer `fetch_min` keeps the smallest distance.
struct RunningBest(AtomicU64);

impl RunningBest {
    fn new() -> Self {
        Self(AtomicU64::new(f64::INFINITY.to_bits()))
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Acquire))
    }

    fn offer(&self, distance: f64) {
        self.0.fetch_min(distance.max(0.0).to_bits(), Ordering::AcqRel);
    }
}

/// A pair of indices and a lower bound on their distance.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    lower: f64,
    i: usize,
    j: usize,
}

/// Evaluate candidates in ascending lower-bound order, skipping any whose
/// bound exceeds the best distance so far and stopping once that best is
/// within tolerance. Ties go to the earlier candidate.
fn pruned_min<F>(
    mut candidates: Vec<Candidate>,
    config: &ProximityConfig,
    eval: F,
) -> Option<(Proximity, usize, usize)>
where
    F: Fn(usize, usize) -> Proximity + Sync,
{
    candidates.sort_by(|a, b| {
        a.lower
            .total_cmp(&b.lower)
            .then(a.i.cmp(&b.i))
            .then(a.j.cmp(&b.j))
    });

    let best = RunningBest::new();
    let visit = |(rank, c): (usize, &Candidate)| -> Option<(usize, Proximity)> {
        let current = best.get();
        if current <= config.tolerance || c.lower > current {
            return None;
        }
        let prox = eval(c.i, c.j);
        best.offer(prox.distance);
        Some((rank, prox))
    };

    let results: Vec<(usize, Proximity)> = if config.parallel {
        candidates.par_iter().enumerate().filter_map(visit).collect()
    } else {
        candidates.iter().enumerate().filter_map(visit).collect()
    };
    debug!(
        candidates = candidates.len(),
        evaluated = results.len(),
        "pruned pair loop"
    );

    results
        .into_iter()
        .min_by(|(ra, a), (rb, b)| a.distance.total_cmp(&b.distance).then(ra.cmp(rb)))
        .map(|(rank, prox)| (prox, candidates[rank].i, candidates[rank].j))
}

fn face_boxes(shell: &Shell) -> Vec<Aabb3> {
    shell.faces().iter().map(Face::bounding_box).collect()
}

/// Candidates pairing one entity with every face of `shell`.
fn against_faces(boxes: &[Aabb3], lower: impl Fn(&Aabb3) -> f64) -> Vec<Candidate> {
    boxes
        .iter()
        .enumerate()
        .map(|(j, b)| Candidate {
            lower: lower(b),
            i: 0,
            j,
        })
        .collect()
}

/// Closest face point of `shell` to `p`; `None` for a shell without faces.
#[instrument(skip_all, fields(faces = shell.len()))]
pub fn point_shell(p: Point3, shell: &Shell, config: &ProximityConfig) -> Option<Proximity> {
    let candidates = against_faces(&face_boxes(shell), |b| b.distance_to_point(p));
    pruned_min(candidates, config, |_, j| point_face(p, &shell.faces()[j], config))
        .map(|(prox, _, j)| prox.map_second(|w| w.with_face(j)))
}

#[instrument(skip_all, fields(faces = shell.len()))]
pub fn curve_shell(curve: &Curve, shell: &Shell, config: &ProximityConfig) -> Option<Proximity> {
    let curve_box = curve.bounding_box();
    let candidates = against_faces(&face_boxes(shell), |b| b.distance(&curve_box));
    pruned_min(candidates, config, |_, j| {
        curve_face(curve, &shell.faces()[j], config)
    })
    .map(|(prox, _, j)| prox.map_second(|w| w.with_face(j)))
}

#[instrument(skip_all, fields(faces = shell.len()))]
pub fn face_shell(face: &Face, shell: &Shell, config: &ProximityConfig) -> Option<Proximity> {
    let face_box = face.bounding_box();
    let candidates = against_faces(&face_boxes(shell), |b| b.distance(&face_box));
    pruned_min(candidates, config, |_, j| face_face(face, &shell.faces()[j], config))
        .map(|(prox, _, j)| prox.map_second(|w| w.with_face(j)))
}

/// Minimum distance between two shells, with the realizing face indices
/// recorded on the witnesses.
#[instrument(skip_all, fields(faces_a = a.len(), faces_b = b.len()))]
pub fn shell_shell(a: &Shell, b: &Shell, config: &ProximityConfig) -> Option<Proximity> {
    let boxes_a = face_boxes(a);
    let boxes_b = face_boxes(b);
    let candidates = boxes_a
        .iter()
        .enumerate()
        .flat_map(|(i, ba)| {
            boxes_b.iter().enumerate().map(move |(j, bb)| Candidate {
                lower: ba.distance(bb),
                i,
                j,
            })
        })
        .collect();

    pruned_min(candidates, config, |i, j| {
        face_face(&a.faces()[i], &b.faces()[j], config)
    })
    .map(|(prox, i, j)| {
        prox.map_first(|w| w.with_face(i))
            .map_second(|w| w.with_face(j))
    })
}

/// Whether the shells come within tolerance of each other.
pub fn shells_touch(a: &Shell, b: &Shell, config: &ProximityConfig) -> bool {
    shell_shell(a, b, config).is_some_and(|prox| prox.distance <= config.tolerance)
}
