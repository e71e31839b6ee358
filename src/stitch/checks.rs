//! Acceptance checks for a via candidate

use crate::board::{Coord, Courtyard, CourtyardShape, ItemId, NetId};
use log::trace;

use super::clearance::{pad_keepout, ClearanceCalculator};
use super::distance::{
    disk_overlaps_circle, disk_overlaps_polygon, disk_overlaps_rect, point_distance, point_segment_distance,
};
use super::obstacles::{Obstacle, ObstacleIndex, ObstacleKind};
use super::types::{TuningArea, ViaCandidate, SAME_NET_MIN_CLEARANCE};

/// Why a candidate was rejected
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    Courtyard,
    TuningArea,
    Copper { obstacle: Option<ItemId> },
}

/// Copper clearance context of the track being walked
#[derive(Clone, Copy, Debug)]
pub struct CopperRule<'a> {
    pub track_net: NetId,
    pub clearance: Coord,
    /// Layer of the walked track
    pub layer: &'a str,
    /// Segment currently being walked; never tested against its own vias
    pub exclude_segment: Option<ItemId>,
}

impl CopperRule<'_> {
    /// Only the walked segment itself is exempt, never a pad, via or other-layer item sharing its id
    fn exempts(&self, layer: &str, obstacle: &Obstacle) -> bool {
        matches!(obstacle.kind, ObstacleKind::Track { .. })
            && layer == self.layer
            && self.exclude_segment.is_some()
            && obstacle.id == self.exclude_segment
    }
}

/// Through vias may not touch any courtyard, front or back
pub fn via_collides_with_courtyards(candidate: &ViaCandidate, courtyards: &[Courtyard]) -> bool {
    let (center, radius) = (candidate.position, candidate.radius());
    courtyards.iter().any(|c| match &c.shape {
        CourtyardShape::Polygon { points } => disk_overlaps_polygon(center, radius, points),
        CourtyardShape::Rect { min, max } => disk_overlaps_rect(center, radius, *min, *max),
        CourtyardShape::Circle { center: other, radius: other_radius } => {
            disk_overlaps_circle(center, radius, *other, *other_radius)
        }
    })
}

/// Length tuning keep-outs
pub fn via_collides_with_tuning_areas(candidate: &ViaCandidate, areas: &[TuningArea]) -> bool {
    areas
        .iter()
        .any(|a| disk_overlaps_rect(candidate.position, candidate.radius(), a.min, a.max))
}

/// First copper obstacle on any layer the candidate would violate
pub fn via_collides_with_copper<'a>(
    candidate: &ViaCandidate,
    index: &'a ObstacleIndex,
    calculator: &ClearanceCalculator,
    rule: &CopperRule<'_>,
) -> Option<&'a Obstacle> {
    let radius = candidate.radius();
    let p = candidate.position;
    // Widest clearance any obstacle can ask for, plus the pad fallback keep-out
    let reach = radius + rule.clearance.max(SAME_NET_MIN_CLEARANCE) + rule.clearance;

    index
        .near(p, reach)
        .filter(|(layer, obstacle)| !rule.exempts(layer, obstacle))
        .map(|(_, obstacle)| obstacle)
        .find(|obstacle| {
            let check_radius =
                (radius + calculator.obstacle_clearance(obstacle.net, rule.track_net, rule.clearance)) as f64;

            match &obstacle.kind {
                ObstacleKind::Track { start, end, width } => {
                    point_segment_distance(p, *start, *end) < check_radius + (width / 2) as f64
                }
                ObstacleKind::Via { position, diameter } => {
                    point_distance(p, *position) < check_radius + (diameter / 2) as f64
                }
                ObstacleKind::Pad {
                    position,
                    radius: pad_radius,
                    local_clearance,
                    soldermask_expansion,
                } => {
                    let keepout = pad_keepout(*local_clearance, *soldermask_expansion, rule.clearance);
                    point_distance(p, *position) < check_radius + (pad_radius + keepout) as f64
                }
            }
        })
}

/// Run every check in order: courtyards, tuning areas, copper
pub fn check_candidate(
    candidate: &ViaCandidate,
    courtyards: &[Courtyard],
    tuning_areas: &[TuningArea],
    index: &ObstacleIndex,
    calculator: &ClearanceCalculator,
    rule: &CopperRule<'_>,
) -> Result<(), Rejection> {
    if via_collides_with_courtyards(candidate, courtyards) {
        trace!("[Checks] {} rejected: courtyard", candidate.position);
        return Err(Rejection::Courtyard);
    }
    if via_collides_with_tuning_areas(candidate, tuning_areas) {
        trace!("[Checks] {} rejected: tuning area", candidate.position);
        return Err(Rejection::TuningArea);
    }
    if let Some(obstacle) = via_collides_with_copper(candidate, index, calculator, rule) {
        trace!("[Checks] {} rejected: copper {:?}", candidate.position, obstacle.id);
        return Err(Rejection::Copper { obstacle: obstacle.id });
    }
    Ok(())
}
