//! Per-layer obstacle index for via placement
//!
//! An R-tree per copper layer holding every track segment, via and pad that a
//! new via must clear. Filled zones are deliberately absent: a via may land in
//! a pour, which re-flows around it. Accepted vias are inserted as they are
//! placed so later candidates in the same run see them.

use crate::board::{Board, Coord, Courtyard, ItemId, NetId, Pad, Point, Segment, Via};
use indexmap::IndexMap;
use log::info;
use rayon::prelude::*;
use rstar::{RTree, RTreeObject, AABB};

use super::types::ViaCandidate;

/// Geometry of an obstacle
#[derive(Clone, Debug, PartialEq)]
pub enum ObstacleKind {
    Track {
        start: Point,
        end: Point,
        width: Coord,
    },
    Via {
        position: Point,
        diameter: Coord,
    },
    Pad {
        position: Point,
        radius: Coord,
        local_clearance: Option<Coord>,
        soldermask_expansion: Option<Coord>,
    },
}

/// Copper object wrapper for R-tree spatial indexing
#[derive(Clone, Debug)]
pub struct Obstacle {
    /// Board item id; `None` for vias placed during the current run
    pub id: Option<ItemId>,
    pub net: NetId,
    pub kind: ObstacleKind,
    bounds: AABB<[Coord; 2]>,
}

impl Obstacle {
    pub fn track(segment: &Segment) -> Self {
        let half = segment.width / 2;
        Self {
            id: Some(segment.id),
            net: segment.net,
            kind: ObstacleKind::Track {
                start: segment.start,
                end: segment.end,
                width: segment.width,
            },
            bounds: AABB::from_corners(
                [segment.start.x.min(segment.end.x) - half, segment.start.y.min(segment.end.y) - half],
                [segment.start.x.max(segment.end.x) + half, segment.start.y.max(segment.end.y) + half],
            ),
        }
    }

    pub fn via(via: &Via) -> Self {
        Self::disk(Some(via.id), via.net, via.position, via.diameter)
    }

    pub fn candidate(candidate: &ViaCandidate) -> Self {
        Self::disk(None, candidate.target_net, candidate.position, candidate.diameter)
    }

    fn disk(id: Option<ItemId>, net: NetId, position: Point, diameter: Coord) -> Self {
        Self {
            id,
            net,
            kind: ObstacleKind::Via { position, diameter },
            bounds: square(position, diameter / 2),
        }
    }

    pub fn pad(pad: &Pad) -> Self {
        let radius = pad.radius();
        // Envelope covers what the pad knows about its own keep-out; the
        // fallback clearance is added on the query side
        let margin = pad
            .local_clearance
            .unwrap_or(0)
            .max(pad.soldermask_expansion.unwrap_or(0).abs());
        Self {
            id: Some(pad.id),
            net: pad.net,
            kind: ObstacleKind::Pad {
                position: pad.position,
                radius,
                local_clearance: pad.local_clearance,
                soldermask_expansion: pad.soldermask_expansion,
            },
            bounds: square(pad.position, radius + margin),
        }
    }
}

fn square(center: Point, half: Coord) -> AABB<[Coord; 2]> {
    AABB::from_corners(
        [center.x.saturating_sub(half), center.y.saturating_sub(half)],
        [center.x.saturating_add(half), center.y.saturating_add(half)],
    )
}

impl RTreeObject for Obstacle {
    type Envelope = AABB<[Coord; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

/// Copper obstacles per layer, in stackup order
pub struct ObstacleIndex {
    layers: IndexMap<String, RTree<Obstacle>>,
}

impl ObstacleIndex {
    /// Collect the tracks, vias and pads of every copper layer
    pub fn build(board: &Board) -> Self {
        let start = std::time::Instant::now();

        let layers: Vec<(String, RTree<Obstacle>)> = board
            .copper_layers
            .par_iter()
            .map(|layer| {
                let mut obstacles: Vec<Obstacle> = board.segments_on(layer).map(Obstacle::track).collect();

                obstacles.extend(
                    board
                        .vias
                        .iter()
                        .filter(|v| board.via_layers(v).iter().any(|l| l == layer))
                        .map(Obstacle::via),
                );

                obstacles.extend(board.pads().filter(|p| p.is_on_layer(layer)).map(Obstacle::pad));

                (layer.clone(), RTree::bulk_load(obstacles))
            })
            .collect();

        let index = Self {
            layers: layers.into_iter().collect(),
        };

        info!(
            "[Obstacles] Indexed {} obstacles on {} copper layers in {:?}",
            index.len(),
            index.layers.len(),
            start.elapsed()
        );

        index
    }

    /// Fold an accepted through via into every layer
    pub fn insert_via(&mut self, candidate: &ViaCandidate) {
        let obstacle = Obstacle::candidate(candidate);
        for tree in self.layers.values_mut() {
            tree.insert(obstacle.clone());
        }
    }

    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn obstacles_on<'a>(&'a self, layer: &str) -> impl Iterator<Item = &'a Obstacle> + 'a {
        self.layers.get(layer).into_iter().flat_map(|tree| tree.iter())
    }

    /// Total entries over all layers (multi-layer items count once per layer)
    pub fn len(&self) -> usize {
        self.layers.values().map(RTree::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Obstacles on any layer whose envelope comes within `reach` of `center`, with their layer
    pub fn near(&self, center: Point, reach: Coord) -> impl Iterator<Item = (&str, &Obstacle)> + '_ {
        let search = square(center, reach);
        self.layers.iter().flat_map(move |(layer, tree)| {
            tree.locate_in_envelope_intersecting(&search)
                .map(move |obstacle| (layer.as_str(), obstacle))
        })
    }
}

/// Front and back courtyards of every footprint
pub fn build_courtyards(board: &Board) -> Vec<Courtyard> {
    board
        .footprints
        .iter()
        .flat_map(|f| f.courtyards.iter().cloned())
        .collect()
}
