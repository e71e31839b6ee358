//! Stitching operation runner
//!
//! Drives one complete stitching pass over a board:
//! 1. validate parameters (nothing is touched on failure)
//! 2. optionally remove existing ground vias
//! 3. gather and reconstruct the selected layers (in parallel)
//! 4. walk every track layer by layer, committing each layer's vias
//! 5. select the longest track and build the report

use crate::board::{nm_to_mm, Board, Coord, LayerKind};
use log::{info, warn};
use rayon::prelude::*;
use std::time::Instant;

use super::clearance::ClearanceCalculator;
use super::error::{Result, StitchError};
use super::nets::{remove_ground_vias, resolve_ground_net};
use super::obstacles::{build_courtyards, ObstacleIndex};
use super::tracks::{Track, TrackReconstructor};
use super::types::{LayerReport, LongestTrack, StitchParams, StitchReport};
use super::walker::{ViaWalker, WalkOutcome};

/// Copper layers taking part in stitching, top to bottom
///
/// A layer is selected when its kind is enabled in `params` and it carries at
/// least one trace segment.
pub fn selected_layers(board: &Board, params: &StitchParams) -> Vec<String> {
    board
        .copper_layers
        .iter()
        .filter(|layer| {
            board
                .layer_kind(layer)
                .map(|kind: LayerKind| params.includes(kind))
                .unwrap_or(false)
        })
        .filter(|layer| board.segments_on(layer).next().is_some())
        .cloned()
        .collect()
}

/// Run a full stitching pass
///
/// Parameter and ring errors abort before any change. A layer whose tracks
/// cannot be reconstructed aborts the run; vias of the layers before it stay
/// on the board.
pub fn run_stitching(board: &mut Board, params: &StitchParams) -> Result<StitchReport> {
    let start_total = Instant::now();
    let settings = params.to_settings()?;
    let mut report = StitchReport::default();
    let missing_ground = StitchError::GroundNetNotFound.to_string();

    if params.remove_existing_vias {
        match remove_ground_vias(board) {
            Ok(count) => report.removed_vias = Some(count),
            Err(StitchError::GroundNetNotFound) => report.notes.push(missing_ground.clone()),
            Err(e) => return Err(e),
        }
    }

    if !params.stitches_any_layer() {
        info!("[Stitch] No layers selected for stitching");
        return Ok(report);
    }

    let layers = selected_layers(board, params);

    let start_reconstruct = Instant::now();
    let reconstructor = TrackReconstructor::new(board);
    let reconstructed: Vec<(String, usize, Result<Vec<Track>>)> = layers
        .par_iter()
        .map(|layer| {
            let segment_count = board.segments_on(layer).count();
            (layer.clone(), segment_count, reconstructor.reconstruct_layer(layer))
        })
        .collect();
    info!(
        "[Stitch] Reconstructed {} layers in {:.2?}",
        reconstructed.len(),
        start_reconstruct.elapsed()
    );

    let ground = resolve_ground_net(board).ok();
    match ground {
        Some(net) => report.ground_net = Some(board.net_name(net)),
        None => {
            warn!("[Stitch] No ground net on the board, no vias will be placed");
            if !report.notes.contains(&missing_ground) {
                report.notes.push(missing_ground);
            }
        }
    }

    let calculator = ClearanceCalculator::new(board);
    let courtyards = build_courtyards(board);
    let mut index = ground.map(|_| ObstacleIndex::build(board));
    let mut longest: Option<(f64, Track)> = None;

    for (layer, segment_count, tracks) in reconstructed {
        let tracks = tracks.map_err(|e| {
            warn!("[Stitch] Aborting on layer {}: {}", layer, e);
            e
        })?;

        let mut layer_report = LayerReport {
            layer,
            segment_count,
            track_count: tracks.len(),
            ..Default::default()
        };

        if let (Some(gnd), Some(index)) = (ground, index.as_mut()) {
            let start_walk = Instant::now();
            let walker = ViaWalker::new(settings, gnd, &calculator, &courtyards);
            let mut outcome = WalkOutcome::default();
            for track in &tracks {
                outcome.absorb(walker.stitch(track, &tracks, index));
            }

            for via in &outcome.placed {
                board.add_via(via.position, via.diameter, via.drill, via.target_net);
            }

            layer_report.placed = outcome.placed.len();
            layer_report.skipped = outcome.skipped;
            report.placed += layer_report.placed;
            report.skipped += layer_report.skipped;

            info!(
                "[Stitch] Layer {}: {} tracks, {} vias placed, {} skipped in {:.2?}",
                layer_report.layer,
                layer_report.track_count,
                layer_report.placed,
                layer_report.skipped,
                start_walk.elapsed()
            );
        }

        for track in tracks {
            let length = track.length();
            if longest.as_ref().map_or(true, |(best, _)| length > *best) {
                longest = Some((length, track));
            }
        }

        report.layers.push(layer_report);
    }

    if let Some((length, track)) = longest {
        board.set_selection(track.segment_ids());
        report.longest_track = Some(LongestTrack {
            layer: track.layer.clone(),
            net: board.net_name(track.net),
            length_mm: nm_to_mm(length.round() as Coord),
            segment_count: track.segments.len(),
        });
    }

    info!(
        "[Stitch] Done: {} placed, {} skipped over {} layers in {:.2?}",
        report.placed,
        report.skipped,
        report.layers.len(),
        start_total.elapsed()
    );

    Ok(report)
}
