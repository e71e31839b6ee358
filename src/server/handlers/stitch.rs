//! Stitching handlers: ResolveGroundNet, RemoveGroundVias, StitchVias, GetStitchReport

use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use crate::stitch::{remove_ground_vias, resolve_ground_net, run_stitching, StitchError, StitchParams, StitchReport};
use log::{info, warn};

fn report_json(report: &StitchReport) -> serde_json::Value {
    serde_json::json!({
        "report": report,
        "attempted": report.attempted(),
        "success_rate": report.success_rate(),
        "density_warning": report.density_warning(),
        "summary": report.summary(),
    })
}

/// Handle ResolveGroundNet request - finds the net stitching vias are placed on
pub fn handle_resolve_ground_net(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    let Some(board) = state.board.as_ref() else {
        return Response::no_board(id);
    };

    match resolve_ground_net(board) {
        Ok(net) => Response::success(
            id,
            serde_json::json!({
                "net_id": net,
                "net_name": board.net_name(net),
            }),
        ),
        Err(e) => Response::error(id, error_codes::GROUND_NET_NOT_FOUND, e.to_string()),
    }
}

/// Handle RemoveGroundVias request - deletes every via on the ground net
pub fn handle_remove_ground_vias(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    let Some(board) = state.board.as_mut() else {
        return Response::no_board(id);
    };

    match remove_ground_vias(board) {
        Ok(removed) => Response::success(id, serde_json::json!({ "removed": removed })),
        // Informational: nothing to remove
        Err(e @ StitchError::GroundNetNotFound) => Response::success(
            id,
            serde_json::json!({
                "removed": null,
                "message": e.to_string(),
            }),
        ),
        Err(e) => Response::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
    }
}

/// Handle StitchVias request - runs a full stitching pass with the given parameters
pub fn handle_stitch_vias(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    let params: StitchParams = match params {
        None | Some(serde_json::Value::Null) => StitchParams::default(),
        Some(p) => match serde_json::from_value(p) {
            Ok(p) => p,
            Err(e) => {
                return Response::error(id, error_codes::INVALID_PARAMS, format!("Invalid stitch params: {}", e));
            }
        },
    };

    let Some(board) = state.board.as_mut() else {
        return Response::no_board(id);
    };

    info!(
        "[Server] Stitching: distance {} mm, via {}/{} mm, remove existing: {}",
        params.stitch_distance_mm, params.via_diameter_mm, params.via_drill_mm, params.remove_existing_vias
    );

    match run_stitching(board, &params) {
        Ok(report) => {
            let result = report_json(&report);
            state.last_report = Some(report);
            Response::success(id, result)
        }
        Err(e @ (StitchError::RingTooSmall { .. } | StitchError::InvalidParameter { .. })) => {
            Response::error(id, error_codes::INVALID_PARAMS, e.to_string())
        }
        Err(e) => {
            warn!("[Server] Stitching failed: {}", e);
            state.last_report = None;
            Response::error(id, error_codes::STITCH_FAILED, e.to_string())
        }
    }
}

/// Handle GetStitchReport request - returns the report of the last successful run
pub fn handle_get_stitch_report(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    if !state.is_file_loaded() {
        return Response::no_board(id);
    }

    match &state.last_report {
        Some(report) => Response::success(id, report_json(report)),
        None => Response::error(id, error_codes::NO_REPORT, "No stitching run yet".to_string()),
    }
}
