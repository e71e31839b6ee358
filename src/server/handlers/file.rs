//! File operations: Load, Save, Close

use crate::server::protocol::{error_codes, Response};
use crate::server::state::ServerState;
use crate::{load_board_file, save_board_file};
use log::info;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;

/// Handle Load request - reads a JSON board snapshot
pub fn handle_load(
    state: &mut ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize)]
    struct LoadParams {
        file_path: String,
    }

    let params: LoadParams = match params.and_then(|p| serde_json::from_value(p).ok()) {
        Some(p) => p,
        None => {
            return Response::error(
                id,
                error_codes::INVALID_PARAMS,
                "Invalid params: expected {file_path: string}".to_string(),
            );
        }
    };

    info!("[Server] Loading board: {}", params.file_path);
    let start = Instant::now();

    let board = match load_board_file(&params.file_path) {
        Ok(board) => board,
        Err(e) => {
            return Response::error(id, error_codes::LOAD_FAILED, format!("{:#}", e));
        }
    };

    let result = serde_json::json!({
        "status": "ok",
        "copper_layers": board.copper_layers.len(),
        "segments": board.segments.len(),
        "vias": board.vias.len(),
        "nets": board.nets.len(),
        "footprints": board.footprints.len(),
    });

    info!(
        "[Server] Loaded {} segments, {} vias on {} copper layers in {:.2?}",
        board.segments.len(),
        board.vias.len(),
        board.copper_layers.len(),
        start.elapsed()
    );

    state.board_path = Some(params.file_path);
    state.board = Some(board);
    state.last_report = None;

    Response::success(id, result)
}

/// Handle Save request - writes the board to `file_path`, or next to the loaded file
///
/// Without a path the output goes to `<stem>_stitched.<ext>` beside the source;
/// the loaded file itself is never overwritten implicitly.
pub fn handle_save(
    state: &ServerState,
    id: Option<serde_json::Value>,
    params: Option<serde_json::Value>,
) -> Response {
    #[derive(Deserialize, Default)]
    struct SaveParams {
        file_path: Option<String>,
    }

    let params: SaveParams = match params {
        None | Some(serde_json::Value::Null) => SaveParams::default(),
        Some(p) => match serde_json::from_value(p) {
            Ok(p) => p,
            Err(e) => {
                return Response::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid params: expected {{file_path?: string}}: {}", e),
                );
            }
        },
    };

    let Some(board) = state.board.as_ref() else {
        return Response::no_board(id);
    };

    let Some(output_path) = params
        .file_path
        .or_else(|| state.board_path.as_deref().map(default_output_path))
    else {
        return Response::error(id, error_codes::INVALID_PARAMS, "No output path given".to_string());
    };

    info!("[Server] Saving board to: {}", output_path);

    match save_board_file(board, &output_path) {
        Ok(()) => Response::success(
            id,
            serde_json::json!({
                "status": "ok",
                "file_path": output_path,
            }),
        ),
        Err(e) => Response::error(id, error_codes::SAVE_FAILED, format!("{:#}", e)),
    }
}

/// Sibling of `input` named `<stem>_stitched.<ext>`
pub fn default_output_path(input: &str) -> String {
    let path = Path::new(input);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("board");
    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_stitched.{}", stem, ext),
        None => format!("{}_stitched", stem),
    };
    path.with_file_name(file_name).to_string_lossy().into_owned()
}

/// Handle Close request - clears all state
pub fn handle_close(state: &mut ServerState, id: Option<serde_json::Value>) -> Response {
    state.clear();
    info!("[Server] Board closed");
    Response::success(id, serde_json::json!({ "status": "ok" }))
}
