//! Query handlers: GetLayers, GetSelection

use crate::board::LayerKind;
use crate::server::protocol::Response;
use crate::server::state::ServerState;
use serde::Serialize;

/// Handle GetLayers request - copper layers top to bottom with their kind
pub fn handle_get_layers(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    #[derive(Serialize)]
    struct LayerInfo<'a> {
        name: &'a str,
        kind: Option<LayerKind>,
    }

    let Some(board) = state.board.as_ref() else {
        return Response::no_board(id);
    };

    let layers: Vec<LayerInfo> = board
        .copper_layers
        .iter()
        .map(|name| LayerInfo {
            name,
            kind: board.layer_kind(name),
        })
        .collect();

    Response::from_serializable(id, &layers)
}

/// Handle GetSelection request - segment ids selected by the last run
pub fn handle_get_selection(state: &ServerState, id: Option<serde_json::Value>) -> Response {
    let Some(board) = state.board.as_ref() else {
        return Response::no_board(id);
    };

    Response::success(id, serde_json::json!({ "selection": board.selection }))
}
