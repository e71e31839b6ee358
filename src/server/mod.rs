//! Stitch server - line-delimited JSON-RPC host for the stitcher
//!
//! One request per input line, one response per output line. The server owns
//! a single board snapshot between requests.
//!
//! # Module Structure
//! - `protocol` - JSON-RPC request/response types
//! - `state` - Server state management
//! - `handlers` - Request handlers organized by functionality

pub mod handlers;
pub mod protocol;
pub mod state;

pub use protocol::{error_codes, ErrorResponse, Request, Response};
pub use state::ServerState;

use handlers::*;

/// Route a request to its handler
pub fn dispatch(state: &mut ServerState, request: Request) -> Response {
    let Request { id, method, params } = request;

    match method.as_str() {
        "Load" => handle_load(state, id, params),
        "Save" => handle_save(state, id, params),
        "Close" => handle_close(state, id),
        "GetLayers" => handle_get_layers(state, id),
        "GetSelection" => handle_get_selection(state, id),
        "ResolveGroundNet" => handle_resolve_ground_net(state, id),
        "RemoveGroundVias" => handle_remove_ground_vias(state, id),
        "StitchVias" => handle_stitch_vias(state, id, params),
        "GetStitchReport" => handle_get_stitch_report(state, id),
        _ => Response::error(id, error_codes::METHOD_NOT_FOUND, format!("Method not found: {}", method)),
    }
}

/// Parse one input line and handle it; malformed JSON becomes a parse error response
pub fn handle_line(state: &mut ServerState, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(state, request),
        Err(e) => Response::error(None, error_codes::PARSE_ERROR, format!("Parse error: {}", e)),
    }
}
