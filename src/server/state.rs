//! Server state management for the stitch server

use crate::board::Board;
use crate::stitch::StitchReport;

/// In-memory state: the loaded board and the outcome of the last stitching run
#[derive(Default)]
pub struct ServerState {
    pub board_path: Option<String>,
    pub board: Option<Board>,
    pub last_report: Option<StitchReport>,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_file_loaded(&self) -> bool {
        self.board.is_some()
    }

    /// Drop the board and everything derived from it
    pub fn clear(&mut self) {
        self.board_path = None;
        self.board = None;
        self.last_report = None;
    }
}
