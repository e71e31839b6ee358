//! Ground via stitching for PCB layouts
//!
//! - `board` - Board snapshot: stackup, routing, footprints, nets
//! - `stitch` - Track reconstruction, offset math and via placement
//! - `server` - Line-delimited JSON-RPC host around the stitcher

pub mod board;
pub mod server;
pub mod stitch;

use anyhow::Context;
use board::Board;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Reads a JSON board snapshot from disk
///
/// # Example
/// ```ignore
/// let board = load_board_file("tests/fixtures/stitch_board.json")?;
/// println!("{} copper layers", board.copper_layers.len());
/// ```
pub fn load_board_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Board> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open board file {}", path.display()))?;
    let board: Board = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse board file {}", path.display()))?;

    if board.copper_layers.is_empty() {
        anyhow::bail!("Board file {} defines no copper layers", path.display());
    }

    Ok(board)
}

/// Writes a board snapshot as pretty-printed JSON
pub fn save_board_file<P: AsRef<Path>>(board: &Board, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), board)
        .with_context(|| format!("Failed to write board to {}", path.display()))?;
    Ok(())
}
