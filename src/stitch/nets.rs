//! Ground net resolution and ground via removal

use crate::board::{Board, NetId};
use log::info;

use super::error::{Result, StitchError};
use super::types::GROUND_NET_NAMES;

/// Name follows the ground convention (`GND`, `GROUND`, `VSS`, any case)
pub fn is_ground_net_name(name: &str) -> bool {
    GROUND_NET_NAMES.iter().any(|&g| g.eq_ignore_ascii_case(name))
}

/// First net in board order whose name follows the ground convention
pub fn resolve_ground_net(board: &Board) -> Result<NetId> {
    board
        .nets
        .iter()
        .find(|n| is_ground_net_name(&n.name))
        .map(|n| n.id)
        .ok_or(StitchError::GroundNetNotFound)
}

/// Delete every via on `net`
///
/// Returns `None` when the board has no such net, so callers can tell a
/// missing net apart from a net without vias.
pub fn remove_vias_on_net(board: &mut Board, net: NetId) -> Option<usize> {
    board.net(net)?;
    Some(board.remove_vias_on(net))
}

/// Resolve the ground net and remove all of its vias
pub fn remove_ground_vias(board: &mut Board) -> Result<usize> {
    let gnd = resolve_ground_net(board)?;
    let removed = remove_vias_on_net(board, gnd).unwrap_or(0);
    info!("[Nets] Removed {} vias on {}", removed, board.net_name(gnd));
    Ok(removed)
}
