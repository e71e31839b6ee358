//! Typed errors for stitching operations

use crate::board::{Coord, Point};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StitchError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StitchError {
    #[error("via ring too small: ring width {ring} nm is below the minimum of {minimum} nm")]
    RingTooSmall { ring: Coord, minimum: Coord },
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("net mismatch on layer {layer}: traces share endpoint {at} but have different nets {net_a} and {net_b}")]
    NetMismatch {
        layer: String,
        net_a: String,
        net_b: String,
        at: Point,
    },
    #[error("no GND net found in the board")]
    GroundNetNotFound,
}
