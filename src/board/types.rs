//! Core board types for via stitching
//!
//! This module contains the primitives read from the host board snapshot:
//! points, trace segments, vias, nets, pads, footprints and courtyards.
//! All coordinates are integer nanometres.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Board coordinate in nanometres
pub type Coord = i64;

/// Net code as assigned by the host
pub type NetId = u32;

/// Identifier of a board item (segment, via, pad)
pub type ItemId = u64;

/// A 2D point in nanometres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single straight copper run on one layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: ItemId,
    pub start: Point,
    pub end: Point,
    pub net: NetId,
    pub width: Coord,
    pub layer: String,
    /// Clearance from the segment's own design rule, if the host resolved one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearance: Option<Coord>,
}

impl Segment {
    /// Euclidean length in nanometres
    pub fn length(&self) -> f64 {
        let dx = (self.end.x - self.start.x) as f64;
        let dy = (self.end.y - self.start.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Copper layer pair a via connects (inclusive)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViaSpan {
    pub top: String,
    pub bottom: String,
}

/// Plated via; a missing span means a through via
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub id: ItemId,
    pub position: Point,
    pub diameter: Coord,
    pub drill: Coord,
    pub net: NetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<ViaSpan>,
}

impl Via {
    pub fn radius(&self) -> Coord {
        self.diameter / 2
    }
}

/// Net code and name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Net {
    pub id: NetId,
    pub name: String,
}

/// Copper pad of a footprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub id: ItemId,
    pub position: Point,
    /// Footprint-local size (x, y)
    pub size: (Coord, Coord),
    #[serde(default)]
    pub net: NetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_clearance: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soldermask_expansion: Option<Coord>,
    /// Copper layers the pad occupies
    pub layers: Vec<String>,
}

impl Pad {
    /// Radius of the circle enclosing the larger pad dimension
    pub fn radius(&self) -> Coord {
        self.size.0.max(self.size.1) / 2
    }

    pub fn is_on_layer(&self, layer: &str) -> bool {
        self.layers.iter().any(|l| l == layer)
    }
}

/// Board side a courtyard belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardSide {
    Front,
    Back,
}

/// Courtyard outline primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CourtyardShape {
    Polygon { points: Vec<Point> },
    Rect { min: Point, max: Point },
    Circle { center: Point, radius: Coord },
}

/// Footprint keep-out boundary on one side of the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Courtyard {
    pub side: BoardSide,
    #[serde(flatten)]
    pub shape: CourtyardShape,
}

/// Placed component with its pads and courtyards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub reference: String,
    #[serde(default)]
    pub pads: Vec<Pad>,
    #[serde(default)]
    pub courtyards: Vec<Courtyard>,
}

/// Position of a copper layer in the stackup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Top,
    Inner,
    Bottom,
}

/// Board-level design rules
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignRules {
    /// Default clearance from the board's netclass setup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_clearance: Option<Coord>,
}
