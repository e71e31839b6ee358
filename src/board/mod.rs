//! Board model for the via stitcher
//!
//! The host board snapshot: everything the stitching core reads (stackup,
//! segments, vias, pads, courtyards, nets, clearances) and the handful of
//! commit operations it performs.
//!
//! # Submodules
//! - `types` - Board primitives (Point, Segment, Via, Pad, Courtyard, ...)
//! - `model` - The `Board` container with queries and commit operations
//! - `units` - Millimetre conversion at the host boundary

mod types;
mod model;
mod units;

pub use types::{
    Coord,
    NetId,
    ItemId,
    Point,
    Segment,
    ViaSpan,
    Via,
    Net,
    Pad,
    BoardSide,
    CourtyardShape,
    Courtyard,
    Footprint,
    LayerKind,
    DesignRules,
};

pub use model::Board;

pub use units::{NM_PER_MM, mm_to_nm, nm_to_mm};
