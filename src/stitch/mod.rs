//! Via stitching engine
//!
//! Places ground vias alongside routed tracks: segments are grouped into
//! tracks, each track is walked at a fixed interval, and every candidate via is
//! checked against courtyards and copper before it is committed.
//!
//! # Submodules
//! - `types` - Constants, parameters, candidates and the report
//! - `error` - Typed stitching errors
//! - `distance` - Point, segment and disk geometry
//! - `tracks` - Track reconstruction and path ordering
//! - `obstacles` - Per-layer R-tree of copper obstacles, courtyards
//! - `clearance` - Lateral offsets and obstacle clearances
//! - `checks` - Candidate acceptance tests
//! - `walker` - Arc-length walk and via placement
//! - `nets` - Ground net resolution and via removal
//! - `runners` - Full stitching pass over a board

mod types;
mod error;
mod distance;
mod tracks;
mod obstacles;
mod clearance;
mod checks;
mod walker;
mod nets;
mod runners;

pub use types::{
    COORD_TOLERANCE,
    MIN_VIA_RING,
    DEFAULT_CLEARANCE,
    MIN_SINGLE_TRACE_CLEARANCE,
    SAME_NET_MIN_CLEARANCE,
    MAX_PARAMETER_MM,
    GROUND_NET_NAMES,
    StitchParams,
    StitchSettings,
    ViaCandidate,
    TuningArea,
    LayerReport,
    LongestTrack,
    StitchReport,
    validate_via_ring,
};

pub use error::{Result, StitchError};

pub use distance::{
    coords_match,
    points_match,
    point_distance,
    point_segment_distance,
    direction,
    perpendicular,
    point_in_polygon,
};

pub use tracks::{Track, Run, TrackReconstructor, sort_into_path, max_path_gap};

pub use obstacles::{Obstacle, ObstacleKind, ObstacleIndex, build_courtyards};

pub use clearance::{ClearanceCalculator, OffsetPlan, diff_pair_sibling_name, pad_keepout};

pub use checks::{
    CopperRule,
    Rejection,
    check_candidate,
    via_collides_with_courtyards,
    via_collides_with_tuning_areas,
    via_collides_with_copper,
};

pub use walker::{ViaWalker, WalkOutcome};

pub use nets::{is_ground_net_name, resolve_ground_net, remove_vias_on_net, remove_ground_vias};

pub use runners::{run_stitching, selected_layers};
