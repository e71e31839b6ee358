//! Board snapshot: the host model the stitcher reads from and commits to

use super::types::*;
use serde::{Deserialize, Serialize};

/// In-memory board: copper stackup, routing, footprints and nets
///
/// Geometry is read-only for the stitching core; the only mutations are the
/// commit operations (`add_via`, `remove_vias_on`, `set_selection`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    /// Copper layer names ordered top to bottom
    pub copper_layers: Vec<String>,
    #[serde(default)]
    pub nets: Vec<Net>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    #[serde(default)]
    pub vias: Vec<Via>,
    #[serde(default)]
    pub footprints: Vec<Footprint>,
    #[serde(default)]
    pub design_rules: DesignRules,
    /// Segment ids surfaced to the user after the last operation
    #[serde(default)]
    pub selection: Vec<ItemId>,
}

impl Board {
    /// Index of a copper layer in the stackup (0 = top)
    pub fn layer_index(&self, layer: &str) -> Option<usize> {
        self.copper_layers.iter().position(|l| l == layer)
    }

    /// Classify a copper layer as top, inner or bottom
    pub fn layer_kind(&self, layer: &str) -> Option<LayerKind> {
        let index = self.layer_index(layer)?;
        Some(if index == 0 {
            LayerKind::Top
        } else if index + 1 == self.copper_layers.len() {
            LayerKind::Bottom
        } else {
            LayerKind::Inner
        })
    }

    /// Copper layers a via occupies, in stackup order
    ///
    /// Through vias (no span) and spans naming unknown layers cover the whole stackup.
    pub fn via_layers(&self, via: &Via) -> &[String] {
        let all = &self.copper_layers[..];
        let Some(span) = &via.span else {
            return all;
        };
        match (self.layer_index(&span.top), self.layer_index(&span.bottom)) {
            (Some(a), Some(b)) => &all[a.min(b)..=a.max(b)],
            _ => all,
        }
    }

    pub fn net(&self, id: NetId) -> Option<&Net> {
        self.nets.iter().find(|n| n.id == id)
    }

    /// Net name, or a `#<code>` placeholder for unknown codes
    pub fn net_name(&self, id: NetId) -> String {
        self.net(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| format!("#{}", id))
    }

    /// Trace segments on one copper layer, in board order
    pub fn segments_on<'a>(&'a self, layer: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.segments.iter().filter(move |s| s.layer == layer)
    }

    /// All pads of all footprints
    pub fn pads(&self) -> impl Iterator<Item = &Pad> {
        self.footprints.iter().flat_map(|f| f.pads.iter())
    }

    /// Allocate a fresh item id above every id present on the board
    pub fn allocate_id(&self) -> ItemId {
        self.segments
            .iter()
            .map(|s| s.id)
            .chain(self.vias.iter().map(|v| v.id))
            .chain(self.pads().map(|p| p.id))
            .max()
            .map_or(1, |id| id + 1)
    }

    /// Add a through via and return its id
    pub fn add_via(&mut self, position: Point, diameter: Coord, drill: Coord, net: NetId) -> ItemId {
        let id = self.allocate_id();
        self.vias.push(Via {
            id,
            position,
            diameter,
            drill,
            net,
            span: None,
        });
        id
    }

    /// Remove every via on `net`, returning how many were removed
    pub fn remove_vias_on(&mut self, net: NetId) -> usize {
        let before = self.vias.len();
        self.vias.retain(|v| v.net != net);
        before - self.vias.len()
    }

    /// Replace the current selection
    pub fn set_selection(&mut self, ids: Vec<ItemId>) {
        self.selection = ids;
    }
}
