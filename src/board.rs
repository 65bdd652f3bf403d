//! The board model consumed by the DRC engine.
//!
//! The board (copper traces, vias, pads, planes, holes, polygons, silkscreen,
//! courtyards, stroke text, device placements) is owned entirely by the
//! host application — the schematic editor, the S-expression persistence
//! layer and the library database that produce it are out of scope here
//! (see `spec.md` §1). This module defines the `Board` trait the DRC engine
//! consumes, the shape-bearing entity types, and a minimal in-memory
//! reference implementation used by this crate's own tests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Path, Point};
use crate::layer::LayerStack;
use crate::net::NetSignal;
use crate::units::Length;

/// A non-plated or plated through hole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hole {
    pub position: Point,
    pub diameter: Length,
    pub plated: bool,
    /// `None` for a round hole; `Some(path)` for a slot, the path being the
    /// drill path the tool follows (straight single-segment, multi-segment,
    /// or curved).
    pub slot_path: Option<Path>,
}

impl Hole {
    pub fn is_slot(&self) -> bool {
        self.slot_path.is_some()
    }

    /// Classifies a slot's shape for the "allowed slots" policy check.
    pub fn slot_class(&self) -> SlotClass {
        match &self.slot_path {
            None => SlotClass::Round,
            Some(path) => {
                let verts = path.vertices();
                let has_arc = verts.iter().any(|v| !v.arc_angle.is_zero());
                if has_arc {
                    SlotClass::Curved
                } else if verts.len() <= 2 {
                    SlotClass::StraightSingleSegment
                } else {
                    SlotClass::StraightMultiSegment
                }
            }
        }
    }

    /// The slot's width: for a round hole this is the diameter itself.
    pub fn width(&self) -> Length {
        self.diameter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotClass {
    Round,
    StraightSingleSegment,
    StraightMultiSegment,
    Curved,
}

/// A via connecting copper layers through a plated hole.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Via {
    pub position: Point,
    /// Copper annular diameter.
    pub size: Length,
    pub drill: Length,
    pub net: Option<NetSignal>,
}

/// A straight or obround segment of copper belonging to a net.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetLine {
    pub start: Point,
    pub end: Point,
    pub width: Length,
    pub layer: String,
    pub net: Option<NetSignal>,
}

/// A connected sub-graph of copper carrying exactly one net signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetSegment {
    pub net: NetSignal,
    pub line_indices: Vec<usize>,
}

/// A flood-filled copper region on a signal layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plane {
    pub layer: String,
    pub net: Option<NetSignal>,
    pub outline: Path,
    /// The computed filled area, read directly by the path generator.
    /// Populated by `Board::rebuild_all_planes`.
    pub filled_area: Option<Path>,
    pub min_width: Length,
}

/// A copper (or silkscreen) polygon drawn directly on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardPolygon {
    pub layer: String,
    pub outline: Path,
    pub net: Option<NetSignal>,
    pub width: Length,
    pub filled: bool,
}

/// A filled or stroked circle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circle {
    pub layer: String,
    pub center: Point,
    pub diameter: Length,
    pub net: Option<NetSignal>,
    pub width: Length,
    pub filled: bool,
}

/// A single geometry a pad contributes on one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PadGeometry {
    pub layer: String,
    pub outline: Path,
}

/// A solder pad, possibly present on several layers at once (SMT on one
/// side, THT on every copper layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pad {
    pub origin: Point,
    pub geometries: Vec<PadGeometry>,
    pub hole: Option<Hole>,
    pub net: Option<NetSignal>,
    /// Layers on which a net-line is connected to this pad.
    pub connected_layers: Vec<String>,
}

impl Pad {
    pub fn geometry_on(&self, layer: &str) -> Option<&PadGeometry> {
        self.geometries.iter().find(|g| g.layer == layer)
    }
}

/// Stroked text (silkscreen or copper-layer fabrication marking).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrokeText {
    pub layer: String,
    pub stroke_path: Path,
    pub stroke_width: Length,
}

/// A placed device: a footprint instance plus its pads, holes, courtyard
/// and stroke text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub component_uuid: Uuid,
    pub reference: String,
    pub pads: Vec<Pad>,
    pub holes: Vec<Hole>,
    pub stroke_texts: Vec<StrokeText>,
    pub top_courtyard: Option<Path>,
    pub bot_courtyard: Option<Path>,
}

/// A logical component from the circuit/schematic domain, possibly without
/// a placed `Device` yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInstance {
    pub uuid: Uuid,
    pub reference: String,
    pub schematic_only: bool,
}

/// An unrouted logical connection inferred from the netlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirWire {
    pub net: NetSignal,
    pub start: Point,
    pub end: Point,
}

/// The board-model interface consumed by the DRC engine (spec.md §6.1).
/// Implementations are host-owned; the DRC engine only ever borrows.
pub trait Board {
    fn layer_stack(&self) -> &LayerStack;
    fn net_segments(&self) -> &[NetSegment];
    fn net_lines(&self) -> &[NetLine];
    fn planes(&self) -> &[Plane];
    fn polygons(&self) -> &[BoardPolygon];
    fn circles(&self) -> &[Circle];
    fn stroke_texts(&self) -> &[StrokeText];
    fn holes(&self) -> &[Hole];
    fn vias(&self) -> &[Via];
    fn devices(&self) -> &[Device];
    fn component_instances(&self) -> &[ComponentInstance];
    fn air_wires(&self) -> &[AirWire];

    fn device_by_component_uuid(&self, uuid: Uuid) -> Option<&Device> {
        self.devices().iter().find(|d| d.component_uuid == uuid)
    }

    /// Recomputes every plane's `filled_area`. Mutates board state; invoked
    /// by the coordinator exactly once per (non-quick) run, never by an
    /// individual check.
    fn rebuild_all_planes(&mut self);

    /// Recomputes the air-wire list from the current netlist and routed
    /// copper. Mutates board state; invoked exactly once per (non-quick) run.
    fn force_air_wires_rebuild(&mut self);
}

/// A minimal in-memory `Board` used by this crate's own tests and available
/// to hosts that don't already have a richer model.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoard {
    pub layer_stack: LayerStack,
    pub net_segments: Vec<NetSegment>,
    pub net_lines: Vec<NetLine>,
    pub planes: Vec<Plane>,
    pub polygons: Vec<BoardPolygon>,
    pub circles: Vec<Circle>,
    pub stroke_texts: Vec<StrokeText>,
    pub holes: Vec<Hole>,
    pub vias: Vec<Via>,
    pub devices: Vec<Device>,
    pub component_instances: Vec<ComponentInstance>,
    pub air_wires: Vec<AirWire>,
}

impl InMemoryBoard {
    pub fn new(layer_stack: LayerStack) -> Self {
        Self { layer_stack, ..Default::default() }
    }
}

impl Board for InMemoryBoard {
    fn layer_stack(&self) -> &LayerStack {
        &self.layer_stack
    }

    fn net_segments(&self) -> &[NetSegment] {
        &self.net_segments
    }

    fn net_lines(&self) -> &[NetLine] {
        &self.net_lines
    }

    fn planes(&self) -> &[Plane] {
        &self.planes
    }

    fn polygons(&self) -> &[BoardPolygon] {
        &self.polygons
    }

    fn circles(&self) -> &[Circle] {
        &self.circles
    }

    fn stroke_texts(&self) -> &[StrokeText] {
        &self.stroke_texts
    }

    fn holes(&self) -> &[Hole] {
        &self.holes
    }

    fn vias(&self) -> &[Via] {
        &self.vias
    }

    fn devices(&self) -> &[Device] {
        &self.devices
    }

    fn component_instances(&self) -> &[ComponentInstance] {
        &self.component_instances
    }

    fn air_wires(&self) -> &[AirWire] {
        &self.air_wires
    }

    fn rebuild_all_planes(&mut self) {
        for plane in &mut self.planes {
            // A full copper-pour solver is outside this engine's scope (it
            // belongs to the host's layout engine); this reference board
            // simply adopts the drawn outline as the filled area so that
            // DRC checks have something to intersect against.
            plane.filled_area = Some(plane.outline.clone());
        }
    }

    fn force_air_wires_rebuild(&mut self) {
        // A full ratsnest solver is outside this engine's scope; the
        // reference board leaves whatever air-wires the test fixture set up.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerStack;

    #[test]
    fn device_lookup_by_uuid() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        let uuid = Uuid::new_v4();
        board.devices.push(Device {
            component_uuid: uuid,
            reference: "U1".to_string(),
            pads: Vec::new(),
            holes: Vec::new(),
            stroke_texts: Vec::new(),
            top_courtyard: None,
            bot_courtyard: None,
        });
        assert!(board.device_by_component_uuid(uuid).is_some());
        assert!(board.device_by_component_uuid(Uuid::new_v4()).is_none());
    }

    #[test]
    fn rebuild_all_planes_populates_filled_area() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.planes.push(Plane {
            layer: "F.Cu".to_string(),
            net: None,
            outline: Path::default(),
            filled_area: None,
            min_width: Length::from_millimeters(0.2),
        });
        board.rebuild_all_planes();
        assert!(board.planes[0].filled_area.is_some());
    }
}
