//! The twelve board design-rule checks (spec.md §4.5), generalized from the
//! teacher's single-board `PcbDrcChecker` into layer- and net-aware polygon
//! intersection tests over an arbitrary `Board` implementation.

use crate::board::{Board, Hole};
use crate::cache::{CacheKey, CopperPathsCache};
use crate::geometry::Path;
use crate::message::{DrcMessage, DrcMessageKind};
use crate::net::{same_net, NetSignal};
use crate::path_gen::{self, PathGenError};
use crate::polygon::PolygonSet;
use crate::settings::{AllowedSlots, DrcSettings};
use crate::units::Length;

/// One copper-bearing object gathered for a clearance pass: a trace, pad,
/// via, plane, polygon or circle, with enough identity to report a useful
/// violation. `layer` is empty for through-hole items (vias), which are
/// considered present on every layer.
struct ClearanceItem {
    label: String,
    layer: String,
    net: Option<NetSignal>,
    polygons: PolygonSet,
}

/// Builds the `InternalError` diagnostic recorded when a check hits
/// `GeometryDomain` or `PolygonAlgebra` (spec.md §7): the check in progress
/// is abandoned and the run continues with the next one.
fn internal_error(check: &str, err: impl std::fmt::Display) -> DrcMessage {
    DrcMessage::new(
        DrcMessageKind::InternalError { check: check.to_string(), detail: err.to_string() },
        format!("{check} check aborted: {err}"),
        Vec::new(),
    )
}

/// Borrows a board and a settings profile for the duration of one run's
/// worth of checks, plus the copper-paths cache shared across them.
pub struct BoardDrcChecker<'a, B: Board> {
    board: &'a B,
    settings: &'a DrcSettings,
    cache: &'a mut CopperPathsCache,
}

impl<'a, B: Board> BoardDrcChecker<'a, B> {
    pub fn new(board: &'a B, settings: &'a DrcSettings, cache: &'a mut CopperPathsCache) -> Self {
        Self { board, settings, cache }
    }

    fn arc_tol(&self) -> Length {
        self.settings.max_arc_tolerance
    }

    /// Runs every check in spec order. Each check short-circuits when its
    /// governing setting is zero (disabled).
    pub fn check_all(&mut self) -> Vec<DrcMessage> {
        let mut out = Vec::new();
        out.extend(self.check_minimum_copper_width());
        out.extend(self.check_copper_copper_clearance());
        out.extend(self.check_copper_board_clearance());
        out.extend(self.check_copper_hole_clearance());
        out.extend(self.check_minimum_annular_ring());
        out.extend(self.check_minimum_drill_and_slot_dimensions());
        out.extend(self.check_allowed_slot_policies());
        out.extend(self.check_invalid_pad_connections());
        out.extend(self.check_courtyard_clearance());
        out.extend(self.check_unplaced_components());
        out.extend(self.check_missing_connections());
        out.extend(self.check_stale_objects());
        out
    }

    /// Every copper-bearing object across enabled copper layers, each
    /// flattened to a polygon set offset by `offset`.
    fn copper_items(&self, offset: Length) -> Result<Vec<ClearanceItem>, PathGenError> {
        let tol = self.arc_tol();
        let mut items = Vec::new();
        for (i, via) in self.board.vias().iter().enumerate() {
            items.push(ClearanceItem {
                label: format!("via#{i}"),
                layer: String::new(),
                net: via.net.clone(),
                polygons: path_gen::via_copper_paths(via, offset, tol)?,
            });
        }
        for layer in self.board.layer_stack().copper_layers() {
            let name = layer.name().to_string();
            for (i, line) in self.board.net_lines().iter().enumerate() {
                if line.layer == name {
                    items.push(ClearanceItem {
                        label: format!("net_line#{i}@{name}"),
                        layer: name.clone(),
                        net: line.net.clone(),
                        polygons: path_gen::netline_paths(line, offset, tol)?,
                    });
                }
            }
            for (i, plane) in self.board.planes().iter().enumerate() {
                if plane.layer == name {
                    items.push(ClearanceItem {
                        label: format!("plane#{i}@{name}"),
                        layer: name.clone(),
                        net: plane.net.clone(),
                        polygons: path_gen::plane_paths(plane, tol)?,
                    });
                }
            }
            for (i, poly) in self.board.polygons().iter().enumerate() {
                if poly.filled && poly.layer == name {
                    items.push(ClearanceItem {
                        label: format!("polygon#{i}@{name}"),
                        layer: name.clone(),
                        net: poly.net.clone(),
                        polygons: path_gen::board_polygon_paths(poly, offset, tol)?,
                    });
                }
            }
            for (i, circle) in self.board.circles().iter().enumerate() {
                if circle.filled && circle.layer == name {
                    items.push(ClearanceItem {
                        label: format!("circle#{i}@{name}"),
                        layer: name.clone(),
                        net: circle.net.clone(),
                        polygons: path_gen::circle_paths(circle, offset, tol)?,
                    });
                }
            }
            for device in self.board.devices() {
                for pad in &device.pads {
                    if pad.geometry_on(&name).is_some() {
                        items.push(ClearanceItem {
                            label: format!("{}/pad@{name}", device.reference),
                            layer: name.clone(),
                            net: pad.net.clone(),
                            polygons: path_gen::pad_paths(pad, &name, offset, tol)?,
                        });
                    }
                }
            }
        }
        Ok(items)
    }

    /// The raw (unoffset) union of copper on one layer, memoised in the
    /// run's copper-paths cache. A failure is never cached, so a retry after
    /// an aborted check recomputes it.
    fn layer_copper_union(&mut self, layer: &str) -> Result<PolygonSet, PathGenError> {
        let key = CacheKey::new(layer, Vec::<uuid::Uuid>::new(), false);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }
        let tol = self.arc_tol();
        let board = self.board;
        let mut set = PolygonSet::empty();
        for via in board.vias() {
            set = set.union(&path_gen::via_copper_paths(via, Length::ZERO, tol)?);
        }
        for line in board.net_lines() {
            if line.layer == layer {
                set = set.union(&path_gen::netline_paths(line, Length::ZERO, tol)?);
            }
        }
        for plane in board.planes() {
            if plane.layer == layer {
                set = set.union(&path_gen::plane_paths(plane, tol)?);
            }
        }
        for poly in board.polygons() {
            if poly.filled && poly.layer == layer {
                set = set.union(&path_gen::board_polygon_paths(poly, Length::ZERO, tol)?);
            }
        }
        for circle in board.circles() {
            if circle.filled && circle.layer == layer {
                set = set.union(&path_gen::circle_paths(circle, Length::ZERO, tol)?);
            }
        }
        for device in board.devices() {
            for pad in &device.pads {
                if pad.geometry_on(layer).is_some() {
                    set = set.union(&path_gen::pad_paths(pad, layer, Length::ZERO, tol)?);
                }
            }
        }
        self.cache.get_or_build(key, || set.clone());
        Ok(set)
    }

    fn aggregate_copper(&mut self) -> Result<PolygonSet, PathGenError> {
        let names: Vec<String> = self.board.layer_stack().copper_layers().map(|l| l.name().to_string()).collect();
        let mut out = PolygonSet::empty();
        for name in names {
            out = out.union(&self.layer_copper_union(&name)?);
        }
        Ok(out)
    }

    /// §4.5.1 Minimum copper width.
    pub fn check_minimum_copper_width(&mut self) -> Vec<DrcMessage> {
        let threshold = self.settings.min_copper_width;
        if threshold.is_zero() {
            return Vec::new();
        }
        match self.try_check_minimum_copper_width(threshold) {
            Ok(out) => out,
            Err(e) => vec![internal_error("minimum_copper_width", e)],
        }
    }

    fn try_check_minimum_copper_width(&mut self, threshold: Length) -> Result<Vec<DrcMessage>, PathGenError> {
        let tol = self.arc_tol().as_nanos() as f64;
        let min_highlight = Length::from_micros(50.0);
        let mut out = Vec::new();
        for (i, line) in self.board.net_lines().iter().enumerate() {
            if line.width < threshold {
                let stroke = Path::from_straight_points(vec![line.start.to_point2d(), line.end.to_point2d()]);
                let highlight_width = line.width.max(min_highlight);
                let locations = stroke.to_outline_strokes(highlight_width.as_nanos() as f64, tol)?.to_paths();
                out.push(DrcMessage::new(
                    DrcMessageKind::MinimumWidthViolation { object: format!("net_line#{i}"), actual: line.width, threshold },
                    format!("trace width {} below minimum {}", line.width, threshold),
                    locations,
                ));
            }
        }
        for (i, plane) in self.board.planes().iter().enumerate() {
            if plane.min_width < threshold {
                let highlight_width = plane.min_width.max(min_highlight);
                let locations = plane.outline.to_outline_strokes(highlight_width.as_nanos() as f64, tol)?.to_paths();
                out.push(DrcMessage::new(
                    DrcMessageKind::MinimumWidthViolation { object: format!("plane#{i}"), actual: plane.min_width, threshold },
                    format!("plane minimum width {} below minimum {}", plane.min_width, threshold),
                    locations,
                ));
            }
        }
        for (i, text) in self.board.stroke_texts().iter().enumerate() {
            if text.stroke_width < threshold {
                let highlight_width = text.stroke_width.max(min_highlight);
                let locations = text.stroke_path.to_outline_strokes(highlight_width.as_nanos() as f64, tol)?.to_paths();
                out.push(DrcMessage::new(
                    DrcMessageKind::MinimumWidthViolation { object: format!("stroke_text#{i}"), actual: text.stroke_width, threshold },
                    format!("stroke width {} below minimum {}", text.stroke_width, threshold),
                    locations,
                ));
            }
        }
        for device in self.board.devices() {
            for (i, text) in device.stroke_texts.iter().enumerate() {
                if text.stroke_width < threshold {
                    let highlight_width = text.stroke_width.max(min_highlight);
                    let locations = text.stroke_path.to_outline_strokes(highlight_width.as_nanos() as f64, tol)?.to_paths();
                    out.push(DrcMessage::new(
                        DrcMessageKind::MinimumWidthViolation {
                            object: format!("{}/stroke_text#{i}", device.reference),
                            actual: text.stroke_width,
                            threshold,
                        },
                        format!("stroke width {} below minimum {}", text.stroke_width, threshold),
                        locations,
                    ));
                }
            }
        }
        Ok(out)
    }

    /// §4.5.2 Copper ↔ copper clearance.
    pub fn check_copper_copper_clearance(&mut self) -> Vec<DrcMessage> {
        let clearance = self.settings.min_copper_copper_clearance;
        if clearance.is_zero() {
            return Vec::new();
        }
        match self.try_check_copper_copper_clearance(clearance) {
            Ok(out) => out,
            Err(e) => vec![internal_error("copper_copper_clearance", e)],
        }
    }

    fn try_check_copper_copper_clearance(&mut self, clearance: Length) -> Result<Vec<DrcMessage>, PathGenError> {
        let tol = self.arc_tol();
        let offset = path_gen::clearance_offset(clearance, tol);
        let items = self.copper_items(offset)?;
        let mut out = Vec::new();
        for i in 0..items.len() {
            for j in (i + 1)..items.len() {
                let a = &items[i];
                let b = &items[j];
                if same_net(a.net.as_ref(), b.net.as_ref()) {
                    continue;
                }
                if !a.layer.is_empty() && !b.layer.is_empty() && a.layer != b.layer {
                    continue;
                }
                let overlap = a.polygons.intersection(&b.polygons);
                if overlap.is_empty() {
                    continue;
                }
                let layer = if !a.layer.is_empty() { a.layer.clone() } else { b.layer.clone() };
                out.push(DrcMessage::new(
                    DrcMessageKind::CopperCopperClearanceViolation { a: a.label.clone(), b: b.label.clone(), layer },
                    format!("{} and {} are closer than {}", a.label, b.label, clearance),
                    overlap.to_paths(),
                ));
            }
        }
        Ok(out)
    }

    /// §4.5.3 Copper ↔ board-outline clearance.
    pub fn check_copper_board_clearance(&mut self) -> Vec<DrcMessage> {
        let clearance = self.settings.min_copper_board_clearance;
        if clearance.is_zero() {
            return Vec::new();
        }
        match self.try_check_copper_board_clearance(clearance) {
            Ok(out) => out,
            Err(e) => vec![internal_error("copper_board_clearance", e)],
        }
    }

    fn try_check_copper_board_clearance(&mut self, clearance: Length) -> Result<Vec<DrcMessage>, PathGenError> {
        let tol = self.arc_tol();
        let width = (clearance * 2 - tol - Length::from_nanos(1)).as_nanos().max(1) as f64;
        let mut r = PolygonSet::empty();
        for poly in self.board.polygons() {
            if poly.layer == "board_outlines" {
                let stroked = poly.outline.to_outline_strokes(width, tol.as_nanos() as f64)?;
                r = r.union(&stroked);
            }
        }
        if r.is_empty() {
            return Ok(Vec::new());
        }
        let items = self.copper_items(Length::ZERO)?;
        let mut out = Vec::new();
        for item in &items {
            let overlap = r.intersection(&item.polygons);
            if !overlap.is_empty() {
                out.push(DrcMessage::new(
                    DrcMessageKind::CopperBoardClearanceViolation { object: item.label.clone() },
                    format!("{} is closer than {} to the board outline", item.label, clearance),
                    overlap.to_paths(),
                ));
            }
        }
        Ok(out)
    }

    /// §4.5.4 Copper ↔ NPTH-hole clearance.
    pub fn check_copper_hole_clearance(&mut self) -> Vec<DrcMessage> {
        let clearance = self.settings.min_copper_npth_clearance;
        if clearance.is_zero() {
            return Vec::new();
        }
        match self.try_check_copper_hole_clearance(clearance) {
            Ok(out) => out,
            Err(e) => vec![internal_error("copper_hole_clearance", e)],
        }
    }

    fn try_check_copper_hole_clearance(&mut self, clearance: Length) -> Result<Vec<DrcMessage>, PathGenError> {
        let tol = self.arc_tol();
        let offset = clearance - Length::from_nanos(1);
        let copper = self.aggregate_copper()?;
        if copper.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for (i, hole) in self.board.holes().iter().enumerate() {
            check_hole_against_copper(&mut out, &copper, hole, format!("hole#{i}"), clearance, offset, tol)?;
        }
        for device in self.board.devices() {
            for (i, hole) in device.holes.iter().enumerate() {
                check_hole_against_copper(&mut out, &copper, hole, format!("{}/hole#{i}", device.reference), clearance, offset, tol)?;
            }
        }
        Ok(out)
    }

    /// §4.5.5 Minimum annular ring (plated).
    pub fn check_minimum_annular_ring(&mut self) -> Vec<DrcMessage> {
        let annular = self.settings.min_pth_annular_ring;
        if annular.is_zero() {
            return Vec::new();
        }
        match self.try_check_minimum_annular_ring(annular) {
            Ok(out) => out,
            Err(e) => vec![internal_error("minimum_annular_ring", e)],
        }
    }

    fn try_check_minimum_annular_ring(&mut self, annular: Length) -> Result<Vec<DrcMessage>, PathGenError> {
        let tol = self.arc_tol();
        let mut out = Vec::new();
        // A via's own `size`/`drill` fields give the annular ring directly.
        for (i, via) in self.board.vias().iter().enumerate() {
            let actual = (via.size - via.drill) / 2;
            if actual < annular {
                let disc = path_gen::via_copper_paths(via, Length::ZERO, tol)?;
                out.push(DrcMessage::new(
                    DrcMessageKind::MinimumAnnularRingViolation { object: format!("via#{i}") },
                    format!("via #{i} annular ring {actual} below minimum {annular}"),
                    disc.to_paths(),
                ));
            }
        }
        // A pad's hole can sit inside an arbitrarily-shaped copper outline,
        // so its ring is whatever remains of a test disc once the pad's own
        // copper on that layer is subtracted.
        for device in self.board.devices() {
            for pad in &device.pads {
                if let Some(hole) = &pad.hole {
                    if !hole.plated {
                        continue;
                    }
                    for layer in &pad.connected_layers {
                        if let Some(geom) = pad.geometry_on(layer) {
                            let pad_set = PolygonSet::from_closed_path(&geom.outline, tol.as_nanos() as f64)?;
                            let test_diameter = (hole.diameter + annular * 2 - Length::from_nanos(1)).as_nanos() as f64;
                            let center = hole.position.to_point2d();
                            let test_disc = Path::circle(test_diameter).translated(center.x, center.y);
                            let test_set = PolygonSet::from_closed_path(&test_disc, tol.as_nanos() as f64)?;
                            let remainder = test_set.difference(&pad_set);
                            if !remainder.is_empty() {
                                out.push(DrcMessage::new(
                                    DrcMessageKind::MinimumAnnularRingViolation { object: format!("{}/pad@{layer}", device.reference) },
                                    format!("{} pad annular ring below minimum {annular} on {layer}", device.reference),
                                    remainder.to_paths(),
                                ));
                            }
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// §4.5.6 Minimum drill / slot dimensions.
    pub fn check_minimum_drill_and_slot_dimensions(&mut self) -> Vec<DrcMessage> {
        let mut out = Vec::new();
        for (i, hole) in self.board.holes().iter().enumerate() {
            if let Some(msg) = drill_or_slot_violation(hole, &format!("hole#{i}"), self.settings) {
                out.push(msg);
            }
        }
        for device in self.board.devices() {
            for (i, hole) in device.holes.iter().enumerate() {
                if let Some(msg) = drill_or_slot_violation(hole, &format!("{}/hole#{i}", device.reference), self.settings) {
                    out.push(msg);
                }
            }
            for pad in &device.pads {
                if let Some(hole) = &pad.hole {
                    if let Some(msg) = drill_or_slot_violation(hole, &format!("{}/pad-hole", device.reference), self.settings) {
                        out.push(msg);
                    }
                }
            }
        }
        out
    }

    /// §4.5.7 Allowed slot policies.
    pub fn check_allowed_slot_policies(&mut self) -> Vec<DrcMessage> {
        let npth = self.settings.allowed_npth_slots;
        let pth = self.settings.allowed_pth_slots;
        let mut out = Vec::new();
        for (i, hole) in self.board.holes().iter().enumerate() {
            if let Some(msg) = slot_policy_violation(hole, &format!("hole#{i}"), npth, pth) {
                out.push(msg);
            }
        }
        for device in self.board.devices() {
            for (i, hole) in device.holes.iter().enumerate() {
                if let Some(msg) = slot_policy_violation(hole, &format!("{}/hole#{i}", device.reference), npth, pth) {
                    out.push(msg);
                }
            }
            for pad in &device.pads {
                if let Some(hole) = &pad.hole {
                    if let Some(msg) = slot_policy_violation(hole, &format!("{}/pad-hole", device.reference), npth, pth) {
                        out.push(msg);
                    }
                }
            }
        }
        out
    }

    /// §4.5.8 Invalid pad connections.
    pub fn check_invalid_pad_connections(&mut self) -> Vec<DrcMessage> {
        match self.try_check_invalid_pad_connections() {
            Ok(out) => out,
            Err(e) => vec![internal_error("invalid_pad_connections", e)],
        }
    }

    fn try_check_invalid_pad_connections(&mut self) -> Result<Vec<DrcMessage>, PathGenError> {
        let tol = self.arc_tol();
        let mut out = Vec::new();
        for device in self.board.devices() {
            for pad in &device.pads {
                for layer in &pad.connected_layers {
                    if let Some(geom) = pad.geometry_on(layer) {
                        let set = PolygonSet::from_closed_path(&geom.outline, tol.as_nanos() as f64)?;
                        let origin = pad.origin.to_point2d();
                        if !set.contains_point(origin.x, origin.y) {
                            out.push(DrcMessage::new(
                                DrcMessageKind::InvalidPadConnection { pad: format!("{}/pad", device.reference), layer: layer.clone() },
                                format!("{} pad connection on {} falls outside its copper", device.reference, layer),
                                set.to_paths(),
                            ));
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    /// §4.5.9 Courtyard clearance.
    pub fn check_courtyard_clearance(&mut self) -> Vec<DrcMessage> {
        match self.try_check_courtyard_clearance() {
            Ok(out) => out,
            Err(e) => vec![internal_error("courtyard_clearance", e)],
        }
    }

    fn try_check_courtyard_clearance(&mut self) -> Result<Vec<DrcMessage>, PathGenError> {
        let tol = self.arc_tol();
        let mut out = self.check_courtyard_side(tol, true)?;
        out.extend(self.check_courtyard_side(tol, false)?);
        Ok(out)
    }

    fn check_courtyard_side(&self, tol: Length, top: bool) -> Result<Vec<DrcMessage>, PathGenError> {
        let mut out = Vec::new();
        let mut devices: Vec<(&str, PolygonSet)> = Vec::new();
        for d in self.board.devices() {
            let path = if top { d.top_courtyard.as_ref() } else { d.bot_courtyard.as_ref() };
            if let Some(path) = path {
                devices.push((d.reference.as_str(), PolygonSet::from_closed_path(path, tol.as_nanos() as f64)?));
            }
        }
        let side = if top { "top" } else { "bottom" };
        for i in 0..devices.len() {
            for j in (i + 1)..devices.len() {
                let overlap = devices[i].1.intersection(&devices[j].1);
                if !overlap.is_empty() {
                    out.push(DrcMessage::new(
                        DrcMessageKind::CourtyardOverlap { a: devices[i].0.to_string(), b: devices[j].0.to_string(), side: side.to_string() },
                        format!("{} and {} courtyards overlap on the {} side", devices[i].0, devices[j].0, side),
                        overlap.to_paths(),
                    ));
                }
            }
        }
        Ok(out)
    }

    /// §4.5.10 Unplaced components.
    pub fn check_unplaced_components(&mut self) -> Vec<DrcMessage> {
        let mut out = Vec::new();
        for component in self.board.component_instances() {
            if component.schematic_only {
                continue;
            }
            if self.board.device_by_component_uuid(component.uuid).is_none() {
                out.push(DrcMessage::new(
                    DrcMessageKind::MissingDevice { component: component.reference.clone() },
                    format!("{} has no placed device on the board", component.reference),
                    Vec::new(),
                ));
            }
        }
        out
    }

    /// §4.5.11 Missing connections. The caller is responsible for invoking
    /// `Board::force_air_wires_rebuild` before this check.
    pub fn check_missing_connections(&mut self) -> Vec<DrcMessage> {
        match self.try_check_missing_connections() {
            Ok(out) => out,
            Err(e) => vec![internal_error("missing_connections", e)],
        }
    }

    fn try_check_missing_connections(&mut self) -> Result<Vec<DrcMessage>, PathGenError> {
        let mut out = Vec::new();
        for wire in self.board.air_wires() {
            let start = wire.start.to_point2d();
            let end = wire.end.to_point2d();
            let width = Length::from_micros(50.0).as_nanos() as f64;
            let location = Path::obround(start, end, width)?;
            out.push(DrcMessage::new(
                DrcMessageKind::MissingConnection { net: wire.net.name().to_string() },
                format!("net {} has an unrouted connection", wire.net.name()),
                vec![location],
            ));
        }
        Ok(out)
    }

    /// §4.5.12 Stale objects.
    pub fn check_stale_objects(&mut self) -> Vec<DrcMessage> {
        let mut out = Vec::new();
        for segment in self.board.net_segments() {
            if segment.line_indices.is_empty() {
                out.push(DrcMessage::new(
                    DrcMessageKind::EmptyNetSegment { net: segment.net.name().to_string() },
                    format!("net segment {} has no lines", segment.net.name()),
                    Vec::new(),
                ));
            }
        }
        out
    }
}

fn check_hole_against_copper(
    out: &mut Vec<DrcMessage>,
    copper: &PolygonSet,
    hole: &Hole,
    label: String,
    clearance: Length,
    offset: Length,
    tol: Length,
) -> Result<(), PathGenError> {
    if hole.plated {
        return Ok(());
    }
    let set = path_gen::hole_paths(hole, offset, tol)?;
    let overlap = copper.intersection(&set);
    if !overlap.is_empty() {
        out.push(DrcMessage::new(
            DrcMessageKind::CopperHoleClearanceViolation { object: "copper".to_string(), hole: label.clone() },
            format!("copper is closer than {clearance} to non-plated hole {label}"),
            overlap.to_paths(),
        ));
    }
    Ok(())
}

fn drill_or_slot_violation(hole: &Hole, label: &str, settings: &DrcSettings) -> Option<DrcMessage> {
    if hole.is_slot() {
        let threshold = if hole.plated { settings.min_pth_slot_width } else { settings.min_npth_slot_width };
        if threshold.is_zero() {
            return None;
        }
        let width = hole.width();
        if width < threshold {
            return Some(DrcMessage::new(
                DrcMessageKind::MinimumSlotWidthViolation { object: label.to_string(), actual: width, threshold },
                format!("{label} slot width {width} below minimum {threshold}"),
                hole.slot_path.iter().cloned().collect(),
            ));
        }
    } else {
        let threshold = if hole.plated { settings.min_pth_drill_diameter } else { settings.min_npth_drill_diameter };
        if threshold.is_zero() {
            return None;
        }
        if hole.diameter < threshold {
            return Some(DrcMessage::new(
                DrcMessageKind::MinimumDrillDiameterViolation { object: label.to_string(), actual: hole.diameter, threshold },
                format!("{label} drill diameter {} below minimum {threshold}", hole.diameter),
                Vec::new(),
            ));
        }
    }
    None
}

fn slot_policy_violation(hole: &Hole, label: &str, allowed_npth: AllowedSlots, allowed_pth: AllowedSlots) -> Option<DrcMessage> {
    let class = hole.slot_class();
    let policy = if hole.plated { allowed_pth } else { allowed_npth };
    if policy.forbids(class) {
        Some(DrcMessage::new(
            DrcMessageKind::ForbiddenSlot { object: label.to_string() },
            format!("{label} slot shape not permitted by the configured policy"),
            hole.slot_path.iter().cloned().collect(),
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{BoardPolygon, ComponentInstance, Device, InMemoryBoard, NetLine, Pad, PadGeometry, Via};
    use crate::geometry::{Point, Point2D};
    use crate::layer::LayerStack;
    use crate::net::NetSignal;

    fn board_with_two_close_traces(clearance_mm: f64) -> (InMemoryBoard, DrcSettings) {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.net_lines.push(NetLine {
            start: Point::new(Length::ZERO, Length::ZERO),
            end: Point::new(Length::from_millimeters(5.0), Length::ZERO),
            width: Length::from_millimeters(0.2),
            layer: "F.Cu".to_string(),
            net: None,
        });
        board.net_lines.push(NetLine {
            start: Point::new(Length::ZERO, Length::from_millimeters(0.25)),
            end: Point::new(Length::from_millimeters(5.0), Length::from_millimeters(0.25)),
            width: Length::from_millimeters(0.2),
            layer: "F.Cu".to_string(),
            net: None,
        });
        let mut settings = DrcSettings::disabled();
        settings.min_copper_copper_clearance = Length::from_millimeters(clearance_mm);
        (board, settings)
    }

    #[test]
    fn close_distinct_net_traces_violate_clearance() {
        let (board, settings) = board_with_two_close_traces(0.3);
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_copper_copper_clearance();
        assert!(!messages.is_empty());
    }

    #[test]
    fn distant_traces_do_not_violate_clearance() {
        let (board, settings) = board_with_two_close_traces(0.05);
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_copper_copper_clearance();
        assert!(messages.is_empty());
    }

    /// S2: two overlapping traces on the same net never violate clearance.
    #[test]
    fn same_net_traces_do_not_violate_clearance_even_when_touching() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        let net = NetSignal::new("GND");
        board.net_lines.push(NetLine {
            start: Point::new(Length::ZERO, Length::ZERO),
            end: Point::new(Length::from_millimeters(5.0), Length::ZERO),
            width: Length::from_millimeters(0.2),
            layer: "F.Cu".to_string(),
            net: Some(net.clone()),
        });
        board.net_lines.push(NetLine {
            start: Point::new(Length::ZERO, Length::from_millimeters(0.05)),
            end: Point::new(Length::from_millimeters(5.0), Length::from_millimeters(0.05)),
            width: Length::from_millimeters(0.2),
            layer: "F.Cu".to_string(),
            net: Some(net),
        });
        let mut settings = DrcSettings::disabled();
        settings.min_copper_copper_clearance = Length::from_millimeters(0.3);
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        assert!(checker.check_copper_copper_clearance().is_empty());
    }

    /// Property 1: copper/copper clearance is symmetric in the order items
    /// are gathered — swapping which trace is pushed first changes nothing.
    #[test]
    fn copper_copper_clearance_is_order_independent() {
        let (board_ab, settings) = board_with_two_close_traces(0.3);
        let mut board_ba = InMemoryBoard::new(LayerStack::two_layer());
        board_ba.net_lines.push(board_ab.net_lines[1].clone());
        board_ba.net_lines.push(board_ab.net_lines[0].clone());

        let mut cache_ab = CopperPathsCache::new();
        let mut checker_ab = BoardDrcChecker::new(&board_ab, &settings, &mut cache_ab);
        let count_ab = checker_ab.check_copper_copper_clearance().len();

        let mut cache_ba = CopperPathsCache::new();
        let mut checker_ba = BoardDrcChecker::new(&board_ba, &settings, &mut cache_ba);
        let count_ba = checker_ba.check_copper_copper_clearance().len();

        assert_eq!(count_ab, count_ba);
    }

    /// Property 2: raising the clearance threshold only ever adds
    /// violations, never removes one that already fired.
    #[test]
    fn copper_copper_clearance_is_monotone_in_threshold() {
        // Traces 0.2mm wide with centerlines 0.25mm apart leave a 0.05mm gap
        // between copper edges.
        let (board, _) = board_with_two_close_traces(0.0);
        let mut loose = DrcSettings::disabled();
        loose.min_copper_copper_clearance = Length::from_millimeters(0.03);
        let mut tight = DrcSettings::disabled();
        tight.min_copper_copper_clearance = Length::from_millimeters(0.1);

        let mut cache_loose = CopperPathsCache::new();
        let loose_count = BoardDrcChecker::new(&board, &loose, &mut cache_loose).check_copper_copper_clearance().len();
        let mut cache_tight = CopperPathsCache::new();
        let tight_count = BoardDrcChecker::new(&board, &tight, &mut cache_tight).check_copper_copper_clearance().len();

        assert_eq!(loose_count, 0);
        assert!(tight_count >= loose_count);
    }

    /// Property 6: a finer arc tolerance never turns a clear violation into
    /// a non-violation (the trace geometry here is all straight edges, so
    /// the flattening tolerance cannot move the boundary by more than
    /// itself either way).
    #[test]
    fn clearance_violation_is_stable_across_arc_tolerances() {
        let (board, mut settings) = board_with_two_close_traces(0.3);
        settings.max_arc_tolerance = Length::from_micros(5.0);
        let mut cache_a = CopperPathsCache::new();
        let coarse = BoardDrcChecker::new(&board, &settings, &mut cache_a).check_copper_copper_clearance().len();

        settings.max_arc_tolerance = Length::from_nanos(500);
        let mut cache_b = CopperPathsCache::new();
        let fine = BoardDrcChecker::new(&board, &settings, &mut cache_b).check_copper_copper_clearance().len();

        assert_eq!(coarse, fine);
    }

    #[test]
    fn disabled_threshold_skips_width_check() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.net_lines.push(NetLine {
            start: Point::ORIGIN,
            end: Point::new(Length::from_millimeters(1.0), Length::ZERO),
            width: Length::from_nanos(1),
            layer: "F.Cu".to_string(),
            net: None,
        });
        let settings = DrcSettings::disabled();
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        assert!(checker.check_minimum_copper_width().is_empty());
    }

    #[test]
    fn undersized_trace_violates_minimum_width() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.net_lines.push(NetLine {
            start: Point::ORIGIN,
            end: Point::new(Length::from_millimeters(1.0), Length::ZERO),
            width: Length::from_millimeters(0.05),
            layer: "F.Cu".to_string(),
            net: None,
        });
        let mut settings = DrcSettings::disabled();
        settings.min_copper_width = Length::from_millimeters(0.15);
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_minimum_copper_width();
        assert_eq!(messages.len(), 1);
    }

    fn rectangle_outline(min: (f64, f64), max: (f64, f64)) -> Path {
        Path::from_straight_points(vec![
            Point2D::new(min.0, min.1),
            Point2D::new(max.0, min.1),
            Point2D::new(max.0, max.1),
            Point2D::new(min.0, max.1),
            Point2D::new(min.0, min.1),
        ])
    }

    #[test]
    fn via_outside_board_outline_violates_board_clearance() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.polygons.push(BoardPolygon {
            layer: "board_outlines".to_string(),
            outline: rectangle_outline((0.0, 0.0), (10_000_000.0, 10_000_000.0)),
            net: None,
            width: Length::ZERO,
            filled: false,
        });
        board.vias.push(Via {
            position: Point::new(Length::from_nanos(50_000), Length::from_nanos(50_000)),
            size: Length::from_millimeters(0.6),
            drill: Length::from_millimeters(0.3),
            net: None,
        });
        let mut settings = DrcSettings::disabled();
        settings.min_copper_board_clearance = Length::from_millimeters(0.3);
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_copper_board_clearance();
        assert!(!messages.is_empty());
    }

    /// The bug where `to_outline_strokes` only stroked a board outline's
    /// first edge: a via near the far (non-first) edge must still be
    /// caught.
    #[test]
    fn via_near_far_edge_of_rectangular_outline_violates_board_clearance() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.polygons.push(BoardPolygon {
            layer: "board_outlines".to_string(),
            outline: rectangle_outline((0.0, 0.0), (10_000_000.0, 10_000_000.0)),
            net: None,
            width: Length::ZERO,
            filled: false,
        });
        // Near the top edge (y = 10_000_000), not the first (bottom) edge.
        board.vias.push(Via {
            position: Point::new(Length::from_nanos(5_000_000), Length::from_nanos(9_950_000)),
            size: Length::from_millimeters(0.6),
            drill: Length::from_millimeters(0.3),
            net: None,
        });
        let mut settings = DrcSettings::disabled();
        settings.min_copper_board_clearance = Length::from_millimeters(0.3);
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_copper_board_clearance();
        assert!(!messages.is_empty());
    }

    /// S4: a PTH via whose annular ring is numerically below the configured
    /// minimum is reported.
    #[test]
    fn undersized_via_annular_ring_is_reported() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.vias.push(Via {
            position: Point::ORIGIN,
            size: Length::from_millimeters(0.5),
            drill: Length::from_millimeters(0.45),
            net: None,
        });
        let mut settings = DrcSettings::disabled();
        settings.min_pth_annular_ring = Length::from_millimeters(0.15);
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_minimum_annular_ring();
        assert!(!messages.is_empty());
    }

    /// S5: a pad whose net-line connection point falls outside the pad's
    /// own copper outline on the layer it claims to connect on.
    #[test]
    fn pad_connection_outside_copper_is_invalid() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.devices.push(Device {
            component_uuid: uuid::Uuid::new_v4(),
            reference: "R1".to_string(),
            pads: vec![Pad {
                origin: Point::new(Length::from_millimeters(5.0), Length::from_millimeters(5.0)),
                geometries: vec![PadGeometry {
                    layer: "F.Cu".to_string(),
                    outline: rectangle_outline((0.0, 0.0), (1_000_000.0, 1_000_000.0)),
                }],
                hole: None,
                net: None,
                connected_layers: vec!["F.Cu".to_string()],
            }],
            holes: Vec::new(),
            stroke_texts: Vec::new(),
            top_courtyard: None,
            bot_courtyard: None,
        });
        let settings = DrcSettings::disabled();
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_invalid_pad_connections();
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn pad_connection_inside_copper_is_valid() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.devices.push(Device {
            component_uuid: uuid::Uuid::new_v4(),
            reference: "R1".to_string(),
            pads: vec![Pad {
                origin: Point::new(Length::from_nanos(500_000), Length::from_nanos(500_000)),
                geometries: vec![PadGeometry {
                    layer: "F.Cu".to_string(),
                    outline: rectangle_outline((0.0, 0.0), (1_000_000.0, 1_000_000.0)),
                }],
                hole: None,
                net: None,
                connected_layers: vec!["F.Cu".to_string()],
            }],
            holes: Vec::new(),
            stroke_texts: Vec::new(),
            top_courtyard: None,
            bot_courtyard: None,
        });
        let settings = DrcSettings::disabled();
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        assert!(checker.check_invalid_pad_connections().is_empty());
    }

    #[test]
    fn unplaced_component_is_reported() {
        let mut board = InMemoryBoard::new(LayerStack::two_layer());
        board.component_instances.push(ComponentInstance { uuid: uuid::Uuid::new_v4(), reference: "U1".to_string(), schematic_only: false });
        let settings = DrcSettings::disabled();
        let mut cache = CopperPathsCache::new();
        let mut checker = BoardDrcChecker::new(&board, &settings, &mut cache);
        let messages = checker.check_unplaced_components();
        assert_eq!(messages.len(), 1);
    }
}
