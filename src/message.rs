//! DRC violation messages.

use serde::{Deserialize, Serialize};

use crate::geometry::Path;
use crate::units::Length;

/// Message severity. Annular-ring, clearance and width violations are
/// `Warning`; unplaced components, missing connections, invalid pad
/// connections and forbidden slots are `Error`; stale objects and empty
/// net-segments are `Hint`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

/// A tagged union of violation kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DrcMessageKind {
    MinimumWidthViolation { object: String, actual: Length, threshold: Length },
    CopperCopperClearanceViolation { a: String, b: String, layer: String },
    CopperBoardClearanceViolation { object: String },
    CopperHoleClearanceViolation { object: String, hole: String },
    MinimumAnnularRingViolation { object: String },
    MinimumDrillDiameterViolation { object: String, actual: Length, threshold: Length },
    MinimumSlotWidthViolation { object: String, actual: Length, threshold: Length },
    ForbiddenSlot { object: String },
    InvalidPadConnection { pad: String, layer: String },
    CourtyardOverlap { a: String, b: String, side: String },
    MissingDevice { component: String },
    MissingConnection { net: String },
    EmptyNetSegment { net: String },
    UnconnectedJunction { net: String },
    /// An internal diagnostic recorded when a check hits `GeometryDomain` or
    /// `PolygonAlgebra` and is aborted; the run continues with the next check.
    InternalError { check: String, detail: String },
}

impl DrcMessageKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            DrcMessageKind::MinimumWidthViolation { .. }
            | DrcMessageKind::CopperCopperClearanceViolation { .. }
            | DrcMessageKind::CopperBoardClearanceViolation { .. }
            | DrcMessageKind::CopperHoleClearanceViolation { .. }
            | DrcMessageKind::MinimumAnnularRingViolation { .. }
            | DrcMessageKind::MinimumDrillDiameterViolation { .. }
            | DrcMessageKind::MinimumSlotWidthViolation { .. } => Severity::Warning,
            DrcMessageKind::ForbiddenSlot { .. }
            | DrcMessageKind::InvalidPadConnection { .. }
            | DrcMessageKind::MissingDevice { .. }
            | DrcMessageKind::MissingConnection { .. } => Severity::Error,
            DrcMessageKind::CourtyardOverlap { .. } => Severity::Error,
            DrcMessageKind::EmptyNetSegment { .. } | DrcMessageKind::UnconnectedJunction { .. } => Severity::Hint,
            DrcMessageKind::InternalError { .. } => Severity::Error,
        }
    }

    /// A stable identity key used to suppress duplicate emissions within a
    /// run: `(kind, involved-object-ids, layer)`.
    pub fn dedup_key(&self) -> String {
        match self {
            DrcMessageKind::MinimumWidthViolation { object, .. } => format!("width:{object}"),
            DrcMessageKind::CopperCopperClearanceViolation { a, b, layer } => {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                format!("cu-cu:{lo}:{hi}:{layer}")
            }
            DrcMessageKind::CopperBoardClearanceViolation { object } => format!("cu-board:{object}"),
            DrcMessageKind::CopperHoleClearanceViolation { object, hole } => format!("cu-hole:{object}:{hole}"),
            DrcMessageKind::MinimumAnnularRingViolation { object } => format!("annular:{object}"),
            DrcMessageKind::MinimumDrillDiameterViolation { object, .. } => format!("drill:{object}"),
            DrcMessageKind::MinimumSlotWidthViolation { object, .. } => format!("slot-width:{object}"),
            DrcMessageKind::ForbiddenSlot { object } => format!("forbidden-slot:{object}"),
            DrcMessageKind::InvalidPadConnection { pad, layer } => format!("invalid-pad:{pad}:{layer}"),
            DrcMessageKind::CourtyardOverlap { a, b, side } => {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                format!("courtyard:{lo}:{hi}:{side}")
            }
            DrcMessageKind::MissingDevice { component } => format!("missing-device:{component}"),
            DrcMessageKind::MissingConnection { net } => format!("missing-conn:{net}"),
            DrcMessageKind::EmptyNetSegment { net } => format!("empty-segment:{net}"),
            DrcMessageKind::UnconnectedJunction { net } => format!("unconnected:{net}"),
            DrcMessageKind::InternalError { check, detail } => format!("internal:{check}:{detail}"),
        }
    }
}

/// A single DRC violation, carrying the highlighted locations to show the
/// user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrcMessage {
    pub kind: DrcMessageKind,
    pub text: String,
    pub severity: Severity,
    pub locations: Vec<Path>,
}

impl DrcMessage {
    pub fn new(kind: DrcMessageKind, text: impl Into<String>, locations: Vec<Path>) -> Self {
        let severity = kind.default_severity();
        Self { kind, text: text.into(), severity, locations }
    }

    pub fn dedup_key(&self) -> String {
        self.kind.dedup_key()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn clearance_violation_defaults_to_warning() {
        let kind = DrcMessageKind::CopperCopperClearanceViolation {
            a: "T1".to_string(),
            b: "T2".to_string(),
            layer: "F.Cu".to_string(),
        };
        assert_eq!(kind.default_severity(), Severity::Warning);
    }

    #[test]
    fn missing_device_defaults_to_error() {
        let kind = DrcMessageKind::MissingDevice { component: "U2".to_string() };
        assert_eq!(kind.default_severity(), Severity::Error);
    }

    #[test]
    fn empty_net_segment_defaults_to_hint() {
        let kind = DrcMessageKind::EmptyNetSegment { net: "GND".to_string() };
        assert_eq!(kind.default_severity(), Severity::Hint);
    }

    #[test]
    fn clearance_dedup_key_is_order_independent() {
        let k1 = DrcMessageKind::CopperCopperClearanceViolation {
            a: "T1".to_string(),
            b: "T2".to_string(),
            layer: "F.Cu".to_string(),
        };
        let k2 = DrcMessageKind::CopperCopperClearanceViolation {
            a: "T2".to_string(),
            b: "T1".to_string(),
            layer: "F.Cu".to_string(),
        };
        assert_eq!(k1.dedup_key(), k2.dedup_key());
    }
}
