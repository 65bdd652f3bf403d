//! DRC settings: the parameterised rule-set a run is checked against.

use serde::{Deserialize, Serialize};

use crate::units::Length;

/// One of the allowed-slot policies for §4.5.7. Ordered from most to least
/// restrictive: `None < SingleSegmentStraight < MultiSegmentStraight < Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AllowedSlots {
    #[default]
    None,
    SingleSegmentStraight,
    MultiSegmentStraight,
    Any,
}

impl AllowedSlots {
    /// Rank of a classified hole, in the same order as `AllowedSlots`, for
    /// comparison against the configured policy.
    fn class_rank(class: crate::board::SlotClass) -> u8 {
        use crate::board::SlotClass;
        match class {
            SlotClass::Round => 0,
            SlotClass::StraightSingleSegment => 1,
            SlotClass::StraightMultiSegment => 2,
            SlotClass::Curved => 3,
        }
    }

    /// Returns true iff a hole of this class is forbidden under this policy.
    pub fn forbids(self, class: crate::board::SlotClass) -> bool {
        if self == AllowedSlots::Any {
            return false;
        }
        Self::class_rank(class) > self as u8
    }
}

/// The parameterised rule-set a board is checked against. Zero means
/// "disabled" for every numeric threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrcSettings {
    /// Minimum stroke width on copper layers.
    pub min_copper_width: Length,
    /// Minimum distance between distinct-net copper.
    pub min_copper_copper_clearance: Length,
    /// Minimum distance from copper to the board outline.
    pub min_copper_board_clearance: Length,
    /// Minimum distance from copper to non-plated holes.
    pub min_copper_npth_clearance: Length,
    /// Minimum full-ring copper around plated holes.
    pub min_pth_annular_ring: Length,
    /// Minimum round-hole diameter (NPTH).
    pub min_npth_drill_diameter: Length,
    /// Minimum round-hole diameter (PTH).
    pub min_pth_drill_diameter: Length,
    /// Minimum slot width (NPTH).
    pub min_npth_slot_width: Length,
    /// Minimum slot width (PTH).
    pub min_pth_slot_width: Length,
    pub allowed_npth_slots: AllowedSlots,
    pub allowed_pth_slots: AllowedSlots,
    /// Chord-height error bound for arc flattening; must be passed
    /// identically to every polygon operation in a run.
    pub max_arc_tolerance: Length,
}

impl Default for DrcSettings {
    fn default() -> Self {
        Self {
            min_copper_width: Length::from_millimeters(0.15),
            min_copper_copper_clearance: Length::from_millimeters(0.2),
            min_copper_board_clearance: Length::from_millimeters(0.3),
            min_copper_npth_clearance: Length::from_millimeters(0.3),
            min_pth_annular_ring: Length::from_millimeters(0.15),
            min_npth_drill_diameter: Length::from_millimeters(0.3),
            min_pth_drill_diameter: Length::from_millimeters(0.3),
            min_npth_slot_width: Length::from_millimeters(0.3),
            min_pth_slot_width: Length::from_millimeters(0.3),
            allowed_npth_slots: AllowedSlots::Any,
            allowed_pth_slots: AllowedSlots::Any,
            max_arc_tolerance: Length::from_micros(5.0),
        }
    }
}

impl DrcSettings {
    /// A conservative JLCPCB-style manufacturing profile.
    pub fn jlcpcb() -> Self {
        Self {
            min_copper_width: Length::from_millimeters(0.127),
            min_copper_copper_clearance: Length::from_millimeters(0.127),
            min_copper_board_clearance: Length::from_millimeters(0.3),
            min_copper_npth_clearance: Length::from_millimeters(0.3),
            min_pth_annular_ring: Length::from_millimeters(0.125),
            min_npth_drill_diameter: Length::from_millimeters(0.2),
            min_pth_drill_diameter: Length::from_millimeters(0.2),
            min_npth_slot_width: Length::from_millimeters(0.45),
            min_pth_slot_width: Length::from_millimeters(0.45),
            allowed_npth_slots: AllowedSlots::MultiSegmentStraight,
            allowed_pth_slots: AllowedSlots::MultiSegmentStraight,
            max_arc_tolerance: Length::from_micros(5.0),
        }
    }

    /// Disables every optional check (all thresholds zero, slots wide open)
    /// except `max_arc_tolerance`, which can never be zero.
    pub fn disabled() -> Self {
        Self {
            min_copper_width: Length::ZERO,
            min_copper_copper_clearance: Length::ZERO,
            min_copper_board_clearance: Length::ZERO,
            min_copper_npth_clearance: Length::ZERO,
            min_pth_annular_ring: Length::ZERO,
            min_npth_drill_diameter: Length::ZERO,
            min_pth_drill_diameter: Length::ZERO,
            min_npth_slot_width: Length::ZERO,
            min_pth_slot_width: Length::ZERO,
            allowed_npth_slots: AllowedSlots::Any,
            allowed_pth_slots: AllowedSlots::Any,
            max_arc_tolerance: Length::from_micros(5.0),
        }
    }

    /// Loads settings from a TOML document, e.g. a host-shipped
    /// `drc-jlcpcb.toml` manufacturing profile.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Serializes settings to a TOML document.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// `max_arc_tolerance` as a raw f64 in the nanometre-as-f64 domain the
    /// polygon algebra layer operates in.
    pub fn arc_tolerance_nm(&self) -> f64 {
        self.max_arc_tolerance.as_nanos() as f64
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::board::SlotClass;

    #[test]
    fn default_thresholds_are_nonzero() {
        let s = DrcSettings::default();
        assert!(!s.min_copper_width.is_zero());
        assert!(!s.max_arc_tolerance.is_zero());
    }

    #[test]
    fn allowed_slots_ordering() {
        assert!(AllowedSlots::None < AllowedSlots::SingleSegmentStraight);
        assert!(AllowedSlots::SingleSegmentStraight < AllowedSlots::MultiSegmentStraight);
        assert!(AllowedSlots::MultiSegmentStraight < AllowedSlots::Any);
    }

    #[test]
    fn none_policy_forbids_every_slot_shape() {
        assert!(AllowedSlots::None.forbids(SlotClass::StraightSingleSegment));
        assert!(AllowedSlots::None.forbids(SlotClass::Curved));
        assert!(!AllowedSlots::None.forbids(SlotClass::Round));
    }

    #[test]
    fn any_policy_forbids_nothing() {
        assert!(!AllowedSlots::Any.forbids(SlotClass::Curved));
    }

    #[test]
    fn single_segment_policy_forbids_multi_and_curved_only() {
        let policy = AllowedSlots::SingleSegmentStraight;
        assert!(!policy.forbids(SlotClass::StraightSingleSegment));
        assert!(policy.forbids(SlotClass::StraightMultiSegment));
        assert!(policy.forbids(SlotClass::Curved));
    }

    #[test]
    fn toml_roundtrip() {
        let s = DrcSettings::jlcpcb();
        let toml_str = s.to_toml().unwrap();
        let parsed = DrcSettings::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.min_copper_width, s.min_copper_width);
    }
}
