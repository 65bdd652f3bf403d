//! Net signal identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The electrical identity shared by conductors that must be connected.
/// Two objects are same-net iff they reference the same `NetSignal`; `None`
/// (i.e. the absence of a `NetSignal`) means "isolated".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetSignal {
    id: Uuid,
    name: String,
}

impl NetSignal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), name: name.into() }
    }

    pub fn with_id(id: Uuid, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Returns true iff `a` and `b` are both `Some` and reference the same net.
pub fn same_net(a: Option<&NetSignal>, b: Option<&NetSignal>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolated_nets_are_never_same_net() {
        let vcc = NetSignal::new("VCC");
        assert!(!same_net(Some(&vcc), None));
        assert!(!same_net(None, None));
    }

    #[test]
    fn distinct_signals_are_not_same_net() {
        let vcc = NetSignal::new("VCC");
        let gnd = NetSignal::new("GND");
        assert!(!same_net(Some(&vcc), Some(&gnd)));
    }

    #[test]
    fn identical_signal_is_same_net() {
        let vcc = NetSignal::new("VCC");
        assert!(same_net(Some(&vcc), Some(&vcc)));
    }
}
