//! Layer identity and the board's layer stack.

use serde::{Deserialize, Serialize};

/// Which side of the board a layer (or layer pair) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerSide {
    Top,
    Bottom,
    Inner,
}

/// What kind of content a layer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Copper(LayerSide),
    Outline,
    Courtyard(LayerSide),
    Silkscreen(LayerSide),
    Other,
}

/// An opaque layer identity with a stable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    name: String,
    kind: LayerKind,
    enabled: bool,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind, enabled: bool) -> Self {
        Self { name: name.into(), kind, enabled }
    }

    pub fn board_outlines() -> Self {
        Self::new("board_outlines", LayerKind::Outline, true)
    }

    pub fn top_courtyard() -> Self {
        Self::new("top_courtyard", LayerKind::Courtyard(LayerSide::Top), true)
    }

    pub fn bot_courtyard() -> Self {
        Self::new("bot_courtyard", LayerKind::Courtyard(LayerSide::Bottom), true)
    }

    pub fn copper(name: impl Into<String>, side: LayerSide, enabled: bool) -> Self {
        Self::new(name, LayerKind::Copper(side), enabled)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_copper(&self) -> bool {
        matches!(self.kind, LayerKind::Copper(_))
    }

    pub fn is_top(&self) -> bool {
        matches!(
            self.kind,
            LayerKind::Copper(LayerSide::Top) | LayerKind::Courtyard(LayerSide::Top) | LayerKind::Silkscreen(LayerSide::Top)
        )
    }

    pub fn is_bottom(&self) -> bool {
        matches!(
            self.kind,
            LayerKind::Copper(LayerSide::Bottom)
                | LayerKind::Courtyard(LayerSide::Bottom)
                | LayerKind::Silkscreen(LayerSide::Bottom)
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }
}

/// The board's ordered layer stack, from top to bottom.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name() == name)
    }

    pub fn copper_layers(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter().filter(|l| l.is_copper() && l.is_enabled())
    }

    pub fn all(&self) -> &[Layer] {
        &self.layers
    }

    /// Standard two-layer stack (`F.Cu`/`B.Cu`), used by tests and simple
    /// boards.
    pub fn two_layer() -> Self {
        Self::new(vec![
            Layer::copper("F.Cu", LayerSide::Top, true),
            Layer::copper("B.Cu", LayerSide::Bottom, true),
            Layer::board_outlines(),
            Layer::top_courtyard(),
            Layer::bot_courtyard(),
        ])
    }
}
