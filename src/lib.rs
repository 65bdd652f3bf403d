//! Board design-rule-check engine: a geometry kernel, polygon algebra over
//! flattened copper shapes, and a parameterised set of clearance and
//! manufacturing checks run against a host-owned board model.
//!
//! The board itself — traces, vias, pads, planes, the netlist, the
//! schematic/placement editors that produce it — is out of scope; this
//! crate only consumes it through the [`board::Board`] trait and reports
//! violations through the [`drc::DrcObserver`] interface.

pub mod board;
pub mod board_drc;
pub mod cache;
pub mod drc;
pub mod geometry;
pub mod layer;
pub mod message;
pub mod net;
pub mod path_gen;
pub mod polygon;
pub mod settings;
pub mod units;

pub use board::{Board, InMemoryBoard};
pub use board_drc::BoardDrcChecker;
pub use cache::{CacheKey, CopperPathsCache};
pub use drc::{CancellationToken, DrcCoordinator, DrcObserver, DrcRunState, NullObserver};
pub use geometry::{GeometryError, Path, Point, Point2D, Transform, Vertex};
pub use message::{DrcMessage, DrcMessageKind, Severity};
pub use net::NetSignal;
pub use path_gen::{clearance_offset, PathGenError};
pub use polygon::{PolygonAlgebraError, PolygonSet};
pub use settings::{AllowedSlots, DrcSettings};
pub use units::{Angle, Length, PositiveLength, UnsignedLength};
