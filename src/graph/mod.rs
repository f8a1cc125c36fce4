//! Supply-chain graph model and layout engine.
//!
//! Raw payload → [`normalize`] → [`validate`] → [`SimulationState`], driven
//! frame by frame through [`SupplyGraphState`]. Nothing here touches the DOM.

pub mod camera;
pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod palette;
pub mod payload;
pub mod scene;
pub mod simulation;
pub mod state;
pub mod validate;

pub use camera::{Bounds, CameraTween, ViewTransform};
pub use config::{GraphConfig, LayoutConfig};
pub use error::{PayloadError, Result};
pub use model::{AttrValue, Edge, EdgeType, Graph, Node, NodeType};
pub use normalize::normalize;
pub use palette::{LabelRule, Palette};
pub use payload::{RawEdge, RawNode, RawPayload};
pub use scene::{NodeDetail, Scene, SceneEdge, SceneNode};
pub use simulation::{Body, Pin, Point, SimulationState, step};
pub use state::SupplyGraphState;
pub use validate::validate;
