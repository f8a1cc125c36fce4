mod component;
mod detail;
mod render;

pub use component::SupplyGraphCanvas;
pub use detail::NodeDetailPanel;
