pub mod base;
pub mod marker;
pub mod radius;

pub use base::{LayerSpec, LayerType, Visibility};
pub use marker::{DistanceMarker, DistanceMarkerSet};
pub use radius::SearchRadius;
