//! Core types and utilities

pub mod color;
pub mod rng;
pub mod spatial;
pub mod vec3;
pub mod zone;

pub use color::{Rgb, Rgba};
pub use rng::FlowRng;
pub use spatial::SpatialIndex;
pub use vec3::Vec3;
pub use zone::ZoneType;
