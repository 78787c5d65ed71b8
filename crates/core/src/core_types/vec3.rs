//! Vector type alias for 3D positions and directions.

use nalgebra::Vector3;

/// 3D vector type for positions, displacements, and directions.
///
/// Alias for `nalgebra::Vector3<f32>`. World space uses +z as the
/// free-stream direction (front wing at -z, diffuser and wake at +z),
/// +y up and x across the car.
pub type Vec3 = Vector3<f32>;
