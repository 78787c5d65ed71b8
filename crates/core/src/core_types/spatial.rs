use crate::core_types::vec3::Vec3;
use rustc_hash::FxHashMap;

/// Smallest cell edge; keeps the grid finite when spacing is tiny.
const MIN_CELL_SIZE: f32 = 1e-3;

/// Neighbourhood radius (in cells) beyond which a linear scan is cheaper.
const MAX_CELL_REACH: i32 = 4;

/// Hash-grid of accepted seed positions for minimum-spacing queries.
///
/// Cells are keyed by Morton code. Distinct cells may alias to one key far
/// apart from each other; every candidate is distance-checked, so aliasing
/// only costs time, never correctness.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cells: FxHashMap<u64, Vec<Vec3>>,
    cell_size: f32,
    len: usize,
}

impl SpatialIndex {
    /// Create an empty index with the given cell edge length.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() {
            cell_size.max(MIN_CELL_SIZE)
        } else {
            MIN_CELL_SIZE
        };
        SpatialIndex {
            cells: FxHashMap::default(),
            cell_size,
            len: 0,
        }
    }

    fn cell_of(&self, pos: Vec3) -> (i32, i32, i32) {
        (
            (pos.x / self.cell_size).floor() as i32,
            (pos.y / self.cell_size).floor() as i32,
            (pos.z / self.cell_size).floor() as i32,
        )
    }

    /// Record an accepted position.
    pub fn insert(&mut self, position: Vec3) {
        let (ix, iy, iz) = self.cell_of(position);
        self.cells
            .entry(morton_encode(ix, iy, iz))
            .or_default()
            .push(position);
        self.len += 1;
    }

    /// True when no recorded position lies strictly closer than `min_distance`.
    pub fn is_clear(&self, position: Vec3, min_distance: f32) -> bool {
        if min_distance <= 0.0 || self.len == 0 {
            return true;
        }

        let reach = (min_distance / self.cell_size).ceil() as i32;
        if reach > MAX_CELL_REACH {
            return self
                .cells
                .values()
                .flatten()
                .all(|p| (p - position).norm() >= min_distance);
        }

        let (cx, cy, cz) = self.cell_of(position);
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                for dz in -reach..=reach {
                    let key = morton_encode(cx + dx, cy + dy, cz + dz);
                    if let Some(points) = self.cells.get(&key) {
                        if points.iter().any(|p| (p - position).norm() < min_distance) {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}

/// Morton encode 3D coordinates into a single 64-bit integer
/// This provides spatial locality for hash lookups
fn morton_encode(x: i32, y: i32, z: i32) -> u64 {
    // Reinterpret as unsigned so negative cells keep distinct low bits
    let x = u64::from(x as u32);
    let y = u64::from(y as u32);
    let z = u64::from(z as u32);

    let mut result = 0u64;

    for i in 0..21 {
        // 21 bits per coordinate = 63 bits total
        result |= ((x & (1 << i)) << (2 * i))
            | ((y & (1 << i)) << (2 * i + 1))
            | ((z & (1 << i)) << (2 * i + 2));
    }

    result
}
