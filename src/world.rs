use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Height added on top of the cell size so avatars sit just above the tiles.
pub const STANDING_OFFSET: f32 = 0.1;

/// A discrete cell on the XZ plane. Travels over the wire as `[x, z]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridCell {
    pub x: i32,
    pub z: i32,
}

impl GridCell {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Render-space point an avatar standing on this cell occupies.
    pub fn to_world_pos(&self, cell_size: f32) -> Vec3 {
        Vec3::new(
            self.x as f32 * cell_size,
            cell_size + STANDING_OFFSET,
            self.z as f32 * cell_size,
        )
    }
}

impl From<[i32; 2]> for GridCell {
    fn from([x, z]: [i32; 2]) -> Self {
        Self { x, z }
    }
}

impl From<GridCell> for [i32; 2] {
    fn from(cell: GridCell) -> Self {
        [cell.x, cell.z]
    }
}

/// Tiling rule: 2x2 raised blocks separated by 2-wide gutters.
pub fn tile(x: usize, y: usize) -> u8 {
    if y % 4 >= 2 || x % 4 >= 2 { 0 } else { 1 }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heightmap {
    width: usize,
    depth: usize,
    data: Vec<u8>,
}

impl Heightmap {
    pub fn generate(width: usize, depth: usize) -> Result<Self> {
        if width == 0 || depth == 0 {
            return Err(Error::InvalidArgument(format!(
                "heightmap dimensions must be positive, got {width}x{depth}"
            )));
        }

        let data = (0..width * depth)
            .map(|i| tile(i % width, i / width))
            .collect();

        Ok(Self { width, depth, data })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.width + x]
    }

    /// Reads a cell, clamping out-of-grid coordinates to the nearest edge.
    pub fn get_clamped(&self, x: isize, y: isize) -> u8 {
        let x = x.clamp(0, self.width as isize - 1) as usize;
        let y = y.clamp(0, self.depth as isize - 1) as usize;
        self.get(x, y)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

pub struct World {
    pub heightmap: Heightmap,
    pub cell_size: f32,
}

impl World {
    pub fn new(width: usize, depth: usize, cell_size: f32) -> Result<Self> {
        if !(cell_size > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "cell size must be positive, got {cell_size}"
            )));
        }
        let heightmap = Heightmap::generate(width, depth)?;
        log::info!("Generated {width}x{depth} heightmap, cell size {cell_size}");
        Ok(Self { heightmap, cell_size })
    }

    pub fn width(&self) -> usize {
        self.heightmap.width()
    }

    pub fn depth(&self) -> usize {
        self.heightmap.depth()
    }

    /// Maps a world-space XZ point to a grid cell, clamped to `[0, width] x [0, depth]`.
    pub fn grid_from_world(&self, x: f32, z: f32) -> GridCell {
        grid_from_world(x, z, self.cell_size, self.width(), self.depth())
    }

    /// Accepts cells in `[0, width] x [0, depth]`; the upper bound is inclusive
    /// to match what click mapping can produce.
    pub fn check_cell(&self, cell: GridCell) -> Result<GridCell> {
        let in_range = |v: i32, max: usize| v >= 0 && v as usize <= max;
        if in_range(cell.x, self.width()) && in_range(cell.z, self.depth()) {
            Ok(cell)
        } else {
            Err(Error::OutOfRange {
                x: cell.x,
                z: cell.z,
                width: self.width(),
                depth: self.depth(),
            })
        }
    }
}

pub fn grid_from_world(x: f32, z: f32, cell_size: f32, width: usize, depth: usize) -> GridCell {
    let clamp = |v: f32, max: usize| ((v / cell_size).floor().max(0.0) as i64).min(max as i64) as i32;
    GridCell {
        x: clamp(x, width),
        z: clamp(z, depth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, 1)]
    #[test_case(4, 4)]
    #[test_case(7, 3)]
    #[test_case(256, 256)]
    fn heightmap_matches_tiling_rule(width: usize, depth: usize) {
        let map = Heightmap::generate(width, depth).unwrap();
        assert_eq!(map.as_slice().len(), width * depth);

        for y in 0..depth {
            for x in 0..width {
                let expected = if y % 4 < 2 && x % 4 < 2 { 1 } else { 0 };
                assert_eq!(map.get(x, y), expected, "cell ({x}, {y})");
                assert_eq!(map.as_slice()[y * width + x], expected);
            }
        }
    }

    #[test]
    fn heightmap_is_deterministic() {
        let a = Heightmap::generate(33, 17).unwrap();
        let b = Heightmap::generate(33, 17).unwrap();
        assert_eq!(a, b);
    }

    #[test_case(0, 4)]
    #[test_case(4, 0)]
    #[test_case(0, 0)]
    fn zero_dimensions_are_rejected(width: usize, depth: usize) {
        assert!(matches!(
            Heightmap::generate(width, depth),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn clamped_reads_stick_to_edges() {
        let map = Heightmap::generate(6, 6).unwrap();
        assert_eq!(map.get_clamped(-3, 0), map.get(0, 0));
        assert_eq!(map.get_clamped(10, 2), map.get(5, 2));
        assert_eq!(map.get_clamped(2, 99), map.get(2, 5));
    }

    #[test]
    fn grid_mapping_floors_and_clamps() {
        assert_eq!(grid_from_world(250.0, 399.9, 100.0, 8, 8), GridCell::new(2, 3));
        assert_eq!(grid_from_world(-50.0, -1.0, 100.0, 8, 8), GridCell::new(0, 0));
        assert_eq!(grid_from_world(5000.0, 850.0, 100.0, 8, 8), GridCell::new(8, 8));
    }

    #[test]
    fn cell_to_world_pos_stands_above_tile() {
        let pos = GridCell::new(1, 1).to_world_pos(100.0);
        assert_eq!(pos, Vec3::new(100.0, 100.1, 100.0));
    }

    #[test]
    fn check_cell_reports_out_of_range() {
        let world = World::new(8, 8, 100.0).unwrap();
        assert!(world.check_cell(GridCell::new(8, 0)).is_ok());
        assert!(matches!(
            world.check_cell(GridCell::new(-1, 3)),
            Err(Error::OutOfRange { x: -1, z: 3, .. })
        ));
    }
}
