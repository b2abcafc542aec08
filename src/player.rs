use glam::Vec3;

use crate::movement::Movement;
use crate::world::GridCell;

pub const LOCAL_PLAYER: usize = 0;

pub struct Player {
    pub index: usize,
    pub movement: Movement,
    /// Cell the local player last requested, until the server answers.
    pub grid_target: Option<GridCell>,
    /// Whether the camera rides along with this player's movement.
    pub camera_follow: bool,
}

impl Player {
    pub fn new(index: usize, position: Vec3) -> Self {
        Self {
            index,
            movement: Movement::new(position),
            grid_target: None,
            camera_follow: false,
        }
    }

    /// The locally controlled avatar: index 0, camera attached.
    pub fn local(position: Vec3) -> Self {
        Self {
            camera_follow: true,
            ..Self::new(LOCAL_PLAYER, position)
        }
    }

    pub fn position(&self) -> Vec3 {
        self.movement.position()
    }

    pub fn move_to(&mut self, cell: GridCell, cell_size: f32) {
        log::debug!("Player {} moving to ({}, {})", self.index, cell.x, cell.z);
        self.movement.set_target(cell, cell_size);
    }
}
