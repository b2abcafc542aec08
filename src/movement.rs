use glam::Vec3;

use crate::world::GridCell;

/// Squared distance under which an interpolation counts as arrived.
pub const ARRIVAL_EPSILON: f32 = 1e-7;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MovementState {
    #[default]
    Idle,
    Translating,
}

/// Linear interpolation of one avatar from wherever it is towards the last
/// cell it was sent to, covering the whole distance in one tick.
#[derive(Clone, Debug)]
pub struct Movement {
    position: Vec3,
    target: Vec3,
    direction: Vec3,
    elapsed: f32,
    state: MovementState,
}

impl Movement {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            target: position,
            direction: Vec3::ZERO,
            elapsed: 0.0,
            state: MovementState::Idle,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    pub fn is_translating(&self) -> bool {
        self.state == MovementState::Translating
    }

    /// Starts a new interpolation, dropping any one in progress.
    pub fn set_target(&mut self, cell: GridCell, cell_size: f32) {
        self.target = cell.to_world_pos(cell_size);
        self.direction = self.target - self.position;
        self.elapsed = 0.0;
        self.state = MovementState::Translating;
    }

    /// Moves by `direction * delta / tick_duration`. Returns the displacement
    /// actually applied, or `None` when idle.
    pub fn advance(&mut self, delta: f32, tick_duration: f32) -> Option<Vec3> {
        if self.state != MovementState::Translating {
            return None;
        }

        let start = self.position;
        self.position += self.direction * (delta / tick_duration);
        self.elapsed += delta;

        // the elapsed check stops large frame deltas from carrying us past the target
        if self.position.distance_squared(self.target) <= ARRIVAL_EPSILON
            || self.elapsed >= tick_duration
        {
            self.position = self.target;
            self.direction = Vec3::ZERO;
            self.state = MovementState::Idle;
        }

        Some(self.position - start)
    }
}
