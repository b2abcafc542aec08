use glam::Vec3;
use rand::Rng;

use crate::error::Result;
use crate::player::{LOCAL_PLAYER, Player};
use crate::protocol::PositionUpdate;
use crate::world::{GridCell, World};

/// How remote players (every slot except the local one) pick their targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemoteMode {
    /// Slot `i` of each packet drives player `i`.
    #[default]
    Payload,
    /// Remote players wander to a random cell on every packet, ignoring
    /// its contents. Useful without a server that reports other players.
    Demo,
}

/// Ordered set of tracked players. Slot 0 is always the local player.
pub struct PlayerRegistry {
    players: Vec<Player>,
    remote_mode: RemoteMode,
}

impl PlayerRegistry {
    pub fn new(local: Player, remote_mode: RemoteMode) -> Self {
        Self {
            players: vec![local],
            remote_mode,
        }
    }

    /// Local player plus `size - 1` remote players, all at `spawn`.
    pub fn with_roster(size: usize, spawn: Vec3, remote_mode: RemoteMode) -> Self {
        let mut registry = Self::new(Player::local(spawn), remote_mode);
        for index in 1..size {
            registry.add(Player::new(index, spawn));
        }
        registry
    }

    pub fn remote_mode(&self) -> RemoteMode {
        self.remote_mode
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn add(&mut self, mut player: Player) {
        player.index = self.players.len();
        self.players.push(player);
    }

    /// Removes a remote player; later players shift down one slot.
    /// Indices are positions, not stable identities.
    pub fn remove(&mut self, index: usize) -> Option<Player> {
        if index == LOCAL_PLAYER || index >= self.players.len() {
            log::warn!("Refusing to remove player {index} (roster size {})", self.players.len());
            return None;
        }

        let removed = self.players.remove(index);
        for (slot, player) in self.players.iter_mut().enumerate().skip(index) {
            player.index = slot;
        }
        Some(removed)
    }

    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    pub fn local(&self) -> &Player {
        &self.players[LOCAL_PLAYER]
    }

    pub fn local_mut(&mut self) -> &mut Player {
        &mut self.players[LOCAL_PLAYER]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Applies one inbound packet. Positions are the server's word and are
    /// applied as sent. A packet without a usable slot 0 is rejected as a
    /// whole and leaves every player untouched.
    pub fn dispatch_update<R: Rng>(
        &mut self,
        update: &PositionUpdate,
        world: &World,
        rng: &mut R,
    ) -> Result<()> {
        let local_cell = update.local_pos()?;
        let cell_size = world.cell_size;

        self.local_mut().move_to(local_cell, cell_size);

        for player in self.players.iter_mut().skip(1) {
            let cell = match self.remote_mode {
                RemoteMode::Payload => match update.pos_for(player.index) {
                    Some(cell) => cell,
                    None => continue,
                },
                RemoteMode::Demo => GridCell::new(
                    rng.random_range(0..=world.width() as i32),
                    rng.random_range(0..=world.depth() as i32),
                ),
            };

            player.move_to(cell, cell_size);
        }

        Ok(())
    }

    /// Advances every player by `delta` seconds. `on_follow` receives each
    /// camera-following player together with the displacement it just made.
    pub fn tick<F>(&mut self, delta: f32, tick_duration: f32, mut on_follow: F)
    where
        F: FnMut(&Player, Vec3),
    {
        for player in self.players.iter_mut() {
            if let Some(movement) = player.movement.advance(delta, tick_duration) {
                if player.camera_follow {
                    on_follow(&*player, movement);
                }
            }
        }
    }
}
