use glam::{Vec2, Vec3};
use image::RgbImage;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::{FollowCamera, Projection};
use crate::config::Config;
use crate::error::Result;
use crate::network::NetworkBridge;
use crate::protocol::{MoveRequest, PositionUpdate};
use crate::registry::PlayerRegistry;
use crate::texture;
use crate::world::{GridCell, World};

const CAMERA_PITCH: f32 = 50.0;
const CAMERA_DISTANCE_CELLS: f32 = 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub applied: usize,
    pub dropped: usize,
}

/// Everything one running client owns. The frame loop is the only mutator.
pub struct GameContext<B> {
    pub config: Config,
    pub world: World,
    pub texture: RgbImage,
    pub players: PlayerRegistry,
    pub camera: FollowCamera,
    pub projection: Projection,
    bridge: B,
    rng: StdRng,
}

impl<B: NetworkBridge> GameContext<B> {
    pub fn new(config: Config, bridge: B) -> Result<Self> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let world = World::new(config.width, config.depth, config.cell_size)?;
        let texture = texture::synthesize(&world.heightmap, config.upscale, &mut rng)?;

        let spawn = GridCell::new((config.width / 2) as i32, (config.depth / 2) as i32)
            .to_world_pos(config.cell_size);
        let players = PlayerRegistry::with_roster(config.max_players, spawn, config.remote_mode());
        let camera = FollowCamera::orbiting(
            spawn,
            0.0,
            CAMERA_PITCH,
            config.cell_size * CAMERA_DISTANCE_CELLS,
        );
        let projection = Projection::new(800, 600, 60.0, 1.0, 20000.0);

        log::info!(
            "Game ready: {} players, remote mode {:?}",
            players.len(),
            players.remote_mode()
        );

        Ok(Self {
            config,
            world,
            texture,
            players,
            camera,
            projection,
            bridge,
            rng,
        })
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn local_position(&self) -> Vec3 {
        self.players.local().position()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// Requests a move to `cell` for the local player. The avatar starts
    /// moving once the server confirms it. Cells off the map are refused.
    pub fn request_move(&mut self, cell: GridCell) -> anyhow::Result<()> {
        let cell = self.world.check_cell(cell)?;
        self.players.local_mut().grid_target = Some(cell);
        self.bridge.send(&MoveRequest::new(cell))?;
        log::info!("Requested move to ({}, {})", cell.x, cell.z);
        Ok(())
    }

    /// Maps a click to a grid cell and requests a move there. Clicks that
    /// miss the ground do nothing.
    pub fn click(&mut self, cursor: Vec2) -> anyhow::Result<Option<GridCell>> {
        let Some(cell) = self.camera.pick_cell(&self.projection, cursor, &self.world) else {
            log::debug!("Click at {cursor} missed the terrain");
            return Ok(None);
        };
        self.request_move(cell)?;
        Ok(Some(cell))
    }

    /// One frame: apply every pending packet in arrival order, then advance
    /// all players by `delta` seconds with the camera in tow.
    pub fn frame(&mut self, delta: f32) -> FrameStats {
        let mut stats = FrameStats::default();

        while let Some(packet) = self.bridge.poll() {
            let applied = PositionUpdate::parse(&packet)
                .and_then(|update| self.players.dispatch_update(&update, &self.world, &mut self.rng));

            match applied {
                Ok(()) => {
                    // the server's cell wins, even when it differs from the request
                    self.players.local_mut().grid_target = None;
                    stats.applied += 1;
                }
                Err(err) => {
                    log::warn!("Dropping inbound packet {packet:?}: {err}");
                    stats.dropped += 1;
                }
            }
        }

        let camera = &mut self.camera;
        self.players.tick(delta, self.config.tick, |player, movement| {
            camera.follow(movement, player.position());
        });

        stats
    }
}
