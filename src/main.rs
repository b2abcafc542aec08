use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use gridwalk::config::Config;
use gridwalk::game::GameContext;
use gridwalk::network::LoopbackBridge;
use gridwalk::texture;
use gridwalk::world::GridCell;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowId},
};

/// Fixed step used when no window drives the clock.
const HEADLESS_FRAME: f32 = 1.0 / 60.0;

struct App {
    game: GameContext<LoopbackBridge>,
    window: Option<Window>,
    cursor_position: PhysicalPosition<f64>,
    last_frame: Instant,
}

impl App {
    fn new(game: GameContext<LoopbackBridge>) -> Self {
        Self {
            game,
            window: None,
            cursor_position: PhysicalPosition::new(0.0, 0.0),
            last_frame: Instant::now(),
        }
    }

    fn on_click(&mut self) {
        let cursor = Vec2::new(self.cursor_position.x as f32, self.cursor_position.y as f32);
        if let Err(e) = self.game.click(cursor) {
            log::error!("Failed to send move: {e:#}");
        }
    }

    fn update_title(&self) {
        if let Some(window) = self.window.as_ref() {
            let pos = self.game.local_position();
            let cell = self.game.world.grid_from_world(pos.x, pos.z);
            window.set_title(&format!("gridwalk - ({}, {})", cell.x, cell.z));
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes().with_title("gridwalk");
            match event_loop.create_window(window_attributes) {
                Ok(window) => {
                    let size = window.inner_size();
                    self.game.resize(size.width, size.height);
                    self.window = Some(window);
                    self.last_frame = Instant::now();
                }
                Err(e) => {
                    log::error!("Failed to create window: {e}");
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match self.window.as_ref() {
            Some(window) if window.id() == id => {}
            _ => return,
        }

        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_position = position;
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.on_click();
            }
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        logical_key: Key::Named(NamedKey::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.game.resize(physical_size.width, physical_size.height);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let stats = self.game.frame(delta);
        if stats.applied > 0 || self.game.players.local().movement.is_translating() {
            self.update_title();
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

/// Drives the game without a window: walks the local player to the far
/// corner and back, the same way clicks would.
fn run_headless(mut game: GameContext<LoopbackBridge>, frames: u32) -> Result<()> {
    let corner = GridCell::new(game.world.width() as i32 - 1, game.world.depth() as i32 - 1);
    let home = GridCell::new(0, 0);

    for frame in 0..frames {
        if !game.players.local().movement.is_translating() && game.players.local().grid_target.is_none() {
            let pos = game.local_position();
            let next = if game.world.grid_from_world(pos.x, pos.z) == corner { home } else { corner };
            game.request_move(next)?;
        }
        let stats = game.frame(HEADLESS_FRAME);
        if stats.dropped > 0 {
            log::warn!("Frame {frame}: dropped {} packets", stats.dropped);
        }
    }

    let pos = game.local_position();
    log::info!("Headless run finished after {frames} frames at {pos}");
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();

    let texture_out = config.texture_out.clone();
    let headless_frames = config.headless_frames;
    let game = GameContext::new(config, LoopbackBridge::new()).context("failed to set up game")?;

    if let Some(path) = texture_out {
        texture::save_texture(&game.texture, path)?;
    }

    if let Some(frames) = headless_frames {
        return run_headless(game, frames);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(game);
    event_loop.run_app(&mut app)?;
    Ok(())
}
