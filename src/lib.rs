pub mod camera;
pub mod config;
pub mod error;
pub mod game;
pub mod movement;
pub mod network;
pub mod player;
pub mod protocol;
pub mod registry;
pub mod texture;
pub mod world;

pub use error::{Error, Result};
