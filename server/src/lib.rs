//! Spin-top arena server library.
//!
//! The simulation core (`top`, `bowl`, `collision`) only sees bodies through
//! the `body::RigidBody` seam. `arena` drives it on the reference host, and
//! the remaining modules serve the arena over websockets.

pub mod arena;
pub mod body;
pub mod bowl;
pub mod collision;
pub mod config;
pub mod game_loop;
pub mod player;
pub mod protocol;
pub mod state;
pub mod top;
pub mod ws;
