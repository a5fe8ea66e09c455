//! Types shared between the spin-top arena server and its viewers:
//! configuration, the websocket protocol and the orbit camera.

pub mod camera;
pub mod config;
pub mod protocol;
