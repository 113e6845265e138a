pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod gateway;
pub mod hub;
pub mod movement;
pub mod protocol;
pub mod ranking;
pub mod rng;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod types;
pub mod world;
