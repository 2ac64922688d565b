// Library exports for the Kaa Battlesnake
// The server binary, the replay tool, and the integration tests share this core

pub mod bot;
pub mod config;
pub mod decision;
pub mod error;
pub mod geometry;
pub mod metadata;
pub mod occupancy;
pub mod replay;
pub mod search;
pub mod selector;
pub mod turn_recorder;
pub mod types;
