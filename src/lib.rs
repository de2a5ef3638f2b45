//! Terramesh - streaming heightfield terrain generation

pub mod config;
pub mod core;
pub mod math;
pub mod streaming;
pub mod terrain;
