//! Движение walker'а: буферизованный интегратор + headless-порт сцены

pub mod components;
pub mod integrator;
pub mod stage;

// Re-export для удобного импорта
pub use components::*;
pub use integrator::{integrate_movement, resolve_contacts, MovementPlugin};
pub use stage::{probe_edges, step_stage_bodies, Stage, StagePlugin};
