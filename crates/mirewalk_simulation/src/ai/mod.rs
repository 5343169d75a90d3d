//! Поведение walker'а: FSM + idle-осциллятор + директивы host'а
//!
//! Порядок решения тика (chained, set Decide):
//! 1. apply_directives — внешние входы Attack/Stunned
//! 2. bootstrap_idle_cycle — первичный запуск осциллятора после спавна
//! 3. tick_idle_cycle — expiry таймера переключает Idle/Patrol
//! 4. behavior_decide — match по состоянию: direction/jump/переходы

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod fsm;
pub mod idle_cycle;

// Re-export основных типов
pub use components::{
    AIConfig, AIState, FormCatalog, FormEntry, FormVariant, IdleCycleTimer, PatrolState, Player,
    TrackedPlayer, Walker,
};
pub use events::WalkerDirective;

use crate::physics::{CharacterBody, MovementConfig, MovementState};

/// AI Plugin: решение тика в SimulationSet::Decide, последовательно
/// для детерминизма seed'ованного RNG.
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WalkerDirective>();
        app.init_resource::<FormCatalog>();
        app.add_systems(
            FixedUpdate,
            (
                fsm::apply_directives,
                idle_cycle::bootstrap_idle_cycle,
                idle_cycle::tick_idle_cycle,
                fsm::behavior_decide,
            )
                .chain()
                .in_set(crate::SimulationSet::Decide),
        );
    }
}

/// Spawn helper: walker с полным набором компонентов
///
/// Позиция спавна становится якорем патруля; порт-компоненты и осциллятор
/// добавляются через Required Components маркера Walker.
pub fn spawn_walker(
    commands: &mut Commands,
    position: Vec2,
    movement_config: MovementConfig,
    ai_config: AIConfig,
    tracked_player: Option<Entity>,
) -> Entity {
    let movement = MovementState::new(&movement_config);

    commands
        .spawn((
            Walker,
            CharacterBody {
                position,
                ..default()
            },
            movement_config,
            movement,
            ai_config,
            AIState::default(),
            PatrolState {
                origin: position,
                direction: 1.0,
            },
            TrackedPlayer(tracked_player),
        ))
        .id()
}

/// Spawn helper: игрок-цель (минимальное тело, без интегратора)
pub fn spawn_player(commands: &mut Commands, position: Vec2) -> Entity {
    commands
        .spawn((
            Player,
            CharacterBody {
                position,
                ..default()
            },
        ))
        .id()
}
