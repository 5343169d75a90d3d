//! MIREWALK Simulation Core
//!
//! Headless ECS-симуляция патрулирующего walker'а на Bevy 0.16:
//! AI FSM (Patrol/Chase/Attack/Stunned/Idle) + буферизованный интегратор
//! движения (jump buffer, coyote time).
//!
//! HYBRID ARCHITECTURE:
//! - ECS = поведение и интеграция скоростей (этот crate)
//! - Host-движок = тактический слой (тело, raycast, плеер анимации)
//!   через порт-компоненты CharacterBody / EdgeSensor / SpritePlayback;
//!   в тестах и демо порт закрывает headless StagePlugin.
//!
//! Координаты экранные 2D, +Y вниз: velocity.y > 0 — падение.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

// Публичные модули
pub mod ai;
pub mod logger;
pub mod physics;
pub mod visual;

// Re-export базовых типов для удобства
pub use ai::{
    spawn_player, spawn_walker, AIConfig, AIPlugin, AIState, FormCatalog, FormEntry, FormVariant,
    IdleCycleTimer, PatrolState, Player, TrackedPlayer, Walker, WalkerDirective,
};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use physics::{
    CharacterBody, EdgeSensor, Landed, MovementConfig, MovementInput, MovementPlugin,
    MovementState, Stage, StagePlugin,
};
pub use visual::{Clip, SpritePlayback, VisualPlugin};

/// Частота fixed-тика симуляции
pub const SIMULATION_HZ: f64 = 60.0;

/// Порядок подсистем внутри одного fixed-тика (chained)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// AI решает направление и прыжок
    Decide,
    /// Интегратор до порта: гравитация + подвод горизонтальной скорости
    Integrate,
    /// Порт двигает тело и отвечает сенсорам
    Port,
    /// Буферы и прыжок по свежим контактам
    Resolve,
    /// Диспетчеризация анимации
    Visual,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
        app.insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ));

        // Детерминистичный RNG: не перетираем seed, выданный create_headless_app
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Decide,
                SimulationSet::Integrate,
                SimulationSet::Port,
                SimulationSet::Resolve,
                SimulationSet::Visual,
            )
                .chain(),
        );

        // Подсистемы ядра; порт-бекенд (StagePlugin или host-мост) добавляется отдельно
        app.add_plugins((AIPlugin, MovementPlugin, VisualPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// TimeUpdateStrategy::ManualDuration с периодом fixed-тика: каждый
/// app.update() продвигает ровно один тик, независимо от wall-clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )));

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Сериализация через Debug: простейший стабильный формат, сортировка по
/// Entity ID.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
