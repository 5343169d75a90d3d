//! MIREWALK Simulation - Headless Demo
//!
//! Минимальная сцена: пол с ямой и стеной, парящий игрок и один walker.
//! Host-слой здесь изображают два системных хука: инжектор атак по
//! дистанции (вместо боевой системы) и логгер приземлений.
//!
//! Запуск: cargo run -p mirewalk_simulation

use bevy::prelude::*;
use mirewalk_simulation::{
    create_headless_app, log, spawn_player, spawn_walker, AIConfig, AIState, CharacterBody, Landed,
    MovementConfig, MovementState, Player, SimulationPlugin, SimulationSet, Stage, StagePlugin,
    Walker, WalkerDirective,
};

/// Кулдаун между приказами атаки (сек)
const ATTACK_ORDER_COOLDOWN: f32 = 2.5;

/// Количество тиков демо (60 сек симуляции при 60Hz)
const DEMO_TICKS: u32 = 3600;

/// Суррогат боевой системы host'а: таймер до следующего приказа
#[derive(Resource, Default)]
struct AttackInjector {
    cooldown: f32,
}

fn main() {
    log("🎮 MIREWALK simulation demo starting...");

    let mut app = create_headless_app(42);
    app.add_plugins((SimulationPlugin, StagePlugin));

    // Пол на y=0, яма справа, невысокая стена слева
    app.insert_resource(Stage {
        floor_y: 0.0,
        holes: vec![(120.0, 180.0)],
        walls: vec![(-120.0, -116.0)],
    });

    app.init_resource::<AttackInjector>();
    app.add_systems(
        FixedUpdate,
        (inject_attack_orders, log_landings).after(SimulationSet::Visual),
    );

    // Игрок парит выше пола — walker будет прыгать к нему
    let player = {
        let mut commands = app.world_mut().commands();
        spawn_player(&mut commands, Vec2::new(-60.0, -30.0))
    };
    app.world_mut().flush();

    let walker = {
        let mut commands = app.world_mut().commands();
        spawn_walker(
            &mut commands,
            Vec2::ZERO,
            MovementConfig::default(),
            AIConfig {
                patrol_range: 1000.0,
                ..default()
            },
            Some(player),
        )
    };
    app.world_mut().flush();

    log(&format!(
        "Spawned walker {:?} tracking player {:?}",
        walker, player
    ));

    for tick in 0..DEMO_TICKS {
        app.update();

        if tick % 240 == 0 {
            let world = app.world_mut();
            let mut walkers = world
                .query_filtered::<(&CharacterBody, &MovementState, &AIState), With<Walker>>();
            if let Ok((body, movement, state)) = walkers.single(world) {
                log(&format!(
                    "tick {:4}: pos=({:6.1}, {:6.1}) vel=({:6.1}, {:6.1}) state={:?}",
                    tick,
                    body.position.x,
                    body.position.y,
                    movement.velocity.x,
                    movement.velocity.y,
                    state
                ));
            }
        }
    }

    log("✅ Demo complete");
}

/// Выдаёт приказ атаки, когда walker в радиусе attack_range от игрока
///
/// В полном host'е это делает боевая система; демо повторяет только
/// дистанционный триггер с кулдауном.
fn inject_attack_orders(
    time: Res<Time>,
    mut injector: ResMut<AttackInjector>,
    walkers: Query<(Entity, &CharacterBody, &AIConfig), With<Walker>>,
    players: Query<&CharacterBody, With<Player>>,
    mut directives: EventWriter<WalkerDirective>,
) {
    injector.cooldown = (injector.cooldown - time.delta_secs()).max(0.0);
    if injector.cooldown > 0.0 {
        return;
    }

    let Ok(player_body) = players.single() else {
        return;
    };

    for (entity, body, config) in walkers.iter() {
        if body.position.distance(player_body.position) < config.attack_range {
            directives.write(WalkerDirective::OrderAttack { entity });
            injector.cooldown = ATTACK_ORDER_COOLDOWN;
        }
    }
}

fn log_landings(mut landings: EventReader<Landed>) {
    for landed in landings.read() {
        log(&format!("💥 {:?} hit the ground", landed.entity));
    }
}
