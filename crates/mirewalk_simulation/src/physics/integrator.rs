//! Буферизованный интегратор движения
//!
//! Две фазы вокруг шага порта:
//! - integrate_movement (до порта): выбор гравитации, вертикальная
//!   интеграция, подвод горизонтальной скорости к намерению AI;
//! - resolve_contacts (после порта): буферные таймеры по контактам,
//!   исполнение прыжка (jump buffer + coyote time), событие приземления.
//!
//! Ошибок нет: входы клампятся, отсутствующий порт — нарушение
//! предусловия тика, а не runtime-ситуация.

use bevy::prelude::*;

use crate::physics::components::{
    CharacterBody, Landed, MovementConfig, MovementInput, MovementState,
};
use crate::SimulationSet;

/// Фаза A: до шага порта. Работает в FixedUpdate (60Hz) для детерминизма.
pub fn integrate_movement(
    mut query: Query<(&MovementConfig, &MovementInput, &mut MovementState)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (config, input, mut movement) in query.iter_mut() {
        movement.select_gravity(config, input.jump);
        movement.integrate_vertical(delta);
        movement.approach_horizontal(config, input.direction, delta);
    }
}

/// Фаза B: после шага порта — буферы и прыжок по свежим контактам.
///
/// Запрос прыжка потребляется здесь: jump — одноразовый импульс тика.
pub fn resolve_contacts(
    mut query: Query<(
        Entity,
        &MovementConfig,
        &mut MovementState,
        &mut MovementInput,
        &CharacterBody,
    )>,
    mut landings: EventWriter<Landed>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, config, mut movement, mut input, body) in query.iter_mut() {
        if input.jump {
            movement.jump_time = 0.0;
            input.jump = false;
        }

        let was_airborne = !movement.on_ground;
        movement.on_ground = body.on_floor;

        if movement.on_ground {
            movement.air_time = 0.0;
        } else {
            movement.air_time = (movement.air_time + delta).min(config.air_buffer_seconds);
            movement.jump_time = (movement.jump_time + delta).min(config.jump_buffer_seconds);
        }

        if movement.jump_buffered(config) {
            movement.launch_jump(config);
        } else if was_airborne && movement.on_ground {
            // приземление без буферизованного прыжка — hook для host'а
            landings.write(Landed { entity });
        }
    }
}

/// Plugin интегратора: фазы по обе стороны порта.
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Landed>();
        app.add_systems(
            FixedUpdate,
            integrate_movement.in_set(SimulationSet::Integrate),
        );
        app.add_systems(FixedUpdate, resolve_contacts.in_set(SimulationSet::Resolve));
    }
}
