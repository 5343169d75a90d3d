//! Headless-бекенд портов сцены: тело и луч обрыва
//!
//! Stand-in движковой стороны для тестов и демо: плоский пол с дырками
//! плюс тонкие стены. Host-движок заменяет StagePlugin целиком, оставляя
//! контракт CharacterBody / EdgeSensor.

use bevy::prelude::*;

use crate::physics::components::{CharacterBody, EdgeSensor, MovementState};
use crate::SimulationSet;

/// Геометрия сцены (y-вниз: меньше floor_y — выше пола)
#[derive(Resource, Debug, Clone, Default)]
pub struct Stage {
    pub floor_y: f32,
    /// Интервалы (min_x, max_x) пола без опоры
    pub holes: Vec<(f32, f32)>,
    /// Тонкие колонны (min_x, max_x), блокирующие движение по X
    pub walls: Vec<(f32, f32)>,
}

impl Stage {
    pub fn over_hole(&self, x: f32) -> bool {
        // края дырки считаются опорой
        self.holes.iter().any(|&(min_x, max_x)| x > min_x && x < max_x)
    }

    /// Шаг тела: velocity → позиция со скольжением вдоль пола и стен.
    /// Заблокированная компонента скорости зануляется, контакты пишутся в body.
    pub fn step_body(&self, body: &mut CharacterBody, movement: &mut MovementState, delta: f32) {
        let mut next = body.position + movement.velocity * delta;

        body.on_wall = false;
        for &(min_x, max_x) in &self.walls {
            if movement.velocity.x > 0.0 && body.position.x <= min_x && next.x > min_x {
                next.x = min_x;
                movement.velocity.x = 0.0;
                body.on_wall = true;
            } else if movement.velocity.x < 0.0 && body.position.x >= max_x && next.x < max_x {
                next.x = max_x;
                movement.velocity.x = 0.0;
                body.on_wall = true;
            }
        }

        body.on_floor = false;
        if movement.velocity.y >= 0.0
            && body.position.y <= self.floor_y
            && next.y >= self.floor_y
            && !self.over_hole(next.x)
        {
            next.y = self.floor_y;
            movement.velocity.y = 0.0;
            body.on_floor = true;
        }

        body.position = next;
    }

    /// Луч вниз из (origin.x + offset_x) длиной reach: есть ли опора.
    pub fn probe_ground(&self, origin: Vec2, offset_x: f32, reach: f32) -> bool {
        let probe_x = origin.x + offset_x;
        !self.over_hole(probe_x) && origin.y <= self.floor_y && origin.y + reach >= self.floor_y
    }
}

/// Система: шаг всех тел со state'ом интегратора.
pub fn step_stage_bodies(
    stage: Res<Stage>,
    mut bodies: Query<(&mut CharacterBody, &mut MovementState)>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (mut body, mut movement) in bodies.iter_mut() {
        stage.step_body(&mut body, &mut movement, delta);
    }
}

/// Система: ответ сенсорам обрыва по свежим позициям тел.
pub fn probe_edges(stage: Res<Stage>, mut sensors: Query<(&mut EdgeSensor, &CharacterBody)>) {
    for (mut sensor, body) in sensors.iter_mut() {
        let ahead = stage.probe_ground(body.position, sensor.offset_x, sensor.reach);
        if sensor.ground_ahead != ahead {
            sensor.ground_ahead = ahead;
        }
    }
}

pub struct StagePlugin;

impl Plugin for StagePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Stage>();
        app.add_systems(
            FixedUpdate,
            (step_stage_bodies, probe_edges)
                .chain()
                .in_set(SimulationSet::Port),
        );
    }
}
