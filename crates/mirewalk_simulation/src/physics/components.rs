//! Компоненты движения walker'а
//!
//! Координаты экранные 2D, +Y вниз: velocity.y > 0 — падение,
//! прыжок задаёт отрицательный velocity.y. Интеграция скоростей живёт
//! здесь методами MovementState, чтобы тестировать математику без App.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Параметры движения (задаются при спавне, data-driven тюнинг)
///
/// Инварианты: все поля ≥ 0, gravity_strong ≥ gravity.
#[derive(Component, Debug, Clone, Copy, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct MovementConfig {
    /// Максимальная горизонтальная скорость (px/s)
    pub max_speed: f32,
    /// Высота прыжка (px): launch speed = √(2·jump_height·gravity)
    pub jump_height: f32,
    /// Лёгкая гравитация — восходящая фаза прыжка (px/s²)
    pub gravity: f32,
    /// Сильная гравитация — падение и jump cut (px/s²)
    pub gravity_strong: f32,
    /// Разгон к желаемой скорости (px/s²)
    pub acceleration: f32,
    /// Торможение (px/s²)
    pub deceleration: f32,
    /// Coyote time: окно прыжка после схода с опоры (секунды)
    pub air_buffer_seconds: f32,
    /// Jump buffer: окно досрочного нажатия прыжка (секунды)
    pub jump_buffer_seconds: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 120.0,
            jump_height: 40.0,
            gravity: 310.0,
            gravity_strong: 620.0,
            acceleration: 512.0,
            deceleration: 600.0,
            air_buffer_seconds: 0.15,
            jump_buffer_seconds: 0.1,
        }
    }
}

/// Текущее состояние интегратора (мутируется каждый fixed-тик)
///
/// Инварианты: air_time ∈ [0, air_buffer_seconds], jump_time ∈ [0, jump_buffer_seconds];
/// air_time сбрасывается в 0 в момент контакта с полом; таймеры растут
/// только в воздухе и клампятся к потолку.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct MovementState {
    pub velocity: Vec2,
    pub on_ground: bool,
    /// Время с момента схода с опоры (для coyote time)
    pub air_time: f32,
    /// Время с момента запроса прыжка (для jump buffer)
    pub jump_time: f32,
    /// Выбранная гравитация (лёгкая после прыжка, сильная при падении)
    pub target_gravity: f32,
}

impl MovementState {
    /// Оба буферных таймера стартуют с потолка: свежезаспавненное тело
    /// не имеет ни подвисшего запроса прыжка, ни «недавней» опоры.
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            velocity: Vec2::ZERO,
            on_ground: false,
            air_time: config.air_buffer_seconds,
            jump_time: config.jump_buffer_seconds,
            target_gravity: config.gravity_strong,
        }
    }

    /// Выбор гравитации: сильная при падении или при подвисшем буферном
    /// запросе без свежего нажатия; иначе сохраняем текущую (лёгкая
    /// держится всю восходящую фазу после прыжка).
    pub fn select_gravity(&mut self, config: &MovementConfig, jump_requested: bool) {
        if self.velocity.y > 0.0
            || (!jump_requested && self.jump_time < config.jump_buffer_seconds)
        {
            self.target_gravity = config.gravity_strong;
        }
    }

    pub fn integrate_vertical(&mut self, delta: f32) {
        self.velocity.y += self.target_gravity * delta;
    }

    /// Монотонный подвод velocity.x к dir·max_speed. Acceleration — когда
    /// input не противоречит знаку текущей скорости (старт с места
    /// считается согласным), deceleration — торможение и реверс.
    pub fn approach_horizontal(&mut self, config: &MovementConfig, direction: f32, delta: f32) {
        let target_speed = direction * config.max_speed;
        let accel = if direction != 0.0 && direction * self.velocity.x >= 0.0 {
            config.acceleration
        } else {
            config.deceleration
        };
        self.velocity.x = move_toward(self.velocity.x, target_speed, accel * delta);
    }

    /// Прыжок буферизован: запрос свежее jump_buffer И опора была свежее
    /// air_buffer (jump buffer + coyote time одним условием).
    pub fn jump_buffered(&self, config: &MovementConfig) -> bool {
        self.jump_time < config.jump_buffer_seconds && self.air_time < config.air_buffer_seconds
    }

    /// Исполнение прыжка: launch speed вверх (y-вниз: минус), лёгкая
    /// гравитация на восходящую фазу, оба таймера к потолку — буфер потреблён.
    /// Флаг опоры снимается сразу: решение следующего тика видит тело в
    /// воздухе, а не стоящим на полу с устаревшим контактом.
    pub fn launch_jump(&mut self, config: &MovementConfig) {
        self.velocity.y = -(2.0 * config.jump_height * config.gravity).sqrt();
        self.target_gravity = config.gravity;
        self.jump_time = config.jump_buffer_seconds;
        self.air_time = config.air_buffer_seconds;
        self.on_ground = false;
    }
}

/// Намерение движения от AI (или host'а в тестах)
///
/// direction ∈ [-1, 1]; jump — запрос прыжка, потребляется интегратором
/// в конце тика.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct MovementInput {
    pub direction: f32,
    pub jump: bool,
}

impl MovementInput {
    pub fn set_direction(&mut self, direction: f32) {
        self.direction = direction.clamp(-1.0, 1.0);
    }
}

/// Порт физического тела: пишет только бекенд порта (host-движок или
/// headless Stage), симуляция читает.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct CharacterBody {
    pub position: Vec2,
    /// Контакт с полом после последнего шага порта
    pub on_floor: bool,
    /// Контакт со стеной после последнего шага порта
    pub on_wall: bool,
}

/// Порт сенсора обрыва: луч вниз на offset_x впереди тела
///
/// offset_x перенацеливает AI, ground_ahead отвечает бекенд порта.
/// Ответ отстаёт на один тик от прицеливания — как и у луча в сцене.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct EdgeSensor {
    pub offset_x: f32,
    /// Длина луча вниз (px)
    pub reach: f32,
    pub ground_ahead: bool,
}

impl Default for EdgeSensor {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            reach: 8.0,
            ground_ahead: true, // оптимистично до первого опроса
        }
    }
}

/// Приземление без буферизованного прыжка (hook-расширение, ядро не подписано)
#[derive(Event, Debug, Clone, Copy)]
pub struct Landed {
    pub entity: Entity,
}

/// move_toward в семантике Godot: шаг к цели не длиннее max_delta, без перелёта
pub fn move_toward(from: f32, to: f32, max_delta: f32) -> f32 {
    if (to - from).abs() <= max_delta {
        to
    } else {
        from + (to - from).signum() * max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: f32 = 1.0 / 60.0;

    #[test]
    fn test_acceleration_from_rest() {
        // max_speed=120, acceleration=512: первый тик с места даёт 512/60 ≈ 8.53
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config);

        state.approach_horizontal(&config, 1.0, TICK);

        assert!(
            (state.velocity.x - 512.0 / 60.0).abs() < 1e-3,
            "velocity.x = {}",
            state.velocity.x
        );
    }

    #[test]
    fn test_jump_launch_speed() {
        // jump_height=40, gravity=310: √(2·40·310) ≈ 157.48, вверх = минус
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config);

        state.launch_jump(&config);

        assert!(
            (state.velocity.y + 157.4802).abs() < 1e-2,
            "velocity.y = {}",
            state.velocity.y
        );
        assert_eq!(state.target_gravity, config.gravity);
        assert_eq!(state.jump_time, config.jump_buffer_seconds);
        assert_eq!(state.air_time, config.air_buffer_seconds);
    }

    #[test]
    fn test_launch_clears_ground_contact() {
        // устаревший флаг опоры заставил бы AI пере-запросить прыжок и
        // сбросить jump_time в воздухе (сильная гравитация на взлёте)
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config);
        state.on_ground = true;
        state.air_time = 0.0;
        state.jump_time = 0.0;

        state.launch_jump(&config);

        assert!(!state.on_ground);
        assert!(!state.jump_buffered(&config));
    }

    #[test]
    fn test_deceleration_converges_without_overshoot() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config);
        state.velocity.x = 120.0;

        let mut previous = state.velocity.x;
        for _ in 0..120 {
            state.approach_horizontal(&config, 0.0, TICK);
            assert!(state.velocity.x >= 0.0, "перелёт через ноль: {}", state.velocity.x);
            assert!(state.velocity.x <= previous, "немонотонное торможение");
            previous = state.velocity.x;
        }
        assert_eq!(state.velocity.x, 0.0);
    }

    #[test]
    fn test_opposing_input_brakes_with_deceleration() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config);
        state.velocity.x = -50.0;

        state.approach_horizontal(&config, 1.0, TICK);

        // реверс гасится deceleration'ом, не acceleration'ом
        let expected = -50.0 + config.deceleration * TICK;
        assert!(
            (state.velocity.x - expected).abs() < 1e-3,
            "velocity.x = {}",
            state.velocity.x
        );
    }

    #[test]
    fn test_gravity_selection() {
        let config = MovementConfig::default();
        let mut state = MovementState::new(&config);

        // падение → сильная
        state.target_gravity = config.gravity;
        state.velocity.y = 10.0;
        state.select_gravity(&config, false);
        assert_eq!(state.target_gravity, config.gravity_strong);

        // восходящая фаза после прыжка (буфер потреблён) → лёгкая сохраняется
        state.launch_jump(&config);
        state.select_gravity(&config, false);
        assert_eq!(state.target_gravity, config.gravity);

        // подвисший буферный запрос без свежего нажатия → сильная
        state.jump_time = 0.0;
        state.select_gravity(&config, false);
        assert_eq!(state.target_gravity, config.gravity_strong);
    }

    #[test]
    fn test_new_state_has_no_pending_jump() {
        // нулевые таймеры при спавне дали бы фантомный прыжок на первом тике
        let config = MovementConfig::default();
        let state = MovementState::new(&config);

        assert!(!state.jump_buffered(&config));
        assert_eq!(state.target_gravity, config.gravity_strong);
        assert!(!state.on_ground);
    }

    #[test]
    fn test_move_toward() {
        assert_eq!(move_toward(0.0, 10.0, 3.0), 3.0);
        assert_eq!(move_toward(9.0, 10.0, 3.0), 10.0); // не перелетаем цель
        assert_eq!(move_toward(-5.0, -10.0, 2.0), -7.0);
        assert_eq!(move_toward(5.0, 5.0, 1.0), 5.0);
    }

    #[test]
    fn test_direction_clamp() {
        let mut input = MovementInput::default();
        input.set_direction(3.5);
        assert_eq!(input.direction, 1.0);
        input.set_direction(-2.0);
        assert_eq!(input.direction, -1.0);
        input.set_direction(0.25);
        assert_eq!(input.direction, 0.25);
    }
}
