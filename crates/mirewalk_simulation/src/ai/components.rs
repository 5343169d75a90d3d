//! Компоненты поведения walker'а (FSM, патруль, формы, idle-таймер)

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Walker — патрулирующий враг
///
/// Автоматически добавляет порт-компоненты и осциллятор через Required
/// Components; конфиги и state спавнятся явно (см. spawn_walker).
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(
    crate::physics::CharacterBody,
    crate::physics::MovementInput,
    crate::physics::EdgeSensor,
    crate::visual::SpritePlayback,
    FormVariant,
    IdleCycleTimer
)]
pub struct Walker;

/// Player — цель преследования (минимальное тело без интегратора)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
#[require(crate::physics::CharacterBody)]
pub struct Player;

/// AI FSM состояния walker'а
///
/// Attack и Stunned не имеют входного триггера в ядре: вход только через
/// WalkerDirective от host'а, ядро владеет политикой выхода.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Patrol — ходьба между границами с разворотом у стен и обрывов
    Patrol,

    /// Chase — преследование игрока по X (с прыжком к цели выше)
    Chase,

    /// Attack — замирание до погашения импульса (урон вне ядра)
    Attack,

    /// Stunned — оглушение на timer секунд, затем Patrol
    Stunned {
        timer: f32,
    },

    /// Idle — пауза осциллятора; вход/выход только через idle_cycle
    Idle,
}

impl Default for AIState {
    fn default() -> Self {
        Self::Patrol
    }
}

/// Параметры AI (радиусы — евклидова дистанция, сравнения строгие)
#[derive(Component, Debug, Clone, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct AIConfig {
    /// Полудиапазон патруля от якоря (px)
    pub patrol_range: f32,
    /// Радиус начала/удержания преследования (px)
    pub chase_range: f32,
    /// Радиус атаки — используется host'ом для директив (px)
    pub attack_range: f32,
    /// Вынос луча обрыва вперёд по ходу (px)
    pub edge_check_distance: f32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            patrol_range: 100.0,
            chase_range: 150.0,
            attack_range: 40.0,
            edge_check_distance: 20.0,
        }
    }
}

/// Состояние патруля: якорь (позиция спавна) и текущее направление (±1)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct PatrolState {
    pub origin: Vec2,
    pub direction: f32,
}

impl Default for PatrolState {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            direction: 1.0,
        }
    }
}

/// Слабый handle игрока: резолвится каждый тик через lookup,
/// пустой или протухший — штатный случай (walker возвращается в Patrol).
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct TrackedPlayer(pub Option<Entity>);

/// Визуальная форма walker'а: индекс в каталоге + бит зеркальности
///
/// Часть форм отрисована зеркально относительно направления движения —
/// причуда ассетов, сохранённая как поведение.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct FormVariant {
    pub index: usize,
    pub mirrored: bool,
}

/// Запись каталога форм
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormEntry {
    pub name: String,
    pub mirrored: bool,
}

/// Каталог форм: явная таблица entry → зеркальность вместо матчинга имён.
/// Host перезаписывает ресурс под свои спрайт-листы.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct FormCatalog {
    pub entries: Vec<FormEntry>,
}

impl Default for FormCatalog {
    fn default() -> Self {
        Self {
            entries: vec![
                FormEntry {
                    name: "green".to_string(),
                    mirrored: false,
                },
                FormEntry {
                    name: "ash".to_string(),
                    mirrored: false,
                },
                FormEntry {
                    name: "rust".to_string(),
                    mirrored: true,
                },
                FormEntry {
                    name: "pale".to_string(),
                    mirrored: true,
                },
            ],
        }
    }
}

impl FormCatalog {
    /// Равновероятный выбор формы; None только для пустого каталога.
    pub fn pick(&self, rng: &mut ChaCha8Rng) -> Option<(usize, &FormEntry)> {
        if self.entries.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.entries.len());
        Some((index, &self.entries[index]))
    }
}

/// One-shot таймер idle-осциллятора с re-arm guard'ом
///
/// remaining декрементируется тиком; running — защита от двойного взвода.
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct IdleCycleTimer {
    pub remaining: f32,
    pub running: bool,
}

impl IdleCycleTimer {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start_once(&mut self, seconds: f32) {
        self.remaining = seconds;
        self.running = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_catalog_pick_matches_table() {
        let catalog = FormCatalog::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);

        for _ in 0..50 {
            let (index, entry) = catalog.pick(&mut rng).unwrap();
            assert!(index < catalog.entries.len());
            assert_eq!(entry.mirrored, catalog.entries[index].mirrored);
        }
    }

    #[test]
    fn test_empty_catalog_picks_nothing() {
        let catalog = FormCatalog { entries: vec![] };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert!(catalog.pick(&mut rng).is_none());
    }

    #[test]
    fn test_idle_timer_one_shot() {
        let mut cycle = IdleCycleTimer::default();
        assert!(!cycle.is_running());

        cycle.start_once(4.0);
        assert!(cycle.is_running());
        assert_eq!(cycle.remaining, 4.0);
    }
}
