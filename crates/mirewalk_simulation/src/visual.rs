//! Диспетчеризация анимации walker'а
//!
//! SpritePlayback — порт анимации: симуляция пишет клип/скорость/флип,
//! host читает через Changed<SpritePlayback>. Повторный запрос играющего
//! клипа — no-op, так что спама изменений нет.

use bevy::prelude::*;

use crate::ai::FormVariant;
use crate::physics::{MovementConfig, MovementInput, MovementState};
use crate::SimulationSet;

/// Множитель скорости ходьбы (чуть бодрее единицы)
pub const WALK_PLAYBACK_SCALE: f32 = 1.15;
pub const IDLE_PLAYBACK_SCALE: f32 = 1.0;

/// Именованный клип анимации
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum Clip {
    Idle,
    Walk,
}

/// Порт плеера анимации (host потребляет через change detection)
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct SpritePlayback {
    /// None до первой диспетчеризации
    pub current: Option<Clip>,
    pub speed_scale: f32,
    pub flip_h: bool,
}

impl Default for SpritePlayback {
    fn default() -> Self {
        Self {
            current: None,
            speed_scale: 1.0,
            flip_h: false,
        }
    }
}

impl SpritePlayback {
    /// Идемпотентная смена клипа: тот же клип — no-op, параметры не трогаем.
    pub fn play(&mut self, clip: Clip, speed_scale: f32) {
        if self.current == Some(clip) {
            return;
        }
        self.current = Some(clip);
        self.speed_scale = speed_scale;
    }

    pub fn set_flip(&mut self, flip: bool) {
        if self.flip_h != flip {
            self.flip_h = flip;
        }
    }
}

/// Флип спрайта: движение влево, с поправкой на зеркальные формы
fn flip_for(target_speed: f32, mirrored: bool) -> bool {
    (target_speed < 0.0) != mirrored
}

/// Система: клип и флип по итогам тика
///
/// Walk на земле при ненулевой целевой скорости; Idle на земле и при
/// падении; восходящая фаза прыжка клип не меняет. Флип обновляется
/// только при ненулевой целевой скорости.
pub fn update_playback(
    mut query: Query<(
        &MovementInput,
        &MovementState,
        &MovementConfig,
        &FormVariant,
        &mut SpritePlayback,
    )>,
) {
    for (input, movement, config, form, mut playback) in query.iter_mut() {
        let target_speed = input.direction * config.max_speed;

        let desired = if movement.on_ground && target_speed != 0.0 {
            Some(Clip::Walk)
        } else if movement.on_ground {
            Some(Clip::Idle)
        } else if movement.velocity.y >= 0.0 {
            Some(Clip::Idle)
        } else {
            None
        };

        if let Some(clip) = desired {
            if playback.current != Some(clip) {
                let scale = match clip {
                    Clip::Walk => WALK_PLAYBACK_SCALE,
                    Clip::Idle => IDLE_PLAYBACK_SCALE,
                };
                playback.play(clip, scale);
            }
        }

        if target_speed != 0.0 {
            let flip = flip_for(target_speed, form.mirrored);
            if playback.flip_h != flip {
                playback.set_flip(flip);
            }
        }
    }
}

pub struct VisualPlugin;

impl Plugin for VisualPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_playback.in_set(SimulationSet::Visual));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_is_idempotent() {
        let mut playback = SpritePlayback::default();

        playback.play(Clip::Walk, WALK_PLAYBACK_SCALE);
        assert_eq!(playback.current, Some(Clip::Walk));
        assert_eq!(playback.speed_scale, WALK_PLAYBACK_SCALE);

        // повторный запрос того же клипа не перетирает параметры
        playback.play(Clip::Walk, 99.0);
        assert_eq!(playback.speed_scale, WALK_PLAYBACK_SCALE);

        playback.play(Clip::Idle, IDLE_PLAYBACK_SCALE);
        assert_eq!(playback.current, Some(Clip::Idle));
        assert_eq!(playback.speed_scale, IDLE_PLAYBACK_SCALE);
    }

    #[test]
    fn test_flip_convention_table() {
        // (target_speed < 0) XOR mirrored
        assert!(flip_for(-120.0, false));
        assert!(!flip_for(120.0, false));
        assert!(!flip_for(-120.0, true));
        assert!(flip_for(120.0, true));
    }
}
