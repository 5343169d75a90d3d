//! Idle/форм-осциллятор walker'а
//!
//! Один one-shot таймер на экземпляр: not-Idle → Idle (случайная форма из
//! каталога, эпизод 20·U(0.3, 1.2) секунд), Idle → Patrol (эпизод
//! 10·U(0.3, 1.2) секунд). Взводится при спавне и далее только собственным
//! expiry — самоподдерживающаяся осцилляция, независимая от игрока.
//! Случайность — из seed'ованного RNG симуляции.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::ai::components::{AIState, FormCatalog, FormVariant, IdleCycleTimer, Walker};
use crate::DeterministicRng;

fn idle_episode_seconds(rng: &mut ChaCha8Rng) -> f32 {
    20.0 * rng.gen_range(0.3..1.2)
}

fn patrol_episode_seconds(rng: &mut ChaCha8Rng) -> f32 {
    10.0 * rng.gen_range(0.3..1.2)
}

/// Переключение эпизода. Вызывается при спавне и по expiry таймера;
/// повторный взвод заблокирован guard'ом is_running.
pub fn cycle_idle_state(
    entity: Entity,
    state: &mut AIState,
    form: &mut FormVariant,
    cycle: &mut IdleCycleTimer,
    catalog: &FormCatalog,
    rng: &mut ChaCha8Rng,
) {
    if !matches!(*state, AIState::Idle) {
        if let Some((index, entry)) = catalog.pick(rng) {
            form.index = index;
            form.mirrored = entry.mirrored;
            crate::log(&format!("😴 {:?} → Idle (form '{}')", entity, entry.name));
        } else {
            crate::log(&format!("😴 {:?} → Idle (form catalog is empty)", entity));
        }
        *state = AIState::Idle;
        if !cycle.is_running() {
            cycle.start_once(idle_episode_seconds(rng));
        }
    } else {
        crate::log(&format!("🚶 {:?} Idle → Patrol", entity));
        *state = AIState::Patrol;
        if !cycle.is_running() {
            cycle.start_once(patrol_episode_seconds(rng));
        }
    }
}

/// Система: первичный запуск осциллятора для свежезаспавненных walker'ов.
/// Первый эпизод после спавна — всегда Idle.
pub fn bootstrap_idle_cycle(
    mut fresh: Query<
        (Entity, &mut AIState, &mut FormVariant, &mut IdleCycleTimer),
        Added<Walker>,
    >,
    catalog: Res<FormCatalog>,
    mut rng: ResMut<DeterministicRng>,
) {
    for (entity, mut state, mut form, mut cycle) in fresh.iter_mut() {
        cycle_idle_state(entity, &mut state, &mut form, &mut cycle, &catalog, &mut rng.rng);
    }
}

/// Система: тик one-shot таймера; по истечении — переключение эпизода.
pub fn tick_idle_cycle(
    mut walkers: Query<
        (Entity, &mut AIState, &mut FormVariant, &mut IdleCycleTimer),
        With<Walker>,
    >,
    catalog: Res<FormCatalog>,
    mut rng: ResMut<DeterministicRng>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut state, mut form, mut cycle) in walkers.iter_mut() {
        if !cycle.running {
            continue;
        }

        cycle.remaining = (cycle.remaining - delta).max(0.0);
        if cycle.remaining > 0.0 {
            continue;
        }

        cycle.running = false;
        cycle_idle_state(entity, &mut state, &mut form, &mut cycle, &catalog, &mut rng.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_episode_duration_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let idle = idle_episode_seconds(&mut rng);
            assert!((6.0..24.0).contains(&idle), "idle-эпизод {} вне [6, 24)", idle);
            let patrol = patrol_episode_seconds(&mut rng);
            assert!((3.0..12.0).contains(&patrol), "patrol-эпизод {} вне [3, 12)", patrol);
        }
    }

    #[test]
    fn test_cycle_toggles_without_rearm() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let catalog = FormCatalog::default();
        let mut state = AIState::Patrol;
        let mut form = FormVariant::default();
        let mut cycle = IdleCycleTimer::default();

        cycle_idle_state(
            Entity::PLACEHOLDER,
            &mut state,
            &mut form,
            &mut cycle,
            &catalog,
            &mut rng,
        );
        assert!(matches!(state, AIState::Idle));
        assert!(cycle.is_running());
        assert!(cycle.remaining >= 6.0 && cycle.remaining < 24.0);
        assert!(form.index < catalog.entries.len());
        assert_eq!(form.mirrored, catalog.entries[form.index].mirrored);

        // таймер уже взведён — повторный вызов не перевзводит
        let remaining_before = cycle.remaining;
        cycle_idle_state(
            Entity::PLACEHOLDER,
            &mut state,
            &mut form,
            &mut cycle,
            &catalog,
            &mut rng,
        );
        assert!(matches!(state, AIState::Patrol));
        assert_eq!(cycle.remaining, remaining_before);
    }

    #[test]
    fn test_cycle_arms_patrol_episode_after_expiry() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let catalog = FormCatalog::default();
        let mut state = AIState::Idle;
        let mut form = FormVariant::default();
        let mut cycle = IdleCycleTimer::default(); // expiry уже снял running

        cycle_idle_state(
            Entity::PLACEHOLDER,
            &mut state,
            &mut form,
            &mut cycle,
            &catalog,
            &mut rng,
        );
        assert!(matches!(state, AIState::Patrol));
        assert!(cycle.is_running());
        assert!(cycle.remaining >= 3.0 && cycle.remaining < 12.0);
    }
}
