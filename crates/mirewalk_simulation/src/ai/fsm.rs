//! FSM walker'а: применение директив host'а и решение тика
//!
//! Один match по AIState; каждая ветка выставляет (новый state, direction,
//! jump) по сенсорике. Порядок приоритетов патруля: граница диапазона,
//! затем стена/обрыв — любого достаточно для разворота.

use bevy::prelude::*;

use crate::ai::components::{AIConfig, AIState, PatrolState, Player, TrackedPlayer, Walker};
use crate::ai::events::WalkerDirective;
use crate::physics::{CharacterBody, EdgeSensor, MovementConfig, MovementInput, MovementState};

/// Порог выхода из Attack: импульс погашен, |velocity.x| ниже (px/s)
const ATTACK_RELEASE_SPEED: f32 = 5.0;

/// Знак со схлопыванием нуля (семантика Godot): 0.0 → 0.0
///
/// f32::signum отдаёт 1.0 на нуле — для chase это дрожь на точном
/// совпадении X, поэтому свой helper.
fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Обнуление намерения с guard'ами от Changed-спама
fn freeze_input(input: &mut MovementInput) {
    if input.direction != 0.0 {
        input.direction = 0.0;
    }
    if input.jump {
        input.jump = false;
    }
}

/// Система: применение директив host'а (до решения тика)
///
/// Вход в Attack/Stunned только отсюда; FSM владеет политикой выхода.
pub fn apply_directives(
    mut directives: EventReader<WalkerDirective>,
    mut walkers: Query<(&mut AIState, &mut MovementInput), With<Walker>>,
) {
    for directive in directives.read() {
        match directive {
            WalkerDirective::OrderAttack { entity } => {
                // цель могла деспавниться — штатно пропускаем
                let Ok((mut state, mut input)) = walkers.get_mut(*entity) else {
                    continue;
                };
                if !matches!(*state, AIState::Attack) {
                    crate::log(&format!("⚔️ {:?} → Attack (host directive)", entity));
                    *state = AIState::Attack;
                }
                freeze_input(&mut input);
            }

            WalkerDirective::Stun { entity, duration } => {
                let Ok((mut state, mut input)) = walkers.get_mut(*entity) else {
                    continue;
                };
                crate::log(&format!("💫 {:?} → Stunned ({:.2}s)", entity, duration));
                *state = AIState::Stunned { timer: *duration };
                freeze_input(&mut input);
            }
        }
    }
}

/// Система: решение тика walker'а
///
/// ⚠️ Сенсорика прошлого тика: порт отвечает после решения, поэтому
/// ground_ahead/on_wall отстают на тик — как и лучи движка в сцене.
pub fn behavior_decide(
    mut walkers: Query<
        (
            Entity,
            &mut AIState,
            &mut PatrolState,
            &mut MovementInput,
            &mut EdgeSensor,
            &CharacterBody,
            &MovementState,
            &MovementConfig,
            &AIConfig,
            &TrackedPlayer,
        ),
        With<Walker>,
    >,
    players: Query<&CharacterBody, With<Player>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (
        entity,
        mut state,
        mut patrol,
        mut input,
        mut sensor,
        body,
        movement,
        movement_config,
        config,
        tracked,
    ) in walkers.iter_mut()
    {
        // слабый handle: игрок мог деспавниться, оба случая штатны
        let player = tracked.0.and_then(|target| players.get(target).ok());

        let new_state = match state.as_ref() {
            AIState::Patrol => {
                let displacement = body.position.x - patrol.origin.x;

                if displacement.abs() > config.patrol_range {
                    // вышли за границу — к якорю (приоритет над сенсором)
                    let back = -sign(displacement);
                    if patrol.direction != back {
                        crate::log(&format!(
                            "🔄 {:?} Patrol: bound crossed at x={:.1}, turning {}",
                            entity, body.position.x, back
                        ));
                        patrol.direction = back;
                    }
                } else if body.on_wall || (movement.on_ground && !sensor.ground_ahead) {
                    patrol.direction = -patrol.direction;
                    crate::log(&format!(
                        "🔄 {:?} Patrol: obstacle ahead, turning {}",
                        entity, patrol.direction
                    ));
                }

                if input.direction != patrol.direction {
                    input.direction = patrol.direction;
                }
                if input.jump {
                    input.jump = false;
                }

                // перенацеливаем луч обрыва по (возможно новому) ходу
                let aim = config.edge_check_distance * patrol.direction;
                if sensor.offset_x != aim {
                    sensor.offset_x = aim;
                }

                match player {
                    Some(target) if body.position.distance(target.position) < config.chase_range => {
                        crate::log(&format!("⚔️ {:?} Patrol → Chase (player in range)", entity));
                        AIState::Chase
                    }
                    _ => AIState::Patrol,
                }
            }

            AIState::Chase => match player {
                Some(target) if body.position.distance(target.position) < config.chase_range => {
                    let direction = sign(target.position.x - body.position.x);
                    if input.direction != direction {
                        input.direction = direction;
                    }

                    // y-вниз: игрок выше, когда его y меньше нашего
                    let jump = movement.on_ground
                        && body.position.y - target.position.y > movement_config.jump_height / 2.0;
                    if input.jump != jump {
                        input.jump = jump;
                    }

                    AIState::Chase
                }
                _ => {
                    // игрок пропал или вышел из радиуса: в этот тик стоим,
                    // запрос прыжка не висит
                    crate::log(&format!("🚶 {:?} Chase → Patrol (target lost)", entity));
                    freeze_input(&mut input);
                    AIState::Patrol
                }
            },

            AIState::Attack => {
                freeze_input(&mut input);

                if movement.velocity.x.abs() < ATTACK_RELEASE_SPEED {
                    crate::log(&format!("🔄 {:?} Attack → Chase (momentum spent)", entity));
                    AIState::Chase
                } else {
                    AIState::Attack
                }
            }

            AIState::Stunned { timer } => {
                freeze_input(&mut input);

                let new_timer = (*timer - delta).max(0.0);
                if new_timer <= 0.0 {
                    crate::log(&format!("🚶 {:?} Stunned → Patrol (recovered)", entity));
                    AIState::Patrol
                } else {
                    AIState::Stunned { timer: new_timer }
                }
            }

            AIState::Idle => {
                freeze_input(&mut input);
                AIState::Idle
            }
        };

        if *state != new_state {
            *state = new_state;
        }
    }
}
