//! Директивы поведения от host'а
//!
//! Attack и Stunned не имеют входного триггера в ядре: боевая система
//! живёт на стороне host'а и впрыскивает входы событиями. Директивы для
//! деспавненных entity молча игнорируются.

use bevy::prelude::*;

/// Внешние директивы walker'у
#[derive(Event, Debug, Clone)]
pub enum WalkerDirective {
    /// Замереть и атаковать (выход — когда импульс погашен)
    OrderAttack {
        entity: Entity,
    },

    /// Оглушить на duration секунд (повторная директива перезаводит таймер)
    Stun {
        entity: Entity,
        duration: f32,
    },
}
