use crate::manager::BusinessManager;
use crate::resources::GameTick;
use bevy::prelude::*;

/// System that advances the game tick
pub fn advance_tick_system(mut tick: ResMut<GameTick>, manager: Res<BusinessManager>) {
    tick.tick();

    if tick.current % 100 == 0 {
        log::debug!(
            "Tick: {}, Businesses: {}, Open conflicts: {}",
            tick.current,
            manager.businesses().count(),
            manager.open_conflicts().count()
        );
    }
}

/// Drives the manager's per-frame hook at the fixed tick rate
pub fn economy_update_system(tick: Res<GameTick>, mut manager: ResMut<BusinessManager>) {
    manager.update(tick.delta_time());
}
