//! Host-side simulation time: runs producer timers forward.

use crate::world::{EntityKind, World};

impl World {
    /// Advance every machine, trap and pot by `minutes`.
    pub fn advance_minutes(&mut self, minutes: u32) {
        for (_, entity) in self.entities_mut() {
            match &mut entity.kind {
                EntityKind::Machine(m) => m.advance(minutes),
                EntityKind::CrabPot(p) => p.advance(minutes),
                EntityKind::GardenPot(p) => p.advance(minutes),
                _ => {}
            }
        }
    }
}
