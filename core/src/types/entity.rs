/// Object type of an entity as reported by the server spawn packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Pc,
    Npc,
    Item,
    /// Ground skill unit.
    Unit,
    Unknown,
    NpcEvent,
    Effect,
    Trap,
    Mob,
    Homun,
    Merc,
    Elem,
}

impl EntityKind {
    /// Whether an entity of this kind occupies its cell for walk-target correction.
    pub fn blocks_movement(self) -> bool {
        !matches!(self, EntityKind::Effect | EntityKind::Unit | EntityKind::Trap)
    }
}

/// Animation state of an entity; only the states the session logic branches on are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntityAction {
    #[default]
    Idle,
    Walk,
    Sit,
    Attack,
    Hurt,
    Die,
}

#[cfg(test)]
mod tests {
    use super::EntityKind;

    #[test]
    fn only_effects_units_and_traps_are_passable() {
        assert!(!EntityKind::Effect.blocks_movement());
        assert!(!EntityKind::Unit.blocks_movement());
        assert!(!EntityKind::Trap.blocks_movement());

        assert!(EntityKind::Pc.blocks_movement());
        assert!(EntityKind::Mob.blocks_movement());
        assert!(EntityKind::Npc.blocks_movement());
        assert!(EntityKind::Item.blocks_movement());
    }
}
