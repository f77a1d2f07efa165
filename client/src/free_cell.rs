use std::ops::ControlFlow;

use zone_core::constants::CellFlags;
use zone_core::types::{round_coord, Cell};

use crate::collaborators::{EntityRegistry, Terrain};

/// True when `cell` is walkable and no blocking entity stands on it.
pub fn is_free_cell(terrain: &dyn Terrain, entities: &dyn EntityRegistry, cell: Cell) -> bool {
    if !terrain
        .cell_flags(cell.x, cell.y)
        .contains(CellFlags::WALKABLE)
    {
        return false;
    }

    let mut occupied = false;
    entities.for_each(&mut |entity| {
        if entity.kind.blocks_movement()
            && round_coord(entity.x) == cell.x
            && round_coord(entity.y) == cell.y
        {
            occupied = true;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    !occupied
}

/// Searches rings of growing radius around `target` for a free cell.
///
/// Each axis is scanned starting on the far side of the target as seen from `origin`, so ties
/// resolve away from the player. Returns `None` when every cell within `range` is taken.
///
/// # Arguments
/// * `origin` - The player's unrounded map position; only used for the scan bias.
/// * `target` - Requested destination.
/// * `range` - Largest ring radius to try (0 only checks `target`).
pub fn find_free_cell(
    terrain: &dyn Terrain,
    entities: &dyn EntityRegistry,
    origin: (f32, f32),
    target: Cell,
    range: i32,
) -> Option<Cell> {
    let bias_x = if origin.0 < target.x as f32 { -1 } else { 1 };
    let bias_y = if origin.1 < target.y as f32 { -1 } else { 1 };

    for r in 0..=range {
        for dx in -r..=r {
            for dy in -r..=r {
                let candidate = Cell::new(target.x + dx * bias_x, target.y + dy * bias_y);
                if is_free_cell(terrain, entities, candidate) {
                    return Some(candidate);
                }
            }
        }
    }

    None
}
