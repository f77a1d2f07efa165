use zone_core::constants::{
    Modifiers, FREE_CELL_SEARCH_RANGE, MOVE_ACTION_SETTLE_MS, WALK_INTERVAL_MS,
    WALK_TICK_GUARD_MS,
};
use zone_core::types::Cell;

use crate::collaborators::{EntityRegistry, Terrain};
use crate::free_cell::find_free_cell;
use crate::network::client_commands::{ClientRequest, PacketFactory};
use crate::network::Link;
use crate::scheduler::{Scheduler, TimerHandle, TimerKind};
use crate::session::Session;

/// Last sampled pointer cell and held keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerState {
    /// Negative when the pointer is off the map.
    pub cell: Cell,
    pub modifiers: Modifiers,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            cell: Cell::new(-1, -1),
            modifiers: Modifiers::empty(),
        }
    }
}

/// Borrowed engine state the pipeline works on.
pub struct MoveContext<'a> {
    pub session: &'a mut Session,
    pub link: &'a mut Link,
    pub factory: &'a PacketFactory,
    pub scheduler: &'a mut Scheduler,
    pub terrain: &'a dyn Terrain,
    pub entities: &'a dyn EntityRegistry,
}

/// Turns pointer input into throttled move or turn packets.
///
/// While a walk request is held, the target is re-sent every [`WALK_INTERVAL_MS`] so the
/// character follows a moving pointer. Evaluations closer together than
/// [`WALK_TICK_GUARD_MS`] are dropped.
#[derive(Debug, Default)]
pub struct MovementPipeline {
    walk_timer: Option<TimerHandle>,
    settle_timer: Option<TimerHandle>,
    last_walk_tick: Option<u64>,
}

impl MovementPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_walk_tick(&self) -> Option<u64> {
        self.last_walk_tick
    }

    pub fn has_walk_timer(&self, scheduler: &Scheduler) -> bool {
        self.walk_timer.is_some_and(|h| scheduler.is_pending(h))
    }

    pub fn request_move(&mut self, ctx: &mut MoveContext<'_>, pointer: PointerState, now: u64) {
        self.cancel_walk_timer(ctx.scheduler);

        let Some(entity) = ctx.session.entity.as_mut() else {
            log::debug!("Ignoring move request: no player entity");
            return;
        };

        if entity.is_seated() || pointer.modifiers.contains(Modifiers::SHIFT) {
            entity.look_to(pointer.cell);
            let turn = ctx.factory.build(&ClientRequest::ChangeDirection {
                head_dir: entity.head_dir,
                dir: entity.direction,
            });
            ctx.link.send(&turn);
            return;
        }

        self.walk_step(ctx, pointer, now);
    }

    /// Cancels the pending re-evaluation without sending anything.
    pub fn request_stop(&mut self, scheduler: &mut Scheduler) {
        self.cancel_walk_timer(scheduler);
    }

    /// Schedules the queued move action, if any, shortly after the walk ended.
    pub fn on_walk_end(&mut self, session: &Session, scheduler: &mut Scheduler, now: u64) {
        if session.pending_move_action().is_none() {
            return;
        }
        if let Some(handle) = self.settle_timer.take() {
            scheduler.cancel(handle);
        }
        self.settle_timer = Some(scheduler.schedule(
            now + MOVE_ACTION_SETTLE_MS,
            TimerKind::MoveActionSettle,
        ));
    }

    pub fn on_timer(
        &mut self,
        ctx: &mut MoveContext<'_>,
        handle: TimerHandle,
        kind: TimerKind,
        pointer: PointerState,
        now: u64,
    ) {
        match kind {
            TimerKind::WalkStep if self.walk_timer == Some(handle) => {
                self.walk_timer = None;
                self.walk_step(ctx, pointer, now);
            }
            TimerKind::MoveActionSettle if self.settle_timer == Some(handle) => {
                self.settle_timer = None;
                if let Some(action) = ctx.session.take_pending_move_action() {
                    log::debug!("Sending queued move action {:?}", action.header());
                    ctx.link.send(&action);
                }
            }
            _ => log::debug!("Ignoring stale {kind:?} timer"),
        }
    }

    /// Cancels the walk and settle timers; used on every teardown.
    pub fn cancel_all(&mut self, scheduler: &mut Scheduler) {
        self.cancel_walk_timer(scheduler);
        if let Some(handle) = self.settle_timer.take() {
            scheduler.cancel(handle);
        }
    }

    fn cancel_walk_timer(&mut self, scheduler: &mut Scheduler) {
        if let Some(handle) = self.walk_timer.take() {
            scheduler.cancel(handle);
        }
    }

    fn walk_step(&mut self, ctx: &mut MoveContext<'_>, pointer: PointerState, now: u64) {
        if let Some(last) = self.last_walk_tick {
            if last + WALK_TICK_GUARD_MS > now {
                return;
            }
        }

        let Some(entity) = ctx.session.entity.as_ref() else {
            return;
        };
        let target = pointer.cell;

        if target.is_on_map() && target != entity.cell() {
            let dest = find_free_cell(
                ctx.terrain,
                ctx.entities,
                (entity.x, entity.y),
                target,
                FREE_CELL_SEARCH_RANGE,
            )
            .unwrap_or(target);

            match (u16::try_from(dest.x), u16::try_from(dest.y)) {
                (Ok(x), Ok(y)) => {
                    let cmd = ctx.factory.build(&ClientRequest::Move { x, y });
                    ctx.link.send(&cmd);
                }
                _ => log::debug!("Dropping move to off-map cell ({}, {})", dest.x, dest.y),
            }
        }

        self.cancel_walk_timer(ctx.scheduler);
        self.walk_timer = Some(
            ctx.scheduler
                .schedule(now + WALK_INTERVAL_MS, TimerKind::WalkStep),
        );
        self.last_walk_tick = Some(now);
    }
}
