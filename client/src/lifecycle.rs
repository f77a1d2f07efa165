use zone_core::byte_operations::read_u16;
use zone_core::constants::{Modifiers, ACT_SIT, ACT_STAND, KEY_INSERT};
use zone_core::types::Cell;

use crate::chat::ChatState;
use crate::collaborators::Frontend;
use crate::dispatch::DispatchTable;
use crate::movement::{MoveContext, MovementPipeline, PointerState};
use crate::network::client_commands::{ClientRequest, PacketFactory};
use crate::network::server_commands::ServerCommand;
use crate::network::{Connector, Link, NetworkEvent};
use crate::scheduler::{Scheduler, TimerHandle, TimerKind};
use crate::session::Session;
use crate::settings::Settings;
use crate::ui::{PanelFeatures, PanelId, APPEND_ORDER, MAP_AWARE_PANELS, MAP_SCOPED_CLEAN};

/// Bound on transport events handled by a single [`MapEngine::update`].
pub const MAX_EVENTS_PER_UPDATE: usize = 64;

/// Map load requested from the scene, applied when it reports completion.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PendingMapLoad {
    pub map_name: String,
    pub x: u16,
    pub y: u16,
}

/// Drives one player's zone-server session.
///
/// The host owns the frame loop: it calls [`MapEngine::update`] once per frame with the
/// current tick, forwards pointer and keyboard input, and reports completion of the
/// asynchronous scene operations (`on_map_loaded`, `on_background_removed`).
pub struct MapEngine {
    pub(crate) settings: Settings,
    pub(crate) factory: PacketFactory,
    pub(crate) session: Session,
    pub(crate) link: Link,
    pub(crate) connector: Box<dyn Connector>,
    pub(crate) frontend: Frontend,
    pub(crate) scheduler: Scheduler,
    pub(crate) movement: MovementPipeline,
    pub(crate) chat: ChatState,
    pub(crate) pointer: PointerState,
    pub(crate) dispatch: Option<DispatchTable>,
    /// Packet hooks and one-time UI preparation are in place. Never reset.
    pub(crate) armed: bool,
    /// Version-selected panels must be re-selected and re-prepared on the next connect.
    pub(crate) ui_version_dirty: bool,
    /// The per-map key hook (sit/stand) is installed.
    pub(crate) map_key_hook: bool,
    pub(crate) pending_map_load: Option<PendingMapLoad>,
    pub(crate) exit_pending: bool,
    pub(crate) ping: Option<crate::bootstrap::PingCycle>,
    pub(crate) awaiting_raw: bool,
}

impl MapEngine {
    pub fn new(
        settings: Settings,
        session: Session,
        connector: Box<dyn Connector>,
        frontend: Frontend,
    ) -> Self {
        let factory = PacketFactory::new(settings.packet_version);
        log::info!(
            "Map engine created (packetver {}, extended={})",
            factory.packet_version(),
            factory.is_extended()
        );
        Self {
            settings,
            factory,
            session,
            link: Link::default(),
            connector,
            frontend,
            scheduler: Scheduler::new(),
            movement: MovementPipeline::new(),
            chat: ChatState::default(),
            pointer: PointerState::default(),
            dispatch: None,
            armed: false,
            ui_version_dirty: false,
            map_key_hook: false,
            pending_map_load: None,
            exit_pending: false,
            ping: None,
            awaiting_raw: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn is_ui_version_dirty(&self) -> bool {
        self.ui_version_dirty
    }

    /// Forces the version-selected panels to be rebuilt on the next connect.
    pub fn request_ui_version_refresh(&mut self) {
        self.ui_version_dirty = true;
    }

    pub fn has_walk_timer(&self) -> bool {
        self.movement.has_walk_timer(&self.scheduler)
    }

    pub fn has_ping_cycle(&self) -> bool {
        self.ping
            .as_ref()
            .is_some_and(|p| self.scheduler.is_pending(p.timer))
    }

    pub fn set_pointer(&mut self, cell: Cell) {
        self.pointer.cell = cell;
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.pointer.modifiers = modifiers;
    }

    /// Handles pending transport events, then fires due timers.
    pub fn update(&mut self, now: u64) {
        for _ in 0..MAX_EVENTS_PER_UPDATE {
            let Some(evt) = self.link.poll() else {
                break;
            };
            self.handle_network_event(evt, now);
        }

        for (handle, kind) in self.scheduler.take_due(now) {
            self.on_timer(handle, kind, now);
        }
    }

    fn handle_network_event(&mut self, evt: NetworkEvent, now: u64) {
        match evt {
            NetworkEvent::Connected => self.on_connected(now),
            NetworkEvent::ConnectFailed(reason) => self.on_connect_failed(&reason),
            NetworkEvent::Packet(bytes) => self.dispatch_packet(&bytes, now),
            NetworkEvent::Raw(bytes) => self.on_raw(&bytes),
            NetworkEvent::Error(reason) => {
                log::error!("Zone connection lost: {reason}");
                self.on_transport_lost();
            }
            NetworkEvent::Closed => {
                log::warn!("Zone server closed the connection");
                self.on_transport_lost();
            }
        }
    }

    fn dispatch_packet(&mut self, bytes: &[u8], now: u64) {
        let Some(table) = self.dispatch.as_ref() else {
            log::warn!("Dropping packet received before hooks were armed");
            return;
        };
        let Some(cmd) = ServerCommand::from_bytes(bytes) else {
            log::debug!(
                "No decoder for packet 0x{:04X} ({} bytes)",
                read_u16(bytes, 0).unwrap_or_default(),
                bytes.len()
            );
            return;
        };
        let Some(handler) = table.get(cmd.header) else {
            log::debug!("No handler for {:?}", cmd.header);
            return;
        };
        log::debug!("Dispatching {:?}", cmd.header);
        handler(self, &cmd, now);
    }

    fn on_timer(&mut self, handle: TimerHandle, kind: TimerKind, now: u64) {
        match kind {
            TimerKind::Ping => self.on_ping_timer(handle, now),
            TimerKind::WalkStep | TimerKind::MoveActionSettle => {
                let pointer = self.pointer;
                let (mut ctx, movement) = self.movement_parts();
                movement.on_timer(&mut ctx, handle, kind, pointer, now);
            }
        }
    }

    /// Splits the engine into the movement pipeline and the state it works on.
    pub(crate) fn movement_parts(&mut self) -> (MoveContext<'_>, &mut MovementPipeline) {
        (
            MoveContext {
                session: &mut self.session,
                link: &mut self.link,
                factory: &self.factory,
                scheduler: &mut self.scheduler,
                terrain: &*self.frontend.terrain,
                entities: &*self.frontend.entities,
            },
            &mut self.movement,
        )
    }

    pub(crate) fn panel_features(&self) -> PanelFeatures {
        PanelFeatures {
            map_name: self.settings.enable_map_name,
            cash_shop: self.settings.enable_cash_shop,
            bank: self.settings.enable_bank,
            check_attendance: self.settings.enable_check_attendance,
            extended_protocol: self.factory.is_extended(),
            win_stats_version: self.frontend.ui.win_stats_version(),
        }
    }

    fn on_transport_lost(&mut self) {
        self.stop_ping();
        self.session.set_playing(false);
    }

    // -------------------------------------------------------------------------
    // Map change
    // -------------------------------------------------------------------------

    /// Detaches the current map and asks the scene to load `map_name`.
    pub(crate) fn change_map(&mut self, map_name: &str, x: u16, y: u16) {
        log::info!("Changing map to {map_name} ({x}, {y})");
        self.map_key_hook = false;
        self.pending_map_load = Some(PendingMapLoad {
            map_name: map_name.to_string(),
            x,
            y,
        });
        self.frontend.scene.load_map(map_name);
    }

    /// Completes a map change once the scene finished loading.
    pub fn on_map_loaded(&mut self) {
        let Some(load) = self.pending_map_load.take() else {
            log::warn!("on_map_loaded without a pending map load");
            return;
        };

        self.map_key_hook = true;

        let gid = self.session.character.gid;
        let Some(entity) = self.session.entity.as_mut() else {
            log::warn!("Map {} loaded without a player entity", load.map_name);
            return;
        };
        entity.place(load.x, load.y, 0, gid);
        self.frontend.entities.register(entity);
        self.frontend.scene.reload_aura(entity);
        self.frontend.scene.focus_camera(entity);

        let features = self.panel_features();
        let current_map = self.frontend.scene.current_map();
        for panel in features.filter(APPEND_ORDER) {
            self.frontend.ui.append(panel);
            if MAP_AWARE_PANELS.contains(&panel) {
                self.frontend.ui.set_map(panel, &current_map);
            }
        }

        self.frontend.plugins.reload();
        self.link.send(&self.factory.build(&ClientRequest::ActorInit));
        log::info!("Entered map {} at ({}, {})", load.map_name, load.x, load.y);
    }

    /// Installed per-map key hook. Returns true when the key was consumed.
    pub fn key_down(&mut self, key: u32) -> bool {
        if !self.map_key_hook || key != KEY_INSERT {
            return false;
        }
        let Some(entity) = self.session.entity.as_ref() else {
            return false;
        };
        let action = if entity.is_seated() { ACT_STAND } else { ACT_SIT };
        let cmd = self.factory.build(&ClientRequest::Act { target: 0, action });
        self.link.send(&cmd);
        true
    }

    // -------------------------------------------------------------------------
    // Teardown
    // -------------------------------------------------------------------------

    fn cancel_session_timers(&mut self) {
        self.movement.cancel_all(&mut self.scheduler);
        self.stop_ping();
    }

    /// Removes BasicInfo and cleans the in-map panels.
    fn clean_map_panels(&mut self) {
        self.frontend.ui.remove(PanelId::BasicInfo);
        for panel in MAP_SCOPED_CLEAN {
            self.frontend.ui.clean(panel);
        }
    }

    /// Full exit: the pre-game engine takes over once the background is removed.
    pub(crate) fn exit_teardown(&mut self) {
        log::info!("Leaving the map server");
        self.cancel_session_timers();
        self.map_key_hook = false;
        self.pending_map_load = None;

        self.frontend.scene.stop();
        self.frontend.scene.free_map();
        self.frontend.ui.remove_all();
        self.link.close();
        self.frontend.audio.stop_sounds();
        self.frontend.audio.stop_music();

        self.session.leave_world();
        self.exit_pending = true;
        self.frontend.scene.remove_background();
    }

    /// Completes an exit once the scene removed its background.
    pub fn on_background_removed(&mut self) {
        if !self.exit_pending {
            return;
        }
        self.exit_pending = false;
        self.frontend.engines.enter_pre_game();
    }

    /// Leaves the map for character selection; the transport stays open.
    pub(crate) fn restart_teardown(&mut self) {
        log::info!("Returning to character selection");
        self.cancel_session_timers();
        self.map_key_hook = false;
        self.pending_map_load = None;

        self.clean_map_panels();
        self.frontend.scene.free_map();
        self.frontend.scene.stop();

        self.session.leave_world();
        self.frontend.engines.enter_char_select();
    }

    /// Server-confirmed disconnect.
    pub(crate) fn disconnect_teardown(&mut self) {
        self.clean_map_panels();
        self.frontend.scene.stop();
        self.exit_teardown();
    }
}
