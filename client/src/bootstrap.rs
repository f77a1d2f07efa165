use zone_core::byte_operations::read_u32;
use zone_core::constants::MSG_SERVER_CONNECTION_FAILED;

use crate::collaborators::Notice;
use crate::dispatch::DispatchTable;
use crate::lifecycle::MapEngine;
use crate::network::client_commands::ClientRequest;
use crate::scheduler::{TimerHandle, TimerKind};
use crate::ui::{PREPARE_ORDER, VERSIONED_PANELS_PREPARE, VERSIONED_PANELS_SELECT};

/// Recurring keep-alive armed after a successful connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PingCycle {
    /// Tick the elapsed client time is measured from.
    pub start: u64,
    pub timer: TimerHandle,
}

impl MapEngine {
    /// Connects to a zone server and remembers the map to enter.
    ///
    /// The outcome arrives through [`MapEngine::update`]. Any previous connection is closed.
    /// Packet hooks and the one-time UI preparation happen on the first call only.
    pub fn connect(&mut self, host: &str, port: u16, map_name: &str) {
        log::info!("Connecting to zone server {host}:{port} for map {map_name}");
        self.session.map_name = map_name.to_string();
        self.stop_ping();
        self.awaiting_raw = false;

        let transport = self.connector.open(host, port);
        self.link.replace(transport);

        let refresh_versioned_ui = self.ui_version_dirty || !self.armed;
        if refresh_versioned_ui {
            for panel in VERSIONED_PANELS_SELECT {
                self.frontend.ui.select_ui_version(panel);
            }
        }

        if !self.armed {
            self.arm();
        }

        if refresh_versioned_ui {
            for panel in VERSIONED_PANELS_PREPARE {
                self.frontend.ui.prepare(panel);
            }
            self.ui_version_dirty = false;
        }
    }

    /// Installs the packet hooks and prepares the map panels. Runs once per engine.
    fn arm(&mut self) {
        log::info!("Arming zone packet hooks");
        self.dispatch = Some(DispatchTable::new());

        let features = self.panel_features();
        for panel in features.filter(PREPARE_ORDER) {
            self.frontend.ui.prepare(panel);
        }
        self.armed = true;
    }

    pub(crate) fn on_connected(&mut self, now: u64) {
        self.frontend.scene.reset_current_map();

        let enter = self.factory.build(&ClientRequest::Enter {
            account_id: self.session.account_id,
            char_id: self.session.character.gid,
            auth_code: self.session.auth_code,
            client_time: now as u32,
            sex: self.session.sex,
        });
        self.link.send(&enter);

        self.awaiting_raw = true;
        self.link.read_raw();

        self.start_ping(now);
        self.session.set_playing(true);
        log::info!("Zone handshake sent for character {}", self.session.character.gid);
    }

    pub(crate) fn on_connect_failed(&mut self, reason: &str) {
        log::error!("Zone connection failed: {reason}");
        self.frontend.scene.reset_current_map();
        self.frontend
            .ui
            .notify(Notice::ErrorBox(MSG_SERVER_CONNECTION_FAILED));
    }

    /// The single unframed read that follows the handshake.
    ///
    /// Servers older than 2007-05-21 answer with the bare 4-byte character id.
    pub(crate) fn on_raw(&mut self, bytes: &[u8]) {
        if !self.awaiting_raw {
            return;
        }
        self.awaiting_raw = false;

        if bytes.len() == 4 {
            if let Some(gid) = read_u32(bytes, 0) {
                log::info!("Server assigned character id {gid}");
                self.session.character.gid = gid;
            }
        }
    }

    fn start_ping(&mut self, now: u64) {
        self.stop_ping();
        let timer = self
            .scheduler
            .schedule(now + self.settings.ping_interval_ms, TimerKind::Ping);
        self.ping = Some(PingCycle { start: now, timer });
    }

    pub(crate) fn stop_ping(&mut self) {
        if let Some(ping) = self.ping.take() {
            self.scheduler.cancel(ping.timer);
        }
    }

    pub(crate) fn on_ping_timer(&mut self, handle: TimerHandle, now: u64) {
        let Some(ping) = self.ping.as_mut() else {
            return;
        };
        if ping.timer != handle {
            return;
        }

        if self.settings.sec_hbt {
            self.link.send(&self.factory.build(&ClientRequest::Heartbeat));
        }
        let client_time = now.saturating_sub(ping.start) as u32;
        self.link
            .send(&self.factory.build(&ClientRequest::Ping { client_time }));

        ping.timer = self
            .scheduler
            .schedule(now + self.settings.ping_interval_ms, TimerKind::Ping);
    }
}
