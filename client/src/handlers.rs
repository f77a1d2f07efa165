//! Zone server packet handlers.

use std::net::Ipv4Addr;

use zone_core::constants::MSG_WAIT_BEFORE_QUIT;

use crate::collaborators::{InfoField, Notice};
use crate::lifecycle::MapEngine;
use crate::network::server_commands::{ServerCommand, ServerCommandData};

/// `ZC_AID`: the server confirms our character id.
pub(crate) fn on_account_id(engine: &mut MapEngine, cmd: &ServerCommand, _now: u64) {
    let ServerCommandData::AccountId { account_id } = cmd.structured_data else {
        return;
    };
    log::info!("Server confirmed id {account_id}");
    engine.session.character.gid = account_id;
}

/// `ZC_ACCEPT_ENTER{,2,3}`: build the player entity and load the map picked at connect time.
pub(crate) fn on_world_entry_accepted(engine: &mut MapEngine, cmd: &ServerCommand, _now: u64) {
    let ServerCommandData::AcceptEnter { x, y, sex, .. } = cmd.structured_data else {
        return;
    };

    engine.session.enter_world(sex);

    let character = &engine.session.character;
    let ui = &mut engine.frontend.ui;
    ui.update_info(InfoField::BaseLevel(character.level));
    ui.update_info(InfoField::JobLevel(character.job_level));
    ui.update_info(InfoField::Zeny(character.money));
    ui.update_info(InfoField::Name(character.name.clone()));
    ui.update_info(InfoField::Job(character.job));

    let map_name = engine.session.map_name.clone();
    log::info!("World entry accepted at {map_name} ({x}, {y})");
    engine.change_map(&map_name, x, y);
}

/// `ZC_NPCACK_MAPMOVE`
pub(crate) fn on_map_move(engine: &mut MapEngine, cmd: &ServerCommand, _now: u64) {
    let ServerCommandData::MapMove { map_name, x, y } = &cmd.structured_data else {
        return;
    };
    engine.change_map(map_name, *x, *y);
}

/// `ZC_NPCACK_SERVERMOVE`: hand the session over to another zone server.
pub(crate) fn on_server_change(engine: &mut MapEngine, cmd: &ServerCommand, _now: u64) {
    let ServerCommandData::ServerMove {
        map_name,
        x,
        y,
        ip,
        port,
    } = &cmd.structured_data
    else {
        return;
    };

    let host = Ipv4Addr::from(ip.to_le_bytes());
    log::info!("Zone change to {host}:{port} ({map_name} {x},{y})");
    engine.map_key_hook = false;
    engine.connect(&host.to_string(), *port, map_name);
}

/// `ZC_ACCEPT_QUIT`
pub(crate) fn on_exit_accepted(engine: &mut MapEngine, _cmd: &ServerCommand, _now: u64) {
    engine.exit_teardown();
}

/// `ZC_REFUSE_QUIT`
pub(crate) fn on_exit_refused(engine: &mut MapEngine, _cmd: &ServerCommand, _now: u64) {
    engine
        .frontend
        .ui
        .notify(Notice::ChatError(MSG_WAIT_BEFORE_QUIT));
}

/// `ZC_RESTART_ACK`
pub(crate) fn on_restart_ack(engine: &mut MapEngine, cmd: &ServerCommand, _now: u64) {
    let ServerCommandData::RestartAck { kind } = cmd.structured_data else {
        return;
    };
    if kind == 0 {
        engine
            .frontend
            .ui
            .notify(Notice::ChatError(MSG_WAIT_BEFORE_QUIT));
    } else {
        engine.restart_teardown();
    }
}

/// `ZC_ACK_REQ_DISCONNECT`
pub(crate) fn on_disconnect_ack(engine: &mut MapEngine, cmd: &ServerCommand, _now: u64) {
    let ServerCommandData::DisconnectAck { result } = cmd.structured_data else {
        return;
    };
    match result {
        0 => engine.disconnect_teardown(),
        1 => engine
            .frontend
            .ui
            .notify(Notice::ChatError(MSG_WAIT_BEFORE_QUIT)),
        other => log::debug!("Ignoring disconnect answer {other}"),
    }
}

/// `ZC_NOTIFY_TIME`
pub(crate) fn on_pong(_engine: &mut MapEngine, cmd: &ServerCommand, _now: u64) {
    if let ServerCommandData::NotifyTime { time } = cmd.structured_data {
        log::debug!("Pong, server time {time}");
    }
}
