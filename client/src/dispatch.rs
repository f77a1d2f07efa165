use std::collections::HashMap;

use crate::handlers;
use crate::lifecycle::MapEngine;
use crate::network::server_commands::{ServerCommand, ServerCommandType};

/// Handler invoked for one decoded server packet. Handlers run to completion and never fail;
/// follow-up work goes through the scheduler or the scene callbacks.
pub(crate) type Handler = fn(&mut MapEngine, &ServerCommand, u64);

const HANDLERS: &[(ServerCommandType, Handler)] = &[
    (ServerCommandType::Aid, handlers::on_account_id),
    (ServerCommandType::AcceptEnter, handlers::on_world_entry_accepted),
    (ServerCommandType::AcceptEnter2, handlers::on_world_entry_accepted),
    (ServerCommandType::AcceptEnter3, handlers::on_world_entry_accepted),
    (ServerCommandType::NpcAckMapMove, handlers::on_map_move),
    (ServerCommandType::NpcAckServerMove, handlers::on_server_change),
    (ServerCommandType::AcceptQuit, handlers::on_exit_accepted),
    (ServerCommandType::RefuseQuit, handlers::on_exit_refused),
    (ServerCommandType::RestartAck, handlers::on_restart_ack),
    (ServerCommandType::AckReqDisconnect, handlers::on_disconnect_ack),
    (ServerCommandType::NotifyTime, handlers::on_pong),
];

/// Opcode → handler map, built once when the engine arms its hooks.
pub(crate) struct DispatchTable {
    handlers: HashMap<ServerCommandType, Handler>,
}

impl DispatchTable {
    pub(crate) fn new() -> Self {
        Self {
            handlers: HANDLERS.iter().copied().collect(),
        }
    }

    pub(crate) fn get(&self, header: ServerCommandType) -> Option<Handler> {
        self.handlers.get(&header).copied()
    }
}
