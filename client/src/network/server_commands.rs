use zone_core::byte_operations::{read_fixed_string, read_u16, read_u32, read_u8};
use zone_core::constants::MAP_NAME_LENGTH;
use zone_core::types::decode_pos_dir;

use super::framing::PacketLength;

/// Zone server → client opcodes handled by this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ServerCommandType {
    AcceptEnter = 0x0073,
    NotifyTime = 0x007F,
    NpcAckMapMove = 0x0091,
    NpcAckServerMove = 0x0092,
    RestartAck = 0x00B3,
    AckReqDisconnect = 0x018B,
    AcceptQuit = 0x0191,
    RefuseQuit = 0x0192,
    Aid = 0x0283,
    AcceptEnter2 = 0x02EB,
    AcceptEnter3 = 0x0A18,
}

impl ServerCommandType {
    pub const ALL: [ServerCommandType; 11] = [
        ServerCommandType::AcceptEnter,
        ServerCommandType::NotifyTime,
        ServerCommandType::NpcAckMapMove,
        ServerCommandType::NpcAckServerMove,
        ServerCommandType::RestartAck,
        ServerCommandType::AckReqDisconnect,
        ServerCommandType::AcceptQuit,
        ServerCommandType::RefuseQuit,
        ServerCommandType::Aid,
        ServerCommandType::AcceptEnter2,
        ServerCommandType::AcceptEnter3,
    ];

    pub fn from_opcode(opcode: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|t| *t as u16 == opcode)
    }

    /// Wire length including the 2-byte opcode.
    pub fn length(self) -> PacketLength {
        let len = match self {
            ServerCommandType::AcceptEnter => 11,
            ServerCommandType::NotifyTime => 6,
            ServerCommandType::NpcAckMapMove => 22,
            ServerCommandType::NpcAckServerMove => 28,
            ServerCommandType::RestartAck => 3,
            ServerCommandType::AckReqDisconnect => 4,
            ServerCommandType::AcceptQuit => 2,
            ServerCommandType::RefuseQuit => 2,
            ServerCommandType::Aid => 6,
            ServerCommandType::AcceptEnter2 => 13,
            ServerCommandType::AcceptEnter3 => 14,
        };
        PacketLength::Fixed(len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerCommandData {
    AccountId {
        account_id: u32,
    },
    AcceptEnter {
        start_time: u32,
        x: u16,
        y: u16,
        dir: u8,
        /// Only `ZC_ACCEPT_ENTER2` and later.
        font: Option<u16>,
        /// Only `ZC_ACCEPT_ENTER3`. Values other than 0/1 are passed through; the handler
        /// decides whether to apply them.
        sex: Option<u8>,
    },
    MapMove {
        map_name: String,
        x: u16,
        y: u16,
    },
    ServerMove {
        map_name: String,
        x: u16,
        y: u16,
        ip: u32,
        port: u16,
    },
    AcceptQuit,
    RefuseQuit,
    RestartAck {
        kind: u8,
    },
    DisconnectAck {
        result: u16,
    },
    NotifyTime {
        time: u32,
    },
}

fn parse_accept_enter(bytes: &[u8], header: ServerCommandType) -> Option<ServerCommandData> {
    let start_time = read_u32(bytes, 2)?;
    let pos_dir: [u8; 3] = bytes.get(6..9)?.try_into().ok()?;
    let (x, y, dir) = decode_pos_dir(pos_dir);
    // bytes 9..11 carry the x/y cell sizes, which the client does not use.

    let font = match header {
        ServerCommandType::AcceptEnter => None,
        _ => Some(read_u16(bytes, 11)?),
    };
    let sex = match header {
        ServerCommandType::AcceptEnter3 => Some(read_u8(bytes, 13)?),
        _ => None,
    };

    Some(ServerCommandData::AcceptEnter {
        start_time,
        x,
        y,
        dir,
        font,
        sex,
    })
}

fn from_bytes(bytes: &[u8]) -> Option<(ServerCommandType, ServerCommandData)> {
    let header = ServerCommandType::from_opcode(read_u16(bytes, 0)?)?;

    let data = match header {
        ServerCommandType::Aid => ServerCommandData::AccountId {
            account_id: read_u32(bytes, 2)?,
        },
        ServerCommandType::AcceptEnter
        | ServerCommandType::AcceptEnter2
        | ServerCommandType::AcceptEnter3 => parse_accept_enter(bytes, header)?,
        ServerCommandType::NpcAckMapMove => ServerCommandData::MapMove {
            map_name: read_fixed_string(bytes, 2, MAP_NAME_LENGTH)?,
            x: read_u16(bytes, 18)?,
            y: read_u16(bytes, 20)?,
        },
        ServerCommandType::NpcAckServerMove => ServerCommandData::ServerMove {
            map_name: read_fixed_string(bytes, 2, MAP_NAME_LENGTH)?,
            x: read_u16(bytes, 18)?,
            y: read_u16(bytes, 20)?,
            ip: read_u32(bytes, 22)?,
            port: read_u16(bytes, 26)?,
        },
        ServerCommandType::AcceptQuit => ServerCommandData::AcceptQuit,
        ServerCommandType::RefuseQuit => ServerCommandData::RefuseQuit,
        ServerCommandType::RestartAck => ServerCommandData::RestartAck {
            kind: read_u8(bytes, 2)?,
        },
        ServerCommandType::AckReqDisconnect => ServerCommandData::DisconnectAck {
            result: read_u16(bytes, 2)?,
        },
        ServerCommandType::NotifyTime => ServerCommandData::NotifyTime {
            time: read_u32(bytes, 2)?,
        },
    };

    Some((header, data))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerCommand {
    pub header: ServerCommandType,
    pub structured_data: ServerCommandData,
}

impl ServerCommand {
    /// Decodes one framed packet (opcode included).
    ///
    /// Returns `None` for opcodes this crate does not handle and for truncated payloads.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let (header, structured_data) = from_bytes(bytes)?;
        Some(ServerCommand {
            header,
            structured_data,
        })
    }
}
