use zone_core::constants::{EXTENDED_PACKETVER, NAME_LENGTH};
use zone_core::string_operations::{write_c_string, write_fixed_string};
use zone_core::types::encode_pos_dir;

/// Client → zone server opcodes handled by this crate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum ClientCommandType {
    Enter = 0x0072,
    NotifyActorInit = 0x007D,
    RequestTime = 0x007E,
    RequestMove = 0x0085,
    RequestAct = 0x0089,
    RequestChat = 0x008C,
    Whisper = 0x0096,
    ChangeDirection = 0x009B,
    ItemThrow = 0x00A2,
    UseItem = 0x00A7,
    ReqWearEquip = 0x00A9,
    ReqTakeoffEquip = 0x00AB,
    Restart = 0x00B2,
    StatusChange = 0x00BB,
    RequestChatParty = 0x0108,
    ReqCartOff = 0x012A,
    GuildChat = 0x017E,
    Heartbeat = 0x0187,
    RequestQuit = 0x018A,
    Chopokgi = 0x01ED,
    StandingResurrection = 0x0292,
    Config = 0x02D8,
    RequestMove2 = 0x035F,
    RequestTime2 = 0x0360,
    ChangeDirection2 = 0x0361,
    ItemThrow2 = 0x0363,
    Enter2 = 0x0436,
    RequestAct2 = 0x0437,
    UseItem2 = 0x0439,
}

impl ClientCommandType {
    /// Variable-length packets carry their total size as a u16 right after the opcode.
    fn is_variable_length(self) -> bool {
        matches!(
            self,
            ClientCommandType::RequestChat
                | ClientCommandType::Whisper
                | ClientCommandType::RequestChatParty
                | ClientCommandType::GuildChat
        )
    }
}

/// `CZ_RESTART` type byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum RestartKind {
    SavePoint = 0,
    CharacterSelect = 1,
}

/// An outbound intent, independent of the protocol version that will carry it.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientRequest {
    Enter {
        account_id: u32,
        char_id: u32,
        auth_code: u32,
        client_time: u32,
        sex: u8,
    },
    Ping {
        client_time: u32,
    },
    Heartbeat,
    Move {
        x: u16,
        y: u16,
    },
    ChangeDirection {
        head_dir: u16,
        dir: u8,
    },
    Act {
        target: u32,
        action: u8,
    },
    UseItem {
        index: u16,
        account_id: u32,
    },
    ThrowItem {
        index: u16,
        count: u16,
    },
    ActorInit,
    Quit,
    Restart(RestartKind),
    Resurrection,
    StatusChange {
        status_id: u16,
        amount: u8,
    },
    WearEquip {
        index: u16,
        location: u32,
    },
    TakeoffEquip {
        index: u16,
    },
    Config {
        kind: u32,
        value: u32,
    },
    CartOff,
    Whisper {
        receiver: String,
        message: String,
    },
    Chat {
        message: String,
    },
    PartyChat {
        message: String,
    },
    GuildChat {
        message: String,
    },
    Chopokgi,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientCommand {
    header: ClientCommandType,
    payload: Vec<u8>,
}

impl ClientCommand {
    /// Creates a command with a specific header and raw payload bytes.
    fn new(header: ClientCommandType, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    pub fn header(&self) -> ClientCommandType {
        self.header
    }

    pub fn opcode(&self) -> u16 {
        self.header as u16
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Serializes the command: u16 opcode, then the u16 total length for variable-length
    /// packets, then the payload, all little-endian.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.payload.len());
        bytes.extend_from_slice(&self.opcode().to_le_bytes());
        if self.header.is_variable_length() {
            let total = (4 + self.payload.len()) as u16;
            bytes.extend_from_slice(&total.to_le_bytes());
        }
        bytes.extend_from_slice(&self.payload);
        bytes
    }

    fn empty(cmd: ClientCommandType) -> Self {
        Self::new(cmd, Vec::new())
    }

    fn cmd_u32(cmd: ClientCommandType, x: u32) -> Self {
        Self::new(cmd, x.to_le_bytes().to_vec())
    }

    fn cmd_u16(cmd: ClientCommandType, x: u16) -> Self {
        Self::new(cmd, x.to_le_bytes().to_vec())
    }

    fn cmd_u32_u32(cmd: ClientCommandType, x: u32, y: u32) -> Self {
        let mut payload = Vec::with_capacity(8);
        payload.extend_from_slice(&x.to_le_bytes());
        payload.extend_from_slice(&y.to_le_bytes());
        Self::new(cmd, payload)
    }

    fn cmd_message(cmd: ClientCommandType, message: &str) -> Self {
        let mut payload = Vec::with_capacity(message.len() + 1);
        write_c_string(&mut payload, message);
        Self::new(cmd, payload)
    }
}

/// Builds outbound packets for one protocol version.
///
/// This is the only place that compares against the version threshold; callers describe
/// what they want with a [`ClientRequest`].
#[derive(Clone, Copy, Debug)]
pub struct PacketFactory {
    packet_version: u32,
}

impl PacketFactory {
    pub fn new(packet_version: u32) -> Self {
        Self { packet_version }
    }

    pub fn packet_version(&self) -> u32 {
        self.packet_version
    }

    /// True when the "2"-suffixed wire variants are in use.
    pub fn is_extended(&self) -> bool {
        self.packet_version >= EXTENDED_PACKETVER
    }

    fn pick(&self, legacy: ClientCommandType, extended: ClientCommandType) -> ClientCommandType {
        if self.is_extended() {
            extended
        } else {
            legacy
        }
    }

    pub fn build(&self, request: &ClientRequest) -> ClientCommand {
        use ClientCommandType as T;

        let cmd = match request {
            ClientRequest::Enter {
                account_id,
                char_id,
                auth_code,
                client_time,
                sex,
            } => {
                let mut payload = Vec::with_capacity(17);
                payload.extend_from_slice(&account_id.to_le_bytes());
                payload.extend_from_slice(&char_id.to_le_bytes());
                payload.extend_from_slice(&auth_code.to_le_bytes());
                payload.extend_from_slice(&client_time.to_le_bytes());
                payload.push(*sex);
                ClientCommand::new(self.pick(T::Enter, T::Enter2), payload)
            }
            ClientRequest::Ping { client_time } => {
                ClientCommand::cmd_u32(self.pick(T::RequestTime, T::RequestTime2), *client_time)
            }
            ClientRequest::Heartbeat => ClientCommand::empty(T::Heartbeat),
            ClientRequest::Move { x, y } => ClientCommand::new(
                self.pick(T::RequestMove, T::RequestMove2),
                encode_pos_dir(*x, *y, 0).to_vec(),
            ),
            ClientRequest::ChangeDirection { head_dir, dir } => {
                let mut payload = Vec::with_capacity(3);
                payload.extend_from_slice(&head_dir.to_le_bytes());
                payload.push(*dir);
                ClientCommand::new(self.pick(T::ChangeDirection, T::ChangeDirection2), payload)
            }
            ClientRequest::Act { target, action } => {
                let mut payload = Vec::with_capacity(5);
                payload.extend_from_slice(&target.to_le_bytes());
                payload.push(*action);
                ClientCommand::new(self.pick(T::RequestAct, T::RequestAct2), payload)
            }
            ClientRequest::UseItem { index, account_id } => {
                let mut payload = Vec::with_capacity(6);
                payload.extend_from_slice(&index.to_le_bytes());
                payload.extend_from_slice(&account_id.to_le_bytes());
                ClientCommand::new(self.pick(T::UseItem, T::UseItem2), payload)
            }
            ClientRequest::ThrowItem { index, count } => {
                let mut payload = Vec::with_capacity(4);
                payload.extend_from_slice(&index.to_le_bytes());
                payload.extend_from_slice(&count.to_le_bytes());
                ClientCommand::new(self.pick(T::ItemThrow, T::ItemThrow2), payload)
            }
            ClientRequest::ActorInit => ClientCommand::empty(T::NotifyActorInit),
            ClientRequest::Quit => ClientCommand::cmd_u16(T::RequestQuit, 0),
            ClientRequest::Restart(kind) => ClientCommand::new(T::Restart, vec![*kind as u8]),
            ClientRequest::Resurrection => ClientCommand::empty(T::StandingResurrection),
            ClientRequest::StatusChange { status_id, amount } => {
                let mut payload = Vec::with_capacity(3);
                payload.extend_from_slice(&status_id.to_le_bytes());
                payload.push(*amount);
                ClientCommand::new(T::StatusChange, payload)
            }
            ClientRequest::WearEquip { index, location } => {
                let mut payload = Vec::with_capacity(6);
                payload.extend_from_slice(&index.to_le_bytes());
                payload.extend_from_slice(&location.to_le_bytes());
                ClientCommand::new(T::ReqWearEquip, payload)
            }
            ClientRequest::TakeoffEquip { index } => {
                ClientCommand::cmd_u16(T::ReqTakeoffEquip, *index)
            }
            ClientRequest::Config { kind, value } => {
                ClientCommand::cmd_u32_u32(T::Config, *kind, *value)
            }
            ClientRequest::CartOff => ClientCommand::empty(T::ReqCartOff),
            ClientRequest::Whisper { receiver, message } => {
                let mut payload = Vec::with_capacity(NAME_LENGTH + message.len() + 1);
                write_fixed_string(&mut payload, receiver, NAME_LENGTH);
                write_c_string(&mut payload, message);
                ClientCommand::new(T::Whisper, payload)
            }
            ClientRequest::Chat { message } => ClientCommand::cmd_message(T::RequestChat, message),
            ClientRequest::PartyChat { message } => {
                ClientCommand::cmd_message(T::RequestChatParty, message)
            }
            ClientRequest::GuildChat { message } => {
                ClientCommand::cmd_message(T::GuildChat, message)
            }
            ClientRequest::Chopokgi => ClientCommand::empty(T::Chopokgi),
        };

        log::debug!(
            "Building {:?} (0x{:04X}) for packetver {}",
            cmd.header,
            cmd.opcode(),
            self.packet_version
        );
        cmd
    }
}
