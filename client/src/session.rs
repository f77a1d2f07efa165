use zone_core::types::{direction_towards, round_coord, Cell, CharacterProfile, EntityAction};

use crate::network::client_commands::ClientCommand;

/// Party/guild/companion state the map server re-sends after every world entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldEntryFlags {
    pub has_party: bool,
    pub is_party_leader: bool,
    pub has_guild: bool,
    pub guild_right: u32,
    pub pet_id: u32,
    pub homun_id: u32,
}

impl WorldEntryFlags {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The locally controlled character as placed on the current map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerEntity {
    pub gid: u32,
    pub name: String,
    pub job: u16,
    pub sex: u8,
    pub clevel: u32,
    pub x: f32,
    pub y: f32,
    pub direction: u8,
    pub head_dir: u16,
    pub action: EntityAction,
}

impl PlayerEntity {
    pub fn from_profile(profile: &CharacterProfile) -> Self {
        Self {
            gid: profile.gid,
            name: profile.name.clone(),
            job: profile.job,
            sex: profile.sex,
            clevel: profile.level,
            x: 0.0,
            y: 0.0,
            direction: 0,
            head_dir: 0,
            action: EntityAction::Idle,
        }
    }

    /// Places the entity on a cell and (re)binds its GID.
    pub fn place(&mut self, x: u16, y: u16, dir: u8, gid: u32) {
        self.x = x as f32;
        self.y = y as f32;
        self.direction = dir;
        self.gid = gid;
    }

    /// The cell the renderer shows the entity on.
    pub fn cell(&self) -> Cell {
        Cell::new(round_coord(self.x), round_coord(self.y))
    }

    pub fn is_seated(&self) -> bool {
        self.action == EntityAction::Sit
    }

    /// Turns the body towards `target`; returns the new direction, or `None` when `target`
    /// is the entity's own cell.
    pub fn look_to(&mut self, target: Cell) -> Option<u8> {
        let dir = direction_towards(self.cell(), target)?;
        self.direction = dir;
        self.head_dir = 0;
        Some(dir)
    }
}

/// State of one logical zone-server connection.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub account_id: u32,
    pub auth_code: u32,
    pub sex: u8,
    /// The selected character. `gid` is the id the server last confirmed.
    pub character: CharacterProfile,
    /// Map named at connect time; world entry loads it.
    pub map_name: String,
    pub flags: WorldEntryFlags,
    pub entity: Option<PlayerEntity>,
    playing: bool,
    pending_move_action: Option<ClientCommand>,
}

impl Session {
    pub fn new(account_id: u32, auth_code: u32, sex: u8, character: CharacterProfile) -> Self {
        Self {
            account_id,
            auth_code,
            sex,
            character,
            ..Self::default()
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub(crate) fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    /// Builds the local entity from the selected character and resets all world-entry state.
    pub(crate) fn enter_world(&mut self, sex_override: Option<u8>) -> &mut PlayerEntity {
        let mut entity = PlayerEntity::from_profile(&self.character);
        if let Some(sex) = sex_override.filter(|s| *s < 2) {
            entity.sex = sex;
        }
        self.flags.reset();
        self.entity.insert(entity)
    }

    /// Leaves the map: stops playing and drops the local entity and any queued action.
    pub(crate) fn leave_world(&mut self) {
        self.playing = false;
        self.entity = None;
        self.pending_move_action = None;
    }

    pub fn pending_move_action(&self) -> Option<&ClientCommand> {
        self.pending_move_action.as_ref()
    }

    pub(crate) fn set_pending_move_action(&mut self, command: ClientCommand) {
        self.pending_move_action = Some(command);
    }

    pub(crate) fn take_pending_move_action(&mut self) -> Option<ClientCommand> {
        self.pending_move_action.take()
    }

    pub(crate) fn clear_pending_move_action(&mut self) {
        self.pending_move_action = None;
    }
}
