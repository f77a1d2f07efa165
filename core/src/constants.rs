//! Protocol, timing and message constants shared by the zone client.

use bitflags::bitflags;

// =============================================================================
// Protocol versions
// =============================================================================

/// Packet versions dated at or after this build select the "2"-suffixed wire variants.
pub const EXTENDED_PACKETVER: u32 = 20180307;
/// Version used when the configuration does not name one.
pub const DEFAULT_PACKETVER: u32 = EXTENDED_PACKETVER;

/// Fixed-size string fields on the wire.
pub const MAP_NAME_LENGTH: usize = 16;
pub const NAME_LENGTH: usize = 24;

// =============================================================================
// Timing (milliseconds of the client tick clock)
// =============================================================================

/// Re-evaluation period of the walk loop.
pub const WALK_INTERVAL_MS: u64 = 500;
/// Minimum spacing accepted between two walk evaluations. Timers fire late, so this is
/// intentionally shorter than `WALK_INTERVAL_MS`.
pub const WALK_TICK_GUARD_MS: u64 = 450;
/// Delay between the end of a walk and sending the queued action.
pub const MOVE_ACTION_SETTLE_MS: u64 = 50;
pub const DEFAULT_PING_INTERVAL_MS: u64 = 10_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Ring radius used when correcting a walk target.
pub const FREE_CELL_SEARCH_RANGE: i32 = 1;

// =============================================================================
// Message table ids (msgstringtable)
// =============================================================================

pub const MSG_SERVER_CONNECTION_FAILED: u32 = 1;
pub const MSG_WAIT_BEFORE_QUIT: u32 = 502;
pub const MSG_SN_CHANT_FIRST: u32 = 790;
pub const MSG_SN_CHANT_SECOND_PREFIX: u32 = 791;
pub const MSG_SN_CHANT_SECOND_SUFFIX: u32 = 792;
pub const MSG_SN_CHANT_THIRD: u32 = 793;

// =============================================================================
// Input
// =============================================================================

/// Browser-style key code of INSERT (sit/stand toggle).
pub const KEY_INSERT: u32 = 45;

// =============================================================================
// Jobs
// =============================================================================

/// Super Novice job ids (base, baby, expanded and their variants).
pub const SUPER_NOVICE_JOBS: [u16; 8] = [23, 4045, 4128, 4172, 4190, 4191, 4192, 4193];
/// Public lines that must have been sent before a chant line is considered.
pub const CHANT_MIN_CHAT_LINES: u32 = 7;

// =============================================================================
// Entity actions sent with CZ_REQUEST_ACT
// =============================================================================

pub const ACT_SIT: u8 = 2;
pub const ACT_STAND: u8 = 3;

bitflags! {
    /// Terrain cell type bits reported by the altitude/ground data.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellFlags: u8 {
        const WALKABLE = 1 << 0;
        const WATER = 1 << 1;
        const SNIPABLE = 1 << 2;
    }
}

bitflags! {
    /// Chat box channel bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChatTarget: u32 {
        const SELF = 1 << 0;
        const PUBLIC = 1 << 1;
        const PRIVATE = 1 << 2;
        const PARTY = 1 << 3;
        const GUILD = 1 << 4;
        const ANNOUNCE = 1 << 5;
        const ERROR = 1 << 6;
        const INFO = 1 << 7;
    }
}

bitflags! {
    /// Keyboard state sampled alongside pointer input.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        /// Any of the 0-9 keys is held (alt+digit is an emote shortcut, not a guild toggle).
        const DIGIT = 1 << 3;
    }
}
