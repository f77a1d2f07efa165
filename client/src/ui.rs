/// UI panels the session prepares, attaches and tears down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    BasicInfo,
    Bank,
    CartItems,
    CashShop,
    ChangeCart,
    ChatBox,
    ChatBoxSettings,
    ChatRoomCreate,
    CheckAttendance,
    Emoticons,
    Equipment,
    Escape,
    Fps,
    Guild,
    Inventory,
    MapName,
    MiniMap,
    MobileUi,
    PartyFriends,
    Quest,
    Rodex,
    RodexIcon,
    ShortCut,
    ShortCuts,
    SkillList,
    SkillListMer,
    StatusIcons,
    Vending,
    WinStats,
    WorldMap,
}

/// When a panel takes part in a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelGate {
    Always,
    MapNameEnabled,
    CashShopEnabled,
    BankEnabled,
    /// `enableCheckAttendance` and the extended protocol.
    CheckAttendanceEnabled,
    /// The UI uses the standalone stats window.
    WinStatsV0,
}

/// Answers the gate questions for one connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelFeatures {
    pub map_name: bool,
    pub cash_shop: bool,
    pub bank: bool,
    pub check_attendance: bool,
    pub extended_protocol: bool,
    pub win_stats_version: u32,
}

impl PanelFeatures {
    fn allows(&self, gate: PanelGate) -> bool {
        match gate {
            PanelGate::Always => true,
            PanelGate::MapNameEnabled => self.map_name,
            PanelGate::CashShopEnabled => self.cash_shop,
            PanelGate::BankEnabled => self.bank,
            PanelGate::CheckAttendanceEnabled => self.check_attendance && self.extended_protocol,
            PanelGate::WinStatsV0 => self.win_stats_version == 0,
        }
    }

    /// The panels of `list` enabled for these features, in list order.
    pub fn filter<'a>(
        &'a self,
        list: &'a [(PanelId, PanelGate)],
    ) -> impl Iterator<Item = PanelId> + 'a {
        list.iter()
            .filter(|(_, gate)| self.allows(*gate))
            .map(|(panel, _)| *panel)
    }
}

/// Panels whose implementation depends on the packet version.
pub const VERSIONED_PANELS_SELECT: [PanelId; 5] = [
    PanelId::BasicInfo,
    PanelId::MiniMap,
    PanelId::SkillList,
    PanelId::Quest,
    PanelId::Equipment,
];

/// Prepare order of the versioned panels once their version is selected.
pub const VERSIONED_PANELS_PREPARE: [PanelId; 5] = [
    PanelId::MiniMap,
    PanelId::SkillList,
    PanelId::BasicInfo,
    PanelId::Equipment,
    PanelId::Quest,
];

/// One-time preparation at first connect.
pub const PREPARE_ORDER: &[(PanelId, PanelGate)] = &[
    (PanelId::Escape, PanelGate::Always),
    (PanelId::Inventory, PanelGate::Always),
    (PanelId::CartItems, PanelGate::Always),
    (PanelId::Vending, PanelGate::Always),
    (PanelId::ChangeCart, PanelGate::Always),
    (PanelId::Equipment, PanelGate::Always),
    (PanelId::ShortCuts, PanelGate::Always),
    (PanelId::ShortCut, PanelGate::Always),
    (PanelId::ChatRoomCreate, PanelGate::Always),
    (PanelId::Emoticons, PanelGate::Always),
    (PanelId::Fps, PanelGate::Always),
    (PanelId::PartyFriends, PanelGate::Always),
    (PanelId::StatusIcons, PanelGate::Always),
    (PanelId::ChatBox, PanelGate::Always),
    (PanelId::ChatBoxSettings, PanelGate::Always),
    (PanelId::Guild, PanelGate::Always),
    (PanelId::WorldMap, PanelGate::Always),
    (PanelId::SkillListMer, PanelGate::Always),
    (PanelId::Rodex, PanelGate::Always),
    (PanelId::RodexIcon, PanelGate::Always),
    (PanelId::WinStats, PanelGate::WinStatsV0),
    (PanelId::MapName, PanelGate::MapNameEnabled),
    (PanelId::CashShop, PanelGate::CashShopEnabled),
    (PanelId::Bank, PanelGate::BankEnabled),
    (PanelId::CheckAttendance, PanelGate::CheckAttendanceEnabled),
];

/// Attachment at every map load.
pub const APPEND_ORDER: &[(PanelId, PanelGate)] = &[
    (PanelId::MiniMap, PanelGate::Always),
    (PanelId::MapName, PanelGate::MapNameEnabled),
    (PanelId::ChatBox, PanelGate::Always),
    (PanelId::ChatBoxSettings, PanelGate::Always),
    (PanelId::BasicInfo, PanelGate::Always),
    (PanelId::Escape, PanelGate::Always),
    (PanelId::Inventory, PanelGate::Always),
    (PanelId::CartItems, PanelGate::Always),
    (PanelId::Vending, PanelGate::Always),
    (PanelId::ChangeCart, PanelGate::Always),
    (PanelId::Equipment, PanelGate::Always),
    (PanelId::ShortCuts, PanelGate::Always),
    (PanelId::StatusIcons, PanelGate::Always),
    (PanelId::ShortCut, PanelGate::Always),
    (PanelId::ChatRoomCreate, PanelGate::Always),
    (PanelId::Emoticons, PanelGate::Always),
    (PanelId::SkillList, PanelGate::Always),
    (PanelId::Fps, PanelGate::Always),
    (PanelId::PartyFriends, PanelGate::Always),
    (PanelId::Guild, PanelGate::Always),
    (PanelId::WorldMap, PanelGate::Always),
    (PanelId::SkillListMer, PanelGate::Always),
    (PanelId::MobileUi, PanelGate::Always),
    (PanelId::WinStats, PanelGate::WinStatsV0),
    (PanelId::Quest, PanelGate::Always),
    (PanelId::CashShop, PanelGate::CashShopEnabled),
    (PanelId::CheckAttendance, PanelGate::CheckAttendanceEnabled),
];

/// Panels cleaned when leaving the map for character select or a confirmed disconnect.
pub const MAP_SCOPED_CLEAN: [PanelId; 5] = [
    PanelId::StatusIcons,
    PanelId::ChatBox,
    PanelId::ShortCut,
    PanelId::Quest,
    PanelId::PartyFriends,
];

/// Panels that receive the map name after attachment.
pub const MAP_AWARE_PANELS: [PanelId; 2] = [PanelId::MiniMap, PanelId::MapName];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gated_panels_follow_features() {
        let off = PanelFeatures {
            win_stats_version: 1,
            ..PanelFeatures::default()
        };
        let appended: Vec<_> = off.filter(APPEND_ORDER).collect();
        assert_eq!(appended.len(), APPEND_ORDER.len() - 4);
        assert_eq!(appended[0], PanelId::MiniMap);
        assert_eq!(appended[1], PanelId::ChatBox);

        let on = PanelFeatures {
            map_name: true,
            cash_shop: true,
            bank: true,
            check_attendance: true,
            extended_protocol: true,
            win_stats_version: 0,
        };
        assert_eq!(on.filter(APPEND_ORDER).count(), APPEND_ORDER.len());
        assert_eq!(on.filter(PREPARE_ORDER).count(), PREPARE_ORDER.len());
    }

    #[test]
    fn attendance_needs_extended_protocol() {
        let features = PanelFeatures {
            check_attendance: true,
            extended_protocol: false,
            ..PanelFeatures::default()
        };
        assert!(!features
            .filter(PREPARE_ORDER)
            .any(|p| p == PanelId::CheckAttendance));
    }
}
