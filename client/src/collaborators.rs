//! Interfaces of the subsystems the session drives but does not own.

use std::ops::ControlFlow;

use zone_core::constants::CellFlags;
use zone_core::types::EntityKind;

use crate::session::PlayerEntity;
use crate::ui::PanelId;

/// Ground data of the loaded map.
pub trait Terrain {
    /// Cell type bits; cells outside the map report no flags.
    fn cell_flags(&self, x: i32, y: i32) -> CellFlags;
}

/// What the session may see of another entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub gid: u32,
    pub kind: EntityKind,
    pub x: f32,
    pub y: f32,
}

/// Every entity currently known on the map.
pub trait EntityRegistry {
    /// Visits entities until the visitor breaks.
    fn for_each(&self, visitor: &mut dyn FnMut(&EntityView) -> ControlFlow<()>);
    /// Adds (or refreshes) the local player entity.
    fn register(&mut self, entity: &PlayerEntity);
}

pub trait Scene {
    /// Name of the loaded map, empty when none.
    fn current_map(&self) -> String;
    /// Forgets the loaded map name so the next load of the same map is not skipped.
    fn reset_current_map(&mut self);
    /// Starts loading `map_name`. The host calls `MapEngine::on_map_loaded` when done.
    fn load_map(&mut self, map_name: &str);
    fn focus_camera(&mut self, entity: &PlayerEntity);
    fn reload_aura(&mut self, entity: &PlayerEntity);
    /// Stops the render loop.
    fn stop(&mut self);
    fn free_map(&mut self);
    /// Starts removing the loading background. The host calls
    /// `MapEngine::on_background_removed` when done.
    fn remove_background(&mut self);
}

/// User-visible notifications, referenced by message table id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Modal error box.
    ErrorBox(u32),
    /// Error line in the chat box.
    ChatError(u32),
}

/// Initial values pushed to the basic info panel on world entry.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoField {
    BaseLevel(u32),
    JobLevel(u32),
    Zeny(u32),
    Name(String),
    Job(u16),
}

pub trait Ui {
    /// Picks the panel implementation matching the packet version.
    fn select_ui_version(&mut self, panel: PanelId);
    fn prepare(&mut self, panel: PanelId);
    fn append(&mut self, panel: PanelId);
    fn clean(&mut self, panel: PanelId);
    fn remove(&mut self, panel: PanelId);
    fn remove_all(&mut self);
    fn set_map(&mut self, panel: PanelId, map_name: &str);
    fn notify(&mut self, notice: Notice);
    fn update_info(&mut self, field: InfoField);
    /// Localized message table lookup.
    fn message(&self, id: u32) -> String;
    /// Version of the stats window in use; 0 is the standalone window.
    fn win_stats_version(&self) -> u32;
}

pub trait Audio {
    fn stop_sounds(&mut self);
    fn stop_music(&mut self);
}

pub trait Plugins {
    fn reload(&mut self);
}

/// The engines control is handed to when the map session ends.
pub trait Engines {
    /// Login/pre-game flow after a full exit.
    fn enter_pre_game(&mut self);
    fn enter_char_select(&mut self);
}

/// Everything outside the session that the engine talks to.
pub struct Frontend {
    pub scene: Box<dyn Scene>,
    pub ui: Box<dyn Ui>,
    pub audio: Box<dyn Audio>,
    pub plugins: Box<dyn Plugins>,
    pub engines: Box<dyn Engines>,
    pub terrain: Box<dyn Terrain>,
    pub entities: Box<dyn EntityRegistry>,
}
