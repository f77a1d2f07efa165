//! Recording fakes for the engine's collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::rc::Rc;

use zone_core::constants::CellFlags;
use zone_core::types::{encode_pos_dir, round_coord, CharacterProfile, EntityKind};

use crate::collaborators::{
    Audio, Engines, EntityRegistry, EntityView, Frontend, InfoField, Notice, Plugins, Scene,
    Terrain, Ui,
};
use crate::lifecycle::MapEngine;
use crate::network::server_commands::ServerCommandType;
use crate::network::{Connector, NetworkEvent, Transport};
use crate::session::{PlayerEntity, Session};
use crate::settings::Settings;
use crate::ui::PanelId;

pub const LEGACY_PACKETVER: u32 = 20120410;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ResetCurrentMap,
    LoadMap(String),
    FocusCamera(u32),
    ReloadAura(u32),
    SceneStop,
    FreeMap,
    RemoveBackground,
    SelectUiVersion(PanelId),
    Prepare(PanelId),
    Append(PanelId),
    Clean(PanelId),
    Remove(PanelId),
    RemoveAll,
    SetMap(PanelId, String),
    Notify(Notice),
    UpdateInfo(InfoField),
    StopSounds,
    StopMusic,
    ReloadPlugins,
    EnterPreGame,
    EnterCharSelect,
    Register(u32, i32, i32),
}

/// Ordered log of collaborator calls, shared by all fakes of one harness.
#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    fn record(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub fn opcodes(packets: &[Vec<u8>]) -> Vec<u16> {
    packets
        .iter()
        .map(|p| u16::from_le_bytes([p[0], p[1]]))
        .collect()
}

/// `ZC_ACCEPT_ENTER*` bytes for the given variant.
pub fn accept_enter(header: ServerCommandType, x: u16, y: u16, sex: Option<u8>) -> Vec<u8> {
    let mut bytes = (header as u16).to_le_bytes().to_vec();
    bytes.extend_from_slice(&5000u32.to_le_bytes());
    bytes.extend_from_slice(&encode_pos_dir(x, y, 0));
    bytes.extend_from_slice(&[5, 5]);
    if header != ServerCommandType::AcceptEnter {
        bytes.extend_from_slice(&0u16.to_le_bytes());
    }
    if header == ServerCommandType::AcceptEnter3 {
        bytes.push(sex.unwrap_or(0));
    }
    bytes
}

// -----------------------------------------------------------------------------
// Terrain and entities
// -----------------------------------------------------------------------------

pub struct FakeTerrain {
    width: i32,
    height: i32,
    walkable: Vec<bool>,
}

impl FakeTerrain {
    pub fn open(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            walkable: vec![true; (width * height) as usize],
        }
    }

    pub fn blocked(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            walkable: vec![false; (width * height) as usize],
        }
    }

    pub fn set_walkable(&mut self, x: i32, y: i32) {
        let idx = (y * self.width + x) as usize;
        self.walkable[idx] = true;
    }
}

impl Terrain for FakeTerrain {
    fn cell_flags(&self, x: i32, y: i32) -> CellFlags {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return CellFlags::empty();
        }
        if self.walkable[(y * self.width + x) as usize] {
            CellFlags::WALKABLE
        } else {
            CellFlags::empty()
        }
    }
}

#[derive(Default)]
pub struct FakeEntities {
    views: Vec<EntityView>,
    journal: Option<Journal>,
}

impl FakeEntities {
    pub fn with(entities: &[(EntityKind, f32, f32)]) -> Self {
        let views = entities
            .iter()
            .enumerate()
            .map(|(i, &(kind, x, y))| EntityView {
                gid: 1000 + i as u32,
                kind,
                x,
                y,
            })
            .collect();
        Self {
            views,
            journal: None,
        }
    }
}

impl EntityRegistry for FakeEntities {
    fn for_each(&self, visitor: &mut dyn FnMut(&EntityView) -> ControlFlow<()>) {
        for view in &self.views {
            if visitor(view).is_break() {
                break;
            }
        }
    }

    fn register(&mut self, entity: &PlayerEntity) {
        if let Some(journal) = &self.journal {
            journal.record(Call::Register(
                entity.gid,
                round_coord(entity.x),
                round_coord(entity.y),
            ));
        }
    }
}

// -----------------------------------------------------------------------------
// Transport
// -----------------------------------------------------------------------------

#[derive(Default)]
struct NetState {
    opened: Vec<(String, u16)>,
    transports_open: Vec<bool>,
    sent: Vec<Vec<u8>>,
    inbox: VecDeque<NetworkEvent>,
    closes: usize,
    raw_requests: usize,
}

/// Scripted network: tests push events in and read sent bytes out.
#[derive(Clone, Default)]
pub struct FakeNet(Rc<RefCell<NetState>>);

impl FakeNet {
    pub fn open_transport(&self) -> Box<dyn Transport> {
        let mut state = self.0.borrow_mut();
        state.transports_open.push(true);
        Box::new(FakeTransport {
            net: self.clone(),
            index: state.transports_open.len() - 1,
        })
    }

    pub fn connector(&self) -> Box<dyn Connector> {
        Box::new(FakeConnector { net: self.clone() })
    }

    pub fn push(&self, evt: NetworkEvent) {
        self.0.borrow_mut().inbox.push_back(evt);
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.0.borrow().sent.clone()
    }

    pub fn clear_sent(&self) {
        self.0.borrow_mut().sent.clear();
    }

    pub fn opened(&self) -> Vec<(String, u16)> {
        self.0.borrow().opened.clone()
    }

    pub fn closes(&self) -> usize {
        self.0.borrow().closes
    }

    pub fn raw_requests(&self) -> usize {
        self.0.borrow().raw_requests
    }

    /// Whether the most recently opened transport is still open.
    pub fn is_open(&self) -> bool {
        self.0
            .borrow()
            .transports_open
            .last()
            .copied()
            .unwrap_or(false)
    }
}

struct FakeConnector {
    net: FakeNet,
}

impl Connector for FakeConnector {
    fn open(&mut self, host: &str, port: u16) -> Box<dyn Transport> {
        self.net
            .0
            .borrow_mut()
            .opened
            .push((host.to_string(), port));
        self.net.open_transport()
    }
}

struct FakeTransport {
    net: FakeNet,
    index: usize,
}

impl Transport for FakeTransport {
    fn send(&mut self, bytes: Vec<u8>) {
        self.net.0.borrow_mut().sent.push(bytes);
    }

    fn read_raw(&mut self) {
        self.net.0.borrow_mut().raw_requests += 1;
    }

    fn poll(&mut self) -> Option<NetworkEvent> {
        self.net.0.borrow_mut().inbox.pop_front()
    }

    fn close(&mut self) {
        let mut state = self.net.0.borrow_mut();
        if state.transports_open[self.index] {
            state.transports_open[self.index] = false;
            state.closes += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.net.0.borrow().transports_open[self.index]
    }
}

// -----------------------------------------------------------------------------
// Scene, UI and the rest
// -----------------------------------------------------------------------------

struct FakeScene {
    journal: Journal,
    current_map: String,
}

impl Scene for FakeScene {
    fn current_map(&self) -> String {
        self.current_map.clone()
    }

    fn reset_current_map(&mut self) {
        self.current_map.clear();
        self.journal.record(Call::ResetCurrentMap);
    }

    fn load_map(&mut self, map_name: &str) {
        self.current_map = map_name.to_string();
        self.journal.record(Call::LoadMap(map_name.to_string()));
    }

    fn focus_camera(&mut self, entity: &PlayerEntity) {
        self.journal.record(Call::FocusCamera(entity.gid));
    }

    fn reload_aura(&mut self, entity: &PlayerEntity) {
        self.journal.record(Call::ReloadAura(entity.gid));
    }

    fn stop(&mut self) {
        self.journal.record(Call::SceneStop);
    }

    fn free_map(&mut self) {
        self.journal.record(Call::FreeMap);
    }

    fn remove_background(&mut self) {
        self.journal.record(Call::RemoveBackground);
    }
}

struct FakeUi {
    journal: Journal,
}

impl Ui for FakeUi {
    fn select_ui_version(&mut self, panel: PanelId) {
        self.journal.record(Call::SelectUiVersion(panel));
    }

    fn prepare(&mut self, panel: PanelId) {
        self.journal.record(Call::Prepare(panel));
    }

    fn append(&mut self, panel: PanelId) {
        self.journal.record(Call::Append(panel));
    }

    fn clean(&mut self, panel: PanelId) {
        self.journal.record(Call::Clean(panel));
    }

    fn remove(&mut self, panel: PanelId) {
        self.journal.record(Call::Remove(panel));
    }

    fn remove_all(&mut self) {
        self.journal.record(Call::RemoveAll);
    }

    fn set_map(&mut self, panel: PanelId, map_name: &str) {
        self.journal
            .record(Call::SetMap(panel, map_name.to_string()));
    }

    fn notify(&mut self, notice: Notice) {
        self.journal.record(Call::Notify(notice));
    }

    fn update_info(&mut self, field: InfoField) {
        self.journal.record(Call::UpdateInfo(field));
    }

    fn message(&self, id: u32) -> String {
        format!("msg{id}")
    }

    fn win_stats_version(&self) -> u32 {
        0
    }
}

struct FakeAudio {
    journal: Journal,
}

impl Audio for FakeAudio {
    fn stop_sounds(&mut self) {
        self.journal.record(Call::StopSounds);
    }

    fn stop_music(&mut self) {
        self.journal.record(Call::StopMusic);
    }
}

struct FakePlugins {
    journal: Journal,
}

impl Plugins for FakePlugins {
    fn reload(&mut self) {
        self.journal.record(Call::ReloadPlugins);
    }
}

struct FakeEngines {
    journal: Journal,
}

impl Engines for FakeEngines {
    fn enter_pre_game(&mut self) {
        self.journal.record(Call::EnterPreGame);
    }

    fn enter_char_select(&mut self) {
        self.journal.record(Call::EnterCharSelect);
    }
}

pub fn frontend(journal: &Journal) -> Frontend {
    Frontend {
        scene: Box::new(FakeScene {
            journal: journal.clone(),
            current_map: String::new(),
        }),
        ui: Box::new(FakeUi {
            journal: journal.clone(),
        }),
        audio: Box::new(FakeAudio {
            journal: journal.clone(),
        }),
        plugins: Box::new(FakePlugins {
            journal: journal.clone(),
        }),
        engines: Box::new(FakeEngines {
            journal: journal.clone(),
        }),
        terrain: Box::new(FakeTerrain::open(400, 400)),
        entities: Box::new(FakeEntities {
            views: Vec::new(),
            journal: Some(journal.clone()),
        }),
    }
}

pub fn profile() -> CharacterProfile {
    CharacterProfile {
        gid: 150001,
        name: "Lyra".to_string(),
        level: 99,
        job_level: 50,
        money: 12345,
        job: 4008,
        sex: 1,
        base_exp: 0,
        base_exp_next: 0,
    }
}

/// An engine wired to recording fakes.
pub struct Harness {
    pub engine: MapEngine,
    pub journal: Journal,
    pub net: FakeNet,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        let journal = Journal::default();
        let net = FakeNet::default();
        let session = Session::new(2000001, 0x5EED, 1, profile());
        let engine = MapEngine::new(settings, session, net.connector(), frontend(&journal));
        Self {
            engine,
            journal,
            net,
        }
    }

    /// Connected at tick 1000 and standing on prontera (156, 191).
    pub fn in_map() -> Self {
        Self::in_map_with(Settings::default())
    }

    pub fn in_map_with(settings: Settings) -> Self {
        let mut h = Self::new(settings);
        h.engine.connect("10.0.0.1", 5121, "prontera.gat");
        h.net.push(NetworkEvent::Connected);
        h.receive(accept_enter(ServerCommandType::AcceptEnter, 156, 191, None));
        h.engine.update(1000);
        h.engine.on_map_loaded();
        h
    }

    pub fn receive(&self, bytes: Vec<u8>) {
        self.net.push(NetworkEvent::Packet(bytes));
    }
}
