//! Headless zone session: connects, enters the map and keeps the session alive until the
//! server drops it or Ctrl-C requests an exit.

use std::cell::Cell;
use std::env;
use std::ops::ControlFlow;
use std::path::Path;
use std::process;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use zone_core::constants::CellFlags;
use zone_core::types::CharacterProfile;

use zone_client::ui::PanelId;
use zone_client::{
    Audio, Engines, EntityRegistry, EntityView, Frontend, InfoField, MapEngine, Notice,
    PlayerEntity, Plugins, Scene, Session, Settings, TcpConnector, Terrain, Ui,
};

const FRAME: Duration = Duration::from_millis(16);

/// Scene completions the main loop reports back to the engine.
#[derive(Default)]
struct Pending {
    map_loaded: Cell<bool>,
    background_removed: Cell<bool>,
    finished: Cell<bool>,
}

struct HeadlessScene {
    pending: Rc<Pending>,
    current_map: String,
}

impl Scene for HeadlessScene {
    fn current_map(&self) -> String {
        self.current_map.clone()
    }

    fn reset_current_map(&mut self) {
        self.current_map.clear();
    }

    fn load_map(&mut self, map_name: &str) {
        log::info!("Loading {map_name}");
        self.current_map = map_name.to_string();
        self.pending.map_loaded.set(true);
    }

    fn focus_camera(&mut self, _entity: &PlayerEntity) {}

    fn reload_aura(&mut self, _entity: &PlayerEntity) {}

    fn stop(&mut self) {}

    fn free_map(&mut self) {
        self.current_map.clear();
    }

    fn remove_background(&mut self) {
        self.pending.background_removed.set(true);
    }
}

struct LogUi(Rc<Pending>);

impl Ui for LogUi {
    fn select_ui_version(&mut self, _panel: PanelId) {}

    fn prepare(&mut self, _panel: PanelId) {}

    fn append(&mut self, _panel: PanelId) {}

    fn clean(&mut self, _panel: PanelId) {}

    fn remove(&mut self, _panel: PanelId) {}

    fn remove_all(&mut self) {}

    fn set_map(&mut self, _panel: PanelId, _map_name: &str) {}

    fn notify(&mut self, notice: Notice) {
        log::warn!("Notice: {notice:?}");
        if let Notice::ErrorBox(_) = notice {
            self.0.finished.set(true);
        }
    }

    fn update_info(&mut self, field: InfoField) {
        log::info!("{field:?}");
    }

    fn message(&self, id: u32) -> String {
        format!("#{id}")
    }

    fn win_stats_version(&self) -> u32 {
        0
    }
}

struct Silent;

impl Audio for Silent {
    fn stop_sounds(&mut self) {}

    fn stop_music(&mut self) {}
}

impl Plugins for Silent {
    fn reload(&mut self) {}
}

struct Finish(Rc<Pending>);

impl Engines for Finish {
    fn enter_pre_game(&mut self) {
        log::info!("Session over, back to login");
        self.0.finished.set(true);
    }

    fn enter_char_select(&mut self) {
        log::info!("Session over, back to character select");
        self.0.finished.set(true);
    }
}

/// Without map data every cell is walkable and nobody else is around.
struct OpenGround;

impl Terrain for OpenGround {
    fn cell_flags(&self, _x: i32, _y: i32) -> CellFlags {
        CellFlags::WALKABLE
    }
}

impl EntityRegistry for OpenGround {
    fn for_each(&self, _visitor: &mut dyn FnMut(&EntityView) -> ControlFlow<()>) {}

    fn register(&mut self, entity: &PlayerEntity) {
        log::info!("Standing at ({}, {})", entity.x, entity.y);
    }
}

fn usage(program: &str) -> ! {
    eprintln!(
        "Usage: {program} <host> <port> <map> <account_id> <auth_code> <char_id> [settings.json]"
    );
    process::exit(2);
}

fn parse_arg<T: std::str::FromStr>(args: &[String], idx: usize) -> T {
    match args.get(idx).and_then(|a| a.parse().ok()) {
        Some(v) => v,
        None => usage(&args[0]),
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 7 {
        usage(args.first().map(String::as_str).unwrap_or("zone-session"));
    }

    let log_level = zone_core::log_level_from_env("ZONE_LOG", log::LevelFilter::Info);
    zone_core::initialize_logger(log_level, Some("zone_session.log")).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {e:#}. Exiting.");
        process::exit(1);
    });

    let host = args[1].clone();
    let port: u16 = parse_arg(&args, 2);
    let map_name = args[3].clone();
    let account_id: u32 = parse_arg(&args, 4);
    let auth_code: u32 = parse_arg(&args, 5);
    let char_id: u32 = parse_arg(&args, 6);
    let settings = match args.get(7) {
        Some(path) => Settings::load_or_default(Path::new(path)),
        None => Settings::default(),
    };

    let quit_flag = Arc::new(AtomicBool::new(false));
    let quit_flag_handler = quit_flag.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Got signal to terminate. Leaving the map...");
        quit_flag_handler.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    let pending = Rc::new(Pending::default());
    let frontend = Frontend {
        scene: Box::new(HeadlessScene {
            pending: pending.clone(),
            current_map: String::new(),
        }),
        ui: Box::new(LogUi(pending.clone())),
        audio: Box::new(Silent),
        plugins: Box::new(Silent),
        engines: Box::new(Finish(pending.clone())),
        terrain: Box::new(OpenGround),
        entities: Box::new(OpenGround),
    };

    let connector = TcpConnector::new(settings.packet_length_table(), settings.connect_timeout());
    let profile = CharacterProfile {
        gid: char_id,
        ..CharacterProfile::default()
    };
    let session = Session::new(account_id, auth_code, 0, profile);
    let mut engine = MapEngine::new(settings, session, Box::new(connector), frontend);

    let started = Instant::now();
    engine.connect(&host, port, &map_name);

    let mut was_playing = false;
    let mut exit_requested = false;
    while !pending.finished.get() {
        let now = started.elapsed().as_millis() as u64;
        engine.update(now);

        if pending.map_loaded.replace(false) {
            engine.on_map_loaded();
        }
        if pending.background_removed.replace(false) {
            engine.on_background_removed();
        }

        if quit_flag.load(Ordering::SeqCst) && !exit_requested {
            exit_requested = true;
            engine.request_exit();
        }

        let playing = engine.session().is_playing();
        if was_playing && !playing && !exit_requested && !pending.finished.get() {
            log::error!("Lost the zone server. Exiting.");
            process::exit(1);
        }
        was_playing = playing;

        thread::sleep(FRAME);
    }
}
