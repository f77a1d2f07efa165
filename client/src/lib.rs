//! Zone (map) server session engine.
//!
//! [`MapEngine`] owns one player's connection to a zone server: the handshake and keep-alive,
//! inbound packet dispatch, the movement request pipeline, map changes and every way of
//! leaving the map. Rendering, UI panels, audio and the terrain/entity stores stay with the
//! host and are reached through the traits in [`collaborators`].

mod bootstrap;
mod chat;
pub mod collaborators;
mod dispatch;
mod free_cell;
mod handlers;
mod intents;
mod lifecycle;
mod movement;
pub mod network;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use collaborators::{
    Audio, Engines, EntityRegistry, EntityView, Frontend, InfoField, Notice, Plugins, Scene,
    Terrain, Ui,
};
pub use free_cell::{find_free_cell, is_free_cell};
pub use lifecycle::{MapEngine, MAX_EVENTS_PER_UPDATE};
pub use network::client_commands::{ClientCommand, ClientRequest, PacketFactory, RestartKind};
pub use network::server_commands::{ServerCommand, ServerCommandData, ServerCommandType};
pub use network::tcp::TcpConnector;
pub use network::{Connector, Link, NetworkEvent, Transport};
pub use session::{PlayerEntity, Session, WorldEntryFlags};
pub use settings::Settings;
