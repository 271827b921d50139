//! Shared application state: the room registry and per-room session locks.

pub mod commands;
pub mod game;
mod sse;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::{config::AppConfig, state::game::GameSession};

pub use self::sse::SseHub;

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// Capacity of each room's broadcast channel.
const ROOM_CHANNEL_CAPACITY: usize = 16;

/// One game room: the session aggregate behind its mutation lock, plus the
/// hub that fans snapshots out to subscribers.
///
/// The mutex is the per-room critical section: every command on the room
/// serializes through it, and broadcasts are emitted while it is held so
/// subscribers observe snapshots in mutation order.
pub struct Room {
    session: Mutex<GameSession>,
    hub: SseHub,
}

impl Room {
    fn new(zone_count: usize) -> Self {
        Self {
            session: Mutex::new(GameSession::new(zone_count)),
            hub: SseHub::new(ROOM_CHANNEL_CAPACITY),
        }
    }

    /// The session aggregate guarded by the room lock.
    pub fn session(&self) -> &Mutex<GameSession> {
        &self.session
    }

    /// The room's broadcast hub.
    pub fn hub(&self) -> &SseHub {
        &self.hub
    }
}

/// Central application state: immutable configuration and the room registry.
///
/// Rooms live in a [`DashMap`] so commands on different rooms proceed fully
/// in parallel; only commands on the same room contend on that room's lock.
pub struct AppState {
    config: AppConfig,
    rooms: DashMap<String, Arc<Room>>,
}

impl AppState {
    /// Construct the state wrapped in an [`Arc`] so it can be cloned cheaply.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            rooms: DashMap::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Fetch the room for `code`, creating a default session on first
    /// access.
    pub fn room(&self, code: &str) -> Arc<Room> {
        self.rooms
            .entry(code.to_owned())
            .or_insert_with(|| Arc::new(Room::new(self.config.zone_count())))
            .clone()
    }

    /// Fetch the room for `code` only if it already exists. Used by
    /// subscribe-only and query-only flows, which must not create rooms.
    pub fn existing_room(&self, code: &str) -> Option<Arc<Room>> {
        self.rooms.get(code).map(|entry| entry.value().clone())
    }

    /// Snapshot of all rooms, for the countdown evaluator's sweep.
    pub fn rooms(&self) -> Vec<(String, Arc<Room>)> {
        self.rooms
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of rooms currently registered.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
