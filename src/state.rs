use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use tracing::{debug, info};

use crate::{
    app_metrics::Metrics,
    board::Board,
    game,
    pieces::{Piece, PieceSupply},
};

pub use room_id::RoomId;

pub mod config;
pub mod dt;
pub mod room_id;
pub mod updates;

pub type SharedRoom = Arc<RwLock<Room>>;

/// Process-wide room registry. Each room sits behind its own lock, so an
/// operation on one room never waits on another.
#[derive(Clone, Default)]
pub struct SharedState {
    rooms: Arc<RwLock<BTreeMap<RoomId, SharedRoom>>>,
    config: Arc<config::RoomConfig>,
}

impl SharedState {
    pub fn new(config: config::RoomConfig) -> Self {
        Self {
            rooms: Default::default(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &config::RoomConfig {
        &self.config
    }

    pub async fn get_room(&self, room_id: &RoomId) -> Option<SharedRoom> {
        self.rooms.read().await.get(room_id).cloned()
    }

    pub async fn get_or_create_room(&self, room_id: &RoomId) -> SharedRoom {
        if let Some(room) = self.get_room(room_id).await {
            return room;
        }

        let mut rooms = self.rooms.write().await;
        let room = rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Room {} created", room_id);
            Arc::new(RwLock::new(Room::new(
                room_id.clone(),
                *self.config,
                dt::Instant::now(),
            )))
        });
        let room = room.clone();
        Metrics::g_rooms_total_set(rooms.len());
        room
    }

    /// Write-locks the room, creating it first if needed. A handle the
    /// registry dropped while we waited on its lock is looked up again.
    pub async fn lock_or_create_room(&self, room_id: &RoomId) -> OwnedRwLockWriteGuard<Room> {
        loop {
            let room = self.get_or_create_room(room_id).await.write_owned().await;
            if !room.disposed {
                return room;
            }
            debug!("Room {} was dropped while waiting, retrying", room_id);
        }
    }

    /// Drops the room if nobody is left in it.
    pub async fn remove_room_if_empty(&self, room_id: &RoomId) -> bool {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get(room_id) else {
            return false;
        };
        let mut room = room.write().await;
        if !room.players.is_empty() {
            return false;
        }
        room.disposed = true;
        drop(room);
        rooms.remove(room_id);
        info!("Room {} is empty, removed", room_id);
        Metrics::g_rooms_total_set(rooms.len());
        true
    }

    pub async fn rooms(&self) -> Vec<(RoomId, SharedRoom)> {
        self.rooms
            .read()
            .await
            .iter()
            .map(|(id, room)| (id.clone(), room.clone()))
            .collect()
    }

    pub async fn rooms_total(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Removes every room that is empty or has seen no player action for
    /// longer than the idle timeout, whatever its roster size.
    pub async fn evict_idle(&self, now: dt::Instant) -> Vec<RoomId> {
        let mut rooms = self.rooms.write().await;
        let mut evicted = vec![];

        for (room_id, room) in rooms.iter() {
            let room = room.read().await;
            let idle_ms = now.ms_since(room.last_activity);
            if room.players.is_empty() || idle_ms > room.config.idle_timeout_ms {
                info!(
                    "Evicting room {} ({} players, idle for {} ms)",
                    room_id,
                    room.players.len(),
                    idle_ms
                );
                evicted.push(room_id.clone());
            }
        }

        for room_id in &evicted {
            if let Some(room) = rooms.remove(room_id) {
                room.write().await.disposed = true;
            }
            Metrics::c_rooms_evicted_total_incr();
        }
        Metrics::g_rooms_total_set(rooms.len());

        evicted
    }

    /// Forces a turn skip in every playing room whose deadline has passed.
    /// Returns the rooms that advanced.
    pub async fn tick_turns(&self, now: dt::Instant) -> Vec<RoomId> {
        let mut advanced = vec![];

        for (room_id, room) in self.rooms().await {
            let mut room = room.write().await;
            if game::expire_turn(&mut room, now).is_some() {
                room.last_update.set_now();
                advanced.push(room_id);
            }
        }

        advanced
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(String);

impl Default for PlayerId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The anonymous session a request arrives on. Kept private to the room;
/// other players only ever see the public `PlayerId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub session: SessionId,
    pub name: String,
    pub score: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    #[default]
    Waiting,
    Playing,
}

/// Turn bookkeeping. A deadline is set exactly when the room is playing and
/// has an active player.
#[derive(Debug, Default, Clone)]
pub struct TurnState {
    /// Fixed when the second player joins.
    pub order: Option<[PlayerId; 2]>,
    pub index: usize,
    pub active: Option<PlayerId>,
    pub deadline: Option<dt::Instant>,
    pub assigned: HashMap<PlayerId, Piece>,
}

pub struct Room {
    pub id: RoomId,
    pub board: Board,
    /// Join order.
    pub players: Vec<Player>,
    pub turn: TurnState,
    pub status: GameStatus,
    pub config: config::RoomConfig,
    pub supply: PieceSupply,
    /// Last player-initiated action; drives idle eviction.
    pub last_activity: dt::Instant,
    /// Last change of any kind; drives long-poll delivery.
    pub last_update: updates::LastUpdate,
    /// Set once the registry has dropped the room. Holders of a stale handle
    /// must look the room up again.
    pub disposed: bool,
}

impl Room {
    pub fn new(id: RoomId, config: config::RoomConfig, now: dt::Instant) -> Self {
        Self::with_supply(id, config, PieceSupply::default(), now)
    }

    pub fn with_supply(
        id: RoomId,
        config: config::RoomConfig,
        supply: PieceSupply,
        now: dt::Instant,
    ) -> Self {
        Self {
            id,
            board: Board::default(),
            players: vec![],
            turn: TurnState::default(),
            status: GameStatus::Waiting,
            config,
            supply,
            last_activity: now,
            last_update: Default::default(),
            disposed: false,
        }
    }

    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| &p.id == player_id)
    }

    pub fn player_by_session(&self, session: &SessionId) -> Option<&Player> {
        self.players.iter().find(|p| &p.session == session)
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= config::MAX_PLAYERS
    }

    pub fn touch(&mut self, now: dt::Instant) {
        self.last_activity = now;
        self.last_update.set_now();
    }
}
