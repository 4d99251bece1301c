use std::fmt;

use schemars::JsonSchema;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::{
    app_metrics::Metrics,
    pieces::{Piece, Shape},
    state::{self, dt},
};

pub(crate) use state_ext::RoomExt;

mod state_ext;
mod turn;

/// Why an operation was refused. Refusals never mutate the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Rejection {
    RoomFull,
    NotInRoom,
    NotYourTurn,
    GameNotStarted,
    InvalidPlacement,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Rejection::RoomFull => "room-full",
            Rejection::NotInRoom => "not-in-room",
            Rejection::NotYourTurn => "not-your-turn",
            Rejection::GameNotStarted => "game-not-started",
            Rejection::InvalidPlacement => "invalid-placement",
        })
    }
}

/// Runs the registry's periodic work: forced turn skips on every tick and
/// idle-room eviction on a slower cadence.
pub fn spawn_game_worker(state: state::SharedState) -> JoinHandle<()> {
    let config = *state.config();

    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_millis(
            config.tick_interval_ms,
        ));
        let mut eviction = tokio::time::interval(std::time::Duration::from_millis(
            config.eviction_interval_ms,
        ));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        eviction.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let advanced = state.tick_turns(dt::Instant::now()).await;
                    if !advanced.is_empty() {
                        debug!("Turn expired in {} room(s)", advanced.len());
                    }
                }
                _ = eviction.tick() => {
                    let evicted = state.evict_idle(dt::Instant::now()).await;
                    if !evicted.is_empty() {
                        info!("Evicted {} idle room(s)", evicted.len());
                    }
                }
            }
        }
    })
}

/// Adds a player to the room, starting turns when the second one arrives.
/// A session that is already seated gets its existing player back.
pub(crate) fn join_room(
    room: &mut state::Room,
    session: state::SessionId,
    name: &str,
    now: dt::Instant,
) -> Result<state::PlayerId, Rejection> {
    if let Some(player) = room.player_by_session(&session) {
        return Ok(player.id.clone());
    }
    if room.is_full() {
        return Err(Rejection::RoomFull);
    }

    let player = state::Player {
        id: state::PlayerId::default(),
        session,
        name: name.to_owned(),
        score: 0,
    };
    let player_id = player.id.clone();
    room.players.push(player);
    Metrics::c_players_total_incr();

    info!(
        "Player {} ({}) joined room {} [{}/{}]",
        player_id,
        name,
        room.id,
        room.players.len(),
        state::config::MAX_PLAYERS
    );

    if room.is_full() && room.status == state::GameStatus::Waiting {
        turn::start_turns(room, now);
    }

    Ok(player_id)
}

/// Removes the player. Returns true when the room is left empty.
pub(crate) fn leave_room(
    room: &mut state::Room,
    player_id: &state::PlayerId,
    now: dt::Instant,
) -> bool {
    let Some(idx) = room.players.iter().position(|p| &p.id == player_id) else {
        return room.players.is_empty();
    };
    let player = room.players.remove(idx);
    room.turn.assigned.remove(player_id);
    info!("Player {} ({}) left room {}", player.id, player.name, room.id);

    if room.players.len() < state::config::MAX_PLAYERS {
        if room.status == state::GameStatus::Playing {
            turn::stop_turns(room);
        }
    } else if room.turn.active.as_ref() == Some(player_id) {
        turn::advance_turn(room, now);
    }

    room.players.is_empty()
}

/// Places `shape`, rotated by `rotation` quarter turns, with its top-left
/// corner at `(x, y)`. Returns the number of rows cleared.
pub(crate) fn place_piece(
    room: &mut state::Room,
    player_id: &state::PlayerId,
    shape: &Shape,
    rotation: i32,
    x: i32,
    y: i32,
    now: dt::Instant,
) -> Result<usize, Rejection> {
    check_turn(room, player_id)?;

    let shape = shape.rotate(rotation);
    if !room.board.can_place(&shape, x, y) {
        debug!(
            "Player {} placement at ({}, {}) rejected in room {}",
            player_id, x, y, room.id
        );
        return Err(Rejection::InvalidPlacement);
    }

    let seat = room
        .players
        .iter()
        .position(|p| &p.id == player_id)
        .ok_or(Rejection::NotInRoom)?;

    let color = turn::assign_piece(room, player_id).color;
    let written = room.board.place(&shape, x, y, color);
    let rows_cleared = room.board.clear_full_rows();
    let points = room.config.score_per_row * rows_cleared as u64;
    room.players[seat].score += points;

    info!(
        "Player {} placed {} cells at ({}, {}) in room {}, cleared {} rows (+{})",
        player_id, written, x, y, room.id, rows_cleared, points
    );
    Metrics::c_placements_total_incr(rows_cleared);

    turn::advance_turn(room, now);

    Ok(rows_cleared)
}

/// Re-delivers the caller's assigned piece, drawing one if none is held.
pub(crate) fn request_piece(
    room: &mut state::Room,
    player_id: &state::PlayerId,
) -> Result<Piece, Rejection> {
    check_turn(room, player_id)?;
    Ok(turn::assign_piece(room, player_id))
}

/// Clears the board and every score. Turn order, active player and deadline
/// carry on untouched.
pub(crate) fn reset_room(room: &mut state::Room) {
    room.board.reset();
    for player in room.players.iter_mut() {
        player.score = 0;
    }
    info!("Room {} reset", room.id);
}

/// Skips the active player's turn once its deadline has passed, discarding
/// the assigned piece. Returns the skipped player.
pub(crate) fn expire_turn(room: &mut state::Room, now: dt::Instant) -> Option<state::PlayerId> {
    if room.status != state::GameStatus::Playing {
        return None;
    }
    let deadline = room.turn.deadline?;
    if now < deadline {
        return None;
    }

    let skipped = room.turn.active.clone()?;
    info!("Player {} turn expired in room {}", skipped, room.id);
    Metrics::c_turns_skipped_total_incr();

    turn::advance_turn(room, now);
    Some(skipped)
}

/// Checks, in order, that the player is seated, holds the turn, and that the
/// game is running.
pub(crate) fn check_turn(room: &state::Room, player_id: &state::PlayerId) -> Result<(), Rejection> {
    if room.player(player_id).is_none() {
        return Err(Rejection::NotInRoom);
    }
    match &room.turn.active {
        Some(active) if active != player_id => Err(Rejection::NotYourTurn),
        _ if room.status != state::GameStatus::Playing => Err(Rejection::GameNotStarted),
        None => Err(Rejection::GameNotStarted),
        Some(_) => Ok(()),
    }
}
