use tracing::{debug, info};

use crate::state::{self, dt};

/// Fixes the turn order from the current roster and hands the first piece to
/// the first player to have joined.
pub(crate) fn start_turns(room: &mut state::Room, now: dt::Instant) {
    let [first, second] = match room.players.as_slice() {
        [first, second] => [first.id.clone(), second.id.clone()],
        _ => return,
    };

    info!(
        "Room {}: starting turns, {} goes first, {} second",
        room.id, first, second
    );

    room.turn.order = Some([first, second]);
    room.turn.index = 0;
    room.status = state::GameStatus::Playing;
    begin_turn(room, now);
}

/// Hands the turn to the other player in the fixed order.
pub(crate) fn advance_turn(room: &mut state::Room, now: dt::Instant) {
    if let Some(previous) = room.turn.active.take() {
        room.turn.assigned.remove(&previous);
    }
    room.turn.index = (room.turn.index + 1) % 2;
    begin_turn(room, now);
}

/// Drops back to waiting. Board and scores are left alone.
pub(crate) fn stop_turns(room: &mut state::Room) {
    info!("Room {}: not enough players, waiting", room.id);

    room.status = state::GameStatus::Waiting;
    room.turn = state::TurnState::default();
}

/// Returns the assigned piece for the active player, drawing one if the
/// player has none.
pub(crate) fn assign_piece(
    room: &mut state::Room,
    player_id: &state::PlayerId,
) -> crate::pieces::Piece {
    let state::Room { turn, supply, .. } = room;
    let piece = turn.assigned.entry(player_id.clone()).or_insert_with(|| {
        let piece = supply.random_piece();
        debug!("Assigned piece {} ({:?}) to {}", piece.id, piece.kind, player_id);
        piece
    });
    piece.clone()
}

fn begin_turn(room: &mut state::Room, now: dt::Instant) {
    let Some(order) = room.turn.order.clone() else {
        return;
    };
    let active = order[room.turn.index].clone();

    room.turn.deadline = Some(now.plus_ms(room.config.turn_duration_ms));
    room.turn.active = Some(active.clone());
    assign_piece(room, &active);
}
