use aide::axum::{routing::get_with, ApiRouter};
use axum::extract::State;

use crate::{game::RoomExt, models, state};

pub(crate) fn room_routes(state: state::SharedState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/rooms", get_with(list, docs::list))
        .api_route("/rooms/available", get_with(available, docs::available))
        .with_state(state)
}

async fn list(State(state): State<state::SharedState>) -> axum::Json<Vec<models::RoomAvailable>> {
    let mut rooms = vec![];
    for (_, room) in state.rooms().await {
        let room = room.read().await;
        if room.disposed {
            continue;
        }
        rooms.push(room_available(&room));
    }
    axum::Json(rooms)
}

/// First room with a free seat, if any.
async fn available(
    State(state): State<state::SharedState>,
) -> axum::Json<Option<models::RoomAvailable>> {
    for (_, room) in state.rooms().await {
        let room = room.read().await;
        if room.disposed || room.is_full() {
            continue;
        }
        return axum::Json(Some(room_available(&room)));
    }
    axum::Json(None)
}

fn room_available(room: &state::Room) -> models::RoomAvailable {
    models::RoomAvailable {
        room_id: room.id.to_string(),
        status: room.game_phase(),
        player_count: room.players.len(),
    }
}

pub mod docs {
    use aide::transform::TransformOperation;

    pub fn list(op: TransformOperation) -> TransformOperation {
        op.description("List open rooms.")
    }

    pub fn available(op: TransformOperation) -> TransformOperation {
        op.description("Get a room with a free seat.")
    }
}
