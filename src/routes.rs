use crate::{
    game::{self, RoomExt},
    layer::Apid,
    models,
    pieces::Shape,
    state::{self, dt, SharedState},
};

use aide::axum::{
    routing::{get_with, post_with},
    ApiRouter,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

type JsonResult<T> = Result<Json<T>, StatusCode>;

pub(crate) fn api_routes(state: state::SharedState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/room/:room_id", get_with(room, docs::room))
        .api_route("/room/:room_id/player", get_with(player, docs::player))
        .api_route("/room/:room_id/join", post_with(join, docs::join))
        .api_route(
            "/room/:room_id/piece",
            post_with(request_piece, docs::request_piece),
        )
        .api_route("/room/:room_id/place", post_with(place, docs::place))
        .api_route("/room/:room_id/reset", post_with(reset_room, docs::reset_room))
        .api_route("/room/:room_id/leave", post_with(leave, docs::leave))
        .with_state(state)
}

pub(crate) async fn room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Query(query): Query<models::PollQuery>,
) -> JsonResult<models::RoomSnapshot> {
    let room = utils::find_room(&state, &room_id).await?;
    utils::wait_for_update(&room, query).await;

    let room = room.read().await;
    Ok(Json(room.snapshot()))
}

pub(crate) async fn player(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Extension(apid): Extension<Apid>,
    Query(query): Query<models::PollQuery>,
) -> JsonResult<models::GamePlayerState> {
    let room = utils::find_room(&state, &room_id).await?;
    utils::wait_for_update(&room, query).await;

    let room = room.read().await;
    let player_id = utils::seated_player(&room, &apid).ok_or(StatusCode::NOT_FOUND)?;
    let player_state = room
        .player_state(&player_id)
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(player_state))
}

pub(crate) async fn join(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Extension(apid): Extension<Apid>,
    Json(payload): Json<models::JoinRequest>,
) -> JsonResult<models::JoinResponse> {
    let room_id: state::RoomId = room_id.parse().map_err(|err| {
        info!("Player failed to join: {}", err);
        StatusCode::BAD_REQUEST
    })?;

    if payload.name.trim().is_empty()
        || payload.name.chars().count() > 24
        || payload.name.contains(|c: char| c.is_control())
    {
        info!("Player failed to join: name is invalid");
        return Err(StatusCode::BAD_REQUEST);
    }
    let name = payload.name.replace(char::is_whitespace, " ");

    let mut room = state.lock_or_create_room(&room_id).await;

    let now = dt::Instant::now();
    let session = state::SessionId(apid.0);
    match game::join_room(&mut room, session, name.trim(), now) {
        Ok(player_id) => {
            room.touch(now);
            Ok(Json(models::JoinResponse {
                accepted: true,
                player_id: Some(player_id.to_string()),
                reason: None,
            }))
        }
        Err(reason) => {
            info!("Player failed to join room {}: {}", room_id, reason);
            Ok(Json(models::JoinResponse {
                accepted: false,
                player_id: None,
                reason: Some(reason),
            }))
        }
    }
}

pub(crate) async fn request_piece(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Extension(apid): Extension<Apid>,
) -> JsonResult<models::PieceResponse> {
    let room = utils::find_room(&state, &room_id).await?;
    let mut room = room.write().await;

    let result = match utils::seated_player(&room, &apid) {
        Some(player_id) => game::request_piece(&mut room, &player_id),
        None => Err(game::Rejection::NotInRoom),
    };

    let response = match result {
        Ok(piece) => {
            room.touch(dt::Instant::now());
            models::PieceResponse {
                piece: Some((&piece).into()),
                reason: None,
            }
        }
        Err(reason) => {
            info!("Piece request in room {} refused: {}", room_id, reason);
            models::PieceResponse {
                piece: None,
                reason: Some(reason),
            }
        }
    };

    Ok(Json(response))
}

pub(crate) async fn place(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Extension(apid): Extension<Apid>,
    Json(payload): Json<models::PlaceRequest>,
) -> JsonResult<models::PlacementResult> {
    let room = utils::find_room(&state, &room_id).await?;
    let mut room = room.write().await;
    let now = dt::Instant::now();

    let result = utils::seated_player(&room, &apid)
        .ok_or(game::Rejection::NotInRoom)
        .and_then(|player_id| {
            game::check_turn(&room, &player_id)?;
            let shape = Shape::from_matrix(&payload.piece.shape)
                .ok_or(game::Rejection::InvalidPlacement)?;
            game::place_piece(
                &mut room,
                &player_id,
                &shape,
                payload.rotation,
                payload.x,
                payload.y,
                now,
            )
        });

    match result {
        Ok(rows_cleared) => {
            room.touch(now);
            Ok(Json(models::PlacementResult::accepted(rows_cleared)))
        }
        Err(reason) => {
            info!("Placement in room {} rejected: {}", room_id, reason);
            Ok(Json(models::PlacementResult::rejected(reason)))
        }
    }
}

pub(crate) async fn reset_room(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Extension(apid): Extension<Apid>,
) -> JsonResult<models::ActionResult> {
    let room = utils::find_room(&state, &room_id).await?;
    let mut room = room.write().await;

    if utils::seated_player(&room, &apid).is_none() {
        return Ok(Json(models::ActionResult::rejected(
            game::Rejection::NotInRoom,
        )));
    }

    game::reset_room(&mut room);
    room.touch(dt::Instant::now());

    Ok(Json(models::ActionResult::ok()))
}

pub(crate) async fn leave(
    State(state): State<SharedState>,
    Path(room_id): Path<String>,
    Extension(apid): Extension<Apid>,
) -> JsonResult<models::ActionResult> {
    let shared_room = utils::find_room(&state, &room_id).await?;

    let is_empty = {
        let mut room = shared_room.write().await;
        let Some(player_id) = utils::seated_player(&room, &apid) else {
            return Ok(Json(models::ActionResult::rejected(
                game::Rejection::NotInRoom,
            )));
        };
        let now = dt::Instant::now();
        let is_empty = game::leave_room(&mut room, &player_id, now);
        room.touch(now);
        is_empty
    };

    if is_empty {
        let room_id: state::RoomId = room_id.parse().map_err(|_| StatusCode::BAD_REQUEST)?;
        state.remove_room_if_empty(&room_id).await;
    }

    Ok(Json(models::ActionResult::ok()))
}

mod utils {
    use axum::http::StatusCode;
    use tracing::info;

    use crate::{
        app_metrics::Metrics,
        layer::Apid,
        models,
        state::{self, SharedRoom, SharedState},
    };

    /// Unknown rooms are a no-op for everything but join.
    pub async fn find_room(state: &SharedState, room_id: &str) -> Result<SharedRoom, StatusCode> {
        let room_id: state::RoomId = room_id.parse().map_err(|err| {
            info!("Request for room {} failed: {}", room_id, err);
            StatusCode::BAD_REQUEST
        })?;

        let room = state.get_room(&room_id).await.ok_or(StatusCode::NOT_FOUND)?;
        if room.read().await.disposed {
            return Err(StatusCode::NOT_FOUND);
        }
        Metrics::c_room_requests_total_incr();
        Ok(room)
    }

    pub fn seated_player(room: &state::Room, apid: &Apid) -> Option<state::PlayerId> {
        room.player_by_session(&state::SessionId(apid.0.clone()))
            .map(|p| p.id.clone())
    }

    pub async fn wait_for_update(room: &SharedRoom, query: models::PollQuery) {
        if let Some(last_update) = query.since {
            let rx = {
                let room = room.read().await;
                room.last_update.wait_for(last_update)
            };

            let timeout_ms = query.timeout.unwrap_or(5_000).min(30_000);
            let timeout = std::time::Duration::from_millis(timeout_ms);

            tokio::select! {
                _ = rx => {}
                _ = tokio::time::sleep(timeout) => {}
            }
        }
    }
}

pub mod docs {
    use aide::transform::TransformOperation;

    pub fn room(op: TransformOperation) -> TransformOperation {
        op.description(
            "Get the current state of a room. Pass `since` to wait for the next change.",
        )
    }

    pub fn player(op: TransformOperation) -> TransformOperation {
        op.description("Get the caller's private view, including the assigned piece.")
    }

    pub fn join(op: TransformOperation) -> TransformOperation {
        op.description("Join a room, creating it if it does not exist.")
    }

    pub fn request_piece(op: TransformOperation) -> TransformOperation {
        op.description("Fetch the piece assigned to the active player.")
    }

    pub fn place(op: TransformOperation) -> TransformOperation {
        op.description("Place the assigned piece on the board.")
    }

    pub fn reset_room(op: TransformOperation) -> TransformOperation {
        op.description("Clear the board and all scores.")
    }

    pub fn leave(op: TransformOperation) -> TransformOperation {
        op.description("Leave the room.")
    }
}
