use serde::{Deserialize, Serialize};

use crate::{
    board::{Cell, Color},
    game::Rejection,
    pieces::{Piece, PieceId, ShapeKind},
};

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JoinRequest {
    pub(crate) name: String,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JoinResponse {
    pub(crate) accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) player_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<Rejection>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaceRequest {
    pub(crate) piece: ShapeModel,
    pub(crate) x: i32,
    pub(crate) y: i32,
    #[serde(default)]
    pub(crate) rotation: i32,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlacementResult {
    pub(crate) ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<Rejection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) rows_cleared: Option<usize>,
}

impl PlacementResult {
    pub(crate) fn accepted(rows_cleared: usize) -> Self {
        Self {
            ok: true,
            reason: None,
            rows_cleared: Some(rows_cleared),
        }
    }

    pub(crate) fn rejected(reason: Rejection) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            rows_cleared: None,
        }
    }
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionResult {
    pub(crate) ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<Rejection>,
}

impl ActionResult {
    pub(crate) fn ok() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    pub(crate) fn rejected(reason: Rejection) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
        }
    }
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PieceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) piece: Option<PieceModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<Rejection>,
}

/// A piece as it is handed out. `shape` is a row-major matrix of `0`/`1`.
#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PieceModel {
    pub(crate) id: PieceId,
    pub(crate) kind: ShapeKind,
    pub(crate) shape: Vec<Vec<u8>>,
    pub(crate) color: Color,
}

impl From<&Piece> for PieceModel {
    fn from(piece: &Piece) -> Self {
        Self {
            id: piece.id.clone(),
            kind: piece.kind,
            shape: piece.shape.to_matrix(),
            color: piece.color,
        }
    }
}

/// The shape a player places, unrotated. Clients may echo the whole piece
/// back; only `shape` is read.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ShapeModel {
    pub(crate) shape: Vec<Vec<u8>>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PollQuery {
    pub since: Option<u64>,
    pub timeout: Option<u64>,
}

/// Broadcast view of a room, sent to every member after each change.
#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomSnapshot {
    pub(crate) room_id: String,
    pub(crate) state: GamePhase,
    pub(crate) grid: Vec<Vec<Cell>>,
    pub(crate) players: Vec<GameClientPlayer>,
    pub(crate) player_count: usize,
    pub(crate) max_players: usize,
    /// Empty when nobody is on turn.
    pub(crate) current_turn: String,
    pub(crate) turn_deadline: Option<u64>,
    pub(crate) turn_duration: u64,
    pub(crate) last_update: u64,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameClientPlayer {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) score: u64,
}

/// Private view for one player, carrying the piece they hold.
#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GamePlayerState {
    pub(crate) player_id: String,
    pub(crate) state: GamePhase,
    pub(crate) score: u64,
    pub(crate) your_turn: bool,
    pub(crate) piece: Option<PieceModel>,
    pub(crate) turn_expires_dt: Option<u64>,
    pub(crate) last_update: u64,
}

#[derive(Debug, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoomAvailable {
    pub(crate) room_id: String,
    pub(crate) status: GamePhase,
    pub(crate) player_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) enum GamePhase {
    Waiting,
    Playing,
}
