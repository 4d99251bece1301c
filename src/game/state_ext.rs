use crate::{models, state};

pub(crate) trait RoomExt {
    fn game_phase(&self) -> models::GamePhase;
    fn room_players(&self) -> Vec<models::GameClientPlayer>;
    fn is_player_turn(&self, player_id: &state::PlayerId) -> bool;
    fn turn_expires_dt(&self, player_id: &state::PlayerId) -> Option<u64>;
    fn snapshot(&self) -> models::RoomSnapshot;
    fn player_state(&self, player_id: &state::PlayerId) -> Option<models::GamePlayerState>;
}

impl RoomExt for state::Room {
    fn game_phase(&self) -> models::GamePhase {
        match self.status {
            state::GameStatus::Waiting => models::GamePhase::Waiting,
            state::GameStatus::Playing => models::GamePhase::Playing,
        }
    }

    fn room_players(&self) -> Vec<models::GameClientPlayer> {
        self.players
            .iter()
            .map(|p| models::GameClientPlayer {
                id: p.id.to_string(),
                name: p.name.clone(),
                score: p.score,
            })
            .collect()
    }

    fn is_player_turn(&self, player_id: &state::PlayerId) -> bool {
        self.turn.active.as_ref() == Some(player_id)
    }

    fn turn_expires_dt(&self, player_id: &state::PlayerId) -> Option<u64> {
        if !self.is_player_turn(player_id) {
            return None;
        }
        self.turn.deadline.map(|dt| dt.into())
    }

    fn snapshot(&self) -> models::RoomSnapshot {
        models::RoomSnapshot {
            room_id: self.id.to_string(),
            state: self.game_phase(),
            grid: self.board.rows().iter().map(|row| row.to_vec()).collect(),
            players: self.room_players(),
            player_count: self.players.len(),
            max_players: state::config::MAX_PLAYERS,
            current_turn: self
                .turn
                .active
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            turn_deadline: self.turn.deadline.map(|dt| dt.into()),
            turn_duration: self.config.turn_duration_ms,
            last_update: self.last_update.as_u64(),
        }
    }

    fn player_state(&self, player_id: &state::PlayerId) -> Option<models::GamePlayerState> {
        let player = self.player(player_id)?;

        Some(models::GamePlayerState {
            player_id: player.id.to_string(),
            state: self.game_phase(),
            score: player.score,
            your_turn: self.is_player_turn(player_id),
            piece: self.turn.assigned.get(player_id).map(Into::into),
            turn_expires_dt: self.turn_expires_dt(player_id),
            last_update: self.last_update.as_u64(),
        })
    }
}
