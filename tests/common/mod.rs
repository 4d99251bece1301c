#![allow(dead_code)]

pub mod fixtures {
    use super::*;
    use axum_test::TestServer;
    use client::models::Player;
    use state::*;

    pub async fn start_two_player_game(server: &TestServer, room_id: &str) -> StartedGame {
        let player1 = client::new_player("player1");
        let player2 = client::new_player("player2");

        let joined1 = client::join_room(server, &player1, room_id).await;
        assert!(joined1.accepted);
        let joined2 = client::join_room(server, &player2, room_id).await;
        assert!(joined2.accepted);

        StartedGame {
            room_id: room_id.to_string(),
            player1: Player {
                id: joined1.player_id.unwrap(),
                ..player1
            },
            player2: Player {
                id: joined2.player_id.unwrap(),
                ..player2
            },
        }
    }

    mod state {
        use super::Player;

        pub struct StartedGame {
            pub room_id: String,
            pub player1: Player,
            pub player2: Player,
        }
    }
}

pub mod server {
    use axum_test::{TestServer, TestServerConfig};
    use tracing::info;

    use blockduel_server::{game, state};

    pub fn new_mock_app_server() -> (TestServer, WorkerHandle) {
        new_app_server(state::config::RoomConfig::default())
    }

    pub fn new_app_server(config: state::config::RoomConfig) -> (TestServer, WorkerHandle) {
        _ = tracing_subscriber::fmt::try_init();

        info!("Starting test server");

        let state = state::SharedState::new(config);
        let handle = game::spawn_game_worker(state.clone());
        let app = blockduel_server::create_application(state.clone());

        let test_server = TestServerConfig::builder()
            .expect_success_by_default()
            .mock_transport()
            .build_server(app)
            .unwrap();

        info!("Test server initialized");

        (test_server, WorkerHandle(handle, state))
    }

    pub struct WorkerHandle(tokio::task::JoinHandle<()>, state::SharedState);

    impl WorkerHandle {
        pub async fn abort(self) {
            self.0.abort();
            assert!(self.0.await.unwrap_err().is_cancelled());
        }

        pub fn state(&self) -> &state::SharedState {
            &self.1
        }
    }
}

pub mod client {
    use axum_test::TestServer;
    use models::*;
    use serde_json::json;

    type Json = serde_json::Value;

    pub fn new_player(name: &str) -> Player {
        Player {
            name: name.to_string(),
            apid: uuid::Uuid::new_v4().to_string(),
            id: String::new(),
        }
    }

    pub async fn get_room(server: &TestServer, room_id: &str) -> RoomScreen {
        let response = requests::get_room(server, room_id).await.json::<Json>();
        RoomScreen::from(response)
    }

    pub async fn poll_room(server: &TestServer, room_id: &str, since: u64) -> RoomScreen {
        let response = requests::get_room(server, room_id)
            .add_query_param("since", since)
            .add_query_param("timeout", 3_000)
            .await
            .json::<Json>();
        RoomScreen::from(response)
    }

    pub async fn get_player_screen(
        server: &TestServer,
        player: &Player,
        room_id: &str,
    ) -> PlayerScreen {
        let response = requests::get_player(server, player, room_id)
            .await
            .json::<Json>();

        PlayerScreen {
            raw: response.clone(),
            your_turn: response["yourTurn"].as_bool().unwrap(),
            score: response["score"].as_u64().unwrap(),
            piece_id: response["piece"]["id"].as_str().map(str::to_string),
        }
    }

    pub async fn join_room(server: &TestServer, player: &Player, room_id: &str) -> JoinedRoom {
        let response = requests::join_room(server, player, room_id)
            .json(&json!({
                "name": player.name,
            }))
            .await
            .json::<Json>();

        JoinedRoom {
            raw: response.clone(),
            accepted: response["accepted"].as_bool().unwrap(),
            player_id: response["playerId"].as_str().map(str::to_string),
            reason: response["reason"].as_str().map(str::to_string),
        }
    }

    pub async fn place_square(
        server: &TestServer,
        player: &Player,
        room_id: &str,
        x: i32,
        y: i32,
    ) -> Outcome {
        place(server, player, room_id, json!([[1, 1], [1, 1]]), x, y, 0).await
    }

    pub async fn place(
        server: &TestServer,
        player: &Player,
        room_id: &str,
        shape: Json,
        x: i32,
        y: i32,
        rotation: i32,
    ) -> Outcome {
        let response = requests::place(server, player, room_id)
            .json(&json!({
                "piece": { "shape": shape },
                "x": x,
                "y": y,
                "rotation": rotation,
            }))
            .await
            .json::<Json>();
        Outcome::from(response)
    }

    pub async fn request_piece(server: &TestServer, player: &Player, room_id: &str) -> Json {
        requests::request_piece(server, player, room_id)
            .await
            .json::<Json>()
    }

    pub async fn reset_room(server: &TestServer, player: &Player, room_id: &str) -> Outcome {
        let response = requests::reset_room(server, player, room_id)
            .await
            .json::<Json>();
        Outcome::from(response)
    }

    pub async fn leave_room(server: &TestServer, player: &Player, room_id: &str) -> Outcome {
        let response = requests::leave_room(server, player, room_id)
            .await
            .json::<Json>();
        Outcome::from(response)
    }

    pub mod requests {
        use axum::http::{header, HeaderValue};
        use axum_test::{TestRequest, TestServer};

        use super::models::Player;

        fn as_player(request: TestRequest, player: &Player) -> TestRequest {
            let cookie = HeaderValue::from_str(&format!("apid={}", player.apid)).unwrap();
            request.add_header(header::COOKIE, cookie)
        }

        pub fn get_room(server: &TestServer, room_id: &str) -> TestRequest {
            server.get(&format!("/api/v1/room/{}", room_id))
        }
        pub fn get_player(server: &TestServer, player: &Player, room_id: &str) -> TestRequest {
            as_player(server.get(&format!("/api/v1/room/{}/player", room_id)), player)
        }
        pub fn join_room(server: &TestServer, player: &Player, room_id: &str) -> TestRequest {
            as_player(server.post(&format!("/api/v1/room/{}/join", room_id)), player)
        }
        pub fn request_piece(server: &TestServer, player: &Player, room_id: &str) -> TestRequest {
            as_player(server.post(&format!("/api/v1/room/{}/piece", room_id)), player)
        }
        pub fn place(server: &TestServer, player: &Player, room_id: &str) -> TestRequest {
            as_player(server.post(&format!("/api/v1/room/{}/place", room_id)), player)
        }
        pub fn reset_room(server: &TestServer, player: &Player, room_id: &str) -> TestRequest {
            as_player(server.post(&format!("/api/v1/room/{}/reset", room_id)), player)
        }
        pub fn leave_room(server: &TestServer, player: &Player, room_id: &str) -> TestRequest {
            as_player(server.post(&format!("/api/v1/room/{}/leave", room_id)), player)
        }
        pub fn list_rooms(server: &TestServer) -> TestRequest {
            server.get("/api/v1/rooms")
        }
        pub fn available_room(server: &TestServer) -> TestRequest {
            server.get("/api/v1/rooms/available")
        }
    }

    pub mod models {
        use serde_json::Value;

        #[derive(Clone)]
        pub struct Player {
            pub name: String,
            pub apid: String,
            pub id: String,
        }
        pub struct RoomScreen {
            pub raw: Value,
            pub state: String,
            pub current_turn: String,
            pub players: Vec<Value>,
            pub last_update: u64,
        }
        impl From<Value> for RoomScreen {
            fn from(raw: Value) -> Self {
                RoomScreen {
                    state: raw["state"].as_str().unwrap().to_string(),
                    current_turn: raw["currentTurn"].as_str().unwrap().to_string(),
                    players: raw["players"].as_array().unwrap().to_vec(),
                    last_update: raw["lastUpdate"].as_u64().unwrap(),
                    raw,
                }
            }
        }
        impl RoomScreen {
            pub fn cell(&self, x: usize, y: usize) -> &Value {
                &self.raw["grid"][y][x]
            }
            pub fn score_of(&self, player_id: &str) -> u64 {
                self.players
                    .iter()
                    .find(|p| p["id"] == player_id)
                    .and_then(|p| p["score"].as_u64())
                    .unwrap()
            }
        }
        pub struct PlayerScreen {
            pub raw: Value,
            pub your_turn: bool,
            pub score: u64,
            pub piece_id: Option<String>,
        }
        pub struct JoinedRoom {
            pub raw: Value,
            pub accepted: bool,
            pub player_id: Option<String>,
            pub reason: Option<String>,
        }
        pub struct Outcome {
            pub raw: Value,
            pub ok: bool,
            pub reason: Option<String>,
        }
        impl From<Value> for Outcome {
            fn from(raw: Value) -> Self {
                Outcome {
                    ok: raw["ok"].as_bool().unwrap(),
                    reason: raw["reason"].as_str().map(str::to_string),
                    raw,
                }
            }
        }
    }
}
