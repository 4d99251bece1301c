use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use tracing::info;

use blockduel_server::{create_application, game, state};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    // initialize aide
    aide::gen::on_error(|error| {
        tracing::error!("{error}");
    });
    aide::gen::extract_schemas(true);

    // initialize state
    let config = state::config::RoomConfig::from_env();
    info!(
        "Turn duration {} ms, room idle timeout {} ms",
        config.turn_duration_ms, config.idle_timeout_ms
    );
    let state = state::SharedState::new(config);
    game::spawn_game_worker(state.clone());

    let app = create_application(state);

    // run our app with hyper, listening globally - by default on port 5000
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), api_port());
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let local_addr = listener.local_addr()?;
    info!("listening on {}", local_addr);
    info!("API docs are accessible at {}", docs_url(local_addr));

    axum::serve(listener, app).await
}

fn api_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(5000)
}

fn docs_url(listener: SocketAddr) -> String {
    match listener {
        SocketAddr::V4(addr) if addr.ip().is_unspecified() => {
            format!("http://localhost:{}/docs", addr.port())
        }
        addr => format!("http://{}/docs", addr),
    }
}
