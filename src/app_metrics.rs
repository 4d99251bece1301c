use metrics::{counter, gauge, histogram, increment_counter};

pub struct Metrics;

impl Metrics {
    pub fn c_http_requests_total_incr(labels: metrics_labels::HttpRequests) {
        let labels = [
            ("method", labels.method),
            ("path", labels.path),
            ("status", labels.status),
        ];
        increment_counter!("http_requests_total", &labels);
    }

    pub fn h_http_requests_duration_ms(labels: metrics_labels::HttpRequests, duration_ms: f64) {
        let labels = [
            ("method", labels.method),
            ("path", labels.path),
            ("status", labels.status),
        ];
        histogram!("http_requests_duration_ms", duration_ms, &labels);
    }

    pub fn g_rooms_total_set(rooms_total: usize) {
        gauge!("rooms_total", rooms_total as f64);
    }

    /// Requests that reached a live room. Room ids are caller-chosen, so they
    /// never become labels.
    pub fn c_room_requests_total_incr() {
        increment_counter!("room_requests_total");
    }

    pub fn c_players_total_incr() {
        increment_counter!("players_total");
    }

    pub fn c_placements_total_incr(rows_cleared: usize) {
        increment_counter!("placements_total");
        if rows_cleared > 0 {
            counter!("rows_cleared_total", rows_cleared as u64);
        }
    }

    pub fn c_turns_skipped_total_incr() {
        increment_counter!("turns_skipped_total");
    }

    pub fn c_rooms_evicted_total_incr() {
        increment_counter!("rooms_evicted_total");
    }
}

pub mod metrics_labels {
    #[derive(Clone)]
    pub struct HttpRequests {
        pub method: String,
        pub path: String,
        pub status: String,
    }

    pub fn http_requests(method: &str, path: &str, status: u16) -> HttpRequests {
        HttpRequests {
            method: method.to_string(),
            path: path.to_string(),
            status: status.to_string(),
        }
    }
}
