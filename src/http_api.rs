use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    socket::ConnectionState,
    stats::{AggregateState, OutputStat, QueueDepthStat, StatsSummary},
    StatsError,
};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    connection: ConnectionState,
    backend_error: bool,
    backend_error_msg: String,
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    /// Only return the most recent entries
    limit: Option<usize>,
}

/// Read-only views handed to the HTTP handlers.
#[derive(Clone)]
pub struct ApiState {
    pub stats: watch::Receiver<AggregateState>,
    pub connection: watch::Receiver<ConnectionState>,
}

async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let connection = *state.connection.borrow();
    let stats = state.stats.borrow();

    let response = HealthResponse {
        status: if stats.backend_error { "degraded" } else { "ok" },
        connection,
        backend_error: stats.backend_error,
        backend_error_msg: stats.backend_error_msg.clone(),
    };

    (StatusCode::OK, Json(response))
}

async fn stats_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let summary: StatsSummary = state.stats.borrow().summary();
    (StatusCode::OK, Json(summary))
}

async fn output_history_handler(
    State(state): State<ApiState>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let history: Vec<OutputStat> = tail(&state.stats.borrow().output_stats, params.limit);
    (StatusCode::OK, Json(history))
}

async fn queue_history_handler(
    State(state): State<ApiState>,
    Query(params): Query<HistoryParams>,
) -> impl IntoResponse {
    let history: Vec<QueueDepthStat> = tail(&state.stats.borrow().queue_depth_stats, params.limit);
    (StatusCode::OK, Json(history))
}

fn tail<T: Clone>(items: &[T], limit: Option<usize>) -> Vec<T> {
    let skip = limit.map_or(0, |limit| items.len().saturating_sub(limit));
    items[skip..].to_vec()
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route("/stats/output", get(output_history_handler))
        .route("/stats/queue", get(queue_history_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_http_server(
    address: String,
    port: u16,
    state: ApiState,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<(), StatsError> {
    let app = router(state);

    let addr = format!("{}:{}", address, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StatsError::io(format!("Failed to bind HTTP API to {}", addr), e))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
            info!("HTTP server shutting down");
        })
        .await
        .map_err(|e| StatsError::io("HTTP server failed", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::stats::{Aggregator, StatMessage};

    fn fixture() -> (Aggregator, watch::Sender<ConnectionState>, Router) {
        let aggregator = Aggregator::new();
        let (connection_tx, connection_rx) = watch::channel(ConnectionState::Open);
        let app = router(ApiState {
            stats: aggregator.subscribe(),
            connection: connection_rx,
        });
        (aggregator, connection_tx, app)
    }

    async fn get_json(app: Router, uri: &str) -> Value {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn feed(aggregator: &Aggregator, raw: &[&str]) {
        for message in raw {
            aggregator.apply(&StatMessage::parse(message).unwrap());
        }
    }

    #[tokio::test]
    async fn test_health_reports_backend_error() {
        let (aggregator, connection_tx, app) = fixture();

        let health = get_json(app.clone(), "/health").await;
        assert_eq!(health["status"], "ok");
        assert_eq!(health["connection"], "open");

        connection_tx.send_replace(ConnectionState::Reconnecting);
        aggregator.report_error("Error communicating with the backend at ws://x");

        let health = get_json(app, "/health").await;
        assert_eq!(health["status"], "degraded");
        assert_eq!(health["connection"], "reconnecting");
        assert_eq!(
            health["backend_error_msg"],
            "Error communicating with the backend at ws://x"
        );
    }

    #[tokio::test]
    async fn test_stats_summary() {
        let (aggregator, _connection_tx, app) = fixture();
        feed(
            &aggregator,
            &[
                r#"{"EventsWritten":10,"BytesWritten":1000,"Source":"a","Timestamp":1}"#,
                r#"{"EventsWritten":20,"BytesWritten":2000,"Source":"b","Timestamp":3}"#,
                r#"{"GeneratorQueueDepth":5,"OutputQueueDepth":6,"Timestamp":3}"#,
            ],
        );

        let stats = get_json(app, "/stats").await;
        assert_eq!(stats["total_events"], 30);
        assert_eq!(stats["total_bytes"], 3000);
        assert_eq!(stats["total_sources"], 2);
        assert_eq!(stats["events_per_sec"], 10.0);
        assert_eq!(stats["bytes_per_sec"], 1000.0);
        assert_eq!(stats["current_generator_queue_depth"], 5);
        assert_eq!(stats["current_output_queue_depth"], 6);
        assert!(stats.get("output_stats").is_none());
    }

    #[tokio::test]
    async fn test_history_limit() {
        let (aggregator, _connection_tx, app) = fixture();
        feed(
            &aggregator,
            &[
                r#"{"EventsWritten":1,"BytesWritten":1,"Source":"a","Timestamp":1}"#,
                r#"{"EventsWritten":2,"BytesWritten":2,"Source":"a","Timestamp":2}"#,
                r#"{"EventsWritten":3,"BytesWritten":3,"Source":"a","Timestamp":3}"#,
                r#"{"GeneratorQueueDepth":1,"OutputQueueDepth":1,"Timestamp":3}"#,
            ],
        );

        let all = get_json(app.clone(), "/stats/output").await;
        assert_eq!(all.as_array().unwrap().len(), 3);

        let last = get_json(app.clone(), "/stats/output?limit=2").await;
        let last = last.as_array().unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0]["EventsWritten"], 2);
        assert_eq!(last[1]["EventsWritten"], 3);

        let queue = get_json(app, "/stats/queue?limit=10").await;
        assert_eq!(queue.as_array().unwrap().len(), 1);
        assert_eq!(queue[0]["GeneratorQueueDepth"], 1);
    }

    #[test]
    fn test_tail() {
        let items = [1, 2, 3, 4];
        assert_eq!(tail(&items, None), vec![1, 2, 3, 4]);
        assert_eq!(tail(&items, Some(1)), vec![4]);
        assert_eq!(tail(&items, Some(0)), Vec::<i32>::new());
        assert_eq!(tail(&items, Some(10)), vec![1, 2, 3, 4]);
    }
}
