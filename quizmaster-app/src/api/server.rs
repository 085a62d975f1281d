use axum::{routing::{get, post}, Router};
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tokio::net::TcpListener;

use quizmaster_core::{Flashcard, ResultsLedger};
use crate::api::routes::{answer, continue_round, get_session, history, quit, start_session, AppState};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/answer", post(answer))
        .route("/sessions/:id/continue", post(continue_round))
        .route("/sessions/:id/quit", post(quit))
        .route("/history/:quiz_id", get(history))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(ledger: Arc<dyn ResultsLedger>, cards: Vec<Flashcard>, addr: SocketAddr) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(ledger, cards));
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "api listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
