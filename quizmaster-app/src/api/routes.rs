use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use parking_lot::Mutex;
use quizmaster_core::{
    normalize_quiz_id, summarize_history, CoreError, Decision, Flashcard, ResultsLedger,
    RoundOutcome, RoundSummary, Session, Start,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::dto::{AnswerIn, AnswerOut, ContinueIn, HistoryOut, OutcomeOut, SessionOut, StartIn};

/// A session snapshot together with its own copy of the card set.
pub struct QuizSlot {
    pub cards: Vec<Flashcard>,
    pub session: Session,
}

pub struct AppState {
    pub ledger: Arc<dyn ResultsLedger>,
    pub cards: Vec<Flashcard>,
    pub sessions: Mutex<HashMap<Uuid, QuizSlot>>,
}

impl AppState {
    pub fn new(ledger: Arc<dyn ResultsLedger>, cards: Vec<Flashcard>) -> Self {
        Self { ledger, cards, sessions: Mutex::new(HashMap::new()) }
    }

    // Finished sessions accept no further transitions; their slot is dropped
    // once the final snapshot has been rendered.
    fn evict_if_finished(sessions: &mut HashMap<Uuid, QuizSlot>, id: Uuid) {
        if sessions.get(&id).is_some_and(|slot| slot.session.is_finished()) {
            sessions.remove(&id);
            info!(%id, "session finished");
        }
    }

    async fn record(&self, quiz_id: &str, summary: Option<RoundSummary>) -> Result<(), StatusCode> {
        if let Some(s) = summary {
            self.ledger.append(quiz_id, &s).await.map_err(|e| {
                warn!(quiz = quiz_id, error = %e, "could not record round");
                StatusCode::INTERNAL_SERVER_ERROR
            })?;
        }
        Ok(())
    }
}

fn status_for(e: CoreError) -> StatusCode {
    match e {
        CoreError::InvalidState(_) => StatusCode::CONFLICT,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        CoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub async fn start_session(
    State(st): State<Arc<AppState>>,
    Json(body): Json<StartIn>,
) -> Result<(StatusCode, Json<SessionOut>), StatusCode> {
    let quiz_id = normalize_quiz_id(body.quiz_id.as_deref().unwrap_or_default());
    let cards = st.cards.clone();
    let mut session = Session::new(&quiz_id);
    if session.start(&cards, &mut rand::rng()).map_err(status_for)? == Start::NothingToRun {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    let id = Uuid::new_v4();
    let out = SessionOut::new(id, &session, &cards);
    st.sessions.lock().insert(id, QuizSlot { cards, session });
    info!(%id, quiz = %quiz_id, "session started");
    Ok((StatusCode::CREATED, Json(out)))
}

pub async fn get_session(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionOut>, StatusCode> {
    let sessions = st.sessions.lock();
    let slot = sessions.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(SessionOut::new(id, &slot.session, &slot.cards)))
}

pub async fn answer(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, StatusCode> {
    let (out, quiz_id, summary) = {
        let mut sessions = st.sessions.lock();
        let slot = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
        let answered = slot
            .session
            .answer(&mut slot.cards, &body.answer)
            .map_err(status_for)?;
        let out = AnswerOut {
            correct: answered.correct,
            expected: answered.expected,
            outcome: answered
                .outcome
                .as_ref()
                .map(|o| OutcomeOut::from_outcome(o, &slot.cards)),
            session: SessionOut::new(id, &slot.session, &slot.cards),
        };
        let summary = answered.outcome.as_ref().map(RoundOutcome::summary);
        let quiz_id = slot.session.quiz_id().to_string();
        AppState::evict_if_finished(&mut sessions, id);
        (out, quiz_id, summary)
    };
    st.record(&quiz_id, summary).await?;
    Ok(Json(out))
}

pub async fn continue_round(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ContinueIn>,
) -> Result<Json<SessionOut>, StatusCode> {
    let decision = if body.proceed { Decision::Continue } else { Decision::Stop };
    let mut sessions = st.sessions.lock();
    let slot = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    slot.session
        .decide(decision, &slot.cards, &mut rand::rng())
        .map_err(status_for)?;
    let out = SessionOut::new(id, &slot.session, &slot.cards);
    AppState::evict_if_finished(&mut sessions, id);
    Ok(Json(out))
}

pub async fn quit(
    State(st): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionOut>, StatusCode> {
    let (out, quiz_id, summary) = {
        let mut sessions = st.sessions.lock();
        let slot = sessions.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
        let outcome = slot.session.quit().map_err(status_for)?;
        let out = SessionOut::new(id, &slot.session, &slot.cards);
        let quiz_id = slot.session.quiz_id().to_string();
        AppState::evict_if_finished(&mut sessions, id);
        (out, quiz_id, outcome.as_ref().map(RoundOutcome::summary))
    };
    st.record(&quiz_id, summary).await?;
    Ok(Json(out))
}

pub async fn history(
    State(st): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
) -> Json<HistoryOut> {
    let quiz_id = normalize_quiz_id(&quiz_id);
    let rounds = st.ledger.load(&quiz_id).await;
    let stats = summarize_history(&rounds);
    Json(HistoryOut::new(quiz_id, rounds, stats))
}
