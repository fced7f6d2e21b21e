use std::sync::Arc;
use rocket::{State, get, post, serde::json::Json};
use tracing::{error, info, instrument};
use sqlx::PgPool;
use shared::{models::*, validation::validate_poll_request};
use crate::{
    clock::{Clock, SystemClock},
    config::AppConfig,
    error::ApiError,
    queries::PgPollStore,
    service::PollService,
    store::PollStore,
    utils::parse_poll_id,
};

pub struct AppState {
    pub polls: PollService,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self::with_store(Arc::new(PgPollStore::new(pool)), Arc::new(SystemClock), config)
    }

    pub fn with_store(store: Arc<dyn PollStore>, clock: Arc<dyn Clock>, config: AppConfig) -> Self {
        Self {
            polls: PollService::new(store, clock).with_strict_options(config.strict_vote_options),
            config,
        }
    }
}

#[rocket::options("/<_..>")]
pub async fn all_options() -> rocket::http::Status {
    rocket::http::Status::Ok
}

#[instrument(skip(state, request))]
#[post("/poll", format = "json", data = "<request>")]
pub async fn create_poll(
    state: &State<AppState>,
    request: Json<PollRequest>,
) -> Result<Json<PollId>, ApiError> {
    let request = request.into_inner();
    info!("Creating poll: {:?}", request);

    if let Err(e) = validate_poll_request(&request) {
        error!("Rejected poll with {} options: {}", request.options.len(), e);
        return Err(e.into());
    }

    let id = state.polls.create_poll(&request.question, &request.options).await?;
    info!("Created poll with id: {}", id);
    Ok(Json(id))
}

#[instrument(skip(state), fields(poll_id = %id))]
#[get("/poll/<id>")]
pub async fn get_poll(state: &State<AppState>, id: &str) -> Result<Json<PollDetail>, ApiError> {
    state.polls.get_poll(id).await.map(Json)
}

#[instrument(skip(state, vote), fields(poll_id = %id))]
#[post("/poll/<id>/vote", format = "json", data = "<vote>")]
pub async fn cast_vote(
    state: &State<AppState>,
    id: &str,
    vote: Json<VoteRequest>,
) -> Result<Json<Vec<OptionTally>>, ApiError> {
    let poll_id = parse_poll_id(id)?;
    let votes = state.polls.cast_vote(poll_id, &vote.vote_cast).await?;
    Ok(Json(shared::tally(&votes, true)))
}

#[instrument(skip(state), fields(poll_id = %id))]
#[get("/poll/<id>/options")]
pub async fn poll_options(state: &State<AppState>, id: &str) -> Result<Json<Vec<OptionTally>>, ApiError> {
    state.polls.option_tallies(id).await.map(Json)
}

#[instrument(skip(state), fields(poll_id = %id))]
#[get("/poll/<id>/votes")]
pub async fn poll_results(state: &State<AppState>, id: &str) -> Result<Json<Vec<OptionTally>>, ApiError> {
    state.polls.results(id).await.map(Json)
}

#[instrument(skip(state), fields(poll_id = %id))]
#[get("/poll/<id>/ballots")]
pub async fn poll_ballots(state: &State<AppState>, id: &str) -> Result<Json<VoteLog>, ApiError> {
    state.polls.ballots(id).await.map(Json)
}
