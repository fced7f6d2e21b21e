use sqlx::PgPool;
use shared::models::*;
use crate::store::{PollStore, StoreError};

const SELECT_VOTES: &str =
    "SELECT id, poll, option_label AS option, kind, cast_on
     FROM votes WHERE poll = $1 ORDER BY id";

const INSERT_VOTE: &str =
    "INSERT INTO votes (poll, option_label, kind, cast_on)
     VALUES ($1, $2, $3, $4)
     RETURNING id, poll, option_label AS option, kind, cast_on";

/// `PollStore` backed by PostgreSQL.
pub struct PgPollStore {
    pool: PgPool,
}

impl PgPollStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[rocket::async_trait]
impl PollStore for PgPollStore {
    async fn insert_poll(&self, question: &str) -> Result<Poll, StoreError> {
        let poll = sqlx::query_as::<_, Poll>(
            "INSERT INTO polls (question) VALUES ($1) RETURNING id, question"
        )
        .bind(question)
        .fetch_one(&self.pool)
        .await?;
        Ok(poll)
    }

    async fn find_poll_by_id(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        let poll = sqlx::query_as::<_, Poll>("SELECT id, question FROM polls WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(poll)
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
        let vote = sqlx::query_as::<_, Vote>(INSERT_VOTE)
            .bind(vote.poll)
            .bind(vote.option)
            .bind(vote.kind)
            .bind(vote.cast_on)
            .fetch_one(&self.pool)
            .await?;
        Ok(vote)
    }

    async fn insert_votes(&self, votes: Vec<NewVote>) -> Result<Vec<Vote>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(votes.len());
        for vote in votes {
            let row = sqlx::query_as::<_, Vote>(INSERT_VOTE)
                .bind(vote.poll)
                .bind(vote.option)
                .bind(vote.kind)
                .bind(vote.cast_on)
                .fetch_one(&mut *tx)
                .await?;
            saved.push(row);
        }
        tx.commit().await?;
        Ok(saved)
    }

    async fn find_votes_by_poll(&self, poll: PollId) -> Result<Vec<Vote>, StoreError> {
        let votes = sqlx::query_as::<_, Vote>(SELECT_VOTES)
            .bind(poll)
            .fetch_all(&self.pool)
            .await?;
        Ok(votes)
    }

    async fn find_distinct_options_by_poll(&self, poll: PollId) -> Result<Vec<String>, StoreError> {
        let options = sqlx::query_scalar::<_, String>(
            "SELECT option_label FROM votes WHERE poll = $1
             GROUP BY option_label ORDER BY MIN(id)"
        )
        .bind(poll)
        .fetch_all(&self.pool)
        .await?;
        Ok(options)
    }
}
