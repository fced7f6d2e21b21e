use std::sync::Mutex;
use shared::models::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Failed to acquire store lock")]
    LockFailed,
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            e => StoreError::Database(e.to_string()),
        }
    }
}

/// Persistence operations the poll service relies on.
#[rocket::async_trait]
pub trait PollStore: Send + Sync {
    async fn insert_poll(&self, question: &str) -> Result<Poll, StoreError>;

    async fn find_poll_by_id(&self, id: PollId) -> Result<Option<Poll>, StoreError>;

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StoreError>;

    async fn insert_votes(&self, votes: Vec<NewVote>) -> Result<Vec<Vote>, StoreError>;

    /// All vote rows for `poll`, seed and ballot alike, in insertion order.
    async fn find_votes_by_poll(&self, poll: PollId) -> Result<Vec<Vote>, StoreError>;

    /// Distinct option labels recorded for `poll`, in order of first appearance.
    async fn find_distinct_options_by_poll(&self, poll: PollId) -> Result<Vec<String>, StoreError>;
}

#[derive(Debug, Default)]
struct Tables {
    polls: Vec<Poll>,
    votes: Vec<Vote>,
}

/// Process-local store with sequential ids starting at 1.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tables<T>(&self, f: impl FnOnce(&mut Tables) -> T) -> Result<T, StoreError> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::LockFailed)?;
        Ok(f(&mut tables))
    }
}

fn push_vote(tables: &mut Tables, vote: NewVote) -> Vote {
    let vote = vote.into_vote(tables.votes.len() as i64 + 1);
    tables.votes.push(vote.clone());
    vote
}

#[rocket::async_trait]
impl PollStore for MemoryStore {
    async fn insert_poll(&self, question: &str) -> Result<Poll, StoreError> {
        self.with_tables(|t| {
            let poll = Poll { id: t.polls.len() as PollId + 1, question: question.to_owned() };
            t.polls.push(poll.clone());
            poll
        })
    }

    async fn find_poll_by_id(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        self.with_tables(|t| t.polls.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
        self.with_tables(|t| push_vote(t, vote))
    }

    async fn insert_votes(&self, votes: Vec<NewVote>) -> Result<Vec<Vote>, StoreError> {
        self.with_tables(|t| votes.into_iter().map(|v| push_vote(t, v)).collect())
    }

    async fn find_votes_by_poll(&self, poll: PollId) -> Result<Vec<Vote>, StoreError> {
        self.with_tables(|t| t.votes.iter().filter(|v| v.poll == poll).cloned().collect())
    }

    async fn find_distinct_options_by_poll(&self, poll: PollId) -> Result<Vec<String>, StoreError> {
        self.with_tables(|t| {
            let mut options: Vec<String> = Vec::new();
            for vote in t.votes.iter().filter(|v| v.poll == poll) {
                if !options.contains(&vote.option) {
                    options.push(vote.option.clone());
                }
            }
            options
        })
    }
}
