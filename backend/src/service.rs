use std::sync::Arc;
use tracing::{debug, error, info};
use shared::models::*;
use shared::tally::tally;
use crate::{clock::Clock, error::ApiError, store::PollStore, utils::parse_poll_id};

/// Poll creation and vote casting on top of a `PollStore`.
#[derive(Clone)]
pub struct PollService {
    store: Arc<dyn PollStore>,
    clock: Arc<dyn Clock>,
    strict_options: bool,
}

impl PollService {
    pub fn new(store: Arc<dyn PollStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock, strict_options: false }
    }

    /// Reject ballots for labels the poll never declared.
    pub fn with_strict_options(mut self, strict: bool) -> Self {
        self.strict_options = strict;
        self
    }

    /// Stores the poll and one seed row per option. Callers validate the
    /// request first; the two inserts are not atomic.
    pub async fn create_poll(&self, question: &str, options: &[String]) -> Result<PollId, ApiError> {
        let poll = self.store.insert_poll(question).await?;

        let now = self.clock.now();
        let seeds = options.iter()
            .map(|opt| NewVote::seed(poll.id, opt.as_str(), now))
            .collect();
        let saved = self.store.insert_votes(seeds).await?;

        info!("Created poll {} with options {:?}", poll.id,
            saved.iter().map(|v| v.option.as_str()).collect::<Vec<_>>());
        Ok(poll.id)
    }

    /// Records a ballot and returns every vote row stored for the poll.
    pub async fn cast_vote(&self, poll_id: PollId, option: &str) -> Result<Vec<Vote>, ApiError> {
        info!("Casting vote for poll {} and option {}", poll_id, option);

        if self.store.find_poll_by_id(poll_id).await?.is_none() {
            return Err(ApiError::PollNotFound(poll_id.to_string()));
        }

        if self.strict_options {
            let votes = self.store.find_votes_by_poll(poll_id).await?;
            let declared = votes.iter().any(|v| v.kind == VoteKind::Seed && v.option == option);
            if !declared {
                debug!("Rejected undeclared option {:?} for poll {}", option, poll_id);
                return Err(ApiError::InvalidOption(option.to_string()));
            }
        }

        let saved = self.store
            .insert_vote(NewVote::ballot(poll_id, option, self.clock.now()))
            .await?;
        debug!("Saved vote {} for poll {}", saved.id, poll_id);

        Ok(self.store.find_votes_by_poll(poll_id).await?)
    }

    pub async fn get_votes(&self, poll_id: &str) -> Result<Vec<Vote>, ApiError> {
        let id = parse_poll_id(poll_id)?;
        info!("Retrieving votes for poll {}", id);
        Ok(self.store.find_votes_by_poll(id).await?)
    }

    pub async fn get_poll(&self, poll_id: &str) -> Result<PollDetail, ApiError> {
        let id = parse_poll_id(poll_id)?;
        let options = self.store.find_distinct_options_by_poll(id).await?;

        let Some(poll) = self.store.find_poll_by_id(id).await? else {
            error!("No poll {} (options on record: {:?})", id, options);
            return Err(ApiError::PollNotFound(poll_id.to_string()));
        };

        info!("Retrieving poll {} with options {:?}", id, options);
        Ok(PollDetail { id: poll.id, question: poll.question, options })
    }

    /// Declared and voted options, without shares.
    pub async fn option_tallies(&self, poll_id: &str) -> Result<Vec<OptionTally>, ApiError> {
        Ok(tally(&self.get_votes(poll_id).await?, false))
    }

    /// Vote distribution across the poll's options.
    pub async fn results(&self, poll_id: &str) -> Result<Vec<OptionTally>, ApiError> {
        Ok(tally(&self.get_votes(poll_id).await?, true))
    }

    pub async fn ballots(&self, poll_id: &str) -> Result<VoteLog, ApiError> {
        Ok(VoteLog { votes: self.get_votes(poll_id).await? })
    }
}
