use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

pub type PollId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "backend", derive(sqlx::Type))]
#[cfg_attr(feature = "backend", sqlx(type_name = "vote_kind", rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    /// Registers a declared option when the poll is created.
    Seed,
    /// A vote cast by a participant.
    Ballot,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: PollId,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    #[serde(skip_serializing, default)]
    pub id: i64,
    pub poll: PollId,
    pub option: String,
    pub kind: VoteKind,
    #[serde(with = "time::serde::rfc3339")]
    pub cast_on: OffsetDateTime,
}

impl Vote {
    pub fn is_ballot(&self) -> bool {
        self.kind == VoteKind::Ballot
    }
}

/// A vote row that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVote {
    pub poll: PollId,
    pub option: String,
    pub kind: VoteKind,
    pub cast_on: OffsetDateTime,
}

impl NewVote {
    pub fn seed(poll: PollId, option: impl Into<String>, cast_on: OffsetDateTime) -> Self {
        Self { poll, option: option.into(), kind: VoteKind::Seed, cast_on }
    }

    pub fn ballot(poll: PollId, option: impl Into<String>, cast_on: OffsetDateTime) -> Self {
        Self { poll, option: option.into(), kind: VoteKind::Ballot, cast_on }
    }

    pub fn into_vote(self, id: i64) -> Vote {
        Vote {
            id,
            poll: self.poll,
            option: self.option,
            kind: self.kind,
            cast_on: self.cast_on,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollRequest {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub vote_cast: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollDetail {
    pub id: PollId,
    pub question: String,
    pub options: Vec<String>,
}

/// One option's line in a tally. `share` is only present on result views.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub option: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub poll: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub share: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteLog {
    pub votes: Vec<Vote>,
}
