//! The voting engine and its supporting pieces.
mod aggregation;
mod engine;
mod outcome;
mod pair_lock;

pub use aggregation::attach_votes;
pub use engine::{VotingEngine, DEFAULT_VOTE_INTERVAL};
pub use outcome::VoteOutcome;
pub use pair_lock::{KeyedLocks, PairLocks, VoterLocks};
