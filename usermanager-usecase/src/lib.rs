//! # User Manager Use Cases
//! This crate holds the orchestration core of the user manager: the voting
//! engine with its per-pair state machine and rate limit, and the user
//! service coordinating cache-aside reads and writes for user profiles.
pub mod clock;
pub mod errors;
pub mod users;
pub mod voting;

pub use clock::{Clock, SystemClock};
pub use errors::{ErrorKind, UsecaseError};
pub use users::UserService;
pub use voting::{attach_votes, KeyedLocks, PairLocks, VoterLocks, VoteOutcome, VotingEngine, DEFAULT_VOTE_INTERVAL};
