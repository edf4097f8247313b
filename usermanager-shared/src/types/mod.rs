mod page;
mod role;
mod user;
mod user_vote;
mod vote;

pub use page::{Page, Users, Votes};
pub use role::{ensure_role_assignable, Permission, Role};
pub use user::{User, DEFAULT_HASH_COST};
pub use user_vote::UserVote;
pub use vote::{group_votes_by_voter, Vote, VoteValue};

/// Server-assigned user identity.
pub type UserId = uuid::Uuid;

/// Store-assigned vote identity.
pub type VoteId = i64;

/// Store-assigned identity of a user-vote join row.
pub type UserVoteId = i64;
