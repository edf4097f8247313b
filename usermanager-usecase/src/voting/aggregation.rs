use usermanager_shared::types::{group_votes_by_voter, User, Vote};

/// Attaches to each user the votes it authored, matched on
/// `Vote::created_user_id`. Users without votes get an empty list. Any
/// previously attached votes are replaced.
pub fn attach_votes(users: Vec<User>, votes: Vec<Vote>) -> Vec<User> {
    let mut grouped = group_votes_by_voter(votes);
    users
        .into_iter()
        .map(|mut user| {
            user.votes = grouped.remove(&user.user_id).unwrap_or_default();
            user
        })
        .collect()
}
