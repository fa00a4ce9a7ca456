//! Pure derivations from fetched collections plus the followee set.
//!
//! Nothing here is stored. Screens call these on every read so a change to
//! any input shows up in the next render regardless of arrival order.

pub mod inbox;
pub mod wellness;

use std::collections::HashSet;

use reflectra_shared::types::{AnnotatedUser, Post, User, UserId};

pub use inbox::{conversation_order, inbox_rows, suggested_contacts, InboxRow};
pub use wellness::{calendar, chart_series, summary, CalendarDay, ChartPoint, WellnessSummary};

/// Posts authored by `me` or by a followed user, in input order.
///
/// While `me` is still unknown only followed authors qualify.
pub fn visible_posts(posts: &[Post], following: &HashSet<UserId>, me: Option<UserId>) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| Some(p.user_id) == me || following.contains(&p.user_id))
        .cloned()
        .collect()
}

pub fn annotate(user: &User, following: &HashSet<UserId>) -> AnnotatedUser {
    AnnotatedUser {
        user: user.clone(),
        is_following: following.contains(&user.id),
    }
}

pub fn annotate_users(users: &[User], following: &HashSet<UserId>) -> Vec<AnnotatedUser> {
    users.iter().map(|u| annotate(u, following)).collect()
}

/// Posts written by `username`. The account screen only knows its own name.
pub fn own_posts(posts: &[Post], username: &str) -> Vec<Post> {
    posts
        .iter()
        .filter(|p| p.username == username)
        .cloned()
        .collect()
}

/// Members of `roster` still present in the followee set.
pub fn followed_users(roster: &[User], following: &HashSet<UserId>) -> Vec<User> {
    roster
        .iter()
        .filter(|u| following.contains(&u.id))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{post, user};

    #[test]
    fn test_visible_posts_self_and_followed_only() {
        let me = user(1, "alice");
        let bob = user(2, "bob");
        let carol = user(3, "carol");
        let posts = vec![
            post(10, &me, "mine", 3),
            post(11, &bob, "followed", 2),
            post(12, &carol, "stranger", 1),
        ];
        let following = HashSet::from([bob.id]);

        let visible = visible_posts(&posts, &following, Some(me.id));
        let ids: Vec<_> = visible.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![10, 11]);

        // Before the current user arrives.
        let visible = visible_posts(&posts, &following, None);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].username, "bob");
    }

    #[test]
    fn test_annotation_tracks_following_set() {
        let users = vec![user(2, "bob"), user(3, "carol")];
        let mut following = HashSet::new();
        assert!(annotate_users(&users, &following)
            .iter()
            .all(|u| !u.is_following));

        following.insert(UserId(3));
        let annotated = annotate_users(&users, &following);
        assert!(!annotated[0].is_following);
        assert!(annotated[1].is_following);
    }

    #[test]
    fn test_own_posts_by_username() {
        let me = user(1, "alice");
        let bob = user(2, "bob");
        let posts = vec![post(1, &bob, "hi", 1), post(2, &me, "hello", 2)];
        let own = own_posts(&posts, "alice");
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].content_text, "hello");
    }
}
