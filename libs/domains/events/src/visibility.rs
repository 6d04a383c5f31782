//! Visibility resolver
//!
//! Decides whether an actor may see an event, both as a per-document gate
//! and as a MongoDB predicate applied before pagination. Admins and super
//! admins see everything; students are scoped by the event's policy. An
//! unrecognized policy grants nothing.

use axum_helpers::extractors::Identity;
use mongodb::bson::{Bson, Document, doc, to_bson};

use crate::models::VisibilityPolicy;

/// Per-document visibility gate.
///
/// Used after fetching a single event; callers raise an authorization
/// failure when this returns false instead of silently omitting fields.
pub fn can_view(policy: &VisibilityPolicy, identity: &Identity) -> bool {
    if identity.is_elevated() {
        return true;
    }

    match policy {
        VisibilityPolicy::All => true,
        VisibilityPolicy::Branch { branches } => identity
            .branch
            .map(|b| branches.contains(&b))
            .unwrap_or(false),
        VisibilityPolicy::Club { clubs } => identity.clubs.iter().any(|c| clubs.contains(c)),
        VisibilityPolicy::Unknown => false,
    }
}

/// MongoDB predicate matching exactly the events `can_view` would allow.
///
/// Returns `None` for elevated actors (no restriction). For students the
/// predicate enumerates the granting policies, so documents with a
/// malformed policy tag match none of its arms and stay hidden.
pub fn visibility_filter(identity: &Identity) -> Option<Document> {
    if identity.is_elevated() {
        return None;
    }

    let mut grants = vec![doc! { "visibility.type": "all" }];

    if let Some(branch) = identity.branch {
        grants.push(doc! {
            "visibility.type": "branch",
            "visibility.branches": to_bson(&branch).unwrap_or(Bson::Null),
        });
    }

    if !identity.clubs.is_empty() {
        grants.push(doc! {
            "visibility.type": "club",
            "visibility.clubs": { "$in": to_bson(&identity.clubs).unwrap_or(Bson::Null) },
        });
    }

    Some(doc! { "$or": grants })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_helpers::extractors::Role;
    use uuid::Uuid;

    fn student(branch: Option<Uuid>, clubs: Vec<Uuid>) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role: Role::Student,
            branch,
            clubs,
        }
    }

    fn admin() -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role: Role::Admin,
            branch: None,
            clubs: vec![],
        }
    }

    #[test]
    fn test_all_policy_visible_to_any_student() {
        let actor = student(None, vec![]);
        assert!(can_view(&VisibilityPolicy::All, &actor));
    }

    #[test]
    fn test_branch_policy_requires_listed_branch() {
        let branch = Uuid::new_v4();
        let policy = VisibilityPolicy::Branch {
            branches: vec![branch],
        };

        assert!(can_view(&policy, &student(Some(branch), vec![])));
        assert!(!can_view(&policy, &student(Some(Uuid::new_v4()), vec![])));
        assert!(!can_view(&policy, &student(None, vec![])));
    }

    #[test]
    fn test_club_policy_requires_membership_overlap() {
        let club_a = Uuid::new_v4();
        let club_b = Uuid::new_v4();
        let policy = VisibilityPolicy::Club {
            clubs: vec![club_a, club_b],
        };

        assert!(can_view(&policy, &student(None, vec![club_b])));
        assert!(!can_view(&policy, &student(None, vec![Uuid::new_v4()])));
        assert!(!can_view(&policy, &student(None, vec![])));
    }

    #[test]
    fn test_empty_branch_list_grants_nothing() {
        let policy = VisibilityPolicy::Branch { branches: vec![] };
        assert!(!can_view(&policy, &student(Some(Uuid::new_v4()), vec![])));
    }

    #[test]
    fn test_unknown_policy_fails_closed() {
        let actor = student(Some(Uuid::new_v4()), vec![Uuid::new_v4()]);
        assert!(!can_view(&VisibilityPolicy::Unknown, &actor));
        // Admins still see everything, malformed policy included
        assert!(can_view(&VisibilityPolicy::Unknown, &admin()));
    }

    #[test]
    fn test_admin_bypasses_every_policy() {
        let policy = VisibilityPolicy::Branch {
            branches: vec![Uuid::new_v4()],
        };
        assert!(can_view(&policy, &admin()));
        assert!(visibility_filter(&admin()).is_none());
    }

    #[test]
    fn test_student_filter_enumerates_grants() {
        let branch = Uuid::new_v4();
        let club = Uuid::new_v4();
        let filter = visibility_filter(&student(Some(branch), vec![club]))
            .expect("students get a predicate");

        let arms = filter.get_array("$or").unwrap();
        assert_eq!(arms.len(), 3);
    }

    #[test]
    fn test_student_without_affiliations_only_sees_all() {
        let filter = visibility_filter(&student(None, vec![])).unwrap();
        let arms = filter.get_array("$or").unwrap();
        assert_eq!(arms.len(), 1);
    }
}
