//! Capacity ledger
//!
//! Pure roster arithmetic shared by every admission path. Callers build a
//! plan against a freshly read event, then persist it with a conditional
//! write; the plan is recomputed from scratch if the write loses the race.

use uuid::Uuid;

use crate::error::{EventError, EventResult};
use crate::models::{AttendanceStatus, Attendee, Event};

/// Seats consumed by the current roster (going and paid entries only)
pub fn occupied_seats(attendees: &[Attendee]) -> u32 {
    let occupied = attendees
        .iter()
        .filter(|a| a.status.occupies_seat())
        .count();
    u32::try_from(occupied).unwrap_or(u32::MAX)
}

/// Derived seat count: capacity minus occupied, floored at zero
pub fn available_seats(capacity: u32, attendees: &[Attendee]) -> u32 {
    capacity.saturating_sub(occupied_seats(attendees))
}

/// Whether the user holds a seat (going or paid; interest does not count)
pub fn is_registered(attendees: &[Attendee], user_id: Uuid) -> bool {
    attendees
        .iter()
        .any(|a| a.user_id == user_id && a.status.occupies_seat())
}

/// The user's roster entry in any status
pub fn find_registration(attendees: &[Attendee], user_id: Uuid) -> Option<&Attendee> {
    attendees.iter().find(|a| a.user_id == user_id)
}

/// How an admission batch treats entries whose user already holds a seat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail the whole batch (free RSVPs: one registration per user)
    Reject,
    /// Drop the entry and admit the rest (paid admission retried by
    /// duplicate gateway callbacks must not double-admit)
    Skip,
}

/// A roster state ready to persist, plus how many entries it admits
#[derive(Debug, Clone)]
pub struct AdmissionPlan {
    pub attendees: Vec<Attendee>,
    pub available_seats: u32,
    pub admitted: usize,
}

/// Admit a batch of seat-holding entries against the event's current roster.
///
/// The batch is all-or-nothing: a duplicate under `Reject` or a capacity
/// shortfall fails every entry. Interested marks held by admitted users are
/// replaced by their new entries.
pub fn plan_admission(
    event: &Event,
    entries: Vec<Attendee>,
    policy: DuplicatePolicy,
) -> EventResult<AdmissionPlan> {
    for (i, entry) in entries.iter().enumerate() {
        if entries[..i].iter().any(|e| e.user_id == entry.user_id) {
            return Err(EventError::DuplicateRegistration);
        }
    }

    let mut admitted = Vec::with_capacity(entries.len());
    for entry in entries {
        if is_registered(&event.attendees, entry.user_id) {
            match policy {
                DuplicatePolicy::Reject => return Err(EventError::DuplicateRegistration),
                DuplicatePolicy::Skip => continue,
            }
        }
        admitted.push(entry);
    }

    if admitted.is_empty() {
        return Ok(AdmissionPlan {
            attendees: event.attendees.clone(),
            available_seats: available_seats(event.capacity, &event.attendees),
            admitted: 0,
        });
    }

    let requested = u32::try_from(admitted.len()).unwrap_or(u32::MAX);
    let available = available_seats(event.capacity, &event.attendees);
    if requested > available {
        return Err(EventError::CapacityExceeded {
            requested,
            available,
        });
    }

    // An interested mark is superseded by the seat-holding entry
    let mut attendees: Vec<Attendee> = event
        .attendees
        .iter()
        .filter(|a| {
            !(a.status == AttendanceStatus::Interested
                && admitted.iter().any(|e| e.user_id == a.user_id))
        })
        .cloned()
        .collect();
    let count = admitted.len();
    attendees.extend(admitted);

    Ok(AdmissionPlan {
        available_seats: available_seats(event.capacity, &attendees),
        attendees,
        admitted: count,
    })
}

/// Record soft interest for a user with no roster entry yet.
///
/// Returns `None` when the user already appears in any status, making
/// repeated interest calls no-ops. Interest never consumes a seat, so no
/// capacity check applies.
pub fn plan_interest(event: &Event, user_id: Uuid) -> Option<AdmissionPlan> {
    if find_registration(&event.attendees, user_id).is_some() {
        return None;
    }

    let mut attendees = event.attendees.clone();
    attendees.push(Attendee::interested(user_id));

    Some(AdmissionPlan {
        available_seats: available_seats(event.capacity, &attendees),
        attendees,
        admitted: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_create;

    fn event_with_capacity(capacity: u32) -> Event {
        let mut input = sample_create();
        input.capacity = capacity;
        Event::new(input, Uuid::new_v4())
    }

    #[test]
    fn test_interested_entries_do_not_consume_seats() {
        let mut event = event_with_capacity(5);
        event.attendees = vec![
            Attendee::going(Uuid::new_v4()),
            Attendee::interested(Uuid::new_v4()),
            Attendee::paid(Uuid::new_v4(), Uuid::new_v4()),
        ];
        assert_eq!(occupied_seats(&event.attendees), 2);
        assert_eq!(available_seats(event.capacity, &event.attendees), 3);
    }

    #[test]
    fn test_available_seats_floors_at_zero() {
        let roster = vec![Attendee::going(Uuid::new_v4()), Attendee::going(Uuid::new_v4())];
        assert_eq!(available_seats(1, &roster), 0);
    }

    #[test]
    fn test_admission_fills_seats_and_recomputes() {
        let event = event_with_capacity(3);
        let plan = plan_admission(
            &event,
            vec![Attendee::going(Uuid::new_v4()), Attendee::going(Uuid::new_v4())],
            DuplicatePolicy::Reject,
        )
        .unwrap();

        assert_eq!(plan.admitted, 2);
        assert_eq!(plan.attendees.len(), 2);
        assert_eq!(plan.available_seats, 1);
    }

    #[test]
    fn test_admission_rejects_when_batch_exceeds_capacity() {
        let mut event = event_with_capacity(3);
        event.attendees = vec![Attendee::going(Uuid::new_v4()), Attendee::going(Uuid::new_v4())];

        let team: Vec<Attendee> = (0..2).map(|_| Attendee::going(Uuid::new_v4())).collect();
        let err = plan_admission(&event, team, DuplicatePolicy::Reject).unwrap_err();

        match err {
            EventError::CapacityExceeded {
                requested,
                available,
            } => {
                assert_eq!(requested, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected CapacityExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_admission_on_full_event_reports_zero_available() {
        let mut event = event_with_capacity(1);
        event.attendees = vec![Attendee::going(Uuid::new_v4())];

        let err = plan_admission(
            &event,
            vec![Attendee::going(Uuid::new_v4())],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EventError::CapacityExceeded {
                requested: 1,
                available: 0
            }
        ));
    }

    #[test]
    fn test_reject_policy_fails_whole_batch_on_existing_member() {
        let registered = Uuid::new_v4();
        let mut event = event_with_capacity(10);
        event.attendees = vec![Attendee::going(registered)];

        let team = vec![Attendee::going(Uuid::new_v4()), Attendee::going(registered)];
        let err = plan_admission(&event, team, DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, EventError::DuplicateRegistration));
    }

    #[test]
    fn test_skip_policy_drops_existing_member_without_double_seat() {
        let registered = Uuid::new_v4();
        let mut event = event_with_capacity(10);
        event.attendees = vec![Attendee::paid(registered, Uuid::new_v4())];

        let plan = plan_admission(
            &event,
            vec![Attendee::paid(registered, Uuid::new_v4())],
            DuplicatePolicy::Skip,
        )
        .unwrap();

        assert_eq!(plan.admitted, 0);
        assert_eq!(plan.attendees.len(), 1);
        assert_eq!(plan.available_seats, 9);
    }

    #[test]
    fn test_duplicate_user_inside_batch_rejected() {
        let event = event_with_capacity(10);
        let user = Uuid::new_v4();
        let err = plan_admission(
            &event,
            vec![Attendee::going(user), Attendee::going(user)],
            DuplicatePolicy::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, EventError::DuplicateRegistration));
    }

    #[test]
    fn test_admission_replaces_interested_mark() {
        let user = Uuid::new_v4();
        let mut event = event_with_capacity(5);
        event.attendees = vec![Attendee::interested(user)];

        let plan =
            plan_admission(&event, vec![Attendee::going(user)], DuplicatePolicy::Reject).unwrap();

        assert_eq!(plan.attendees.len(), 1);
        assert_eq!(plan.attendees[0].status, AttendanceStatus::Going);
        assert_eq!(plan.available_seats, 4);
    }

    #[test]
    fn test_interest_is_idempotent() {
        let user = Uuid::new_v4();
        let mut event = event_with_capacity(5);

        let plan = plan_interest(&event, user).unwrap();
        assert_eq!(plan.attendees.len(), 1);
        assert_eq!(plan.available_seats, 5);

        event.attendees = plan.attendees;
        assert!(plan_interest(&event, user).is_none());
    }

    #[test]
    fn test_interest_allowed_on_full_event() {
        let mut event = event_with_capacity(1);
        event.attendees = vec![Attendee::going(Uuid::new_v4())];

        let plan = plan_interest(&event, Uuid::new_v4()).unwrap();
        assert_eq!(plan.available_seats, 0);
        assert_eq!(plan.attendees.len(), 2);
    }

    #[test]
    fn test_registration_lookup_distinguishes_interest() {
        let user = Uuid::new_v4();
        let roster = vec![Attendee::interested(user)];

        assert!(!is_registered(&roster, user));
        let entry = find_registration(&roster, user).unwrap();
        assert_eq!(entry.status, AttendanceStatus::Interested);
    }
}
