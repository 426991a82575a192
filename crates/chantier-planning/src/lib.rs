use std::collections::BTreeSet;

use chantier_core::{ConflictQuery, DomainError, ScheduledEvent};
use tracing::debug;

pub use chantier_core::TimeSlot;

/// Events from `existing` that overlap the query window and share at least
/// one participant with it, ordered by `(starts_at, id)`.
///
/// `existing` is a snapshot owned by the caller; nothing is mutated. Events
/// with an empty or inverted interval are skipped rather than reported.
pub fn find_conflicts(
    query: &ConflictQuery,
    existing: &[ScheduledEvent],
) -> Result<Vec<ScheduledEvent>, DomainError> {
    let window = query.window()?;
    let participants = query.participant_set();
    if participants.is_empty() {
        return Ok(Vec::new());
    }

    let mut seen = BTreeSet::new();
    let mut conflicts: Vec<ScheduledEvent> = existing
        .iter()
        .filter(|event| query.exclude_event_id != Some(event.id))
        .filter(|event| match event.slot() {
            Some(slot) => slot.overlaps(&window),
            None => {
                debug!(
                    event_id = %event.id,
                    starts_at = %event.starts_at,
                    ends_at = %event.ends_at,
                    "skipping event with empty interval"
                );
                false
            }
        })
        .filter(|event| shares_participant(event, &participants))
        // First occurrence of an id in the snapshot wins.
        .filter(|event| seen.insert(event.id))
        .cloned()
        .collect();

    conflicts.sort_by(|a, b| a.starts_at.cmp(&b.starts_at).then_with(|| a.id.cmp(&b.id)));

    Ok(conflicts)
}

/// Query participants that are busy in at least one of `conflicts`.
pub fn busy_participants(
    query: &ConflictQuery,
    conflicts: &[ScheduledEvent],
) -> BTreeSet<String> {
    query
        .participant_set()
        .into_iter()
        .filter(|participant| conflicts.iter().any(|event| event.involves(participant)))
        .collect()
}

fn shares_participant(event: &ScheduledEvent, participants: &BTreeSet<String>) -> bool {
    participants
        .iter()
        .any(|participant| event.involves(participant))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
    }

    fn event(start: DateTime<Utc>, end: DateTime<Utc>, participants: &[&str]) -> ScheduledEvent {
        ScheduledEvent::new(Uuid::new_v4(), start, end)
            .unwrap()
            .with_participants(participants.iter().copied())
    }

    /// Bypasses constructor validation, as rows coming from storage can.
    fn raw_event(start: DateTime<Utc>, end: DateTime<Utc>, participants: &[&str]) -> ScheduledEvent {
        let mut event = event(at(0, 0), at(0, 1), participants);
        event.starts_at = start;
        event.ends_at = end;
        event
    }

    #[test]
    fn overlapping_event_with_shared_participant_conflicts() {
        let visite = event(at(9, 0), at(10, 0), &["u1"]);
        let existing = vec![visite.clone()];

        let query = ConflictQuery::new(at(9, 30), at(10, 30), ["u1"]);
        assert_eq!(find_conflicts(&query, &existing).unwrap(), vec![visite]);

        let query = ConflictQuery::new(at(9, 30), at(10, 30), ["u2"]);
        assert!(find_conflicts(&query, &existing).unwrap().is_empty());
    }

    #[test]
    fn back_to_back_events_never_conflict() {
        let existing = vec![event(at(9, 0), at(10, 0), &["u1"])];

        let after = ConflictQuery::new(at(10, 0), at(11, 0), ["u1"]);
        assert!(find_conflicts(&after, &existing).unwrap().is_empty());

        let before = ConflictQuery::new(at(8, 0), at(9, 0), ["u1"]);
        assert!(find_conflicts(&before, &existing).unwrap().is_empty());
    }

    #[test]
    fn one_unit_of_overlap_is_enough() {
        let existing = vec![event(at(9, 0), at(10, 0), &["u1"])];
        let start = at(10, 0) - Duration::nanoseconds(1);

        let query = ConflictQuery::new(start, at(11, 0), ["u1"]);
        assert_eq!(find_conflicts(&query, &existing).unwrap().len(), 1);
    }

    #[test]
    fn invalid_query_interval_is_rejected() {
        let query = ConflictQuery::new(at(10, 0), at(10, 0), ["u1"]);
        assert!(matches!(
            find_conflicts(&query, &[]),
            Err(DomainError::InvalidInterval { .. })
        ));

        let query = ConflictQuery::new(at(11, 0), at(10, 0), ["u1"]);
        assert!(find_conflicts(&query, &[]).is_err());
    }

    #[test]
    fn empty_participant_set_yields_no_conflicts() {
        let existing = vec![event(at(9, 0), at(10, 0), &["u1"])];
        let query = ConflictQuery::new(at(9, 0), at(10, 0), Vec::<String>::new());

        assert!(find_conflicts(&query, &existing).unwrap().is_empty());
    }

    #[test]
    fn duplicate_query_participants_report_each_event_once() {
        let shared = event(at(9, 0), at(10, 0), &["u1", "u2"]);
        let existing = vec![shared.clone()];
        let query = ConflictQuery::new(at(9, 0), at(9, 30), ["u1", "u1", "u2"]);

        assert_eq!(find_conflicts(&query, &existing).unwrap(), vec![shared]);
    }

    #[test]
    fn repeated_id_in_snapshot_is_reported_once() {
        let morning = event(at(9, 0), at(10, 0), &["u1"]);
        let mut stale_copy = morning.clone();
        stale_copy.reschedule(at(11, 0), at(12, 0)).unwrap();
        let between = event(at(10, 0), at(11, 0), &["u1"]);

        let existing = vec![morning.clone(), between.clone(), stale_copy];
        let query = ConflictQuery::new(at(8, 0), at(13, 0), ["u1"]);

        assert_eq!(
            find_conflicts(&query, &existing).unwrap(),
            vec![morning, between]
        );
    }

    #[test]
    fn organizer_is_checked_like_a_participant() {
        let reunion = event(at(14, 0), at(15, 0), &["client-1"]).with_organizer("conducteur-1");
        let query = ConflictQuery::new(at(14, 30), at(16, 0), ["conducteur-1"]);

        assert_eq!(find_conflicts(&query, &[reunion]).unwrap().len(), 1);
    }

    #[test]
    fn zero_duration_and_inverted_events_are_skipped() {
        let existing = vec![
            raw_event(at(9, 30), at(9, 30), &["u1"]),
            raw_event(at(10, 0), at(9, 0), &["u1"]),
        ];
        let query = ConflictQuery::new(at(8, 0), at(12, 0), ["u1"]);

        assert!(find_conflicts(&query, &existing).unwrap().is_empty());
    }

    #[test]
    fn results_are_ordered_by_start_then_id() {
        let late = event(at(11, 0), at(12, 0), &["u1"]);
        let mut early_a = event(at(9, 0), at(10, 0), &["u1"]);
        let mut early_b = event(at(9, 0), at(9, 45), &["u1"]);
        early_a.id = Uuid::from_u128(2);
        early_b.id = Uuid::from_u128(1);

        let existing = vec![late.clone(), early_a.clone(), early_b.clone()];
        let query = ConflictQuery::new(at(8, 0), at(13, 0), ["u1"]);

        let ids: Vec<Uuid> = find_conflicts(&query, &existing)
            .unwrap()
            .into_iter()
            .map(|event| event.id)
            .collect();
        assert_eq!(ids, vec![early_b.id, early_a.id, late.id]);
    }

    #[test]
    fn rescheduled_event_is_not_reported_against_itself() {
        let visite = event(at(9, 0), at(10, 0), &["u1"]);
        let query = ConflictQuery::new(at(9, 30), at(10, 30), ["u1"]).excluding(visite.id);

        assert!(find_conflicts(&query, &[visite]).unwrap().is_empty());
    }

    #[test]
    fn disjoint_participants_never_conflict_even_when_overlapping() {
        let existing = vec![
            event(at(9, 0), at(12, 0), &["u1", "u2"]),
            event(at(10, 0), at(11, 0), &["u3"]),
        ];
        let query = ConflictQuery::new(at(9, 0), at(12, 0), ["u4", "u5"]);

        assert!(find_conflicts(&query, &existing).unwrap().is_empty());
    }

    #[test]
    fn busy_participants_lists_only_query_members_that_conflict() {
        let existing = vec![event(at(9, 0), at(10, 0), &["u1", "u9"])];
        let query = ConflictQuery::new(at(9, 0), at(10, 0), ["u1", "u2"]);
        let conflicts = find_conflicts(&query, &existing).unwrap();

        let busy = busy_participants(&query, &conflicts);
        assert_eq!(busy.into_iter().collect::<Vec<_>>(), vec!["u1".to_string()]);
    }
}
