use crate::models::{
    CreatedEvent, DiningGroup, GroupFailure, MaterializeStage, NewCrossedPath, NewMysteryEvent,
    NewNotification, NewRsvp,
};
use crate::services::supabase::SupabaseClient;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, warn};

/// Outcome of materializing one group
///
/// Best-effort stage failures are carried as warnings on the success arm;
/// they never reclassify the group.
#[derive(Debug)]
pub enum GroupOutcome {
    Created {
        event: CreatedEvent,
        warnings: Vec<String>,
    },
    Failed(GroupFailure),
}

/// Turns one dining group into persisted event, RSVP, notification and
/// crossed-paths rows
///
/// The four inserts run as an ordered pipeline without a wrapping
/// transaction; each write is visible as soon as it commits. The event and
/// RSVP stages are critical. An event row whose RSVP insert failed stays
/// behind as an orphan with zero confirmed attendance, which the rest of the
/// application tolerates.
pub struct EventMaterializer {
    store: Arc<SupabaseClient>,
    event_lead_days: i64,
}

impl EventMaterializer {
    pub fn new(store: Arc<SupabaseClient>, event_lead_days: i64) -> Self {
        Self {
            store,
            event_lead_days,
        }
    }

    pub async fn materialize(&self, group: &DiningGroup, run_at: DateTime<Utc>) -> GroupOutcome {
        let event = NewMysteryEvent::for_group(group, run_at, self.event_lead_days);
        let member_ids = group.member_ids();

        // Stage 1: event row. Nothing else is written when this fails.
        if let Err(e) = self.store.insert_event(&event).await {
            error!(
                "Event insert failed for group {:?}: {}",
                member_ids, e
            );
            return GroupOutcome::Failed(GroupFailure {
                stage: MaterializeStage::Event,
                detail: e.to_string(),
                member_ids,
            });
        }

        // Stage 2: confirmed RSVPs. The group is failed, but the event row
        // already committed and stays behind.
        let rsvps: Vec<NewRsvp> = member_ids
            .iter()
            .map(|id| NewRsvp::confirmed(event.id, id))
            .collect();
        if let Err(e) = self.store.insert_rsvps(&rsvps).await {
            error!(
                "RSVP insert failed for event {} (group {:?}): {}",
                event.id, member_ids, e
            );
            return GroupOutcome::Failed(GroupFailure {
                stage: MaterializeStage::Attendance,
                detail: e.to_string(),
                member_ids,
            });
        }

        let mut warnings = Vec::new();

        // Stage 3: notifications, best-effort
        let notifications = build_notifications(&event, group);
        if let Err(e) = self.store.insert_notifications(&notifications).await {
            warn!("Notification insert failed for event {}: {}", event.id, e);
            warnings.push(format!("notifications: {}", e));
        }

        // Stage 4: crossed paths, best-effort
        let crossed_paths = build_crossed_paths(&event, group, run_at);
        if let Err(e) = self.store.insert_crossed_paths(&crossed_paths).await {
            warn!("Crossed-paths insert failed for event {}: {}", event.id, e);
            warnings.push(format!("crossed_paths: {}", e));
        }

        GroupOutcome::Created {
            event: CreatedEvent {
                event_id: event.id.to_string(),
                participant_count: group.size(),
                location: event.location.clone(),
            },
            warnings,
        }
    }
}

/// One notification per member, carrying the event id and a readable message
fn build_notifications(event: &NewMysteryEvent, group: &DiningGroup) -> Vec<NewNotification> {
    let message = format!(
        "You've been matched for a mystery dinner on {}. Meet your table at {}.",
        event.starts_at.format("%B %d"),
        event.location
    );

    group
        .members
        .iter()
        .map(|member| NewNotification {
            user_id: member.id.clone(),
            event_id: event.id,
            title: "Your Mystery Dinner is booked".to_string(),
            message: message.clone(),
        })
        .collect()
}

/// One crossed-paths row per unordered member pair: n * (n - 1) / 2 rows
fn build_crossed_paths(
    event: &NewMysteryEvent,
    group: &DiningGroup,
    run_at: DateTime<Utc>,
) -> Vec<NewCrossedPath> {
    let mut rows = Vec::new();
    for i in 0..group.members.len() {
        for j in (i + 1)..group.members.len() {
            rows.push(NewCrossedPath {
                user1_id: group.members[i].id.clone(),
                user2_id: group.members[j].id.clone(),
                venue: event.location.clone(),
                matched_at: run_at,
            });
        }
    }
    rows
}
