use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed dining-style categories offered during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiningStyle {
    Adventurous,
    ComfortFood,
    FineDining,
    StreetFood,
    HomeCooking,
}

/// Snapshot of a user eligible for mystery-dinner matching
///
/// Read-only for this service: profile rows are fetched once per run and
/// never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCandidate {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub home_city: String,
    #[serde(default)]
    pub dining_style: Option<DiningStyle>,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

/// A cluster of 2-6 compatible users selected for one mystery dinner
#[derive(Debug, Clone)]
pub struct DiningGroup {
    pub members: Vec<UserCandidate>,
}

impl DiningGroup {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|m| m.id.clone()).collect()
    }

    /// Most common home city among members, first-seen wins ties
    pub fn dominant_city(&self) -> String {
        most_frequent(self.members.iter().map(|m| m.home_city.clone())).unwrap_or_default()
    }

    /// Most common dining style among members who set one, first-seen wins ties
    pub fn dominant_dining_style(&self) -> Option<DiningStyle> {
        most_frequent(self.members.iter().filter_map(|m| m.dining_style))
    }

    /// Most common dietary tag across all members' preference sets
    pub fn dominant_dietary_theme(&self) -> Option<String> {
        most_frequent(
            self.members
                .iter()
                .flat_map(|m| m.dietary_preferences.iter().cloned()),
        )
    }
}

/// First value with the highest occurrence count, in encounter order.
/// Ties break toward the earlier value, which keeps the derivation
/// deterministic for a fixed member order.
fn most_frequent<T: PartialEq>(items: impl Iterator<Item = T>) -> Option<T> {
    let mut counts: Vec<(T, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }

    let mut best: Option<usize> = None;
    let mut best_idx = 0;
    for (idx, (_, count)) in counts.iter().enumerate() {
        if best.map_or(true, |b| *count > b) {
            best = Some(*count);
            best_idx = idx;
        }
    }

    best.map(|_| counts.swap_remove(best_idx).0)
}

/// Weights for the pairwise compatibility heuristic
///
/// The defaults sum to 1.0 for a fully matched pair.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityWeights {
    pub dining_style: f64,
    pub dietary: f64,
    pub locality: f64,
}

impl Default for CompatibilityWeights {
    fn default() -> Self {
        Self {
            dining_style: 0.4,
            dietary: 0.3,
            locality: 0.3,
        }
    }
}

/// Insert payload for a materialized mystery-dinner event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMysteryEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub location: String,
    pub starts_at: DateTime<Utc>,
    pub capacity: u32,
    pub dietary_theme: Option<String>,
    pub dining_style: Option<DiningStyle>,
    pub tags: Vec<String>,
    pub is_mystery_dinner: bool,
    pub created_by: String,
}

impl NewMysteryEvent {
    /// Derive the event row for a group. The creator is the first group
    /// member; an arbitrary tie-break kept from the production rule.
    pub fn for_group(group: &DiningGroup, run_at: DateTime<Utc>, lead_days: i64) -> Self {
        let city = group.dominant_city();

        Self {
            id: Uuid::new_v4(),
            title: "Mystery Dinner".to_string(),
            description: "You've been matched with nearby food lovers for a surprise \
                          dinner. Who's at the table stays a mystery until you arrive."
                .to_string(),
            location: format!("Mystery venue in {}", city),
            starts_at: run_at + Duration::days(lead_days),
            capacity: group.size() as u32,
            dietary_theme: group.dominant_dietary_theme(),
            dining_style: group.dominant_dining_style(),
            tags: vec!["mystery_dinner".to_string(), "auto_matched".to_string()],
            is_mystery_dinner: true,
            created_by: group
                .members
                .first()
                .map(|m| m.id.clone())
                .unwrap_or_default(),
        }
    }
}

/// Insert payload for one confirmed attendance row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRsvp {
    pub event_id: Uuid,
    pub user_id: String,
    pub status: String,
}

impl NewRsvp {
    pub fn confirmed(event_id: Uuid, user_id: &str) -> Self {
        Self {
            event_id,
            user_id: user_id.to_string(),
            status: "confirmed".to_string(),
        }
    }
}

/// Insert payload for one participant notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub event_id: Uuid,
    pub title: String,
    pub message: String,
}

/// Insert payload for one "crossed paths" connection between two members
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCrossedPath {
    pub user1_id: String,
    pub user2_id: String,
    pub venue: String,
    pub matched_at: DateTime<Utc>,
}

/// Success descriptor for one materialized group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEvent {
    #[serde(rename = "eventId")]
    pub event_id: String,
    #[serde(rename = "participantCount")]
    pub participant_count: usize,
    pub location: String,
}

/// Stage of the per-group write pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterializeStage {
    Event,
    Attendance,
    Notifications,
    CrossedPaths,
}

impl std::fmt::Display for MaterializeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MaterializeStage::Event => "event",
            MaterializeStage::Attendance => "attendance",
            MaterializeStage::Notifications => "notifications",
            MaterializeStage::CrossedPaths => "crossed_paths",
        };
        write!(f, "{}", name)
    }
}

/// A group that could not be fully materialized, with the stage that failed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupFailure {
    pub stage: MaterializeStage,
    pub detail: String,
    pub member_ids: Vec<String>,
}

/// Aggregate result of one matchmaking run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub pool_size: usize,
    pub groups_attempted: usize,
    pub events: Vec<CreatedEvent>,
    pub failures: Vec<GroupFailure>,
}

/// Outcome of a run trigger. An undersized pool is a skip, not an error.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Skipped { eligible: usize },
    Completed(RunReport),
}
