// Model exports
pub mod domain;
pub mod responses;

pub use domain::{
    CompatibilityWeights, CreatedEvent, DiningGroup, DiningStyle, GroupFailure, MaterializeStage,
    NewCrossedPath, NewMysteryEvent, NewNotification, NewRsvp, RunOutcome, RunReport,
    UserCandidate,
};
pub use responses::{HealthResponse, MatchmakingErrorResponse, MatchmakingResponse};
