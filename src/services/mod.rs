// Service exports
pub mod materializer;
pub mod run;
pub mod supabase;

pub use materializer::{EventMaterializer, GroupOutcome};
pub use run::{MatchmakingRun, RunError};
pub use supabase::{SupabaseClient, SupabaseError, SupabaseTables};
