pub mod data;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod testing;
pub mod tier;

// Re-export commonly used types
pub use data::{ReferralSummaryData, RewardData};
pub use engine::{ReferralEngine, ReferralOutcome, ReferralSummary};
pub use error::ReferralError;
pub use store::{PgReferralStore, ReferralStore, StoreError};
pub use tier::RewardTier;
