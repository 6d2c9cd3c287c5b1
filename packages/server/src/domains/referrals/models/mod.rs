pub mod participant;
pub mod referral_code;
pub mod referral_edge;
pub mod reward;

pub use participant::Participant;
pub use referral_code::ReferralCode;
pub use referral_edge::ReferralEdge;
pub use reward::Reward;
