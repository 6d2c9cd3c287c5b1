// Waitlist Referral Service - API Core
//
// Backend for the marketing waitlist: email capture plus the referral
// reward program. The referral policy lives in domains/referrals; the
// HTTP surface in server/ is a thin presentation layer over it.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::*;
