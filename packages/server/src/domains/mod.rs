// Business domains
pub mod referrals;
