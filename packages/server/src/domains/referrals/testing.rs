//! In-memory store for exercising the engine in tests.
//!
//! Mirrors the Postgres schema's uniqueness behavior: insert methods answer
//! false on conflict instead of erroring. `set_available(false)` makes every
//! call fail with `StoreError`; the `fail_next_*` toggles fail exactly one
//! write to exercise retries after a mid-operation outage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::models::Reward;
use super::store::{ReferralStore, StoreError};
use super::tier::RewardTier;

#[derive(Default)]
struct Inner {
    participants: Vec<String>,
    /// (email, code) pairs; both columns unique
    codes: Vec<(String, String)>,
    /// (referrer_email, referred_email, referral_code); referred unique
    edges: Vec<(String, String, String)>,
    /// insertion order; `(email, tier)` unique
    rewards: Vec<Reward>,
}

pub struct InMemoryReferralStore {
    inner: Mutex<Inner>,
    available: AtomicBool,
    fail_next_code_insert: AtomicBool,
    fail_next_edge_insert: AtomicBool,
    fail_next_reward_insert: AtomicBool,
}

impl Default for InMemoryReferralStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryReferralStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            available: AtomicBool::new(true),
            fail_next_code_insert: AtomicBool::new(false),
            fail_next_edge_insert: AtomicBool::new(false),
            fail_next_reward_insert: AtomicBool::new(false),
        }
    }

    /// Toggle simulated availability of the backing store.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Fail exactly the next `insert_referral_code` call.
    pub fn fail_next_code_insert(&self) {
        self.fail_next_code_insert.store(true, Ordering::SeqCst);
    }

    /// Fail exactly the next `insert_referral_edge` call.
    pub fn fail_next_edge_insert(&self) {
        self.fail_next_edge_insert.store(true, Ordering::SeqCst);
    }

    /// Fail exactly the next `insert_reward` call.
    pub fn fail_next_reward_insert(&self) {
        self.fail_next_reward_insert.store(true, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError(anyhow!("simulated outage")))
        }
    }

    fn take_failure(flag: &AtomicBool) -> Result<(), StoreError> {
        if flag.swap(false, Ordering::SeqCst) {
            Err(StoreError(anyhow!("simulated outage")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReferralStore for InMemoryReferralStore {
    async fn insert_participant(&self, email: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.lock().unwrap();
        if inner.participants.iter().any(|p| p == email) {
            return Ok(false);
        }
        inner.participants.push(email.to_string());
        Ok(true)
    }

    async fn participant_exists(&self, email: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner.participants.iter().any(|p| p == email))
    }

    async fn insert_referral_code(&self, email: &str, code: &str) -> Result<bool, StoreError> {
        self.check_available()?;
        Self::take_failure(&self.fail_next_code_insert)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.codes.iter().any(|(_, c)| c == code) {
            return Ok(false);
        }
        // the schema also holds one code per email; a second insert errors
        if inner.codes.iter().any(|(e, _)| e == email) {
            return Err(StoreError(anyhow!("participant already holds a code")));
        }
        inner.codes.push((email.to_string(), code.to_string()));
        Ok(true)
    }

    async fn code_for_email(&self, email: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .codes
            .iter()
            .find(|(e, _)| e == email)
            .map(|(_, c)| c.clone()))
    }

    async fn email_for_code(&self, code: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .codes
            .iter()
            .find(|(_, c)| c == code)
            .map(|(e, _)| e.clone()))
    }

    async fn insert_referral_edge(
        &self,
        referrer_email: &str,
        referred_email: &str,
        referral_code: &str,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        Self::take_failure(&self.fail_next_edge_insert)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.edges.iter().any(|(_, referred, _)| referred == referred_email) {
            return Ok(false);
        }
        inner.edges.push((
            referrer_email.to_string(),
            referred_email.to_string(),
            referral_code.to_string(),
        ));
        Ok(true)
    }

    async fn referrer_of(&self, referred_email: &str) -> Result<Option<String>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .edges
            .iter()
            .find(|(_, referred, _)| referred == referred_email)
            .map(|(referrer, _, _)| referrer.clone()))
    }

    async fn count_referrals(&self, referrer_email: &str) -> Result<i64, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .edges
            .iter()
            .filter(|(referrer, _, _)| referrer == referrer_email)
            .count() as i64)
    }

    async fn insert_reward(
        &self,
        email: &str,
        tier: RewardTier,
        referral_count: i64,
    ) -> Result<bool, StoreError> {
        self.check_available()?;
        Self::take_failure(&self.fail_next_reward_insert)?;
        let mut inner = self.inner.lock().unwrap();
        if inner
            .rewards
            .iter()
            .any(|r| r.email == email && r.tier == tier.as_str())
        {
            return Ok(false);
        }
        inner.rewards.push(Reward {
            id: Uuid::new_v4(),
            email: email.to_string(),
            tier: tier.as_str().to_string(),
            referral_count: referral_count as i32,
            earned_at: Utc::now(),
            claimed: false,
        });
        Ok(true)
    }

    async fn rewards_for(&self, email: &str) -> Result<Vec<Reward>, StoreError> {
        self.check_available()?;
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .rewards
            .iter()
            .filter(|r| r.email == email)
            .rev()
            .cloned()
            .collect())
    }
}
