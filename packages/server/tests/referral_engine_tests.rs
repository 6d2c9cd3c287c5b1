//! Integration tests for the referral engine, driven through the in-memory
//! store. Covers registration, referral crediting, tier grants and the
//! guarded no-op paths.

use std::collections::HashSet;
use std::sync::Arc;

use server_core::domains::referrals::testing::InMemoryReferralStore;
use server_core::domains::referrals::{ReferralEngine, ReferralError, RewardTier};

fn engine_with_store() -> (ReferralEngine, Arc<InMemoryReferralStore>) {
    let store = Arc::new(InMemoryReferralStore::new());
    let engine = ReferralEngine::new(store.clone());
    (engine, store)
}

async fn register(engine: &ReferralEngine, email: &str) -> String {
    engine
        .register_participant(email)
        .await
        .expect("registration should succeed")
}

/// Register `count` fresh participants and credit each one to `code`.
async fn refer_n(engine: &ReferralEngine, code: &str, prefix: &str, count: usize) {
    for i in 0..count {
        let email = format!("{}{}@example.com", prefix, i);
        register(engine, &email).await;
        engine
            .record_referral(&email, Some(code))
            .await
            .expect("referral should succeed");
    }
}

#[tokio::test]
async fn registration_issues_unique_codes() {
    let (engine, _) = engine_with_store();

    let mut codes = HashSet::new();
    for i in 0..50 {
        let code = register(&engine, &format!("user{}@example.com", i)).await;
        assert_eq!(code.len(), 8);
        assert!(codes.insert(code), "codes must never repeat");
    }
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let (engine, _) = engine_with_store();

    register(&engine, "ada@example.com").await;
    let err = engine
        .register_participant("ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::AlreadyRegistered));

    // the original registration is untouched
    let summary = engine.referral_summary("ada@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 0);
}

#[tokio::test]
async fn five_referrals_grant_the_first_tier_only() {
    let (engine, _) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    refer_n(&engine, &code, "friend", 5).await;

    let summary = engine.referral_summary("referrer@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 5);
    assert_eq!(summary.rewards.len(), 1);
    assert_eq!(summary.rewards[0].tier, RewardTier::Basic3Months.as_str());
    assert_eq!(summary.rewards[0].referral_count, 5);
    assert!(!summary.rewards[0].claimed);
}

#[tokio::test]
async fn the_fifth_referral_reports_the_granted_tier() {
    let (engine, _) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    refer_n(&engine, &code, "friend", 4).await;

    register(&engine, "fifth@example.com").await;
    let outcome = engine
        .record_referral("fifth@example.com", Some(&code))
        .await
        .unwrap();
    assert_eq!(
        outcome.credited_referrer.as_deref(),
        Some("referrer@example.com")
    );
    assert_eq!(outcome.reward_granted, Some(RewardTier::Basic3Months));
}

#[tokio::test]
async fn replayed_referral_is_credited_at_most_once() {
    let (engine, _) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    register(&engine, "friend@example.com").await;

    let first = engine
        .record_referral("friend@example.com", Some(&code))
        .await
        .unwrap();
    assert!(first.credited_referrer.is_some());

    let replay = engine
        .record_referral("friend@example.com", Some(&code))
        .await
        .unwrap();
    assert_eq!(replay.credited_referrer, None);
    assert_eq!(replay.reward_granted, None);

    let summary = engine.referral_summary("referrer@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 1);
}

#[tokio::test]
async fn retry_completes_a_grant_lost_between_edge_and_reward() {
    let (engine, store) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    refer_n(&engine, &code, "friend", 4).await;

    register(&engine, "fifth@example.com").await;
    store.fail_next_reward_insert();
    let err = engine
        .record_referral("fifth@example.com", Some(&code))
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::StoreUnavailable(_)));

    // the edge committed before the failure, the reward did not
    let summary = engine.referral_summary("referrer@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 5);
    assert!(summary.rewards.is_empty());

    // the caller's retry finishes the interrupted tier check
    let outcome = engine
        .record_referral("fifth@example.com", Some(&code))
        .await
        .unwrap();
    assert_eq!(outcome.credited_referrer, None);
    assert_eq!(outcome.reward_granted, Some(RewardTier::Basic3Months));

    let summary = engine.referral_summary("referrer@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 5);
    assert_eq!(summary.rewards.len(), 1);
    assert_eq!(summary.rewards[0].tier, RewardTier::Basic3Months.as_str());
}

#[tokio::test]
async fn replay_with_another_referrers_code_stays_a_no_op() {
    let (engine, _) = engine_with_store();

    let code_a = register(&engine, "alice@example.com").await;
    let code_b = register(&engine, "bob@example.com").await;
    register(&engine, "friend@example.com").await;
    engine
        .record_referral("friend@example.com", Some(&code_a))
        .await
        .unwrap();

    let outcome = engine
        .record_referral("friend@example.com", Some(&code_b))
        .await
        .unwrap();
    assert_eq!(outcome.credited_referrer, None);
    assert_eq!(outcome.reward_granted, None);

    let alice = engine.referral_summary("alice@example.com").await.unwrap();
    assert_eq!(alice.referral_count, 1);
    let bob = engine.referral_summary("bob@example.com").await.unwrap();
    assert_eq!(bob.referral_count, 0);
}

#[tokio::test]
async fn registration_resumes_after_code_issuance_failure() {
    let (engine, store) = engine_with_store();

    store.fail_next_code_insert();
    let err = engine
        .register_participant("ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::StoreUnavailable(_)));

    // the retry completes code issuance instead of reporting a duplicate
    let code = engine.register_participant("ada@example.com").await.unwrap();
    assert_eq!(code.len(), 8);

    let summary = engine.referral_summary("ada@example.com").await.unwrap();
    assert_eq!(summary.referral_code, code);

    // a genuine duplicate still fails
    let err = engine
        .register_participant("ada@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::AlreadyRegistered));
}

#[tokio::test]
async fn unknown_code_is_a_no_op_and_the_join_stands() {
    let (engine, _) = engine_with_store();

    register(&engine, "joiner@example.com").await;
    let outcome = engine
        .record_referral("joiner@example.com", Some("garbage-code"))
        .await
        .unwrap();
    assert_eq!(outcome.credited_referrer, None);
    assert_eq!(outcome.reward_granted, None);

    // registration unaffected
    let summary = engine.referral_summary("joiner@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 0);
}

#[tokio::test]
async fn missing_code_is_a_no_op() {
    let (engine, _) = engine_with_store();

    register(&engine, "joiner@example.com").await;
    let outcome = engine
        .record_referral("joiner@example.com", None)
        .await
        .unwrap();
    assert_eq!(outcome.credited_referrer, None);
    assert_eq!(outcome.reward_granted, None);
}

#[tokio::test]
async fn self_referral_is_silently_skipped() {
    let (engine, _) = engine_with_store();

    let code = register(&engine, "sneaky@example.com").await;
    let outcome = engine
        .record_referral("sneaky@example.com", Some(&code))
        .await
        .unwrap();
    assert_eq!(outcome.credited_referrer, None);
    assert_eq!(outcome.reward_granted, None);

    let summary = engine.referral_summary("sneaky@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 0);
    assert!(summary.rewards.is_empty());
}

#[tokio::test]
async fn referral_for_unregistered_email_fails() {
    let (engine, _) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    let err = engine
        .record_referral("stranger@example.com", Some(&code))
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::NotFound));
}

#[tokio::test]
async fn ten_referrals_grant_two_distinct_tiers() {
    let (engine, _) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    refer_n(&engine, &code, "friend", 10).await;

    let summary = engine.referral_summary("referrer@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 10);

    let tiers: Vec<&str> = summary.rewards.iter().map(|r| r.tier.as_str()).collect();
    // newest first
    assert_eq!(
        tiers,
        vec![
            RewardTier::Basic6Months.as_str(),
            RewardTier::Basic3Months.as_str()
        ]
    );

    // replaying an already-credited referral never duplicates a reward
    engine
        .record_referral("friend0@example.com", Some(&code))
        .await
        .unwrap();
    let summary = engine.referral_summary("referrer@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 10);
    assert_eq!(summary.rewards.len(), 2);
}

#[tokio::test]
async fn twenty_referrals_grant_all_three_tiers() {
    let (engine, _) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    refer_n(&engine, &code, "friend", 20).await;

    let summary = engine.referral_summary("referrer@example.com").await.unwrap();
    assert_eq!(summary.referral_count, 20);

    let tiers: HashSet<&str> = summary.rewards.iter().map(|r| r.tier.as_str()).collect();
    assert_eq!(tiers.len(), 3);
    assert!(tiers.contains(RewardTier::Pro6Months.as_str()));
}

#[tokio::test]
async fn summary_for_unknown_email_fails() {
    let (engine, _) = engine_with_store();

    let err = engine
        .referral_summary("nobody@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::NotFound));
}

#[tokio::test]
async fn store_outage_surfaces_as_store_unavailable() {
    let (engine, store) = engine_with_store();

    let code = register(&engine, "referrer@example.com").await;
    register(&engine, "friend@example.com").await;

    store.set_available(false);

    let err = engine
        .register_participant("new@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::StoreUnavailable(_)));

    let err = engine
        .record_referral("friend@example.com", Some(&code))
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::StoreUnavailable(_)));

    // recovery: the same operations succeed once the store is back
    store.set_available(true);
    let outcome = engine
        .record_referral("friend@example.com", Some(&code))
        .await
        .unwrap();
    assert_eq!(
        outcome.credited_referrer.as_deref(),
        Some("referrer@example.com")
    );
}
