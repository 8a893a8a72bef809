//! Contract Test: Sync Engine
//!
//! Verifies the populate → diff → apply loop against an in-memory provider.
//!
//! Constraints verified:
//! - A synced zone plans zero changes on the next pass
//! - Dry runs never reach apply()
//! - Unsupported and policy-excluded records never reach a plan, on
//!   either side of the diff
//! - Changes reach the provider as Creates → Updates → Deletes
//!
//! If this test fails, convergence is broken.

mod common;

use common::*;
use zonesync_core::{EngineConfig, RecordPolicy, RecordType, SyncEngine, Zone};

fn build_engine(provider: MockZoneProvider, dry_run: bool) -> SyncEngine {
    SyncEngine::new(Box::new(provider), EngineConfig { dry_run })
}

#[tokio::test]
async fn sync_converges_and_is_idempotent() {
    let provider = MockZoneProvider::new();
    let engine = build_engine(MockZoneProvider::sharing_state_with(&provider), false);

    let report = engine.sync(&desired_zone()).await.expect("first sync succeeds");
    assert_eq!(report.planned, 3);
    assert_eq!(report.applied, 3);
    assert_eq!(provider.stored().unwrap(), desired_zone());

    // Second pass against the converged provider
    let report = engine.sync(&desired_zone()).await.expect("second sync succeeds");
    assert_eq!(report.planned, 0);
    assert_eq!(report.applied, 0);
    assert_eq!(
        provider.apply_call_count(),
        1,
        "an empty plan must never be sent to the provider"
    );
}

#[tokio::test]
async fn dry_run_never_applies() {
    let provider = MockZoneProvider::new();
    let engine = build_engine(MockZoneProvider::sharing_state_with(&provider), true);

    let report = engine.sync(&desired_zone()).await.unwrap();

    assert_eq!(report.planned, 3);
    assert_eq!(report.applied, 0);
    assert_eq!(provider.populate_call_count(), 1);
    assert_eq!(provider.apply_call_count(), 0);
    assert!(provider.stored().is_none());
}

#[tokio::test]
async fn changes_are_applied_creates_updates_deletes() {
    let existing = Zone::with_records(
        ZONE,
        [
            a_record("", 300, &[[1, 2, 3, 4]]),
            a_record("old", 300, &[[9, 9, 9, 9]]),
        ],
    )
    .unwrap();
    let provider = MockZoneProvider::holding(existing);
    let engine = build_engine(MockZoneProvider::sharing_state_with(&provider), false);

    let report = engine.sync(&desired_zone()).await.unwrap();

    assert_eq!(report.applied, 4);
    assert_eq!(
        provider.applied_kinds(),
        vec!["Create", "Create", "Update", "Delete"]
    );
    assert_eq!(provider.stored().unwrap(), desired_zone());
}

#[tokio::test]
async fn unsupported_types_are_left_out() {
    let provider = MockZoneProvider::new().with_supported(vec![RecordType::A]);
    let engine = build_engine(MockZoneProvider::sharing_state_with(&provider), false);

    let plan = engine.plan(&desired_zone()).await.unwrap();

    assert_eq!(plan.len(), 2);
    assert!(plan.changes().iter().all(|c| c.record().record_type() == RecordType::A));
    assert_eq!(plan.desired().len(), 2, "TXT is filtered from the desired side too");
}

#[tokio::test]
async fn root_ns_is_provider_owned_by_default() {
    let existing = Zone::with_records(ZONE, [ns_record("", &["ns11.constellix.com."])]).unwrap();
    let provider = MockZoneProvider::holding(existing.clone());
    let engine = build_engine(MockZoneProvider::sharing_state_with(&provider), false);

    // Desired zone does not mention the apex NS: nothing to delete
    let plan = engine.plan(&Zone::new(ZONE).unwrap()).await.unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.existing().len(), 0, "apex NS is filtered from the existing side");

    let managed = MockZoneProvider::holding(existing).with_policy(RecordPolicy {
        manage_root_ns: true,
        excluded_types: Vec::new(),
    });
    let engine = engine_for(managed);
    let plan = engine.plan(&Zone::new(ZONE).unwrap()).await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.changes()[0].kind(), "Delete");
}

#[tokio::test]
async fn excluded_types_are_left_out() {
    let provider = MockZoneProvider::new().with_policy(RecordPolicy {
        manage_root_ns: false,
        excluded_types: vec![RecordType::Txt],
    });
    let engine = engine_for(provider);

    let plan = engine.plan(&desired_zone()).await.unwrap();

    assert_eq!(plan.len(), 2);
    assert!(!plan.exists());
}

fn engine_for(provider: MockZoneProvider) -> SyncEngine {
    build_engine(provider, false)
}
