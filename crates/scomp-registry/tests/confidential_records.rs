//! Integration test: full confidential record lifecycles over the public
//! registry API with the mock coprocessor.
//!
//! Exercises the external contract a deployment relies on: dense id
//! allocation, homomorphic status derivation, submitter-gated writes,
//! grant bookkeeping, and soft-fail reads — all through client-side
//! encryption, never by poking plaintext into the registry.

use scomp_core::{AccountAddress, ComplianceStatus, ContractAddress, RecordId, RiskLevel, Timestamp};
use scomp_fhe::{
    AccountKeys, CiphertextHandle, DecryptionRequest, EncryptedInputBuilder, FheCoprocessor,
    MockFheEngine,
};
use scomp_registry::{CallContext, ComplianceRegistry, RegistryError};

struct Client {
    keys: AccountKeys,
}

impl Client {
    fn from_seed(seed: u8) -> Self {
        Self {
            keys: AccountKeys::from_seed(&[seed; 32]),
        }
    }

    fn address(&self) -> AccountAddress {
        self.keys.address()
    }

    fn ctx(&self) -> CallContext {
        CallContext::new(
            self.address(),
            Timestamp::from_epoch_secs(1_755_000_000).expect("valid epoch"),
        )
    }

    fn create_record(
        &self,
        engine: &mut MockFheEngine,
        registry: &mut ComplianceRegistry,
        risk: RiskLevel,
        violation_code: u32,
    ) -> Result<RecordId, RegistryError> {
        let input = EncryptedInputBuilder::new(registry.address(), self.address())
            .add_u8(risk.code())
            .add_u32(violation_code)
            .encrypt(engine)?;
        registry.create_record(
            &self.ctx(),
            engine,
            input.handles[0],
            &input.proof,
            input.handles[1],
            &input.proof,
        )
    }

    fn update_status(
        &self,
        engine: &mut MockFheEngine,
        registry: &mut ComplianceRegistry,
        id: RecordId,
        status: ComplianceStatus,
    ) -> Result<(), RegistryError> {
        let input = EncryptedInputBuilder::new(registry.address(), self.address())
            .add_u8(status.code())
            .encrypt(engine)?;
        registry.update_status(&self.ctx(), engine, id, input.handles[0], &input.proof)
    }

    fn decrypt(&self, engine: &MockFheEngine, handle: CiphertextHandle) -> u64 {
        let request = DecryptionRequest::sign(&self.keys, handle).expect("signable request");
        engine.user_decrypt(&request).expect("authorized decrypt").value
    }
}

fn setup() -> (MockFheEngine, ComplianceRegistry) {
    (
        MockFheEngine::new(),
        ComplianceRegistry::new(ContractAddress::from_label("compliance-registry")),
    )
}

#[test]
fn test_count_tracks_successful_creations_only() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(1);

    for expected in 1..=3u64 {
        submitter
            .create_record(&mut engine, &mut registry, RiskLevel::Low, 1000)
            .unwrap();
        assert_eq!(registry.record_count(), expected);
    }

    // A failed creation (stale proof) allocates nothing.
    let input = EncryptedInputBuilder::new(registry.address(), submitter.address())
        .add_u8(RiskLevel::Low.code())
        .add_u32(1)
        .encrypt(&mut engine)
        .unwrap();
    registry
        .create_record(
            &submitter.ctx(),
            &mut engine,
            input.handles[0],
            &input.proof,
            input.handles[1],
            &input.proof,
        )
        .unwrap();
    assert!(registry
        .create_record(
            &submitter.ctx(),
            &mut engine,
            input.handles[0],
            &input.proof,
            input.handles[1],
            &input.proof,
        )
        .is_err());

    assert_eq!(registry.record_count(), 4);
    assert_eq!(
        registry.all_record_ids(),
        (0..4).map(RecordId::new).collect::<Vec<_>>()
    );
}

#[test]
fn test_flagging_pipeline_end_to_end() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(2);

    // risk=High, violation=2002: the derived status must decrypt to Flagged.
    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::High, 2002)
        .unwrap();

    assert_eq!(
        submitter.decrypt(&engine, registry.encrypted_status(id)),
        u64::from(ComplianceStatus::Flagged.code())
    );
    assert_eq!(
        submitter.decrypt(&engine, registry.encrypted_risk_level(id)),
        u64::from(RiskLevel::High.code())
    );
    assert_eq!(
        submitter.decrypt(&engine, registry.encrypted_violation_code(id)),
        2002
    );
}

#[test]
fn test_below_boundary_risk_stays_pending() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(3);

    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::Medium, 3003)
        .unwrap();

    assert_eq!(
        submitter.decrypt(&engine, registry.encrypted_status(id)),
        u64::from(ComplianceStatus::Pending.code())
    );
    // violation=3003 round-trips through encryption untouched.
    assert_eq!(
        submitter.decrypt(&engine, registry.encrypted_violation_code(id)),
        3003
    );
}

#[test]
fn test_submitter_update_then_decrypt() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(4);

    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::Low, 42)
        .unwrap();
    submitter
        .update_status(&mut engine, &mut registry, id, ComplianceStatus::Approved)
        .unwrap();

    assert_eq!(
        submitter.decrypt(&engine, registry.encrypted_status(id)),
        u64::from(ComplianceStatus::Approved.code())
    );
}

#[test]
fn test_non_submitter_rejected_and_state_unchanged() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(5);
    let intruder = Client::from_seed(6);

    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::Low, 7)
        .unwrap();
    let status_before = registry.encrypted_status(id);

    let err = intruder
        .update_status(&mut engine, &mut registry, id, ComplianceStatus::Approved)
        .unwrap_err();
    assert_eq!(err.to_string(), "Only submitter can update");
    assert_eq!(registry.encrypted_status(id), status_before);

    // The intruder cannot decrypt either: no grant was ever made.
    let request = DecryptionRequest::sign(&intruder.keys, status_before).unwrap();
    assert!(engine.user_decrypt(&request).is_err());
}

#[test]
fn test_grant_access_shares_all_three_fields() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(7);
    let auditor = Client::from_seed(8);

    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::Critical, 5005)
        .unwrap();
    registry
        .grant_access(&submitter.ctx(), &mut engine, id, auditor.address())
        .unwrap();

    assert!(registry.has_access(id, auditor.address()));
    assert_eq!(
        auditor.decrypt(&engine, registry.encrypted_risk_level(id)),
        u64::from(RiskLevel::Critical.code())
    );
    assert_eq!(
        auditor.decrypt(&engine, registry.encrypted_status(id)),
        u64::from(ComplianceStatus::Flagged.code())
    );
    assert_eq!(
        auditor.decrypt(&engine, registry.encrypted_violation_code(id)),
        5005
    );
}

#[test]
fn test_grantee_keeps_access_across_status_updates() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(9);
    let auditor = Client::from_seed(10);

    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::High, 1)
        .unwrap();
    registry
        .grant_access(&submitter.ctx(), &mut engine, id, auditor.address())
        .unwrap();

    for status in [
        ComplianceStatus::Approved,
        ComplianceStatus::Pending,
        ComplianceStatus::Flagged,
    ] {
        submitter
            .update_status(&mut engine, &mut registry, id, status)
            .unwrap();
        assert_eq!(
            auditor.decrypt(&engine, registry.encrypted_status(id)),
            u64::from(status.code()),
            "grantee must follow every overwrite"
        );
    }
}

#[test]
fn test_handles_nonzero_for_existing_zero_for_missing() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(11);

    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::Low, 1)
        .unwrap();
    assert!(!registry.encrypted_risk_level(id).is_zero());
    assert!(!registry.encrypted_status(id).is_zero());
    assert!(!registry.encrypted_violation_code(id).is_zero());

    let missing = RecordId::new(999);
    assert!(registry.encrypted_risk_level(missing).is_zero());
    assert!(registry.encrypted_status(missing).is_zero());
    assert!(registry.encrypted_violation_code(missing).is_zero());
    assert!(!registry.record_info(missing).exists);
}

#[test]
fn test_multi_submitter_isolation() {
    let (mut engine, mut registry) = setup();
    let first = Client::from_seed(12);
    let second = Client::from_seed(13);

    let id_a = first
        .create_record(&mut engine, &mut registry, RiskLevel::Low, 100)
        .unwrap();
    let id_b = second
        .create_record(&mut engine, &mut registry, RiskLevel::High, 200)
        .unwrap();

    // Neither submitter can touch the other's record.
    assert!(matches!(
        first.update_status(&mut engine, &mut registry, id_b, ComplianceStatus::Approved),
        Err(RegistryError::NotSubmitter)
    ));
    assert!(matches!(
        registry.grant_access(&second.ctx(), &mut engine, id_a, second.address()),
        Err(RegistryError::NotSubmitter)
    ));

    // Each sees only their own events under the submitter filter.
    assert_eq!(registry.events_by_submitter(first.address()).len(), 1);
    assert_eq!(registry.events_by_submitter(second.address()).len(), 1);
    assert_eq!(
        registry.events_by_submitter(first.address())[0].record_id(),
        id_a
    );
}

#[test]
fn test_record_info_metadata_matches_creation() {
    let (mut engine, mut registry) = setup();
    let submitter = Client::from_seed(14);

    let id = submitter
        .create_record(&mut engine, &mut registry, RiskLevel::Low, 1)
        .unwrap();
    let info = registry.record_info(id);
    assert!(info.exists);
    assert_eq!(info.id, id);
    assert_eq!(info.submitter, submitter.address());
    assert_eq!(info.timestamp, submitter.ctx().block_time);
}
