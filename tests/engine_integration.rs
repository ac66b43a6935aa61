//! Engine Integration Tests
//!
//! Exercises the full credential lifecycle over the public API:
//! submission, attestation, policy management, homomorphic eligibility
//! evaluation, and proof issuance.
//!
//! Tests that need real TFHE ciphertexts generate keys, which is slow.
//! Those are `#[ignore]`d and run with:
//! cargo test --release -- --ignored

use veil::prelude::*;

// ============================================================================
// Plaintext Gate Tests (no key generation)
// ============================================================================

mod gate_tests {
    use super::*;

    fn admin() -> Principal {
        Principal::from_bytes([1u8; 32])
    }

    #[test]
    fn set_verifier_is_admin_only() {
        let mut engine = EligibilityEngine::new(admin());
        let stranger = Principal::from_bytes([5u8; 32]);
        let verifier = Principal::from_bytes([6u8; 32]);

        let result = engine.set_verifier(stranger, verifier, true);
        assert!(matches!(result, Err(EngineError::OnlyAdmin(_))));
        assert!(!engine.is_authorized(verifier));
    }

    #[test]
    fn policy_rights_follow_the_verifier_set() {
        let mut engine = EligibilityEngine::new(admin());
        let verifier = Principal::from_bytes([6u8; 32]);
        let project = ProjectId::derive(&verifier, b"launch");
        let spec = PolicySpec {
            min_age: 18,
            allowed_countries: vec![1, 2],
            requires_passport: false,
            single_use: false,
        };

        assert!(matches!(
            engine.set_policy(verifier, project, spec.clone()),
            Err(EngineError::UnauthorizedVerifier(_))
        ));

        engine.set_verifier(admin(), verifier, true).unwrap();
        engine.set_policy(verifier, project, spec).unwrap();

        engine.set_verifier(admin(), verifier, false).unwrap();
        assert!(matches!(
            engine.set_policy(
                verifier,
                project,
                PolicySpec {
                    min_age: 21,
                    allowed_countries: vec![3],
                    requires_passport: true,
                    single_use: false,
                }
            ),
            Err(EngineError::UnauthorizedVerifier(_))
        ));

        // The earlier registration is untouched by the failed write
        let policy = engine.policy_of(project).unwrap();
        assert_eq!(policy.min_age, 18);
        assert!(policy.active);
    }

    #[test]
    fn oversized_country_list_is_rejected() {
        let mut engine = EligibilityEngine::new(admin());
        let project = ProjectId::derive(&admin(), b"p");

        let result = engine.set_policy(
            admin(),
            project,
            PolicySpec {
                min_age: 18,
                allowed_countries: vec![0; 33],
                requires_passport: false,
                single_use: false,
            },
        );
        assert!(matches!(result, Err(EngineError::PolicyTooLarge { .. })));
    }

    #[test]
    fn reads_on_unknown_keys() {
        let engine = EligibilityEngine::new(admin());
        let ghost = Principal::from_bytes([9u8; 32]);
        let project = ProjectId::from_bytes([8u8; 32]);

        assert!(matches!(
            engine.status_of(ghost),
            Err(EngineError::NoSuchRecord(_))
        ));
        assert!(engine.policy_of(project).is_none());
        assert!(!engine.has_proof(ghost, project));
        assert!(engine.result_of(project, ghost).is_none());
    }
}

// ============================================================================
// Encrypted Lifecycle Tests (TFHE key generation, slow)
// ============================================================================

mod lifecycle_tests {
    use super::*;

    struct World {
        keys: InstanceKeys,
        engine: EligibilityEngine,
        vault: CipherVault,
        admin: Principal,
        verifier: Principal,
        subject: Principal,
        project_principal: Principal,
        project: ProjectId,
    }

    impl World {
        fn new() -> Self {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init();

            let keys = InstanceKeys::generate(&FheConfig::default()).unwrap();
            keys.install();

            let admin = Principal::from_bytes([1u8; 32]);
            let verifier = Principal::from_bytes([2u8; 32]);
            let subject = Principal::from_bytes([3u8; 32]);
            let project_principal = Principal::from_bytes([4u8; 32]);

            let mut engine = EligibilityEngine::new(admin);
            let vault = CipherVault::new(engine.instance_id());
            engine.set_verifier(admin, verifier, true).unwrap();

            let project = ProjectId::derive(&project_principal, b"token-sale");
            Self {
                keys,
                engine,
                vault,
                admin,
                verifier,
                subject,
                project_principal,
                project,
            }
        }

        fn submit(&mut self, birth_year: u32, country: u8) {
            let bundle = SubmissionBundle::seal(
                0x5eed_0001,
                birth_year,
                country,
                self.subject.into_bytes(),
                self.engine.instance_id(),
                &self.keys.client,
            )
            .unwrap();
            self.engine
                .submit(&mut self.vault, self.subject, &bundle)
                .unwrap();
        }

        fn default_policy(&mut self, single_use: bool) {
            self.engine
                .set_policy(
                    self.verifier,
                    self.project,
                    PolicySpec {
                        min_age: 21,
                        allowed_countries: vec![1, 2, 3],
                        requires_passport: true,
                        single_use,
                    },
                )
                .unwrap();
        }

        fn check(&mut self) -> Result<bool, EngineError> {
            let handle = self.engine.evaluate(
                &mut self.vault,
                self.subject,
                self.project,
                self.project_principal,
            )?;
            Ok(self
                .vault
                .decrypt_bool(handle, self.project_principal.into_bytes(), &self.keys.client)
                .unwrap())
        }
    }

    #[test]
    #[ignore]
    fn eligible_subject_passes() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);

        assert!(world.check().unwrap());

        // The subject can read the same verdict through its own grant
        let handle = world
            .engine
            .result_of(world.project, world.subject)
            .unwrap();
        assert!(world
            .vault
            .decrypt_bool(handle, world.subject.into_bytes(), &world.keys.client)
            .unwrap());
    }

    #[test]
    #[ignore]
    fn wrong_country_fails() {
        let mut world = World::new();
        world.submit(current_year() - 25, 9);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);

        assert!(!world.check().unwrap());
    }

    #[test]
    #[ignore]
    fn underage_subject_fails() {
        let mut world = World::new();
        world.submit(current_year() - 10, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);

        assert!(!world.check().unwrap());
    }

    #[test]
    #[ignore]
    fn unattested_subject_is_rejected() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.default_policy(false);

        assert!(matches!(
            world.check(),
            Err(EngineError::UserNotVerified(s)) if s == world.subject
        ));
    }

    #[test]
    #[ignore]
    fn resubmission_revokes_attestation() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);
        assert!(world.check().unwrap());

        // New attributes, old attestation must not survive
        world.submit(current_year() - 25, 3);
        assert!(matches!(
            world.check(),
            Err(EngineError::UserNotVerified(_))
        ));

        world.engine.attest(world.verifier, world.subject).unwrap();
        assert!(world.check().unwrap());
    }

    #[test]
    #[ignore]
    fn policy_replacement_is_total() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);
        assert!(world.check().unwrap());

        // Country 2 disappears from the allow-list
        world
            .engine
            .set_policy(
                world.verifier,
                world.project,
                PolicySpec {
                    min_age: 21,
                    allowed_countries: vec![1, 3],
                    requires_passport: true,
                    single_use: false,
                },
            )
            .unwrap();

        assert!(!world.check().unwrap());
    }

    #[test]
    #[ignore]
    fn passport_requirement_can_be_waived() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world
            .engine
            .set_policy(
                world.verifier,
                world.project,
                PolicySpec {
                    min_age: 21,
                    allowed_countries: vec![2],
                    requires_passport: false,
                    single_use: false,
                },
            )
            .unwrap();

        assert!(world.check().unwrap());
    }

    #[test]
    #[ignore]
    fn no_cross_subject_leakage() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);
        world.check().unwrap();

        // The project may read the verdict, never the raw attributes
        let record = world.engine.record(world.subject).unwrap().clone();
        let project = world.project_principal.into_bytes();
        for attribute in [record.passport, record.birth_year, record.country] {
            assert!(matches!(
                world.vault.decrypt_u32(attribute, project, &world.keys.client),
                Err(FheError::PermissionDenied { .. })
            ));
        }

        // The subject still reads its own birth year
        assert_eq!(
            world
                .vault
                .decrypt_u32(
                    record.birth_year,
                    world.subject.into_bytes(),
                    &world.keys.client
                )
                .unwrap(),
            current_year() - 25
        );
    }

    #[test]
    #[ignore]
    fn single_use_policy_is_consumed() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(true);

        assert!(world.check().unwrap());
        assert!(!world.engine.policy_of(world.project).unwrap().active);
        assert!(matches!(
            world.check(),
            Err(EngineError::PolicyInactive(p)) if p == world.project
        ));

        // Re-registration reactivates
        world.default_policy(true);
        assert!(world.check().unwrap());
    }

    #[test]
    #[ignore]
    fn proof_tokens_reflect_the_verdict() {
        let mut world = World::new();
        world.submit(current_year() - 25, 2);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);

        let token = world
            .engine
            .issue_proof(&mut world.vault, world.subject, world.project)
            .unwrap();
        assert!(world.engine.has_proof(world.subject, world.project));
        assert_ne!(
            world
                .vault
                .decrypt_u64(token, world.subject.into_bytes(), &world.keys.client)
                .unwrap(),
            0
        );

        // Idempotent: a second issuance replaces the token, the flag stays
        let token2 = world
            .engine
            .issue_proof(&mut world.vault, world.subject, world.project)
            .unwrap();
        assert!(world.engine.has_proof(world.subject, world.project));
        assert_ne!(
            world
                .vault
                .decrypt_u64(token2, world.subject.into_bytes(), &world.keys.client)
                .unwrap(),
            0
        );
    }

    #[test]
    #[ignore]
    fn ineligible_proof_decrypts_to_zero() {
        let mut world = World::new();
        world.submit(current_year() - 25, 9);
        world.engine.attest(world.verifier, world.subject).unwrap();
        world.default_policy(false);

        let token = world
            .engine
            .issue_proof(&mut world.vault, world.subject, world.project)
            .unwrap();

        // Issuance happened, but the sealed value says no
        assert!(world.engine.has_proof(world.subject, world.project));
        assert_eq!(
            world
                .vault
                .decrypt_u64(token, world.subject.into_bytes(), &world.keys.client)
                .unwrap(),
            0
        );

        // Nobody else can open the token either
        assert!(matches!(
            world
                .vault
                .decrypt_u64(token, world.admin.into_bytes(), &world.keys.client),
            Err(FheError::PermissionDenied { .. })
        ));
    }

    #[test]
    #[ignore]
    fn tampered_submission_is_rejected() {
        let mut world = World::new();
        let intruder = Principal::from_bytes([66u8; 32]);

        // Bundle sealed for the subject, replayed by another principal
        let bundle = SubmissionBundle::seal(
            1,
            current_year() - 25,
            2,
            world.subject.into_bytes(),
            world.engine.instance_id(),
            &world.keys.client,
        )
        .unwrap();

        let result = world.engine.submit(&mut world.vault, intruder, &bundle);
        assert!(matches!(result, Err(EngineError::InvalidSubmission(_))));
        assert!(matches!(
            world.engine.status_of(intruder),
            Err(EngineError::NoSuchRecord(_))
        ));
    }
}
