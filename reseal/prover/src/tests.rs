use crate::*;
use crate::payload::{decrypt_payload, encrypt_payload};
use curve25519_dalek::{
    constants::RISTRETTO_BASEPOINT_POINT as G, ristretto::RistrettoPoint, scalar::Scalar,
    traits::Identity,
};
use proptest::prelude::*;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use reseal_primitives::TransferState;

fn sk(x: u64) -> SecretKey {
    SecretKey::from_scalar(Scalar::from(x)).expect("non-zero")
}

fn seeded(tag: u8) -> Randomness {
    let mut seed = [0u8; 32];
    seed[0] = tag;
    Randomness::from_seed(seed)
}

fn master(fill: u8) -> MasterKey {
    MasterKey::from_seed([fill; 32])
}

/// Recompute the announcements from the public statement and check the
/// challenge, the same equations a verifier runs.
fn equations_hold(
    old: &SealedKey,
    new: &SealedKey,
    sender_pk: &PublicKey,
    receiver_pk: &PublicKey,
    asset_id: &AssetId,
    proof: &TransferProof,
) -> bool {
    let [s1, s2, u1, u2, v] = proof.scalars().expect("canonical");
    let pk_a = sender_pk.decompress().expect("pk_a");
    let pk_b = receiver_pk.decompress().expect("pk_b");
    let (r0, d0) = (old.ephemeral_point().unwrap(), old.masked_key_point().unwrap());
    let (r1, d1) = (new.ephemeral_point().unwrap(), new.masked_key_point().unwrap());
    if old.key_check() != new.key_check() {
        return false;
    }

    let a1 = s1 * G - v * pk_a;
    let a2 = s2 * G - v * r1;
    let a3 = u1 * r0 - u2 * pk_b - v * (d0 - d1);
    let a4 = (u1 - s1) * G;
    let a5 = (u2 - s2) * G;

    let mut t = new_transcript(&TransferContext {
        sender_pk,
        receiver_pk,
        old_sealed_key: old,
        new_sealed_key: new,
        asset_id,
    });
    append_announcements(&mut t, &[a1, a2, a3, a4, a5]);
    challenge_scalar(&mut t, labels::CHAL) == v
}

// ===== Sealed-key codec =====

#[test]
fn seal_then_open_recovers_master_key() {
    let owner = sk(5);
    let m = master(0x42);
    let sealed = seal(&m, &owner.public(), &seeded(1)).expect("seal");
    assert_eq!(open(&sealed, &owner).expect("open"), m);
}

#[test]
fn seal_is_deterministic_given_randomness() {
    let pk = sk(5).public();
    let a = seal(&master(1), &pk, &seeded(3)).unwrap();
    let b = seal(&master(1), &pk, &seeded(3)).unwrap();
    let c = seal(&master(1), &pk, &seeded(4)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.ephemeral(), c.ephemeral());
    assert_ne!(a.ciphertext(), c.ciphertext());
}

#[test]
fn ephemeral_is_first_draw_of_randomness_stream() {
    let mut seed = [0u8; 32];
    seed[0] = 9;
    let sealed = seal(&master(7), &sk(5).public(), &Randomness::from_seed(seed)).unwrap();

    let mut rng = ChaCha20Rng::from_seed(seed);
    let r = random_scalar(&mut rng);
    assert_eq!(sealed.ephemeral(), (r * G).compress().as_bytes());
}

#[test]
fn open_with_wrong_key_is_decryption_failure() {
    let sealed = seal(&master(3), &sk(5).public(), &seeded(1)).unwrap();
    assert_eq!(open(&sealed, &sk(6)), Err(Error::DecryptionFailure));
}

#[test]
fn tampering_anywhere_is_the_same_decryption_failure() {
    let owner = sk(5);
    let sealed = seal(&master(3), &owner.public(), &seeded(1)).unwrap();
    let bytes = sealed.to_bytes();
    for i in 0..bytes.len() {
        let mut tampered = bytes;
        tampered[i] ^= 0x01;
        let tampered = SealedKey::from_bytes(&tampered);
        assert_eq!(
            open(&tampered, &owner),
            Err(Error::DecryptionFailure),
            "byte {i} flipped"
        );
    }
}

#[test]
fn open_recovers_the_sealed_point() {
    let owner = sk(5);
    let m = master(0x42);
    let sealed = seal(&m, &owner.public(), &seeded(1)).unwrap();
    let d = sealed.masked_key_point().unwrap();
    let r = sealed.ephemeral_point().unwrap();
    assert_eq!(&(d - Scalar::from(5u64) * r), m.point());
    assert_eq!(sealed.key_check(), &m.key_check());
}

#[test]
fn distinct_seeds_give_distinct_master_keys() {
    assert_ne!(master(1), master(2));
    assert_ne!(master(1).key_check(), master(2).key_check());
    assert_ne!(&master(1).key_check(), master(1).as_bytes());
}

#[test]
fn seal_rejects_identity_and_garbage_public_keys() {
    let identity = PublicKey::from_point(&RistrettoPoint::identity());
    assert_eq!(seal(&master(1), &identity, &seeded(1)), Err(Error::InvalidKey));
    let garbage = PublicKey::from_bytes([0xff; 32]);
    assert_eq!(seal(&master(1), &garbage, &seeded(1)), Err(Error::InvalidKey));
}

#[test]
fn reseal_moves_the_key_to_the_receiver() {
    let (alice, bob) = (sk(5), sk(9));
    let m = master(0x5a);
    let sealed0 = seal(&m, &alice.public(), &seeded(1)).unwrap();
    let sealed1 = reseal(&sealed0, &alice, &bob.public(), &seeded(2)).unwrap();

    assert_eq!(open(&sealed1, &bob).unwrap(), m);
    assert_eq!(open(&sealed1, &alice), Err(Error::DecryptionFailure));
    assert_eq!(sealed1.key_check(), sealed0.key_check());
}

#[test]
fn reseal_by_non_holder_fails() {
    let sealed0 = seal(&master(1), &sk(5).public(), &seeded(1)).unwrap();
    assert_eq!(
        reseal(&sealed0, &sk(6), &sk(9).public(), &seeded(2)),
        Err(Error::DecryptionFailure)
    );
}

#[test]
fn secret_key_import_rejects_zero_and_non_canonical() {
    assert_eq!(SecretKey::from_bytes(&[0u8; 32]).unwrap_err(), Error::InvalidSecretKey);
    assert_eq!(SecretKey::from_bytes(&[0xff; 32]).unwrap_err(), Error::InvalidSecretKey);
    let five = SecretKey::from_bytes(&Scalar::from(5u64).to_bytes()).unwrap();
    assert_eq!(five.public(), sk(5).public());
}

#[test]
fn secrets_are_redacted_in_debug() {
    assert_eq!(format!("{:?}", sk(5)), "SecretKey(\"..\")");
    assert_eq!(format!("{:?}", master(1)), "MasterKey(\"..\")");
    assert_eq!(format!("{:?}", seeded(1)), "Randomness(\"..\")");
}

// ===== Transfer proof =====

#[test]
fn honest_proof_satisfies_verifier_equations() {
    let (alice, bob) = (sk(5), sk(9));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();
    let r1 = seeded(2);
    let sealed1 = reseal(&sealed0, &alice, &bob.public(), &r1).unwrap();
    let proof = prove(&sealed0, &sealed1, &alice, &bob.public(), &asset, &r1).unwrap();

    assert!(equations_hold(&sealed0, &sealed1, &alice.public(), &bob.public(), &asset, &proof));
    // Bound to the asset
    let other = AssetId::from("asset-B");
    assert!(!equations_hold(&sealed0, &sealed1, &alice.public(), &bob.public(), &other, &proof));
}

#[test]
fn prove_is_deterministic_given_randomness() {
    let (alice, bob) = (sk(5), sk(9));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();
    let r1 = seeded(2);
    let sealed1 = reseal(&sealed0, &alice, &bob.public(), &r1).unwrap();

    let p1 = prove(&sealed0, &sealed1, &alice, &bob.public(), &asset, &r1).unwrap();
    let p2 = prove(&sealed0, &sealed1, &alice, &bob.public(), &asset, &r1).unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn different_randomness_gives_different_but_valid_proofs() {
    let (alice, bob) = (sk(5), sk(9));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();

    let (ra, rb) = (seeded(2), seeded(3));
    let sa = reseal(&sealed0, &alice, &bob.public(), &ra).unwrap();
    let sb = reseal(&sealed0, &alice, &bob.public(), &rb).unwrap();
    let pa = prove(&sealed0, &sa, &alice, &bob.public(), &asset, &ra).unwrap();
    let pb = prove(&sealed0, &sb, &alice, &bob.public(), &asset, &rb).unwrap();

    assert_ne!(sa, sb);
    assert_ne!(pa, pb);
    assert!(equations_hold(&sealed0, &sa, &alice.public(), &bob.public(), &asset, &pa));
    assert!(equations_hold(&sealed0, &sb, &alice.public(), &bob.public(), &asset, &pb));
}

#[test]
fn prove_with_wrong_sender_key_is_invalid_secret_key() {
    let (alice, bob, mallory) = (sk(5), sk(9), sk(13));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();
    let r1 = seeded(2);
    let sealed1 = reseal(&sealed0, &alice, &bob.public(), &r1).unwrap();

    assert_eq!(
        prove(&sealed0, &sealed1, &mallory, &bob.public(), &asset, &r1),
        Err(Error::InvalidSecretKey)
    );
}

#[test]
fn prove_rejects_reseal_from_other_randomness() {
    let (alice, bob) = (sk(5), sk(9));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();
    let sealed1 = reseal(&sealed0, &alice, &bob.public(), &seeded(2)).unwrap();

    assert_eq!(
        prove(&sealed0, &sealed1, &alice, &bob.public(), &asset, &seeded(3)),
        Err(Error::InconsistentReseal("ephemeral"))
    );
}

#[test]
fn prove_rejects_reseal_of_a_different_master_key() {
    let (alice, bob) = (sk(5), sk(9));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();
    let r1 = seeded(2);
    let swapped = seal(&master(0x22), &bob.public(), &r1).unwrap();

    assert_eq!(
        prove(&sealed0, &swapped, &alice, &bob.public(), &asset, &r1),
        Err(Error::InconsistentReseal("masked key"))
    );
}

#[test]
fn prove_rejects_reseal_to_another_receiver() {
    let (alice, bob, carol) = (sk(5), sk(9), sk(13));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();
    let r1 = seeded(2);
    let to_carol = reseal(&sealed0, &alice, &carol.public(), &r1).unwrap();

    assert_eq!(
        prove(&sealed0, &to_carol, &alice, &bob.public(), &asset, &r1),
        Err(Error::InconsistentReseal("masked key"))
    );
}

#[test]
fn prove_rejects_a_rewritten_key_check() {
    let (alice, bob) = (sk(5), sk(9));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();
    let r1 = seeded(2);
    let sealed1 = reseal(&sealed0, &alice, &bob.public(), &r1).unwrap();
    let rewritten = SealedKey::from_parts(*sealed1.ephemeral(), *sealed1.masked_key(), [7u8; 32]);

    assert_eq!(
        prove(&sealed0, &rewritten, &alice, &bob.public(), &asset, &r1),
        Err(Error::InconsistentReseal("key check"))
    );
}

#[test]
fn propose_transfer_yields_proposed_request() {
    let (alice, bob) = (sk(5), sk(9));
    let asset = AssetId::from("asset-A");
    let sealed0 = seal(&master(0x11), &alice.public(), &seeded(1)).unwrap();

    let transfer = propose_transfer(&TransferInput {
        asset_id: &asset,
        old_sealed_key: &sealed0,
        sender_sk: &alice,
        receiver_pk: &bob.public(),
        randomness: &seeded(2),
    })
    .unwrap();

    assert_eq!(transfer.state(), TransferState::Proposed);
    let req = transfer.request();
    assert_eq!(req.sender_pk, alice.public());
    assert_eq!(req.old_sealed_key, sealed0);
    assert_eq!(open(&req.new_sealed_key, &bob).unwrap(), master(0x11));
    assert!(equations_hold(
        &req.old_sealed_key,
        &req.new_sealed_key,
        &req.sender_pk,
        &req.receiver_pk,
        &req.asset_id,
        &req.proof
    ));
}

#[test]
fn propose_transfer_by_non_holder_is_invalid_secret_key() {
    let sealed0 = seal(&master(0x11), &sk(5).public(), &seeded(1)).unwrap();
    let result = propose_transfer(&TransferInput {
        asset_id: &AssetId::from("asset-A"),
        old_sealed_key: &sealed0,
        sender_sk: &sk(6),
        receiver_pk: &sk(9).public(),
        randomness: &seeded(2),
    });
    assert_eq!(result.unwrap_err(), Error::InvalidSecretKey);
}

// ===== Payload =====

#[test]
fn payload_round_trip_and_wrong_key() {
    let mut rng = ChaCha20Rng::from_seed([3u8; 32]);
    let m = master(0x33);
    let blob = encrypt_payload(&m, b"image bytes", &mut rng).unwrap();
    assert_eq!(blob.len(), payload::NONCE_SIZE + 11 + 16);
    assert_eq!(decrypt_payload(&m, &blob).unwrap(), b"image bytes");
    assert_eq!(decrypt_payload(&master(0x34), &blob), Err(Error::DecryptionFailure));
    assert_eq!(decrypt_payload(&m, &blob[..20]), Err(Error::DecryptionFailure));
}

#[test]
fn payload_survives_a_transfer() {
    let mut rng = ChaCha20Rng::from_seed([4u8; 32]);
    let (alice, bob) = (sk(5), sk(9));
    let m = MasterKey::generate(&mut rng);
    let blob = encrypt_payload(&m, b"secret picture", &mut rng).unwrap();

    let sealed0 = seal(&m, &alice.public(), &Randomness::generate(&mut rng)).unwrap();
    let sealed1 = reseal(&sealed0, &alice, &bob.public(), &Randomness::generate(&mut rng)).unwrap();
    let bob_key = open(&sealed1, &bob).unwrap();
    assert_eq!(decrypt_payload(&bob_key, &blob).unwrap(), b"secret picture");
}

// ===== Vectors =====

#[test]
fn bench_vectors_are_stable_and_consistent() {
    let v1 = bench_vectors::transfer_vectors().unwrap();
    let v2 = bench_vectors::transfer_vectors().unwrap();
    assert_eq!(v1, v2);
    assert_eq!(v1.owners.len(), 3);
    assert_eq!(v1.transfers.len(), 2);
    assert_eq!(v1.transfers[0].old_sealed_key, v1.minted_sealed_key);
    assert_eq!(v1.transfers[1].old_sealed_key, v1.transfers[0].new_sealed_key);

    let asset = AssetId::from_hex(&v1.asset_id).unwrap();
    for t in &v1.transfers {
        assert!(equations_hold(
            &SealedKey::from_hex(&t.old_sealed_key).unwrap(),
            &SealedKey::from_hex(&t.new_sealed_key).unwrap(),
            &PublicKey::from_hex(&t.sender_pk).unwrap(),
            &PublicKey::from_hex(&t.receiver_pk).unwrap(),
            &asset,
            &TransferProof::from_hex(&t.proof).unwrap(),
        ));
    }

    let json = bench_vectors::some_valid_proofs().unwrap();
    let parsed: bench_vectors::TransferVectors = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, v1);
}

// ===== Properties =====

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any master key survives seal → reseal → open.
    #[test]
    fn prop_master_key_survives_reseal(
        key in any::<[u8; 32]>(),
        x in 1u64..u64::MAX,
        y in 1u64..u64::MAX,
        seed0 in any::<[u8; 32]>(),
        seed1 in any::<[u8; 32]>(),
    ) {
        let (a, b) = (sk(x), sk(y));
        let m = MasterKey::from_seed(key);
        let sealed0 = seal(&m, &a.public(), &Randomness::from_seed(seed0)).unwrap();
        prop_assert_eq!(open(&sealed0, &a).unwrap(), m.clone());
        let sealed1 = reseal(&sealed0, &a, &b.public(), &Randomness::from_seed(seed1)).unwrap();
        prop_assert_eq!(open(&sealed1, &b).unwrap(), m);
    }

    /// Honest proofs always satisfy the equations.
    #[test]
    fn prop_honest_proofs_complete(
        key in any::<[u8; 32]>(),
        seed0 in any::<[u8; 32]>(),
        seed1 in any::<[u8; 32]>(),
        asset in proptest::collection::vec(any::<u8>(), 0..48),
    ) {
        let (alice, bob) = (sk(5), sk(9));
        let asset = AssetId::new(asset);
        let sealed0 = seal(&MasterKey::from_seed(key), &alice.public(), &Randomness::from_seed(seed0)).unwrap();
        let r1 = Randomness::from_seed(seed1);
        let sealed1 = reseal(&sealed0, &alice, &bob.public(), &r1).unwrap();
        let proof = prove(&sealed0, &sealed1, &alice, &bob.public(), &asset, &r1).unwrap();
        prop_assert!(equations_hold(&sealed0, &sealed1, &alice.public(), &bob.public(), &asset, &proof));
    }
}
