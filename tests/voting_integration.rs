//! End-to-end voting scenarios, concurrency and persistence

use std::sync::{Arc, Barrier};
use std::thread;

use rand::rngs::OsRng;
use sealvote::prelude::*;
use tempfile::tempdir;

fn ballot(keypair: &KeyPair, choice: bool) -> ElGamalCiphertext {
    ElGamalCiphertext::encrypt_choice(choice, &keypair.public, &mut OsRng)
}

fn fresh_core() -> (KeyPair, Arc<VotingCore<ElGamalCiphertext>>) {
    let keypair = KeyPair::generate();
    let core = Arc::new(VotingCore::new(keypair.public));
    (keypair, core)
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_upgrade_treaty_scenario() {
    let (keypair, core) = fresh_core();
    let id = core
        .create_proposal("Upgrade Treaty", "Adopt the v2 treaty terms")
        .unwrap();

    for (voter, choice) in [("0xA11CE", true), ("0xB0B", false), ("0xCAFE", true)] {
        core.submit_ballot(id, VoterId::derive(voter), &ballot(&keypair, choice))
            .unwrap();
    }
    core.close_proposal(id).unwrap();

    let record = core
        .reveal(id, &keypair.secret, Identity::derive("auditor"))
        .unwrap();
    assert_eq!(record.yes_count, 2);
    assert_eq!(record.no_count, 1);
    assert_eq!(record.outcome(), Outcome::Approved);

    // Second reveal fails; the stored record is unchanged
    let err = core
        .reveal(id, &keypair.secret, Identity::derive("auditor"))
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyRevealed(_)));
    assert_eq!(core.get_disclosure(id).unwrap(), Some(record));
}

#[test]
fn test_double_vote_scenario() {
    let (keypair, core) = fresh_core();
    let id = core.create_proposal("Budget", "Approve the budget").unwrap();
    let voter = VoterId::derive("0xA11CE");

    core.submit_ballot(id, voter, &ballot(&keypair, true)).unwrap();
    let err = core
        .submit_ballot(id, voter, &ballot(&keypair, true))
        .unwrap_err();
    assert!(matches!(err, CoreError::AlreadyVoted { .. }));

    let tally = core.tally_snapshot(id).unwrap();
    assert_eq!(tally.ballots(), 1);
    assert_eq!(keypair.secret.decrypt_count(tally.yes_sum(), 1).unwrap(), 1);
}

#[test]
fn test_reveal_on_open_scenario() {
    let (keypair, core) = fresh_core();
    let id = core.create_proposal("Open", "Still voting").unwrap();
    core.submit_ballot(id, VoterId::derive("a"), &ballot(&keypair, true))
        .unwrap();

    let err = core
        .reveal(id, &keypair.secret, Identity::derive("auditor"))
        .unwrap_err();
    assert!(matches!(err, CoreError::NotClosed { .. }));
    assert!(core.get_disclosure(id).unwrap().is_none());
    assert_eq!(core.get_proposal(id).unwrap().state, ProposalState::Open);
}

#[test]
fn test_empty_proposal_reveals_zero() {
    let (keypair, core) = fresh_core();
    let id = core.create_proposal("Quiet", "Nobody votes").unwrap();
    core.close_proposal(id).unwrap();

    let record = core
        .reveal(id, &keypair.secret, Identity::derive("auditor"))
        .unwrap();
    assert_eq!((record.yes_count, record.no_count), (0, 0));
    assert_eq!(record.outcome(), Outcome::Tied);
}

#[test]
fn test_proposals_are_independent() {
    let (keypair, core) = fresh_core();
    let first = core.create_proposal("First", "one").unwrap();
    let second = core.create_proposal("Second", "two").unwrap();
    let voter = VoterId::derive("alice");

    core.submit_ballot(first, voter, &ballot(&keypair, true)).unwrap();
    core.submit_ballot(second, voter, &ballot(&keypair, false)).unwrap();
    core.close_proposal(first).unwrap();

    assert!(core.get_proposal(second).unwrap().is_open());
    assert_eq!(core.ballot_count(second).unwrap(), 1);

    let record = core.reveal(first, &keypair.secret, Identity::derive("r")).unwrap();
    assert_eq!((record.yes_count, record.no_count), (1, 0));
}

#[test]
fn test_lifecycle_is_forward_only() {
    let (keypair, core) = fresh_core();
    let id = core.create_proposal("P", "text").unwrap();

    core.close_proposal(id).unwrap();
    assert!(matches!(core.close_proposal(id), Err(CoreError::NotOpen { .. })));

    core.reveal(id, &keypair.secret, Identity::derive("r")).unwrap();
    assert!(matches!(core.close_proposal(id), Err(CoreError::NotOpen { .. })));
    assert!(matches!(
        core.submit_ballot(id, VoterId::derive("late"), &ballot(&keypair, true)),
        Err(CoreError::NotOpen { .. })
    ));
}

// =============================================================================
// CONCURRENCY
// =============================================================================

#[test]
fn test_concurrent_voters_all_counted() {
    let (keypair, core) = fresh_core();
    let keypair = Arc::new(keypair);
    let id = core.create_proposal("Concurrent", "Many threads").unwrap();

    const THREADS: usize = 8;
    const PER_THREAD: usize = 20;

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let core = Arc::clone(&core);
            let keypair = Arc::clone(&keypair);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    let voter = VoterId::derive(&format!("voter-{}-{}", t, i));
                    let choice = (t + i) % 3 == 0;
                    core.submit_ballot(id, voter, &ballot(&keypair, choice))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let expected_yes = (0..THREADS)
        .flat_map(|t| (0..PER_THREAD).map(move |i| (t + i) % 3 == 0))
        .filter(|&c| c)
        .count() as u64;
    let total = (THREADS * PER_THREAD) as u64;

    core.close_proposal(id).unwrap();
    let record = core
        .reveal(id, &keypair.secret, Identity::derive("auditor"))
        .unwrap();
    assert_eq!(record.yes_count, expected_yes);
    assert_eq!(record.total(), total);
}

#[test]
fn test_racing_double_vote_accepted_once() {
    let (keypair, core) = fresh_core();
    let keypair = Arc::new(keypair);
    let id = core.create_proposal("Race", "Same voter everywhere").unwrap();
    let voter = VoterId::derive("mallory");

    const THREADS: usize = 16;
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let core = Arc::clone(&core);
            let keypair = Arc::clone(&keypair);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let b = ballot(&keypair, true);
                barrier.wait();
                core.submit_ballot(id, voter, &b)
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let accepted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(accepted, 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, CoreError::AlreadyVoted { .. })));
    assert_eq!(core.tally_snapshot(id).unwrap().ballots(), 1);
}

#[test]
fn test_readers_see_whole_folds() {
    let (keypair, core) = fresh_core();
    let keypair = Arc::new(keypair);
    let id = core.create_proposal("Readers", "Snapshots stay consistent").unwrap();

    const VOTERS: usize = 60;

    let writer = {
        let core = Arc::clone(&core);
        let keypair = Arc::clone(&keypair);
        thread::spawn(move || {
            for i in 0..VOTERS {
                let voter = VoterId::derive(&format!("w{}", i));
                core.submit_ballot(id, voter, &ballot(&keypair, i % 2 == 0))
                    .unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let core = Arc::clone(&core);
            let keypair = Arc::clone(&keypair);
            thread::spawn(move || {
                for _ in 0..20 {
                    let tally = core.tally_snapshot(id).unwrap();
                    let n = tally.ballots();
                    let yes = keypair.secret.decrypt_count(tally.yes_sum(), n).unwrap();
                    let no = keypair.secret.decrypt_count(tally.no_sum(), n).unwrap();
                    assert_eq!(yes + no, n);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    let (yes, no) = core.get_encrypted_tallies(id).unwrap();
    let total = VOTERS as u64;
    assert_eq!(
        keypair.secret.decrypt_count(&yes, total).unwrap()
            + keypair.secret.decrypt_count(&no, total).unwrap(),
        total
    );
}

#[test]
fn test_close_racing_votes_stays_consistent() {
    let (keypair, core) = fresh_core();
    let keypair = Arc::new(keypair);
    let id = core.create_proposal("Closing", "Race against close").unwrap();

    let voters: Vec<_> = (0..4)
        .map(|t| {
            let core = Arc::clone(&core);
            let keypair = Arc::clone(&keypair);
            thread::spawn(move || {
                let mut accepted = 0u64;
                for i in 0..50 {
                    let voter = VoterId::derive(&format!("c-{}-{}", t, i));
                    match core.submit_ballot(id, voter, &ballot(&keypair, true)) {
                        Ok(()) => accepted += 1,
                        Err(CoreError::NotOpen { .. }) => break,
                        Err(e) => panic!("unexpected error: {}", e),
                    }
                }
                accepted
            })
        })
        .collect();

    thread::sleep(std::time::Duration::from_millis(5));
    core.close_proposal(id).unwrap();

    let accepted: u64 = voters.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(core.ballot_count(id).unwrap(), accepted);

    let record = core.reveal(id, &keypair.secret, Identity::derive("r")).unwrap();
    assert_eq!(record.yes_count, accepted);
    assert_eq!(record.no_count, 0);
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[test]
fn test_restart_from_ballot_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ballots.redb");
    let keypair = KeyPair::generate();

    let open = |keypair: &KeyPair| {
        let store = Arc::new(BallotStore::open(&path).unwrap());
        let snapshot = store.load_state().unwrap();
        VotingCore::<ElGamalCiphertext>::restore(keypair.public, CoreConfig::default(), snapshot)
            .unwrap()
            .with_journal(store)
    };

    let id = {
        let core = open(&keypair);
        let id = core.create_proposal("Upgrade Treaty", "Persisted").unwrap();
        core.submit_ballot(id, VoterId::derive("a"), &ballot(&keypair, true))
            .unwrap();
        core.submit_ballot(id, VoterId::derive("b"), &ballot(&keypair, false))
            .unwrap();
        id
    };

    let core = open(&keypair);
    core.submit_ballot(id, VoterId::derive("c"), &ballot(&keypair, true))
        .unwrap();
    assert!(matches!(
        core.submit_ballot(id, VoterId::derive("a"), &ballot(&keypair, true)),
        Err(CoreError::AlreadyVoted { .. })
    ));
    core.close_proposal(id).unwrap();
    core.reveal(id, &keypair.secret, Identity::derive("auditor"))
        .unwrap();
    drop(core);

    let core = open(&keypair);
    let record = core.get_disclosure(id).unwrap().unwrap();
    assert_eq!((record.yes_count, record.no_count), (2, 1));
    assert_eq!(core.proposal_count(), 1);
}
