mod common;

use civitas_core::VoteChoice;
use common::*;

fn outcome(for_votes: usize, against: usize, abstain: usize) -> bool {
    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    h.vote_split(id, for_votes, against, abstain);
    h.end_voting();
    h.gov.proposal_passes(id).unwrap()
}

#[test]
fn test_nine_votes_miss_quorum() {
    assert!(!outcome(9, 0, 0));

    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    h.vote_split(id, 9, 0, 0);
    h.end_voting();
    assert_eq!(h.gov.queue(id).unwrap_err().code(), 112);
}

#[test]
fn test_exactly_at_quorum() {
    assert!(outcome(10, 0, 0));
}

#[test]
fn test_narrow_majority_passes() {
    assert!(outcome(6, 5, 0));
}

#[test]
fn test_tie_fails() {
    assert!(!outcome(5, 5, 0));
}

#[test]
fn test_more_against_fails() {
    assert!(!outcome(4, 6, 0));
}

#[test]
fn test_abstain_counts_toward_quorum_only() {
    assert!(outcome(5, 2, 3));
    assert!(!outcome(0, 0, 10));
}

#[test]
fn test_passes_only_after_voting_ends() {
    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    h.vote_split(id, 10, 0, 0);
    assert!(!h.gov.proposal_passes(id).unwrap());

    let err = h.gov.queue(id).unwrap_err();
    assert_eq!(err.code(), 103);

    h.end_voting();
    assert!(h.gov.proposal_passes(id).unwrap());
}

#[test]
fn test_double_vote_rejected() {
    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    h.gov.cast_vote(&wallet(1), id, VoteChoice::For).unwrap();

    let err = h.gov.cast_vote(&wallet(1), id, VoteChoice::Against).unwrap_err();
    assert_eq!(err.code(), 105);

    let proposal = h.gov.get_proposal(id).unwrap();
    assert_eq!(proposal.tally.for_votes, 1);
    assert_eq!(proposal.tally.against_votes, 0);
}

#[test]
fn test_vote_after_end_rejected() {
    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    h.end_voting();
    let err = h.gov.cast_vote(&wallet(1), id, VoteChoice::For).unwrap_err();
    assert_eq!(err.code(), 104);
}

#[test]
fn test_vote_on_cancelled_rejected() {
    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    h.gov.cancel(&p(DEPLOYER), id).unwrap();
    let err = h.gov.cast_vote(&wallet(1), id, VoteChoice::For).unwrap_err();
    assert_eq!(err.code(), 104);
}

#[test]
fn test_raw_choice_validation() {
    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    assert!(h.gov.cast_vote_raw(&wallet(1), id, 2).unwrap());
    let err = h.gov.cast_vote_raw(&wallet(2), id, 3).unwrap_err();
    assert_eq!(err.code(), 118);
    assert_eq!(h.gov.get_proposal(id).unwrap().tally.abstain_votes, 1);
}

#[test]
fn test_vote_on_missing_proposal() {
    let mut h = Harness::new();
    let err = h.gov.cast_vote(&wallet(1), 42, VoteChoice::For).unwrap_err();
    assert_eq!(err.code(), 102);
}

#[test]
fn test_zero_weight_voter_is_recorded() {
    let mut h = Harness::new();
    let id = h.propose_simple(100, "wallet_2");
    assert!(h.gov.cast_vote(&p("stranger"), id, VoteChoice::For).unwrap());

    let proposal = h.gov.get_proposal(id).unwrap();
    assert!(proposal.has_voted(&p("stranger")));
    assert_eq!(proposal.tally.total(), 0);
}
