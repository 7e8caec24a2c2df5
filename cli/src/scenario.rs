//! Scenario runner
//!
//! Replays a list of governance calls against a freshly built engine, mining
//! heights in between when asked to. Steps may declare the error code they
//! are expected to fail with, which makes a scenario file double as an
//! executable walkthrough of the guard rails.

use civitas_core::{Fingerprint, Memo, Payload, Principal, ProposalId, TransferKind, VoteChoice};
use civitas_governance::{
    Clock, GovernanceError, GovernanceStats, Governor, ManualClock, Proposal, ProposalStats,
};
use civitas_treasury::{AdapterError, Asset, Disbursement, TransferLogic};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    /// Error code the step must fail with. Absent means it must succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    Propose {
        caller: Principal,
        adapter: Principal,
        kind: TransferKind,
        amount: u64,
        recipient: Principal,
        #[serde(default)]
        token: Option<Principal>,
        #[serde(default)]
        memo: Option<String>,
    },
    /// All voters are checked before any vote is recorded, so a failing
    /// step records nothing.
    Vote {
        voters: Vec<Principal>,
        proposal: ProposalId,
        choice: VoteChoice,
    },
    Delegate {
        caller: Principal,
        delegate: Principal,
    },
    Revoke {
        caller: Principal,
    },
    Advance {
        blocks: u64,
    },
    Queue {
        proposal: ProposalId,
    },
    Execute {
        caller: Principal,
        proposal: ProposalId,
        adapter: Principal,
        /// Defaults to the payload's own token.
        #[serde(default)]
        token: Option<Principal>,
    },
    Cancel {
        caller: Principal,
        proposal: ProposalId,
    },
    Upgrade {
        caller: Principal,
        adapter: Principal,
        version: u32,
        #[serde(default)]
        native_only: bool,
    },
}

impl Action {
    pub fn label(&self) -> String {
        match self {
            Action::Propose {
                kind,
                amount,
                recipient,
                ..
            } => format!("propose {} {} to {}", kind, amount, recipient),
            Action::Vote {
                voters,
                proposal,
                choice,
            } => format!("{} x vote {} on #{}", voters.len(), choice, proposal),
            Action::Delegate { caller, delegate } => format!("{} delegates to {}", caller, delegate),
            Action::Revoke { caller } => format!("{} revokes delegation", caller),
            Action::Advance { blocks } => format!("advance {} blocks", blocks),
            Action::Queue { proposal } => format!("queue #{}", proposal),
            Action::Execute { proposal, .. } => format!("execute #{}", proposal),
            Action::Cancel { caller, proposal } => format!("{} cancels #{}", caller, proposal),
            Action::Upgrade {
                adapter, version, ..
            } => format!("upgrade {} to v{}", adapter, version),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub height: u64,
    pub label: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    pub detail: String,
    /// Outcome matched the step's `expect`.
    pub expected: bool,
}

/// Live state of one deployed adapter at the end of a run.
#[derive(Debug, Clone, Serialize)]
pub struct AdapterView {
    pub address: Principal,
    pub logic: String,
    pub version: u32,
    pub fingerprint: Fingerprint,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub steps: Vec<StepReport>,
    pub height: u64,
    pub stats: GovernanceStats,
    pub proposals: Vec<Proposal>,
    pub proposal_stats: Vec<ProposalStats>,
    pub adapters: Vec<AdapterView>,
    pub vault_native: u64,
    pub disbursements: Vec<Disbursement>,
}

impl RunSummary {
    pub fn unexpected(&self) -> usize {
        self.steps.iter().filter(|s| !s.expected).count()
    }
}

fn apply(gov: &mut Governor, clock: &ManualClock, action: &Action) -> Result<String, GovernanceError> {
    match action {
        Action::Propose {
            caller,
            adapter,
            kind,
            amount,
            recipient,
            token,
            memo,
        } => {
            let mut payload = Payload {
                kind: *kind,
                amount: *amount,
                recipient: recipient.clone(),
                token: token.clone(),
                memo: None,
            };
            if let Some(text) = memo {
                let memo = Memo::new(text.as_str())
                    .map_err(|e| GovernanceError::InvalidPayload(e.to_string()))?;
                payload = payload.with_memo(memo);
            }
            let id = gov.propose(caller, adapter, payload)?;
            Ok(format!("proposal #{} created", id))
        }
        Action::Vote {
            voters,
            proposal,
            choice,
        } => {
            check_voters(gov, clock, *proposal, voters)?;
            for voter in voters {
                gov.cast_vote(voter, *proposal, *choice)?;
            }
            let tally = gov
                .get_proposal(*proposal)
                .map(|p| p.tally)
                .unwrap_or_default();
            Ok(format!(
                "for {} / against {} / abstain {}",
                tally.for_votes, tally.against_votes, tally.abstain_votes
            ))
        }
        Action::Delegate { caller, delegate } => {
            gov.delegate_vote(caller, delegate.clone())?;
            Ok(format!("{} now weighs {}", delegate, gov.voting_weight(delegate)))
        }
        Action::Revoke { caller } => {
            gov.revoke_delegation(caller)?;
            Ok(format!("{} weighs {}", caller, gov.voting_weight(caller)))
        }
        Action::Advance { blocks } => {
            let height = clock.advance(*blocks);
            Ok(format!("height {}", height))
        }
        Action::Queue { proposal } => {
            gov.queue(*proposal)?;
            let eta = gov.get_proposal(*proposal).and_then(|p| p.eta).unwrap_or_default();
            Ok(format!("executable at {}", eta))
        }
        Action::Execute {
            caller,
            proposal,
            adapter,
            token,
        } => {
            let token_ref = token
                .clone()
                .or_else(|| gov.get_proposal(*proposal).and_then(|p| p.payload.token.clone()))
                .unwrap_or_else(|| gov.address().clone());
            gov.execute(caller, *proposal, adapter, &token_ref)?;
            Ok(format!("proposal #{} executed", proposal))
        }
        Action::Cancel { caller, proposal } => {
            gov.cancel(caller, *proposal)?;
            Ok(format!("proposal #{} cancelled", proposal))
        }
        Action::Upgrade {
            caller,
            adapter,
            version,
            native_only,
        } => {
            let logic = if *native_only {
                TransferLogic::native_only(*version)
            } else {
                TransferLogic::new(*version)
            };
            let installed = logic.version();
            let deployed = gov
                .adapters_mut()
                .get_mut(adapter)
                .ok_or_else(|| AdapterError::UnknownAdapter(adapter.clone()))?;
            let fingerprint = deployed.upgrade(caller, Box::new(logic))?;
            Ok(format!("v{} installed, fingerprint now {}", installed, fingerprint.short()))
        }
    }
}

/// Mirror of the per-vote guards, applied to the whole step up front.
fn check_voters(
    gov: &Governor,
    clock: &ManualClock,
    id: ProposalId,
    voters: &[Principal],
) -> Result<(), GovernanceError> {
    let proposal = gov
        .get_proposal(id)
        .ok_or(GovernanceError::ProposalMissing(id))?;
    if !proposal.voting_open(clock.height()) {
        return Err(GovernanceError::VotingClosed(id));
    }
    let mut seen = BTreeSet::new();
    for voter in voters {
        if proposal.has_voted(voter) || !seen.insert(voter) {
            return Err(GovernanceError::AlreadyVoted {
                id,
                voter: voter.clone(),
            });
        }
    }
    Ok(())
}

fn adapter_views(gov: &Governor) -> Vec<AdapterView> {
    gov.adapters()
        .addresses()
        .filter_map(|address| gov.adapters().get(address))
        .map(|adapter| {
            let descriptor = adapter.descriptor();
            AdapterView {
                address: adapter.address().clone(),
                logic: descriptor.name.clone(),
                version: descriptor.version,
                fingerprint: descriptor.fingerprint(),
            }
        })
        .collect()
}

pub fn run(gov: &mut Governor, clock: &ManualClock, steps: &[Step]) -> RunSummary {
    let mut reports = Vec::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        let label = step.action.label();
        debug!("step {}: {}", index + 1, label);
        let report = match apply(gov, clock, &step.action) {
            Ok(detail) => StepReport {
                index: index + 1,
                height: clock.height(),
                label,
                ok: true,
                code: None,
                detail,
                expected: step.expect.is_none(),
            },
            Err(err) => StepReport {
                index: index + 1,
                height: clock.height(),
                label,
                ok: false,
                code: Some(err.code()),
                detail: format!("{} ({})", err, err.kind()),
                expected: step.expect == Some(err.code()),
            },
        };
        reports.push(report);
    }

    let proposals: Vec<Proposal> = gov
        .get_proposals(1, usize::MAX)
        .into_iter()
        .cloned()
        .collect();
    let proposal_stats = proposals
        .iter()
        .filter_map(|p| gov.proposal_stats(p.id).ok())
        .collect();

    RunSummary {
        steps: reports,
        height: clock.height(),
        stats: gov.stats(),
        proposals,
        proposal_stats,
        adapters: adapter_views(gov),
        vault_native: gov.vault().balance(&Asset::Native),
        disbursements: gov.vault().disbursements().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenesisConfig;

    const SCENARIO: &str = r#"
[governance]
registry = "deployer.dao-core-v1"

[governance.parameters]
voting_period = 10
timelock = 2

[[balances]]
holder = "alice"
amount = 60

[[balances]]
holder = "bob"
amount = 40

[treasury]
address = "deployer.dao-treasury-v1"
deployer = "deployer"
native = 1000

[[adapters]]
address = "deployer.transfer-adapter-v1"
owner = "deployer"

[[steps]]
action = "propose"
caller = "alice"
adapter = "deployer.transfer-adapter-v1"
kind = "simple-transfer"
amount = 250
recipient = "carol"
memo = "first grant"

[[steps]]
action = "vote"
voters = ["alice", "bob"]
proposal = 1
choice = "for"

[[steps]]
action = "queue"
proposal = 1
expect = 103

[[steps]]
action = "advance"
blocks = 10

[[steps]]
action = "queue"
proposal = 1

[[steps]]
action = "advance"
blocks = 2

[[steps]]
action = "execute"
caller = "bob"
proposal = 1
adapter = "deployer.transfer-adapter-v1"
"#;

    fn build(contents: &str) -> (GenesisConfig, Governor, ManualClock) {
        let config: GenesisConfig = toml::from_str(contents).unwrap();
        let (gov, clock) = config.build().unwrap();
        (config, gov, clock)
    }

    #[test]
    fn test_full_scenario() {
        let (config, mut gov, clock) = build(SCENARIO);
        assert_eq!(config.steps.len(), 7);
        assert_eq!(config.steps[2].expect, Some(103));

        let summary = run(&mut gov, &clock, &config.steps);
        assert_eq!(summary.unexpected(), 0, "{:#?}", summary.steps);
        assert_eq!(summary.height, 13);
        assert_eq!(summary.stats.executed, 1);
        assert_eq!(summary.vault_native, 750);
        assert_eq!(summary.disbursements.len(), 1);
        assert_eq!(summary.steps[1].detail, "for 100 / against 0 / abstain 0");

        let stats = &summary.proposal_stats[0];
        assert_eq!(stats.id, 1);
        assert_eq!(stats.total_votes, 100);
        assert_eq!(stats.approval_percentage, 100.0);
        assert_eq!(stats.participation_rate, 100.0);
        assert!(stats.quorum_met);

        assert_eq!(summary.adapters.len(), 1);
        assert_eq!(summary.adapters[0].logic, "transfer-adapter");
        assert_eq!(summary.adapters[0].version, 1);
    }

    #[test]
    fn test_vote_step_is_all_or_nothing() {
        let contents = SCENARIO.replace(
            "voters = [\"alice\", \"bob\"]",
            "voters = [\"alice\", \"bob\", \"alice\"]",
        );
        let (config, mut gov, clock) = build(&contents);
        let summary = run(&mut gov, &clock, &config.steps[..2]);

        assert_eq!(summary.steps[1].code, Some(105));
        let proposal = gov.get_proposal(1).unwrap();
        assert!(!proposal.has_voted(&Principal::from("alice")));
        assert_eq!(proposal.tally.total(), 0);
    }

    #[test]
    fn test_summary_json_carries_stats() {
        let (config, mut gov, clock) = build(SCENARIO);
        let summary = run(&mut gov, &clock, &config.steps[..2]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["proposal_stats"][0]["for_votes"], 100);
        assert_eq!(json["proposal_stats"][0]["status"], "active");
        assert_eq!(json["adapters"][0]["address"], "deployer.transfer-adapter-v1");
    }

    #[test]
    fn test_upgrade_trips_integrity_check() {
        let contents = SCENARIO.replace(
            "[[steps]]\naction = \"execute\"",
            "[[steps]]\naction = \"upgrade\"\ncaller = \"deployer\"\nadapter = \"deployer.transfer-adapter-v1\"\nversion = 2\n\n[[steps]]\naction = \"execute\"",
        );
        let (config, mut gov, clock) = build(&contents);
        let summary = run(&mut gov, &clock, &config.steps);

        let last = summary.steps.last().unwrap();
        assert!(!last.ok);
        assert_eq!(last.code, Some(113));
        assert!(!last.expected);
        assert_eq!(summary.unexpected(), 1);
        assert_eq!(summary.vault_native, 1_000);
        assert!(summary.steps[summary.steps.len() - 2].detail.starts_with("v2 installed"));
        assert_eq!(summary.adapters[0].version, 2);
    }

    #[test]
    fn test_unexpected_success_is_flagged() {
        let mut config: GenesisConfig = toml::from_str(SCENARIO).unwrap();
        config.steps.truncate(1);
        config.steps[0].expect = Some(114);
        let (mut gov, clock) = config.build().unwrap();

        let summary = run(&mut gov, &clock, &config.steps);
        assert!(summary.steps[0].ok);
        assert!(!summary.steps[0].expected);
    }

    #[test]
    fn test_devnet_walkthrough() {
        let (config, mut gov, clock) = build(include_str!("../config/devnet.toml"));
        let summary = run(&mut gov, &clock, &config.steps);

        assert_eq!(summary.unexpected(), 0, "{:#?}", summary.steps);
        assert_eq!(summary.height, 2_201);
        assert_eq!(summary.stats.total, 3);
        assert_eq!(summary.stats.executed, 1);
        assert_eq!(summary.stats.executable, 1);
        assert_eq!(summary.stats.cancelled, 1);
        assert_eq!(summary.vault_native, 999_000);
        assert_eq!(summary.proposals[0].tally.for_votes, 11);
    }

    #[test]
    fn test_oversized_memo() {
        let contents = SCENARIO.replace(
            "memo = \"first grant\"",
            "memo = \"this memo is far too long to fit in a transfer\"",
        );
        let (config, mut gov, clock) = build(&contents);
        let summary = run(&mut gov, &clock, &config.steps[..1]);
        assert_eq!(summary.steps[0].code, Some(115));
        assert_eq!(gov.get_total_proposals(), 0);
    }
}
