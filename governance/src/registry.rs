//! Proposal registry
//!
//! [`Governor`] is the governance engine: it owns the proposal store, the
//! adapter directory and the treasury vault, and drives every proposal
//! through propose, vote, queue and execute (or cancel).
//!
//! Every mutating call runs all of its checks before touching state, so a
//! failed call leaves the engine exactly as it was.

use civitas_core::{Height, Payload, Principal, ProposalId, VoteChoice};
use civitas_treasury::{AdapterDirectory, DispatchCall, TreasuryVault};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;
use crate::error::{GovernanceError, Result};
use crate::params::GovernanceParameters;
use crate::power::VotingPowerSource;
use crate::proposal::{AdapterPin, Proposal, ProposalStatus};
use crate::store::{GovernanceStore, InMemoryStore};
use crate::tally::{proposal_passes, ProposalStats, Tally};

/// Who may cancel a proposal that has not executed yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelPolicy {
    #[default]
    Anyone,
    ProposerOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GovernorConfig {
    /// Address the engine dispatches from. Adapters must be bound to it.
    pub address: Principal,
    pub params: GovernanceParameters,
    pub cancel_policy: CancelPolicy,
}

impl GovernorConfig {
    pub fn new(address: impl Into<Principal>) -> Self {
        Self {
            address: address.into(),
            params: GovernanceParameters::default(),
            cancel_policy: CancelPolicy::default(),
        }
    }

    pub fn with_params(mut self, params: GovernanceParameters) -> Self {
        self.params = params;
        self
    }

    pub fn with_cancel_policy(mut self, policy: CancelPolicy) -> Self {
        self.cancel_policy = policy;
        self
    }
}

/// Proposal counts by lifecycle stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceStats {
    pub total: u64,
    pub active: u64,
    pub voting_ended: u64,
    pub queued: u64,
    pub executable: u64,
    pub executed: u64,
    pub cancelled: u64,
}

pub struct Governor<S: GovernanceStore = InMemoryStore> {
    config: GovernorConfig,
    clock: Box<dyn Clock>,
    power: Box<dyn VotingPowerSource>,
    adapters: AdapterDirectory,
    vault: TreasuryVault,
    store: S,
}

impl Governor<InMemoryStore> {
    pub fn new(
        config: GovernorConfig,
        clock: impl Clock + 'static,
        power: impl VotingPowerSource + 'static,
        adapters: AdapterDirectory,
        vault: TreasuryVault,
    ) -> Result<Self> {
        Self::with_store(config, InMemoryStore::new(), clock, power, adapters, vault)
    }
}

impl<S: GovernanceStore> Governor<S> {
    pub fn with_store(
        config: GovernorConfig,
        store: S,
        clock: impl Clock + 'static,
        power: impl VotingPowerSource + 'static,
        adapters: AdapterDirectory,
        vault: TreasuryVault,
    ) -> Result<Self> {
        config.params.validate()?;
        info!(
            "governor {} ready at height {} (quorum {}%, threshold {}%, period {}, timelock {})",
            config.address,
            clock.height(),
            config.params.quorum_percent,
            config.params.proposal_threshold_percent,
            config.params.voting_period,
            config.params.timelock
        );
        Ok(Self {
            config,
            clock: Box::new(clock),
            power: Box::new(power),
            adapters,
            vault,
            store,
        })
    }

    pub fn address(&self) -> &Principal {
        &self.config.address
    }

    pub fn cancel_policy(&self) -> CancelPolicy {
        self.config.cancel_policy
    }

    pub fn current_height(&self) -> Height {
        self.clock.height()
    }

    pub fn adapters(&self) -> &AdapterDirectory {
        &self.adapters
    }

    /// Adapter administration (binding, ownership, upgrades) goes through
    /// here; the engine itself only ever reads the directory.
    pub fn adapters_mut(&mut self) -> &mut AdapterDirectory {
        &mut self.adapters
    }

    pub fn vault(&self) -> &TreasuryVault {
        &self.vault
    }

    pub fn vault_mut(&mut self) -> &mut TreasuryVault {
        &mut self.vault
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn proposal(&self, id: ProposalId) -> Result<&Proposal> {
        self.store
            .get_proposal(id)
            .ok_or(GovernanceError::ProposalMissing(id))
    }

    fn weight_at(&self, who: &Principal, height: Height) -> u64 {
        self.store
            .delegations()
            .effective_weight(self.power.as_ref(), who, height)
    }

    /// Create a proposal to run `payload` through the adapter at `adapter`.
    pub fn propose(
        &mut self,
        caller: &Principal,
        adapter: &Principal,
        payload: Payload,
    ) -> Result<ProposalId> {
        let height = self.clock.height();
        let params = self.config.params;

        let weight = self.weight_at(caller, height);
        let supply = self.power.total_supply_at(height);
        if (weight as u128) * 100 < (supply as u128) * (params.proposal_threshold_percent as u128) {
            warn!(
                "{} cannot propose: weight {} of supply {} below {}%",
                caller, weight, supply, params.proposal_threshold_percent
            );
            return Err(GovernanceError::InsufficientPower {
                weight,
                supply,
                threshold_percent: params.proposal_threshold_percent,
            });
        }

        if !payload.is_well_formed() {
            let reason = match &payload.token {
                Some(token) => format!("{} must not name a token (got {})", payload.kind, token),
                None => format!("{} requires a token", payload.kind),
            };
            return Err(GovernanceError::InvalidPayload(reason));
        }

        let fingerprint = self.adapters.fingerprint(adapter).ok_or_else(|| {
            GovernanceError::InvalidPayload(format!("no adapter deployed at {}", adapter))
        })?;

        let id = self.store.next_proposal_id();
        let proposal = Proposal {
            id,
            proposer: caller.clone(),
            adapter: AdapterPin {
                address: adapter.clone(),
                fingerprint,
            },
            payload,
            start_height: height,
            end_height: height.saturating_add(params.voting_period),
            eta: None,
            tally: Tally::default(),
            snapshot_supply: supply,
            executed: false,
            cancelled: false,
            voted: Default::default(),
        };
        info!(
            "proposal {} created by {}: {} {} to {} via {} ({}), voting until {}",
            id,
            caller,
            proposal.payload.kind,
            proposal.payload.amount,
            proposal.payload.recipient,
            adapter,
            fingerprint.short(),
            proposal.end_height
        );
        self.store.put_proposal(proposal);
        Ok(id)
    }

    pub fn cast_vote(&mut self, caller: &Principal, id: ProposalId, choice: VoteChoice) -> Result<bool> {
        let height = self.clock.height();
        let proposal = self.proposal(id)?;
        if !proposal.voting_open(height) {
            return Err(GovernanceError::VotingClosed(id));
        }
        if proposal.has_voted(caller) {
            return Err(GovernanceError::AlreadyVoted {
                id,
                voter: caller.clone(),
            });
        }
        let weight = self.weight_at(caller, proposal.start_height);

        let proposal = self
            .store
            .get_proposal_mut(id)
            .ok_or(GovernanceError::ProposalMissing(id))?;
        proposal.tally.record(choice, weight);
        proposal.voted.insert(caller.clone());
        info!("{} voted {} on proposal {} with weight {}", caller, choice, id, weight);
        Ok(true)
    }

    /// Vote with the wire encoding of the choice (0 against, 1 for, 2 abstain).
    pub fn cast_vote_raw(&mut self, caller: &Principal, id: ProposalId, choice: u8) -> Result<bool> {
        let choice = VoteChoice::try_from(choice).map_err(|_| GovernanceError::InvalidChoice(choice))?;
        self.cast_vote(caller, id, choice)
    }

    pub fn delegate_vote(&mut self, caller: &Principal, delegate: Principal) -> Result<bool> {
        self.store.delegations_mut().delegate(caller, delegate)
    }

    pub fn revoke_delegation(&mut self, caller: &Principal) -> Result<bool> {
        Ok(self.store.delegations_mut().revoke(caller))
    }

    pub fn delegate_of(&self, who: &Principal) -> Option<&Principal> {
        self.store.delegations().delegate_of(who)
    }

    /// Start the timelock on a proposal that passed.
    pub fn queue(&mut self, id: ProposalId) -> Result<bool> {
        let height = self.clock.height();
        let params = self.config.params;
        let proposal = self.proposal(id)?;

        if proposal.cancelled {
            return Err(GovernanceError::AlreadyCancelled(id));
        }
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if height < proposal.end_height {
            return Err(GovernanceError::VotingNotOver {
                end_height: proposal.end_height,
            });
        }
        if proposal.is_queued() {
            return Err(GovernanceError::AlreadyQueued(id));
        }
        if !proposal_passes(proposal, &params, height) {
            debug!(
                "proposal {} failed: {} for / {} against / {} abstain of {}",
                id,
                proposal.tally.for_votes,
                proposal.tally.against_votes,
                proposal.tally.abstain_votes,
                proposal.snapshot_supply
            );
            return Err(GovernanceError::NotPassed(id));
        }

        let eta = height.saturating_add(params.timelock);
        let proposal = self
            .store
            .get_proposal_mut(id)
            .ok_or(GovernanceError::ProposalMissing(id))?;
        proposal.eta = Some(eta);
        info!("proposal {} queued, executable at {}", id, eta);
        Ok(true)
    }

    /// Run a queued proposal whose timelock has expired.
    ///
    /// `adapter_ref` must name the adapter the proposal was created with, and
    /// that adapter's logic must still hash to the pinned fingerprint.
    pub fn execute(
        &mut self,
        caller: &Principal,
        id: ProposalId,
        adapter_ref: &Principal,
        token_ref: &Principal,
    ) -> Result<bool> {
        let height = self.clock.height();
        // Field-level borrow: the vault is borrowed mutably for dispatch below.
        let proposal = self
            .store
            .get_proposal(id)
            .ok_or(GovernanceError::ProposalMissing(id))?;

        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if proposal.cancelled {
            return Err(GovernanceError::AlreadyCancelled(id));
        }
        let eta = proposal.eta.ok_or(GovernanceError::NotQueued(id))?;
        if height < eta {
            return Err(GovernanceError::TooEarly { eta });
        }
        if adapter_ref != &proposal.adapter.address {
            return Err(GovernanceError::InvalidPayload(format!(
                "proposal {} is bound to {}, not {}",
                id, proposal.adapter.address, adapter_ref
            )));
        }
        let live = self.adapters.fingerprint(adapter_ref);
        if live != Some(proposal.adapter.fingerprint) {
            warn!(
                "adapter {} no longer matches proposal {} (pinned {}, live {:?})",
                adapter_ref,
                id,
                proposal.adapter.fingerprint.short(),
                live.map(|fp| fp.short())
            );
            return Err(GovernanceError::HashChanged {
                adapter: adapter_ref.clone(),
                pinned: proposal.adapter.fingerprint,
                live,
            });
        }

        let call = DispatchCall {
            proposal_id: id,
            payload: &proposal.payload,
            token_ref,
        };
        self.adapters
            .dispatch(adapter_ref, &self.config.address, &call, &mut self.vault)?;

        let proposal = self
            .store
            .get_proposal_mut(id)
            .ok_or(GovernanceError::ProposalMissing(id))?;
        proposal.executed = true;
        info!("proposal {} executed by {}", id, caller);
        Ok(true)
    }

    pub fn cancel(&mut self, caller: &Principal, id: ProposalId) -> Result<bool> {
        let proposal = self.proposal(id)?;
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if proposal.cancelled {
            return Err(GovernanceError::AlreadyCancelled(id));
        }
        if self.config.cancel_policy == CancelPolicy::ProposerOnly && caller != &proposal.proposer {
            warn!("{} may not cancel proposal {} by {}", caller, id, proposal.proposer);
            return Err(GovernanceError::Unauthorized(caller.clone()));
        }

        let proposal = self
            .store
            .get_proposal_mut(id)
            .ok_or(GovernanceError::ProposalMissing(id))?;
        proposal.cancelled = true;
        info!("proposal {} cancelled by {}", id, caller);
        Ok(true)
    }

    pub fn get_proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.store.get_proposal(id)
    }

    pub fn get_parameters(&self) -> GovernanceParameters {
        self.config.params
    }

    pub fn get_parameter(&self, name: &str) -> Result<u64> {
        self.config.params.get(name)
    }

    pub fn get_total_proposals(&self) -> u64 {
        self.store.proposal_count()
    }

    pub fn get_proposals(&self, start: ProposalId, limit: usize) -> Vec<&Proposal> {
        self.store.list_proposals(start, limit)
    }

    pub fn proposal_passes(&self, id: ProposalId) -> Result<bool> {
        let proposal = self.proposal(id)?;
        Ok(proposal_passes(proposal, &self.config.params, self.clock.height()))
    }

    pub fn proposal_status(&self, id: ProposalId) -> Result<ProposalStatus> {
        Ok(self.proposal(id)?.status(self.clock.height()))
    }

    /// Tallies, approval and participation for one proposal.
    pub fn proposal_stats(&self, id: ProposalId) -> Result<ProposalStats> {
        let proposal = self.proposal(id)?;
        Ok(ProposalStats::of(proposal, &self.config.params, self.clock.height()))
    }

    /// Current effective weight of `who`: own balance plus delegated-in.
    pub fn voting_weight(&self, who: &Principal) -> u64 {
        self.weight_at(who, self.clock.height())
    }

    pub fn stats(&self) -> GovernanceStats {
        let height = self.clock.height();
        let mut stats = GovernanceStats::default();
        for proposal in self.store.proposals() {
            stats.total += 1;
            match proposal.status(height) {
                ProposalStatus::Active => stats.active += 1,
                ProposalStatus::VotingEnded => stats.voting_ended += 1,
                ProposalStatus::Queued => stats.queued += 1,
                ProposalStatus::Executable => stats.executable += 1,
                ProposalStatus::Executed => stats.executed += 1,
                ProposalStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}
