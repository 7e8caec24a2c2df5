#![allow(dead_code)]

use civitas_core::Principal;
use civitas_governance::*;
use civitas_treasury::{Adapter, AdapterDirectory, Asset, TransferLogic, TreasuryVault};

pub const DEPLOYER: &str = "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM";
pub const VOTERS: usize = 12;
pub const VAULT_FUNDS: u64 = 1_000_000;
pub const VOTING_PERIOD: u64 = 2_100;
pub const TIMELOCK: u64 = 100;

/// Deployer-relative contract principals (".name") or plain wallets.
pub fn p(name: &str) -> Principal {
    if name.starts_with('.') {
        Principal::from(format!("{}{}", DEPLOYER, name))
    } else {
        Principal::from(name)
    }
}

pub fn wallet(n: usize) -> Principal {
    Principal::from(format!("wallet_{}", n))
}

pub fn core() -> Principal {
    p(".dao-core-v1")
}

pub fn adapter() -> Principal {
    p(".transfer-adapter-v1")
}

pub fn token() -> Principal {
    p(".civic-token")
}

/// Supply of 100: twelve wallets with weight 1, the deployer holds the rest.
pub fn balances() -> BalanceSnapshots {
    let mut balances = BalanceSnapshots::new();
    balances.set_balance(DEPLOYER, 0, 100 - VOTERS as u64);
    for n in 1..=VOTERS {
        balances.set_balance(wallet(n), 0, 1);
    }
    balances
}

pub struct Harness {
    pub gov: Governor,
    pub clock: ManualClock,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(balances(), CancelPolicy::Anyone)
    }

    pub fn with(balances: BalanceSnapshots, policy: CancelPolicy) -> Self {
        let clock = ManualClock::new(1);

        let mut vault = TreasuryVault::new(p(".dao-treasury-v1"), p(DEPLOYER));
        vault
            .init(&p(DEPLOYER), core(), adapter(), true)
            .expect("init vault");
        vault.deposit(&Asset::Native, VAULT_FUNDS).expect("fund native");
        vault
            .deposit(&Asset::Token(token()), VAULT_FUNDS)
            .expect("fund token");

        let mut transfer = Adapter::new(adapter(), p(DEPLOYER), Box::new(TransferLogic::default()));
        transfer.set_core(&p(DEPLOYER), core()).expect("bind core");
        let mut adapters = AdapterDirectory::new();
        adapters.deploy(transfer).expect("deploy adapter");

        let config = GovernorConfig::new(core()).with_cancel_policy(policy);
        let gov = Governor::new(config, clock.clone(), balances, adapters, vault)
            .expect("governor");
        Self { gov, clock }
    }

    pub fn propose_simple(&mut self, amount: u64, recipient: &str) -> u64 {
        self.gov
            .propose(&p(DEPLOYER), &adapter(), civitas_core::Payload::simple(amount, recipient))
            .expect("propose")
    }

    /// Cast `for_votes`, `against` and `abstain` votes from distinct wallets.
    pub fn vote_split(&mut self, id: u64, for_votes: usize, against: usize, abstain: usize) {
        let mut n = 1;
        for (count, choice) in [
            (for_votes, civitas_core::VoteChoice::For),
            (against, civitas_core::VoteChoice::Against),
            (abstain, civitas_core::VoteChoice::Abstain),
        ] {
            for _ in 0..count {
                self.gov.cast_vote(&wallet(n), id, choice).expect("vote");
                n += 1;
            }
        }
    }

    pub fn end_voting(&self) {
        self.clock.advance(VOTING_PERIOD);
    }

    pub fn end_timelock(&self) {
        self.clock.advance(TIMELOCK);
    }

    pub fn native_of(&self, who: &str) -> u64 {
        self.gov.vault().balance_of(&Asset::Native, &p(who))
    }
}
