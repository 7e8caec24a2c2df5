//! Genesis configuration
//!
//! A TOML file describing everything an engine needs at height zero: the
//! governance parameters, voting balances, the funded vault, the deployed
//! adapters and, optionally, a scenario of calls to replay against them.

use civitas_core::Principal;
use civitas_governance::{
    BalanceSnapshots, CancelPolicy, GovernanceError, GovernanceParameters, Governor,
    GovernorConfig, ManualClock, VotingPowerSource,
};
use civitas_treasury::{
    Adapter, AdapterDirectory, AdapterError, Asset, TransferLogic, TreasuryError, TreasuryVault,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scenario::Step;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error("Adapter setup failed: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Treasury setup failed: {0}")]
    Treasury(#[from] TreasuryError),
}

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub governance: GovernanceSection,
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
    pub treasury: TreasurySection,
    #[serde(default)]
    pub adapters: Vec<AdapterEntry>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceSection {
    /// Address of the governance registry. Adapters are bound to it.
    pub registry: Principal,
    #[serde(default)]
    pub cancel_policy: CancelPolicy,
    #[serde(default = "default_start_height")]
    pub start_height: u64,
    #[serde(default)]
    pub parameters: GovernanceParameters,
}

fn default_start_height() -> u64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub holder: Principal,
    pub amount: u64,
    /// Height from which the balance applies.
    #[serde(default)]
    pub height: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasurySection {
    pub address: Principal,
    pub deployer: Principal,
    #[serde(default)]
    pub native: u64,
    #[serde(default)]
    pub tokens: Vec<TokenFunding>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFunding {
    pub token: Principal,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterEntry {
    pub address: Principal,
    pub owner: Principal,
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub native_only: bool,
    /// Allow this adapter to draw on the vault.
    #[serde(default = "default_true")]
    pub allowed: bool,
    /// Bind the adapter to the registry at genesis.
    #[serde(default = "default_true")]
    pub bind_core: bool,
}

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

impl AdapterEntry {
    pub fn logic(&self) -> TransferLogic {
        if self.native_only {
            TransferLogic::native_only(self.version)
        } else {
            TransferLogic::new(self.version)
        }
    }
}

impl GenesisConfig {
    pub fn validate(&self) -> Result<()> {
        self.governance.parameters.validate()?;
        let contracts = [&self.governance.registry, &self.treasury.address]
            .into_iter()
            .chain(self.adapters.iter().map(|a| &a.address));
        for address in contracts {
            if !address.is_contract() {
                return Err(CliError::Config(format!(
                    "{} is not a contract principal (expected <deployer>.<name>)",
                    address
                )));
            }
        }
        if self.balances.is_empty() {
            return Err(CliError::Config("no [[balances]] defined".to_string()));
        }
        for (i, adapter) in self.adapters.iter().enumerate() {
            if self.adapters[..i].iter().any(|a| a.address == adapter.address) {
                return Err(CliError::Config(format!(
                    "adapter {} listed twice",
                    adapter.address
                )));
            }
        }
        Ok(())
    }

    pub fn balances(&self) -> BalanceSnapshots {
        let mut snapshots = BalanceSnapshots::new();
        for entry in &self.balances {
            snapshots.set_balance(entry.holder.clone(), entry.height, entry.amount);
        }
        snapshots
    }

    pub fn holder_count(&self) -> usize {
        self.balances().holders().count()
    }

    /// Voting supply at the start height, each holder counted once.
    pub fn voting_supply(&self) -> u64 {
        self.balances().total_supply_at(self.governance.start_height)
    }

    pub fn vault(&self) -> Result<TreasuryVault> {
        let section = &self.treasury;
        let mut vault = TreasuryVault::new(section.address.clone(), section.deployer.clone());

        let mut allowed = self.adapters.iter().filter(|a| a.allowed);
        match allowed.next() {
            Some(first) => {
                vault.init(
                    &section.deployer,
                    self.governance.registry.clone(),
                    first.address.clone(),
                    true,
                )?;
            }
            None => {
                vault.init(
                    &section.deployer,
                    self.governance.registry.clone(),
                    self.governance.registry.clone(),
                    false,
                )?;
            }
        }
        for adapter in allowed {
            vault.set_allowed_invoker(&section.deployer, adapter.address.clone(), true)?;
        }

        if section.native > 0 {
            vault.deposit(&Asset::Native, section.native)?;
        }
        for funding in &section.tokens {
            vault.deposit(&Asset::Token(funding.token.clone()), funding.amount)?;
        }
        Ok(vault)
    }

    pub fn adapters(&self) -> Result<AdapterDirectory> {
        let mut directory = AdapterDirectory::new();
        for entry in &self.adapters {
            let mut adapter = Adapter::new(
                entry.address.clone(),
                entry.owner.clone(),
                Box::new(entry.logic()),
            );
            if entry.bind_core {
                adapter.set_core(&entry.owner, self.governance.registry.clone())?;
            }
            directory.deploy(adapter)?;
        }
        Ok(directory)
    }

    /// Build a fresh engine at `start_height`. The returned clock drives it.
    pub fn build(&self) -> Result<(Governor, ManualClock)> {
        self.validate()?;
        let clock = ManualClock::new(self.governance.start_height);
        let config = GovernorConfig::new(self.governance.registry.clone())
            .with_params(self.governance.parameters)
            .with_cancel_policy(self.governance.cancel_policy);

        let governor = Governor::new(
            config,
            clock.clone(),
            self.balances(),
            self.adapters()?,
            self.vault()?,
        )?;
        info!(
            "genesis loaded: {} holders, {} adapters, {} steps",
            self.balances.len(),
            self.adapters.len(),
            self.steps.len()
        );
        Ok((governor, clock))
    }
}

pub fn load_config(path: &Path) -> Result<GenesisConfig> {
    debug!("reading config {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: GenesisConfig = toml::from_str(&contents)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use civitas_governance::Clock;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
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

[[treasury.tokens]]
token = "deployer.civic-token"
amount = 500

[[adapters]]
address = "deployer.transfer-adapter-v1"
owner = "deployer"
"#;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_and_build() {
        let file = write_config(MINIMAL);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.governance.parameters.voting_period, 10);
        assert_eq!(config.governance.parameters.quorum_percent, 10);
        assert_eq!(config.governance.cancel_policy, CancelPolicy::Anyone);

        let (gov, clock) = config.build().unwrap();
        assert_eq!(clock.height(), 1);
        assert_eq!(gov.vault().balance(&Asset::Native), 1_000);
        assert_eq!(
            gov.vault()
                .balance(&Asset::Token(Principal::from("deployer.civic-token"))),
            500
        );
        let adapter = Principal::from("deployer.transfer-adapter-v1");
        assert!(gov.vault().is_allowed_invoker(&adapter));
        assert_eq!(
            gov.adapters().get(&adapter).unwrap().core(),
            Some(&Principal::from("deployer.dao-core-v1"))
        );
        assert_eq!(gov.voting_weight(&Principal::from("alice")), 60);
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/civitas.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }

    #[test]
    fn test_malformed_toml() {
        let file = write_config("[governance\nregistry = 1");
        assert!(matches!(load_config(file.path()), Err(CliError::Parse(_))));
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let contents = MINIMAL.replace("timelock = 2", "timelock = 2\nquorum_percent = 120");
        let file = write_config(&contents);
        let config = load_config(file.path()).unwrap();
        let err = config.build().err().unwrap();
        assert!(matches!(err, CliError::Governance(GovernanceError::InvalidParameter(_))));
    }

    #[test]
    fn test_duplicate_adapter_rejected() {
        let contents = format!(
            "{}\n[[adapters]]\naddress = \"deployer.transfer-adapter-v1\"\nowner = \"deployer\"\n",
            MINIMAL
        );
        let file = write_config(&contents);
        let config = load_config(file.path()).unwrap();
        assert!(matches!(config.validate(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_contract_addresses_required() {
        let contents = MINIMAL.replace(
            "address = \"deployer.transfer-adapter-v1\"",
            "address = \"transfer-adapter\"",
        );
        let file = write_config(&contents);
        let config = load_config(file.path()).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("transfer-adapter is not a contract principal"));
    }

    #[test]
    fn test_supply_counts_latest_checkpoint_once() {
        let contents = format!("{}\n[[balances]]\nholder = \"alice\"\namount = 70\nheight = 1\n", MINIMAL);
        let file = write_config(&contents);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.holder_count(), 2);
        assert_eq!(config.voting_supply(), 110);
    }

    #[test]
    fn test_proposer_only_policy_parses() {
        let contents = MINIMAL.replace(
            "registry = \"deployer.dao-core-v1\"",
            "registry = \"deployer.dao-core-v1\"\ncancel_policy = \"proposer-only\"",
        );
        let file = write_config(&contents);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.governance.cancel_policy, CancelPolicy::ProposerOnly);
    }
}
