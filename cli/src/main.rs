//! civitas - build a governance engine from a genesis file and drive it

mod config;
mod scenario;

use clap::{Parser, Subcommand};
use civitas_governance::{GovernanceParameters, ProposalStatus};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use config::{load_config, CliError, GenesisConfig};
use scenario::RunSummary;

#[derive(Parser)]
#[command(name = "civitas")]
#[command(about = "Civitas treasury governance engine", long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
#[command(version)]
struct Cli {
    /// Print machine-readable JSON instead of the human summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the [[steps]] of a genesis file against a fresh engine
    Run {
        /// Path to the genesis TOML file
        config: PathBuf,
    },

    /// Show governance parameters (defaults when no file is given)
    Params {
        /// Path to the genesis TOML file
        config: Option<PathBuf>,
    },

    /// Validate a genesis file without running its steps
    Check {
        /// Path to the genesis TOML file
        config: PathBuf,
    },
}

fn print_params(params: &GovernanceParameters) {
    println!("\n{}", "Governance Parameters".cyan().bold());
    println!("═══════════════════════════════════");
    println!("{:<28} {}%", "quorum-percent", params.quorum_percent);
    println!(
        "{:<28} {}%",
        "proposal-threshold-percent", params.proposal_threshold_percent
    );
    println!("{:<28} {} blocks", "voting-period", params.voting_period);
    println!("{:<28} {} blocks", "timelock", params.timelock);
    println!();
}

fn print_check(config: &GenesisConfig) {
    println!("\n{} {}", "✓".green().bold(), "Genesis config is valid".bold());
    println!("  Registry:   {}", config.governance.registry);
    println!(
        "  Holders:    {} ({} voting units at height {})",
        config.holder_count(),
        config.voting_supply(),
        config.governance.start_height
    );
    println!("  Vault:      {} ({} native)", config.treasury.address, config.treasury.native);
    for adapter in &config.adapters {
        println!(
            "  Adapter:    {} v{}{}",
            adapter.address,
            adapter.version,
            if adapter.allowed { "" } else { " (not allowed)" }
        );
    }
    println!("  Steps:      {}", config.steps.len());
    println!();
}

fn status_label(status: ProposalStatus) -> String {
    match status {
        ProposalStatus::Executed => status.green().to_string(),
        ProposalStatus::Cancelled => status.red().to_string(),
        ProposalStatus::Queued | ProposalStatus::Executable => status.yellow().to_string(),
        ProposalStatus::Active | ProposalStatus::VotingEnded => status.to_string(),
    }
}

fn print_summary(summary: &RunSummary) {
    println!("\n{}", "Scenario".cyan().bold());
    println!("═══════════════════════════════════");
    for step in &summary.steps {
        let mark = match (step.ok, step.expected) {
            (true, true) => "✓".green().to_string(),
            (false, true) => "✓".yellow().to_string(),
            _ => "✗".red().bold().to_string(),
        };
        println!(
            "{} {:>3} @{:<6} {:<40} {}",
            mark,
            step.index,
            step.height,
            step.label,
            step.detail.bright_black()
        );
    }

    println!("\n{}", "Proposals".cyan().bold());
    println!("═══════════════════════════════════");
    for (proposal, stats) in summary.proposals.iter().zip(&summary.proposal_stats) {
        println!(
            "#{:<3} {:<14} {} {} to {}  [for {} / against {} / abstain {}]",
            proposal.id,
            status_label(stats.status),
            proposal.payload.kind,
            proposal.payload.amount,
            proposal.payload.recipient,
            stats.for_votes,
            stats.against_votes,
            stats.abstain_votes
        );
        println!(
            "     approval {:.1}%  participation {:.1}%  quorum {}",
            stats.approval_percentage,
            stats.participation_rate,
            if stats.quorum_met { "met".green().to_string() } else { "not met".red().to_string() }
        );
    }

    println!("\n{}", "Adapters".cyan().bold());
    println!("═══════════════════════════════════");
    for adapter in &summary.adapters {
        println!(
            "{}  {} v{}  {}",
            adapter.address,
            adapter.logic,
            adapter.version,
            adapter.fingerprint.short().bright_black()
        );
    }

    println!("\n{}: {}", "Height".yellow().bold(), summary.height);
    println!(
        "{}: {} native",
        "Vault".yellow().bold(),
        summary.vault_native.to_string().green()
    );
    println!("{}: {}", "Disbursements".yellow().bold(), summary.disbursements.len());
    if summary.unexpected() > 0 {
        println!(
            "\n{} {} step(s) did not match their expected outcome",
            "✗".red().bold(),
            summary.unexpected()
        );
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config } => {
            let genesis = load_config(&config)?;
            let (mut gov, clock) = genesis.build()?;
            let summary = scenario::run(&mut gov, &clock, &genesis.steps);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            if summary.unexpected() > 0 {
                return Err(CliError::Config(format!(
                    "{} step(s) did not match their expected outcome",
                    summary.unexpected()
                ))
                .into());
            }
        }

        Commands::Params { config } => {
            let params = match config {
                Some(path) => load_config(&path)?.governance.parameters,
                None => GovernanceParameters::default(),
            };
            params.validate()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&params)?);
            } else {
                print_params(&params);
            }
        }

        Commands::Check { config } => {
            let genesis = load_config(&config)?;
            genesis.build()?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&genesis)?);
            } else {
                print_check(&genesis);
            }
        }
    }

    Ok(())
}
