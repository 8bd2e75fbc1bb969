use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use provision_actions::modules::system::{GooGetInstaller, InstallRequest};
use provision_actions::{
    ActionRegistry, ActionsConfig, BuildContext, CacheError, Collaborators, LaunchError,
    ProcessLauncher, ResourceCache, TaskList,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "provision-actions")]
#[command(about = "Validate and inspect host provisioning actions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct ProvisionActionsCli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate every entry of a task list
    Validate {
        /// Task list file (YAML or JSON)
        task_list: PathBuf,
    },
    /// Print the GooGet command line an install would run
    GoogetCommand {
        /// Package to install
        package: String,

        /// Extra GooGet flag (repeatable); `%` in source URLs becomes the branch
        #[arg(long = "flag", allow_hyphen_values = true)]
        flags: Vec<String>,

        /// GooGet binary override
        #[arg(long)]
        path: Option<PathBuf>,

        /// Branch used for source templating (defaults to the configured one)
        #[arg(long)]
        branch: Option<String>,
    },
}

/// Collaborator used when nothing may be fetched or launched
struct DryRun;

impl ResourceCache for DryRun {
    fn resolve(&self, reference: &str, _build: &dyn BuildContext) -> Result<PathBuf, CacheError> {
        Err(CacheError::FetchFailed {
            reference: reference.to_string(),
            error: "dry run".to_string(),
        })
    }
}

impl ProcessLauncher for DryRun {
    fn execute_binary(&self, binary: &Path, _args: &[String]) -> Result<i32, LaunchError> {
        Err(LaunchError::SpawnFailed {
            binary: binary.display().to_string(),
            error: "dry run".to_string(),
        })
    }

    fn call(&self, command_line: &str) -> Result<i32, LaunchError> {
        Err(LaunchError::SpawnFailed {
            binary: command_line.to_string(),
            error: "dry run".to_string(),
        })
    }
}

fn main() -> Result<()> {
    let cli = ProvisionActionsCli::parse();

    // Initialize tracing
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match &cli.config {
        Some(path) => ActionsConfig::load(path)?,
        None => ActionsConfig::default(),
    };
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Validate { task_list } => validate(&config, &task_list),
        Command::GoogetCommand {
            package,
            flags,
            path,
            branch,
        } => googet_command(&config, package, flags, path, branch),
    }
}

fn validate(config: &ActionsConfig, path: &Path) -> Result<()> {
    let task_list = TaskList::load(path)?;
    info!("Validating {} actions from {}", task_list.len(), path.display());

    let dry_run = Arc::new(DryRun);
    let registry = ActionRegistry::with_core_actions(
        config,
        Collaborators::new(dry_run.clone(), dry_run),
    );

    let mut failures = 0;
    for (index, entry) in task_list.entries.iter().enumerate() {
        match registry.validate_entry(entry) {
            Ok(()) => println!("✅ [{index}] {}", entry.name),
            Err(e) => {
                failures += 1;
                println!("❌ [{index}] {}: {e}", entry.name);
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} actions failed validation", task_list.len());
    }
    println!("All {} actions are valid", task_list.len());
    Ok(())
}

fn googet_command(
    config: &ActionsConfig,
    package: String,
    flags: Vec<String>,
    path: Option<PathBuf>,
    branch: Option<String>,
) -> Result<()> {
    let mut build = config.build.clone();
    if let Some(branch) = branch {
        build.branch = branch;
    }

    let installer = GooGetInstaller::new(
        config.googet.clone(),
        Arc::new(DryRun),
        Arc::new(provision_actions::ThreadSleeper),
    );
    let request = InstallRequest {
        package,
        path,
        flags: (!flags.is_empty()).then_some(flags),
        retries: config.googet.retries,
        sleep: Duration::from_secs(config.googet.sleep_secs),
    };

    let invocation = installer.render(&request, &build)?;
    println!("{}", invocation.command_line());
    if !invocation.binary.exists() {
        println!("⚠️  GooGet binary not found at {}", invocation.binary.display());
    }
    Ok(())
}
