//! `fba` command line: route checks and local integration settings

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use fba_access::{NavigationDecision, NavigationGuard, Principal, Role};
use fba_console::{build_catalog, ConsoleConfig};
use fba_integrations::{
    FileStorage, IntegrationCatalog, IntegrationConfig, IntegrationStore,
    SimulatedConnectionTester,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let role = Arg::new("role")
        .long("role")
        .required(true)
        .help("Role of the principal: viewer, analyst or admin");
    let pending = Arg::new("pending")
        .long("pending")
        .action(ArgAction::SetTrue)
        .help("Principal has an unapproved request for the admin role");
    let id = Arg::new("id").required(true).help("Integration id");

    Command::new("fba")
        .version(fba_console::VERSION)
        .about("Feedback analyzer console tools")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("routes")
                .about("List the menu a role sees")
                .arg(role.clone())
                .arg(pending.clone()),
        )
        .subcommand(
            Command::new("check")
                .about("Decide a navigation attempt")
                .arg(role)
                .arg(pending)
                .arg(
                    Arg::new("route")
                        .long("route")
                        .required(true)
                        .help("Route to navigate to"),
                ),
        )
        .subcommand(
            Command::new("integrations")
                .about("Inspect and change local integration settings")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("Show every integration"))
                .subcommand(
                    Command::new("toggle")
                        .about("Enable or disable an integration")
                        .arg(id.clone()),
                )
                .subcommand(
                    Command::new("configure")
                        .about("Save settings and mark the integration connected")
                        .arg(id.clone())
                        .arg(
                            Arg::new("settings")
                                .num_args(0..)
                                .help("Settings as key=value pairs"),
                        ),
                )
                .subcommand(
                    Command::new("test")
                        .about("Run the connection test")
                        .arg(id),
                ),
        )
}

fn init_tracing(config: &ConsoleConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn principal_from(args: &ArgMatches) -> anyhow::Result<Principal> {
    let raw = args
        .get_one::<String>("role")
        .context("--role is required")?;
    let role: Role = raw.parse()?;
    let principal = Principal::new("cli", "cli@localhost", role);
    Ok(if args.get_flag("pending") {
        principal.with_pending_request(Role::Admin)
    } else {
        principal
    })
}

fn parse_settings(args: &ArgMatches) -> anyhow::Result<IntegrationConfig> {
    let mut config = IntegrationConfig::new();
    for pair in args.get_many::<String>("settings").into_iter().flatten() {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("setting '{pair}' is not key=value");
        };
        config.insert(key.trim().to_string(), value.to_string());
    }
    Ok(config)
}

fn run_routes(config: &ConsoleConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let catalog = build_catalog(config)?;
    let principal = principal_from(args)?;

    println!(
        "Menu for {} (effective role: {})",
        principal.role,
        principal.effective_role()
    );
    for entry in catalog.menu_for(Some(&principal)) {
        println!("  {:<16} {}", entry.route, entry.label);
    }
    Ok(())
}

fn run_check(config: &ConsoleConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let catalog = build_catalog(config)?;
    let principal = principal_from(args)?;
    let route = args
        .get_one::<String>("route")
        .context("--route is required")?;

    match NavigationGuard::new(&catalog).check(Some(&principal), route) {
        NavigationDecision::Allow { route } => println!("allow {route}"),
        NavigationDecision::Redirect { to, reason } => println!("redirect {to} ({reason:?})"),
    }
    Ok(())
}

async fn run_integrations(config: &ConsoleConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let mut store = IntegrationStore::new(
        IntegrationCatalog::builtin(),
        FileStorage::new(&config.storage_dir),
    )
    .with_key(config.storage_key.clone());
    store.load();

    match args.subcommand() {
        Some(("list", _)) => {
            for view in store.views() {
                let missing = view.missing_fields();
                println!(
                    "{:<10} {:<10} {:<8} {:<13} {}",
                    view.state.id,
                    view.display_name(),
                    if view.state.enabled { "on" } else { "off" },
                    view.state.status.as_str(),
                    if missing.is_empty() {
                        String::new()
                    } else {
                        format!("missing: {}", missing.join(", "))
                    }
                );
            }
        }
        Some(("toggle", sub)) => {
            let id = sub.get_one::<String>("id").context("id is required")?;
            let state = store.toggle(id)?;
            store.persist()?;
            println!("{id}: {}", if state.enabled { "enabled" } else { "disabled" });
        }
        Some(("configure", sub)) => {
            let id = sub.get_one::<String>("id").context("id is required")?;
            let settings = parse_settings(sub)?;
            store.configure(id, settings)?;
            store.persist()?;
            let name = store.catalog().get(id).map_or(id.as_str(), |d| d.display_name);
            println!("{name} configured successfully!");
        }
        Some(("test", sub)) => {
            let id = sub.get_one::<String>("id").context("id is required")?;
            let tester = SimulatedConnectionTester::new(config.connection_test_delay());
            let result = store.test_connection(id, &tester).await?;
            println!("{}", result.message);
            if !result.success {
                std::process::exit(1);
            }
        }
        _ => bail!("unknown integrations command"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let config = ConsoleConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))
        .context("failed to load configuration")?;
    init_tracing(&config);
    tracing::debug!(api = %config.api_base_url, "Configuration loaded");

    match matches.subcommand() {
        Some(("routes", args)) => run_routes(&config, args),
        Some(("check", args)) => run_check(&config, args),
        Some(("integrations", args)) => run_integrations(&config, args).await,
        _ => Ok(()),
    }
}
