//! Wallet console.
//!
//! # Architecture Overview
//!
//! ```text
//!   stdin commands                                      ┌──────────────┐
//!   ───────────────┐                                    │  JSON-RPC    │
//!                  ▼                                    │  node(s)     │
//!        ┌──────────────────┐   connect/disconnect      └──────▲───────┘
//!        │    input loop    │──────────────┐                   │
//!        └────────┬─────────┘              ▼                   │
//!                 │ action        ┌─────────────────┐   ┌──────┴───────┐
//!                 ▼               │ ConnectionMgr   │──▶│WalletProvider│
//!        ┌──────────────────┐     │ (watch state)   │   │client+wallet │
//!        │ ActionOrchestr.  │────▶└─────────────────┘   └──────▲───────┘
//!        │ (single flight)  │───────────────────────────────────┘
//!        └────────┬─────────┘
//!                 ▼
//!        ┌──────────────────┐     render task prints every change
//!        │   ConsoleLog     │────────────────────────────▶ stdout
//!        └──────────────────┘
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

use wallet_console::actions::{ActionOutcome, ActionRequest};
use wallet_console::config::load_or_default;
use wallet_console::console::ConsoleSnapshot;
use wallet_console::lifecycle::{build_app, signals, App, Shutdown};
use wallet_console::observability::init_logging;
use wallet_console::ProviderFacade;

#[derive(Parser)]
#[command(name = "wallet-console")]
#[command(about = "Connect a wallet and run chain actions against it", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive console (default)
    Repl,
    /// Connect, run the given actions in order, then disconnect
    Run {
        /// chain-id, balance, network, sign or send
        #[arg(required = true)]
        actions: Vec<ActionRequest>,
    },
    /// Validate the configuration and print it with defaults filled in
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_or_default(cli.config.as_deref())?;
    let one_shot = match cli.command.unwrap_or(Commands::Repl) {
        Commands::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
            return Ok(());
        }
        Commands::Run { actions } => Some(actions),
        Commands::Repl => None,
    };

    init_logging(&config.observability);
    tracing::info!("wallet-console v{} starting", env!("CARGO_PKG_VERSION"));

    let app = build_app(&config)?;
    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c_handler(shutdown.clone());

    let listener = {
        let connection = app.connection.clone();
        let events = app.provider.session_events();
        let stop = shutdown.subscribe();
        tokio::spawn(async move { connection.run_event_listener(events, stop).await })
    };

    let result = match one_shot {
        Some(actions) => run_once(&app, &actions).await,
        None => repl(&app, &shutdown).await,
    };

    shutdown.trigger();
    if let Err(e) = listener.await {
        tracing::warn!(error = %e, "Session event listener ended abnormally");
    }
    tracing::info!("Shutdown complete");
    result
}

async fn run_once(app: &App, actions: &[ActionRequest]) -> Result<(), Box<dyn std::error::Error>> {
    app.connection.request_connect().await?;

    for action in actions {
        match app.actions.execute(*action).await {
            ActionOutcome::Success { lines } => {
                for line in lines {
                    println!("{}", line);
                }
            }
            ActionOutcome::Failure { reason } => eprintln!("{}: {}", action, reason),
        }
    }

    app.connection.request_disconnect().await?;
    Ok(())
}

async fn repl(app: &App, shutdown: &Shutdown) -> Result<(), Box<dyn std::error::Error>> {
    let mut updates = app.log.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            render(&snapshot);
        }
    });

    print_help();
    app.connection.announce();

    let mut stop = shutdown.subscribe();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = stop.recv() => break,
            line = input.next_line() => line?,
        };
        let Some(line) = line else { break };

        match line.trim() {
            "" => {}
            "quit" | "exit" => break,
            "help" => print_help(),
            "status" => println!("{}", app.connection.state()),
            "connect" => {
                let connection = app.connection.clone();
                tokio::spawn(async move {
                    if let Err(e) = connection.request_connect().await {
                        eprintln!("{}", e);
                    }
                });
            }
            "disconnect" => {
                let connection = app.connection.clone();
                tokio::spawn(async move {
                    if let Err(e) = connection.request_disconnect().await {
                        eprintln!("{}", e);
                    }
                });
            }
            "revoke" => app.provider.revoke(),
            other => match other.parse::<ActionRequest>() {
                Ok(action) => {
                    // Spawned so input stays live; a second action is rejected
                    // by the orchestrator while this one runs.
                    let actions = app.actions.clone();
                    tokio::spawn(async move {
                        if let ActionOutcome::Failure { reason } = actions.execute(action).await {
                            eprintln!("{}: {}", action, reason);
                        }
                    });
                }
                Err(e) => eprintln!("{}", e),
            },
        }
    }

    Ok(())
}

fn render(snapshot: &ConsoleSnapshot) {
    if snapshot.loading && snapshot.lines.is_empty() {
        println!("...");
        return;
    }
    for line in &snapshot.lines {
        println!("> {}", line);
    }
}

fn print_help() {
    println!("commands: connect | disconnect | status | revoke | help | quit");
    println!("actions:  chain-id | balance | network | sign | send");
}
