use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskward_core::{Role, TaskwardConfig};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "taskward", version, about = "Taskward CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API server.
    Serve {
        /// Path to taskward.yaml. Falls back to $TASKWARD_CONFIG, then ./taskward.yaml.
        #[arg(long, short)]
        config: Option<PathBuf>,
    },

    /// Biscuit key management.
    Keys {
        #[command(subcommand)]
        cmd: KeysCommand,
    },

    /// Principal token utilities.
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },

    /// Organization hierarchy inspection.
    Orgs {
        #[command(subcommand)]
        cmd: OrgsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum KeysCommand {
    /// Generate a new Ed25519 keypair.
    Generate {
        /// Directory to write private.key and public.key into. Prints to stdout when omitted.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a signed principal token.
    Mint {
        #[arg(long)]
        user_id: i64,

        /// Owner, Admin or Viewer.
        #[arg(long)]
        role: Role,

        #[arg(long)]
        org_id: i64,

        /// Token lifetime, e.g. 24h, 30m, 7d.
        #[arg(long, default_value = "24h")]
        ttl: String,

        /// File holding the hex-encoded private key.
        #[arg(long, env = "TASKWARD_PRIVATE_KEY_FILE")]
        private_key_file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum OrgsCommand {
    /// Print the organizations reachable from --org-id with --role.
    Accessible {
        #[arg(long, short)]
        config: Option<PathBuf>,

        #[arg(long)]
        org_id: i64,

        #[arg(long)]
        role: Role,
    },
}

/// `RUST_LOG` wins; otherwise `level`.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Command::Serve { config } => {
            let config = TaskwardConfig::load(config.as_deref())?;
            init_tracing(&config.observability.log_level);
            commands::serve::run(config).await?
        }

        Command::Keys { cmd } => {
            init_tracing("warn");
            match cmd {
                KeysCommand::Generate { output } => commands::keys::generate(output)?,
            }
        }

        Command::Token { cmd } => {
            init_tracing("warn");
            match cmd {
                TokenCommand::Mint {
                    user_id,
                    role,
                    org_id,
                    ttl,
                    private_key_file,
                } => {
                    let token =
                        commands::token::mint(user_id, role, org_id, &ttl, &private_key_file)?;
                    println!("{token}");
                }
            }
        }

        Command::Orgs { cmd } => {
            init_tracing("warn");
            match cmd {
                OrgsCommand::Accessible {
                    config,
                    org_id,
                    role,
                } => {
                    let report = commands::orgs::accessible(config.as_deref(), org_id, role)?;
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
        }
    }

    Ok(())
}
