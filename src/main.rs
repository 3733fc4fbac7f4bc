use clap::{Parser, Subcommand};
use minigit::commands;
use minigit::core::repository::DEFAULT_BRANCH;
use minigit::Repository;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const ROOT_ENV: &str = "MINIGIT_ROOT";

#[derive(Parser)]
#[command(name = "minigit")]
#[command(about = "Minimal content-addressable version control")]
#[command(version = "0.1.0")]
struct Cli {
    /// Working root holding .minigit (defaults to $MINIGIT_ROOT, then the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Init {
        #[arg(short, long, default_value = DEFAULT_BRANCH)]
        branch: String,
    },
    Add {
        files: Vec<PathBuf>,
    },
    Commit {
        #[arg(short, long)]
        message: String,
        #[arg(long)]
        author: Option<String>,
    },
    Log {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
        #[arg(long)]
        oneline: bool,
    },
    CatFile {
        id: String,
        #[arg(short = 't')]
        show_type: bool,
    },
    LsTree {
        id: String,
        #[arg(short, long)]
        recursive: bool,
    },
    HashObject {
        file: PathBuf,
        #[arg(short, long)]
        write: bool,
    },
    Fsck,
    Branch,
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    Set {
        key: String,
        value: String,
        #[arg(long)]
        global: bool,
    },
    Get {
        key: String,
    },
    List,
}

fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        use colored::Colorize;
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "minigit=debug" } else { "minigit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Storage root: `--root`, then `$MINIGIT_ROOT`, then the current directory.
fn resolve_root(root: Option<PathBuf>) -> anyhow::Result<(PathBuf, bool)> {
    if let Some(root) = root {
        return Ok((root, true));
    }
    if let Some(root) = std::env::var_os(ROOT_ENV) {
        return Ok((PathBuf::from(root), true));
    }
    Ok((std::env::current_dir()?, false))
}

fn open_repo(root: Option<PathBuf>) -> anyhow::Result<Repository> {
    let (root, explicit) = resolve_root(root)?;
    let repo = if explicit {
        Repository::open(&root)?
    } else {
        Repository::discover(&root)?
    };
    Ok(repo)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init { branch } => {
            let (root, _) = resolve_root(cli.root)?;
            commands::init::run(&root, &branch)
        }
        Commands::Add { files } => commands::add::run(&open_repo(cli.root)?, &files),
        Commands::Commit { message, author } => {
            commands::commit::run(&open_repo(cli.root)?, &message, author)
        }
        Commands::Log { limit, oneline } => {
            commands::log::run(&open_repo(cli.root)?, limit, oneline)
        }
        Commands::CatFile { id, show_type } => {
            commands::cat_file::run(&open_repo(cli.root)?, &id, show_type)
        }
        Commands::LsTree { id, recursive } => {
            commands::ls_tree::run(&open_repo(cli.root)?, &id, recursive)
        }
        Commands::HashObject { file, write } => {
            let repo = open_repo(cli.root).ok();
            commands::hash_object::run(repo.as_ref(), &file, write)
        }
        Commands::Fsck => commands::fsck::run(&open_repo(cli.root)?),
        Commands::Branch => commands::branch::run(&open_repo(cli.root)?),
        Commands::Config { action } => {
            let repo = open_repo(cli.root).ok();
            let action = match action {
                ConfigAction::Set { key, value, global } => {
                    commands::config::ConfigAction::Set { key, value, global }
                }
                ConfigAction::Get { key } => commands::config::ConfigAction::Get { key },
                ConfigAction::List => commands::config::ConfigAction::List,
            };
            commands::config::run(repo.as_ref(), &action)
        }
    }
}
