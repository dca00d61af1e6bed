use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use postlab_core::WorkflowKind;
use postlabcli::{resolve_config, PostsCliApp};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "postlabcli")]
#[command(about = "Postlab - fetch, create and store posts from a JSON posts API")]
#[command(version)]
struct Cli {
    /// Posts endpoint used for GET and POST
    #[arg(long, env = "POSTLAB_ENDPOINT")]
    endpoint: Option<String>,

    /// SQLite database file (defaults to posts.db in the config directory)
    #[arg(long, env = "POSTLAB_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// GET the list and show the first five posts
    Get,
    /// POST a new post and show the response
    Post,
    /// POST a new post and save the response locally
    PostSave,
    /// Show posts saved locally
    Saved,
    /// Run the three requests at the same time
    All,
}

fn init_logging() {
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_owned()
        } else {
            "info".to_owned()
        }
    });

    env_logger::Builder::new().parse_filters(&rust_log).init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = resolve_config(cli.endpoint, cli.database)?;
    info!("Endpoint: {} | Database: {:?}", config.endpoint, config.sqlite_file);

    let mut app = PostsCliApp::new(&config);

    match cli.command {
        Some(Command::Get) => app.run_workflow(WorkflowKind::FetchList),
        Some(Command::Post) => app.run_workflow(WorkflowKind::CreateAndDisplay),
        Some(Command::PostSave) => app.run_workflow(WorkflowKind::CreateAndPersist),
        Some(Command::Saved) => app.show_saved()?,
        Some(Command::All) => app.run_all(),
        None => {
            let stdin = io::stdin();
            app.run(stdin.lock())?;
        }
    }

    Ok(())
}
