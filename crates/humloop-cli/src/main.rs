use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;

use app::AppContext;

#[derive(Parser)]
#[command(name = "humloop")]
#[command(about = "Humloop CLI - turn humming into music and share it", long_about = None)]
struct Cli {
    /// Directory holding config.toml and tokens.json
    #[arg(long, global = true, env = "HUMLOOP_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        /// Display name shown on posts
        #[arg(long)]
        nickname: Option<String>,
        /// Read from stdin when omitted
        #[arg(long, env = "HUMLOOP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log in and keep the session for later commands
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "HUMLOOP_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Generate music from an audio file
    Generate(GenerateArgs),
    /// Browse and manage board posts
    Posts {
        #[command(subcommand)]
        action: PostsAction,
    },
    /// Your profile, works and favorites
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Compose new music from a hummed melody
    Humming,
    /// Re-arrange an existing track in another genre
    Genre,
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Audio file to upload
    pub file: PathBuf,
    #[arg(long, value_enum, default_value = "humming")]
    pub mode: ModeArg,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long)]
    pub mood: Option<String>,
    #[arg(long)]
    pub instrument: Option<String>,
    /// Extra instructions for the model
    #[arg(long)]
    pub prompt: Option<String>,
    /// Publish the result as a post
    #[arg(long, requires = "title")]
    pub publish: bool,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OrderArg {
    Newest,
    Oldest,
    Likes,
}

#[derive(Subcommand)]
enum PostsAction {
    /// List posts
    List {
        #[arg(long, value_enum, default_value = "newest")]
        order: OrderArg,
        /// Only posts written by the logged-in user
        #[arg(long)]
        mine: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one post
    Show {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// Delete one of your posts
    Delete { id: i64 },
    /// Like or unlike a post
    Like { id: i64 },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show your profile
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Show activity totals
    Stats,
    /// Change profile fields
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Change your password; prompts on stdin
    Password,
    /// List your tracks
    Music {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List posts or tracks you liked
    Favorites {
        /// Liked tracks instead of liked posts
        #[arg(long)]
        music: bool,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HUMLOOP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = AppContext::bootstrap(cli.config_dir.as_deref()).await?;

    match cli.command {
        Commands::Register {
            username,
            nickname,
            password,
        } => commands::auth::register(&ctx, &username, nickname.as_deref(), password).await?,
        Commands::Login { username, password } => commands::auth::login(&ctx, &username, password).await?,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::Generate(args) => commands::generate::run(&ctx, args).await?,
        Commands::Posts { action } => match action {
            PostsAction::List { order, mine, json } => commands::posts::list(&ctx, order, mine, json).await?,
            PostsAction::Show { id, json } => commands::posts::show(&ctx, id, json).await?,
            PostsAction::Delete { id } => commands::posts::delete(&ctx, id).await?,
            PostsAction::Like { id } => commands::posts::like(&ctx, id).await?,
        },
        Commands::Profile { action } => match action {
            ProfileAction::Show { json } => commands::profile::show(&ctx, json).await?,
            ProfileAction::Stats => commands::profile::stats(&ctx).await?,
            ProfileAction::Update { username, email, bio } => {
                commands::profile::update(&ctx, username, email, bio).await?
            }
            ProfileAction::Password => commands::profile::password(&ctx).await?,
            ProfileAction::Music { page } => commands::profile::music(&ctx, page).await?,
            ProfileAction::Favorites { music, page } => commands::profile::favorites(&ctx, music, page).await?,
        },
    }

    Ok(())
}
