use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use swapshop_client::session::SESSION_ENV;
use swapshop_client::{App, ClientError, ListingForm, SessionStore, DEFAULT_API_URL};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "swapshop")]
#[command(about = "Swap clothes with people nearby")]
#[command(version)]
struct Cli {
    /// Base URL of the Swapshop API
    #[arg(long, env = "SWAPSHOP_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Where the login session is stored
    #[arg(long, env = SESSION_ENV, global = true)]
    session_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and log in
    Register {
        username: String,
        password: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Log in and remember the token
    Login { username: String, password: String },
    /// Forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Show your wardrobe, or add an item to it
    Wardrobe {
        #[command(subcommand)]
        action: Option<WardrobeAction>,
    },
    /// Browse public listings, optionally near a point
    Listings {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Search radius in kilometres
        #[arg(long, default_value_t = 10.0)]
        radius: f64,
    },
    /// Message the owner of a listing
    Message { listing: i64, content: String },
    /// Show received messages
    Inbox {
        /// Only unread messages
        #[arg(long)]
        unread: bool,
        #[command(subcommand)]
        action: Option<InboxAction>,
    },
}

#[derive(Subcommand)]
enum WardrobeAction {
    /// Add a new item
    Add {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// new, like_new, good or fair
        #[arg(long, default_value = "good")]
        condition: String,
        /// cotton, synthetic or mixed
        #[arg(long, default_value = "mixed")]
        category: String,
        /// "lon,lat", e.g. -74.006,40.7128
        #[arg(long, allow_hyphen_values = true)]
        location: Option<String>,
        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum InboxAction {
    /// Mark a message as read
    Read { id: i64 },
}

impl Command {
    fn failure_prefix(&self) -> &'static str {
        match self {
            Command::Register { .. } => "Registration failed",
            Command::Login { .. } => "Login failed",
            Command::Logout => "Logout failed",
            Command::Whoami => "Failed to load user",
            Command::Wardrobe { action: None } => "Failed to load wardrobe",
            Command::Wardrobe { action: Some(_) } => "Failed to create listing",
            Command::Listings { .. } => "Failed to load listings",
            Command::Message { .. } => "Failed to send message",
            Command::Inbox { action: None, .. } => "Failed to load inbox",
            Command::Inbox { action: Some(_), .. } => "Failed to mark message as read",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SessionStore::new(cli.session_file.unwrap_or_else(SessionStore::default_path));
    let app = App::new(cli.api_url, store);

    let prefix = cli.command.failure_prefix();
    match run(&app, cli.command).await {
        Ok(output) => {
            println!("{}", output.trim_end());
            ExitCode::SUCCESS
        }
        Err(ClientError::NotLoggedIn) => {
            eprintln!("{}", "Please log in.".yellow());
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{}", format!("{prefix}: {err}").red());
            ExitCode::FAILURE
        }
    }
}

async fn run(app: &App, command: Command) -> Result<String, ClientError> {
    match command {
        Command::Register {
            username,
            password,
            email,
        } => app.register(&username, &email, &password).await,
        Command::Login { username, password } => app.login(&username, &password).await,
        Command::Logout => app.logout(),
        Command::Whoami => app.whoami().await,
        Command::Wardrobe { action: None } => app.wardrobe().await,
        Command::Wardrobe {
            action:
                Some(WardrobeAction::Add {
                    title,
                    description,
                    condition,
                    category,
                    location,
                    image,
                }),
        } => {
            let form = ListingForm {
                title,
                description,
                condition,
                category,
                location,
                image,
            };
            app.add_to_wardrobe(&form).await
        }
        Command::Listings { lat, lon, radius } => {
            let near = lat.zip(lon);
            app.listings(near, radius).await
        }
        Command::Message { listing, content } => app.message(listing, &content).await,
        Command::Inbox {
            unread,
            action: None,
        } => app.inbox(unread).await,
        Command::Inbox {
            action: Some(InboxAction::Read { id }),
            ..
        } => app.mark_read(id).await,
    }
}
