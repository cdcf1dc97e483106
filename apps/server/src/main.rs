use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::Row;
use swapshop_auth::{AuthError, User};
use swapshop_backend_api::build_router;
use swapshop_backend_api::routes::models::CreateListingRequest;
use swapshop_backend_api::services::{listing as listing_service, message as message_service};
use swapshop_backend_runtime::{telemetry, BackendServices};
use swapshop_config::{load as load_config, AppConfig};
use tokio::net::TcpListener;
use tracing::info;

const DEMO_PASSWORD: &str = "swapshop-demo";

#[derive(Parser)]
#[command(name = "swapshop-backend")]
#[command(about = "Swapshop backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Apply database migrations and exit
    Migrate,
    /// Seed the database with demo users and listings
    SeedData,
    /// Print users, listings and messages
    DumpData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(config).await,
        Commands::Migrate => migrate(config).await,
        Commands::SeedData => seed_data(config).await,
        Commands::DumpData => dump_data(config).await,
    }
}

async fn initialise(config: &AppConfig) -> anyhow::Result<BackendServices> {
    BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")
}

async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    info!("starting Swapshop backend");

    let services = initialise(&config).await?;
    let app = build_router(services.app_state(&config));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(swapshop_backend_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    let services = initialise(&config).await?;
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(&services.db_pool)
        .await
        .context("failed to read migration history")?;

    println!("Database {} is up to date ({applied} migrations applied)", config.database.url);
    Ok(())
}

struct DemoListing {
    title: &'static str,
    description: &'static str,
    condition: &'static str,
    category: &'static str,
    location: &'static str,
}

const ALICE_LISTINGS: &[DemoListing] = &[
    DemoListing {
        title: "Denim jacket",
        description: "Classic blue, size M",
        condition: "good",
        category: "cotton",
        location: "13.4050,52.5200",
    },
    DemoListing {
        title: "Rain shell",
        description: "Lightweight and packable",
        condition: "like_new",
        category: "synthetic",
        location: "13.4290,52.5080",
    },
];

const BOB_LISTINGS: &[DemoListing] = &[
    DemoListing {
        title: "Wool scarf",
        description: "Hand knitted",
        condition: "fair",
        category: "mixed",
        location: "13.3777,52.5163",
    },
    DemoListing {
        title: "Running tights",
        description: "Worn twice",
        condition: "new",
        category: "synthetic",
        location: "13.0645,52.3906",
    },
];

#[derive(Debug, Default, PartialEq, Eq)]
struct SeedSummary {
    users: usize,
    listings: usize,
    messages: usize,
}

async fn seed_data(config: AppConfig) -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let services = initialise(&config).await?;
    let summary = seed(&services).await?;

    println!(
        "Seeded {} users, {} listings and {} messages (password: {DEMO_PASSWORD})",
        summary.users, summary.listings, summary.messages
    );
    Ok(())
}

async fn seed(services: &BackendServices) -> anyhow::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let alice = demo_user(services, "demo_alice", "alice@example.com").await?;
    let bob = demo_user(services, "demo_bob", "bob@example.com").await?;
    summary.users = 2;

    let existing: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM listings l JOIN wardrobes w ON w.id = l.wardrobe_id WHERE w.user_id IN (?, ?)",
    )
    .bind(alice.id)
    .bind(bob.id)
    .fetch_one(&services.db_pool)
    .await
    .context("failed to count demo listings")?;
    if existing > 0 {
        info!(existing, "demo listings already present; skipping");
        return Ok(summary);
    }

    let mut first_alice_listing = None;
    for (owner, listings) in [(&alice, ALICE_LISTINGS), (&bob, BOB_LISTINGS)] {
        for demo in listings {
            let new = listing_service::NewListing::try_from(CreateListingRequest {
                title: demo.title.to_string(),
                description: demo.description.to_string(),
                condition: demo.condition.to_string(),
                category: Some(demo.category.to_string()),
                location: Some(demo.location.to_string()),
                is_public: Some(true),
            })
            .with_context(|| format!("invalid demo listing {}", demo.title))?;

            let listing = listing_service::create_listing(
                &services.db_pool,
                &services.media,
                owner.id,
                new,
                None,
            )
            .await
            .with_context(|| format!("failed to create demo listing {}", demo.title))?;

            if owner.id == alice.id && first_alice_listing.is_none() {
                first_alice_listing = Some(listing.id);
            }
            summary.listings += 1;
        }
    }

    if let Some(listing_id) = first_alice_listing {
        message_service::send_message(
            &services.db_pool,
            bob.id,
            listing_id,
            "Hi! Would you swap this for my wool scarf?",
        )
        .await
        .context("failed to create demo message")?;
        summary.messages += 1;
    }

    Ok(summary)
}

async fn demo_user(services: &BackendServices, username: &str, email: &str) -> anyhow::Result<User> {
    let user = match services
        .authenticator
        .register(username, email, DEMO_PASSWORD)
        .await
    {
        Ok((user, _)) => user,
        Err(AuthError::UserExists) => {
            services
                .authenticator
                .login(username, DEMO_PASSWORD)
                .await
                .with_context(|| format!("demo user {username} exists with another password"))?
                .0
        }
        Err(error) => {
            return Err(error).with_context(|| format!("failed to register demo user {username}"))
        }
    };
    Ok(user)
}

async fn dump_data(config: AppConfig) -> anyhow::Result<()> {
    let services = initialise(&config).await?;

    let users = sqlx::query("SELECT id, username, email, created_at FROM users ORDER BY id")
        .fetch_all(&services.db_pool)
        .await
        .context("failed to fetch users")?;

    println!("=== USERS ===");
    if users.is_empty() {
        println!("No users found in database");
    } else {
        println!("{:<5} {:<20} {:<30} {:<35}", "ID", "Username", "Email", "Created At");
        println!("{}", "-".repeat(95));
        for user in users {
            let id: i64 = user.get("id");
            let username: String = user.get("username");
            let email: String = user.get("email");
            let created_at: String = user.get("created_at");
            println!("{id:<5} {username:<20} {email:<30} {created_at:<35}");
        }
    }

    let listings = sqlx::query(
        r#"
        SELECT l.id, u.username, l.title, l.condition, l.category, l.longitude, l.latitude,
               l.is_public, l.eco_impact
        FROM listings l
        JOIN wardrobes w ON w.id = l.wardrobe_id
        JOIN users u ON u.id = w.user_id
        ORDER BY l.id
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch listings")?;

    println!("\n=== LISTINGS ===");
    if listings.is_empty() {
        println!("No listings found in database");
    } else {
        println!(
            "{:<5} {:<15} {:<25} {:<10} {:<10} {:<22} {:<7} {:<6}",
            "ID", "Owner", "Title", "Condition", "Category", "Location", "Public", "Eco"
        );
        println!("{}", "-".repeat(110));
        for listing in listings {
            let id: i64 = listing.get("id");
            let owner: String = listing.get("username");
            let title: String = listing.get("title");
            let condition: String = listing.get("condition");
            let category: String = listing.get("category");
            let longitude: Option<f64> = listing.get("longitude");
            let latitude: Option<f64> = listing.get("latitude");
            let is_public: bool = listing.get("is_public");
            let eco_impact: f64 = listing.get("eco_impact");
            let location = match (longitude, latitude) {
                (Some(lon), Some(lat)) => format!("{lon},{lat}"),
                _ => "NULL".to_string(),
            };
            println!(
                "{id:<5} {owner:<15} {title:<25} {condition:<10} {category:<10} {location:<22} {is_public:<7} {eco_impact:<6.2}"
            );
        }
    }

    let messages = sqlx::query(
        r#"
        SELECT m.id, s.username AS sender, r.username AS recipient, m.listing_id, m.is_read, m.content
        FROM messages m
        JOIN users s ON s.id = m.sender_id
        JOIN users r ON r.id = m.recipient_id
        ORDER BY m.id
        "#,
    )
    .fetch_all(&services.db_pool)
    .await
    .context("failed to fetch messages")?;

    println!("\n=== MESSAGES ===");
    if messages.is_empty() {
        println!("No messages found in database");
    } else {
        println!(
            "{:<5} {:<15} {:<15} {:<8} {:<6} {}",
            "ID", "From", "To", "Listing", "Read", "Content"
        );
        println!("{}", "-".repeat(100));
        for message in messages {
            let id: i64 = message.get("id");
            let sender: String = message.get("sender");
            let recipient: String = message.get("recipient");
            let listing_id: i64 = message.get("listing_id");
            let is_read: bool = message.get("is_read");
            let content: String = message.get("content");
            println!("{id:<5} {sender:<15} {recipient:<15} {listing_id:<8} {is_read:<6} {content}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(temp_dir: &TempDir) -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = format!(
            "sqlite://{}",
            temp_dir.path().join("seed.db").display()
        );
        config.media.root = temp_dir.path().join("media");
        config
    }

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["swapshop-backend"]).unwrap();
        assert_eq!(cli.command, None);

        let cli = Cli::try_parse_from(["swapshop-backend", "seed-data"]).unwrap();
        assert_eq!(cli.command, Some(Commands::SeedData));
    }

    #[tokio::test]
    async fn seed_is_idempotent() -> anyhow::Result<()> {
        let temp_dir = TempDir::new()?;
        let services = initialise(&config_in(&temp_dir)).await?;

        let first = seed(&services).await?;
        assert_eq!(
            first,
            SeedSummary {
                users: 2,
                listings: 4,
                messages: 1
            }
        );

        let second = seed(&services).await?;
        assert_eq!(second.listings, 0);

        let listings: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(&services.db_pool)
            .await?;
        assert_eq!(listings, 4);
        Ok(())
    }
}
