//! IPO Tracker account administration.
//!
//! Creates users (each with a freshly provisioned API-key profile), edits
//! their identity fields and phone, lists profiles and toggles the client
//! flag that lets a key authenticate.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ipo_tracker_backend::accounts;
use ipo_tracker_backend::config::Config;
use ipo_tracker_backend::db::{ProfileScope, Store, open_store};
use ipo_tracker_backend::filters::ProfileQuery;
use ipo_tracker_backend::models::{NewUser, ProfileResponse, User};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "ipo-admin")]
#[command(about = "Account administration for the IPO Tracker backend")]
#[command(version)]
struct Cli {
    /// Database connection URL (overrides configuration and DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user and provision its API key
    CreateUser {
        /// Unique login name
        #[arg(long)]
        username: String,
        /// Email address
        #[arg(long, default_value = "")]
        email: String,
        /// Given name
        #[arg(long, default_value = "")]
        first_name: String,
        /// Family name
        #[arg(long, default_value = "")]
        last_name: String,
        /// Grant visibility of every profile
        #[arg(long)]
        staff: bool,
        /// Enable the key for API access right away
        #[arg(long)]
        client: bool,
    },

    /// Update identity fields; recreates the profile if it is missing
    SaveUser {
        /// Login name of the user to update
        #[arg(long)]
        username: String,
        /// New email address
        #[arg(long)]
        email: Option<String>,
        /// New given name
        #[arg(long)]
        first_name: Option<String>,
        /// New family name
        #[arg(long)]
        last_name: Option<String>,
        /// New staff flag
        #[arg(long)]
        staff: Option<bool>,
        /// New profile phone number; an empty value clears it
        #[arg(long)]
        phone: Option<String>,
    },

    /// Enable or disable API access for a user's key
    SetClient {
        /// Login name
        #[arg(long)]
        username: String,
        /// Whether the key may authenticate
        #[arg(long, action = clap::ArgAction::Set)]
        enabled: bool,
    },

    /// List profiles, optionally filtered
    ListProfiles {
        /// Only profiles whose client flag has this value
        #[arg(long, action = clap::ArgAction::Set)]
        client: Option<bool>,
        /// Terms matched against username, email and phone
        #[arg(long)]
        search: Option<String>,
    },

    /// Print a user's profile and key
    ShowUser {
        /// Login name
        #[arg(long)]
        username: String,
    },

    /// Remove a user's profile, keeping the user
    DeleteProfile {
        /// Login name
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env().context("loading configuration")?;
    if let Some(url) = cli.database_url {
        config = config.with_overrides(|name| (name == "DATABASE_URL").then(|| url.clone()))?;
    }
    if config.database.is_none() {
        bail!("no database configured; set DATABASE_URL or pass --database-url");
    }
    let store = open_store(config.database.as_ref()).await?;

    run(store, cli.command).await
}

async fn run(store: Arc<dyn Store>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::CreateUser {
            username,
            email,
            first_name,
            last_name,
            staff,
            client,
        } => {
            let new_user = NewUser {
                username,
                email,
                first_name,
                last_name,
                is_staff: staff,
            };
            let mut record = accounts::create_user(store.as_ref(), new_user).await?;
            if client {
                record = store.set_client_access(record.user.id, true).await?;
            }
            info!(username = %record.user.username, "User created");
            print_profile(&ProfileResponse::from(&record))
        }
        Commands::SaveUser {
            username,
            email,
            first_name,
            last_name,
            staff,
            phone,
        } => {
            let mut user = find_user(store.as_ref(), &username).await?;
            if let Some(email) = email {
                user.email = email;
            }
            if let Some(first_name) = first_name {
                user.first_name = first_name;
            }
            if let Some(last_name) = last_name {
                user.last_name = last_name;
            }
            if let Some(staff) = staff {
                user.is_staff = staff;
            }
            let mut record = accounts::save_user(store.as_ref(), &user).await?;
            if let Some(phone) = phone {
                record = accounts::set_phone(store.as_ref(), user.id, Some(phone)).await?;
            }
            print_profile(&ProfileResponse::from(&record))
        }
        Commands::SetClient { username, enabled } => {
            let user = find_user(store.as_ref(), &username).await?;
            let record = store.set_client_access(user.id, enabled).await?;
            info!(username = %username, enabled, "Client access updated");
            print_profile(&ProfileResponse::from(&record))
        }
        Commands::ListProfiles { client, search } => {
            let query = ProfileQuery::new(client, search.as_deref());
            let profiles: Vec<ProfileResponse> = store
                .list_profiles(ProfileScope::All)
                .await?
                .iter()
                .filter(|record| query.matches(record))
                .map(ProfileResponse::from)
                .collect();
            println!("{}", serde_json::to_string_pretty(&profiles)?);
            Ok(())
        }
        Commands::ShowUser { username } => {
            let user = find_user(store.as_ref(), &username).await?;
            match store.find_profile_by_user(user.id).await? {
                Some(record) => print_profile(&ProfileResponse::from(&record)),
                None => bail!("user {username} has no profile; run save-user to recreate it"),
            }
        }
        Commands::DeleteProfile { username } => {
            let user = find_user(store.as_ref(), &username).await?;
            if !store.delete_profile(user.id).await? {
                bail!("user {username} has no profile");
            }
            println!("Deleted profile of {username}");
            Ok(())
        }
    }
}

async fn find_user(store: &dyn Store, username: &str) -> anyhow::Result<User> {
    store
        .find_user_by_username(username)
        .await?
        .with_context(|| format!("no user named {username}"))
}

fn print_profile(profile: &ProfileResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(profile)?);
    Ok(())
}
