use clap::{Parser, Subcommand};

use store_ratings_api::auth::password::hash_password;
use store_ratings_api::database::manager::DatabaseManager;
use store_ratings_api::database::models::Role;
use store_ratings_api::database::repository::{NewUser, UserRepository};
use store_ratings_api::validation;

#[derive(Parser)]
#[command(name = "storectl")]
#[command(about = "Operator CLI for the Store Ratings API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Check that a running server answers its health endpoint")]
    Health {
        #[arg(long, default_value = "http://localhost:5000", help = "Server base URL")]
        url: String,
    },

    #[command(about = "Bootstrap an admin account directly in the database")]
    CreateAdmin {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Health { url } => {
            let endpoint = format!("{}/api/health", url.trim_end_matches('/'));
            let response = reqwest::get(&endpoint).await?;
            let status = response.status();
            let body: serde_json::Value = response.json().await?;

            println!("{} {}", status, body);
            anyhow::ensure!(status.is_success(), "server reported a degraded state");
        }

        Commands::CreateAdmin {
            name,
            email,
            address,
            password,
        } => {
            if let Err(e) = validation::validate_new_user(&name, &email, &address, &password) {
                anyhow::bail!("invalid input: {}", e.to_json());
            }

            let pool = DatabaseManager::pool().await?;
            let users = UserRepository::new(pool);

            anyhow::ensure!(
                users.find_by_email(&email).await?.is_none(),
                "a user with email {email} already exists"
            );

            let password_hash = hash_password(&password)?;
            let user = users
                .create(NewUser {
                    name,
                    email,
                    address,
                    password_hash,
                    role: Role::Admin,
                })
                .await?;

            println!("Created admin {} ({})", user.id, user.email);
        }
    }

    Ok(())
}
