use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

use storefront_common::{signature::signature_header, DatabaseConfig};
use storefront_database::{create_pool, CheckoutSessionStore, MigrationRunner, PgCheckoutSessionStore};

#[derive(Parser)]
#[command(name = "webhook-cli")]
#[command(about = "Storefront checkout webhook CLI Tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Check migration status
    Status,
    /// Print a sample checkout.session.completed event
    Sample {
        #[arg(long, default_value = "cs_test_123")]
        session_id: String,
    },
    /// Print a stripe-signature header for a payload file
    Sign {
        /// File whose exact bytes are signed
        #[arg(long)]
        payload: PathBuf,
        #[command(flatten)]
        signing: SigningArgs,
    },
    /// Sign an event and POST it to the webhook endpoint
    Send {
        /// File whose exact bytes are sent; a sample event is used when omitted
        #[arg(long)]
        payload: Option<PathBuf>,
        /// Session id for the sample event
        #[arg(long, default_value = "cs_test_123")]
        session_id: String,
        #[arg(long, default_value = "http://localhost:3000/webhook")]
        url: String,
        #[command(flatten)]
        signing: SigningArgs,
    },
    /// Show a stored checkout session
    Show {
        session_id: String,
    },
}

#[derive(Args)]
struct SigningArgs {
    /// Webhook secret (defaults to STRIPE_WEBHOOK_SECRET)
    #[arg(long, env = "STRIPE_WEBHOOK_SECRET", hide_env_values = true)]
    secret: String,
    /// Unix timestamp to sign with (defaults to now)
    #[arg(long)]
    timestamp: Option<i64>,
}

impl SigningArgs {
    fn header_for(&self, payload: &[u8]) -> anyhow::Result<String> {
        let timestamp = self.timestamp.unwrap_or_else(|| chrono::Utc::now().timestamp());
        Ok(signature_header(&self.secret, timestamp, payload)?)
    }
}

fn sample_checkout_event(session_id: &str, created: i64) -> Value {
    json!({
        "id": format!("evt_{}", session_id),
        "object": "event",
        "type": "checkout.session.completed",
        "created": created,
        "livemode": false,
        "data": {
            "object": {
                "id": session_id,
                "object": "checkout.session",
                "amount_total": 500,
                "currency": "usd",
                "customer_details": { "email": "customer@example.com" },
                "payment_status": "paid",
                "created": created
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate => {
            let pool = create_pool(&DatabaseConfig::from_env()).await?;
            MigrationRunner::new(pool).run_all_migrations().await?;

            println!("✅ Migrations completed successfully");
        }
        Commands::Status => {
            let pool = create_pool(&DatabaseConfig::from_env()).await?;
            let status = MigrationRunner::new(pool).check_migration_status().await?;
            println!("📊 {}", status);

            if status.is_up_to_date {
                println!("✅ Database is up to date");
            } else {
                println!("⚠️  Database needs migration");
            }
        }
        Commands::Sample { session_id } => {
            let event = sample_checkout_event(&session_id, chrono::Utc::now().timestamp());
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        Commands::Sign { payload, signing } => {
            let bytes = std::fs::read(&payload)
                .with_context(|| format!("reading {}", payload.display()))?;
            println!("{}", signing.header_for(&bytes)?);
        }
        Commands::Send { payload, session_id, url, signing } => {
            let bytes = match payload {
                Some(path) => std::fs::read(&path)
                    .with_context(|| format!("reading {}", path.display()))?,
                None => serde_json::to_vec(&sample_checkout_event(
                    &session_id,
                    chrono::Utc::now().timestamp(),
                ))?,
            };
            let header = signing.header_for(&bytes)?;

            tracing::info!("Sending {} bytes to {}", bytes.len(), url);
            let response = reqwest::Client::new()
                .post(&url)
                .header("content-type", "application/json")
                .header("stripe-signature", header)
                .body(bytes)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            println!("{} {}", status, body);

            if !status.is_success() {
                anyhow::bail!("webhook endpoint returned {}", status);
            }
        }
        Commands::Show { session_id } => {
            let pool = create_pool(&DatabaseConfig::from_env()).await?;
            let store = PgCheckoutSessionStore::new(pool);

            match store.get(&session_id).await? {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => anyhow::bail!("checkout session {} not found", session_id),
            }
        }
    }

    Ok(())
}
