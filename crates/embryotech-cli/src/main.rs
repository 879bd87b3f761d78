use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Confirm, Input, Password};
use dotenvy::dotenv;
use embryotech_cli::seeder::{self, AdminSeed, ReadingSeedConfig};
use embryotech_config::{DatabaseConfig, PasswordConfig};
use embryotech_db::{PgPool, init_db_pool, run_migrations};

#[derive(Parser)]
#[command(name = "embryotech-cli")]
#[command(about = "Embryotech CLI - Administrative tools for Embryotech", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        /// Login name
        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake sensor readings
    SeedReadings {
        /// Number of batches to generate
        #[arg(short = 'b', long, default_value = "3")]
        batches: usize,

        /// Number of readings per batch
        #[arg(long, default_value = "200")]
        per_batch: usize,

        /// Length of each sample window in seconds
        #[arg(long, default_value = "300")]
        window_secs: i64,
    },
    /// Delete every reading
    ClearReadings {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = DatabaseConfig::try_from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&config).await?;
    run_migrations(&pool).await?;

    match cli.command {
        Commands::CreateAdmin {
            username,
            email,
            password,
        } => handle_create_admin(&pool, username, email, password).await,
        Commands::SeedReadings {
            batches,
            per_batch,
            window_secs,
        } => handle_seed_readings(&pool, batches, per_batch, window_secs).await,
        Commands::ClearReadings { yes } => handle_clear_readings(&pool, yes).await,
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let username = match username {
        Some(username) => username,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .context("Failed to read username")?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .context("Failed to read email")?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .context("Failed to read password")?,
    };

    let seed = AdminSeed {
        username,
        email,
        password,
    };
    let id = seeder::create_admin(pool, &seed, &PasswordConfig::from_env()).await?;

    println!("\n✅ Administrator created successfully!");
    println!("   Id: {}", id);
    println!("   Username: {}", seed.username.trim());
    println!("   Email: {}", seed.email.trim().to_lowercase());
    Ok(())
}

async fn handle_seed_readings(
    pool: &PgPool,
    batches: usize,
    per_batch: usize,
    window_secs: i64,
) -> anyhow::Result<()> {
    let config = ReadingSeedConfig::new(batches, per_batch).with_window_secs(window_secs);
    let inserted = seeder::seed_readings(pool, &config).await?;
    println!("✅ Created {} readings", inserted);
    Ok(())
}

async fn handle_clear_readings(pool: &PgPool, yes: bool) -> anyhow::Result<()> {
    let confirmed = yes
        || Confirm::new()
            .with_prompt("Delete every reading?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

    if !confirmed {
        println!("Aborted");
        return Ok(());
    }

    let removed = seeder::clear_readings(pool).await?;
    println!("✅ Removed {} readings", removed);
    Ok(())
}
