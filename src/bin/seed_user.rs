use anyhow::Context;
use clap::Parser;
use localoco::{
    models::user::{NewUser, NewUserInput},
    utils::generate_referral_code::{generate_referral_code, DEFAULT_REFERRAL_CODE_LEN},
    Config, DbPersistence,
};

/// Inserts a user for local testing. Real accounts are created by the auth provider.
#[derive(Parser, Debug)]
#[command(name = "seed_user")]
struct SeedArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    /// Referral code to assign; a random one is generated when omitted
    #[arg(long)]
    referral_code: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = SeedArgs::parse();

    let config = Config::load(&args.config).context("failed to load configuration")?;
    let db = DbPersistence::new(config.get_database_url())
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to run migrations")?;

    let referral_code = match args.referral_code {
        Some(code) => code,
        None => generate_referral_code(DEFAULT_REFERRAL_CODE_LEN)?,
    };

    let new_user = NewUser::new(NewUserInput {
        id: uuid::Uuid::new_v4().to_string(),
        name: args.name,
        email: args.email,
        referral_code: Some(referral_code),
    })
    .map_err(|e| anyhow::anyhow!("invalid user: {}", e))?;

    let user = db.users.create(&new_user).await.context("failed to insert user")?;

    println!("Created user {}", user.id);
    println!("Email: {}", user.email.0);
    if let Some(code) = &user.referral_code {
        println!("Referral code: {}", code.0);
    }

    Ok(())
}
