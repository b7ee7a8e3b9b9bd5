use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "localoco")]
#[command(about = "Localoco backend: users, referrals, vouchers and community forum")]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Database URL override
    #[arg(long)]
    pub database_url: Option<String>,

    /// HTTP port override
    #[arg(long)]
    pub port: Option<u16>,

    /// Run pending migrations and exit
    #[arg(long)]
    pub migrate_only: bool,
}
