use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tradebook_core::config::AppConfig;

/// Sample-data generator and browser for the tradebook data model.
#[derive(Parser, Debug)]
#[command(name = "tradebook")]
#[command(about = "Generate and browse denormalized trade data", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./tradebook.toml if present).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Store contact points, comma separated.
    #[arg(long, value_delimiter = ',')]
    pub hosts: Option<Vec<String>>,

    #[arg(short, long)]
    pub keyspace: Option<String>,

    /// Snapshot file of the embedded store.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Rows fetched per page.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Seed for reproducible data.
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Interactive menu (default).
    Shell,
    /// Generate random users, accounts and trades, then exit.
    Generate {
        /// Number of users.
        #[arg(short, long, default_value_t = 10)]
        users: u32,

        /// Upper bound of accounts per user.
        #[arg(long)]
        max_accounts: Option<u32>,

        /// Upper bound of trades per account.
        #[arg(long)]
        max_trades: Option<u32>,
    },
    /// Print the row count of every table, then exit.
    Inventory,
}

impl Cli {
    /// Applies the command-line overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(hosts) = &self.hosts {
            config.store.hosts = hosts.iter().map(|h| h.trim().to_string()).collect();
        }
        if let Some(keyspace) = &self.keyspace {
            config.store.keyspace = keyspace.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            config.store.snapshot_path = Some(snapshot.clone());
        }
        if let Some(page_size) = self.page_size {
            config.query.page_size = page_size;
        }
        if let Some(seed) = self.seed {
            config.generator.seed = Some(seed);
        }
        if let Some(Commands::Generate {
            max_accounts,
            max_trades,
            ..
        }) = &self.command
        {
            if let Some(max) = max_accounts {
                config.generator.accounts_per_user_max = *max;
            }
            if let Some(max) = max_trades {
                config.generator.transactions_per_account_max = *max;
            }
        }
    }
}
