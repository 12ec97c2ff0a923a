use crate::error::Result;
use crate::fanout::TradeWriter;
use crate::generator::RecordGenerator;
use crate::store::Session;
use log::{debug, info};
use std::fmt;
use tradebook::FakeDataProvider;

/// What a seeding run wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: u32,
    pub accounts: u32,
    pub trades: u32,
}

impl fmt::Display for SeedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} users, {} accounts, {} trades",
            self.users, self.accounts, self.trades
        )
    }
}

/// Generates `users` users, each with a random number of accounts, each
/// with a random number of trades, and writes them all.
///
/// Stops at the first failed write. Records written before it stay.
pub fn seed<S, P>(
    generator: &mut RecordGenerator<P>,
    writer: &TradeWriter<S>,
    users: u32,
) -> Result<SeedReport>
where
    S: Session,
    P: FakeDataProvider,
{
    info!("Generating data for {} users", users);
    let mut report = SeedReport::default();

    for _ in 0..users {
        let user = generator.generate_user();
        for _ in 0..generator.accounts_per_user() {
            let account = generator.generate_account(user.username());
            writer.record_account(&account)?;
            report.accounts += 1;

            for _ in 0..generator.trades_per_account() {
                let trade = generator.generate_trade(account.account_number());
                writer.record_trade(&trade)?;
                report.trades += 1;
            }
        }
        report.users += 1;
        debug!("Seeded user {} ({})", user, report);
    }

    info!("Generated {}", report);
    Ok(report)
}
