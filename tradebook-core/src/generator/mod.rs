//! Synthetic users, accounts and trades.
//!
//! Names, symbols and prices come from a [`FakeDataProvider`]; counts,
//! balances, share sizes and trade sides are drawn here from a seeded RNG.
//! Nothing is written: persisting the records is the fan-out's job.

mod clock;
mod faker;

pub use clock::TradeClock;
pub use faker::MarketFaker;

use crate::config::GeneratorConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tradebook::{Account, FakeDataProvider, Trade, TradeType, User};
use uuid::Builder;

pub struct RecordGenerator<P: FakeDataProvider> {
    provider: P,
    rng: StdRng,
    clock: TradeClock,
    config: GeneratorConfig,
}

impl RecordGenerator<MarketFaker> {
    /// Generator backed by [`MarketFaker`], seeded from `config.seed`.
    pub fn from_config(config: GeneratorConfig) -> Self {
        let provider = MarketFaker::new(config.seed);
        Self::new(provider, config)
    }
}

impl<P: FakeDataProvider> RecordGenerator<P> {
    pub fn new(provider: P, config: GeneratorConfig) -> Self {
        // Offset so the generator does not replay the provider's stream.
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        Self {
            provider,
            rng,
            clock: TradeClock::new(),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate_user(&mut self) -> User {
        User::new(self.provider.next_username())
    }

    pub fn generate_account(&mut self, username: &str) -> Account {
        let number = Builder::from_random_bytes(self.rng.gen()).into_uuid();
        let max = self.config.max_cash_balance;
        let cash_balance = if max > 0.0 { self.rng.gen_range(0.0..max) } else { 0.0 };
        Account::new(
            number.to_string(),
            username,
            cash_balance,
            self.provider.next_account_name(),
        )
    }

    pub fn generate_trade(&mut self, account_id: &str) -> Trade {
        let trade_type = *TradeType::ALL
            .choose(&mut self.rng)
            .unwrap_or(&TradeType::Buy);
        let shares = self.rng.gen_range(1..=self.config.max_shares.max(1));
        let price = self
            .provider
            .next_price(self.config.min_price, self.config.max_price);
        let symbol = self.provider.next_symbol();
        Trade::new(
            account_id,
            self.clock.next_id(),
            trade_type,
            symbol,
            shares,
            price,
        )
    }

    /// How many accounts to open for the next user: `1..=accounts_per_user_max`.
    pub fn accounts_per_user(&mut self) -> u32 {
        self.rng.gen_range(1..=self.config.accounts_per_user_max.max(1))
    }

    /// How many trades to book on the next account: `1..=transactions_per_account_max`.
    pub fn trades_per_account(&mut self) -> u32 {
        self.rng
            .gen_range(1..=self.config.transactions_per_account_max.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl FakeDataProvider for Fixed {
        fn next_username(&mut self) -> String {
            "alice".to_string()
        }
        fn next_symbol(&mut self) -> String {
            "IBM".to_string()
        }
        fn next_price(&mut self, min: f64, _max: f64) -> f64 {
            min * 2.0
        }
        fn next_account_name(&mut self) -> String {
            "ORG-AL1-RIPE".to_string()
        }
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            max_shares: 50,
            min_price: 1.5,
            max_price: 10.0,
            max_cash_balance: 1000.0,
            accounts_per_user_max: 3,
            transactions_per_account_max: 4,
            seed: Some(11),
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_attributes_come_from_provider() {
        let mut generator = RecordGenerator::new(Fixed, config());
        assert_eq!(generator.generate_user().username(), "alice");

        let account = generator.generate_account("alice");
        assert_eq!(account.username(), "alice");
        assert_eq!(account.name(), "ORG-AL1-RIPE");
        assert!(uuid::Uuid::parse_str(account.account_number()).is_ok());
        assert!((0.0..1000.0).contains(&account.cash_balance()));

        let trade = generator.generate_trade(account.account_number());
        assert_eq!(trade.symbol(), "IBM");
        assert_eq!(trade.price(), 3.0);
        assert_eq!(trade.amount(), trade.shares() as f64 * 3.0);
    }

    #[test]
    fn test_ranges_are_respected() {
        let mut generator = RecordGenerator::from_config(config());
        let mut last = None;
        for _ in 0..500 {
            let trade = generator.generate_trade("acc");
            assert!((1..=50).contains(&trade.shares()));
            assert!((1.5..10.0).contains(&trade.price()));
            if let Some(last) = last {
                assert!(trade.trade_id() > last);
            }
            last = Some(trade.trade_id());
            assert!((1..=3).contains(&generator.accounts_per_user()));
            assert!((1..=4).contains(&generator.trades_per_account()));
        }
    }

    #[test]
    fn test_non_positive_balance_bound_gives_empty_accounts() {
        for max_cash_balance in [0.0, -5.0, f64::NAN] {
            let mut generator = RecordGenerator::new(
                Fixed,
                GeneratorConfig {
                    max_cash_balance,
                    ..config()
                },
            );
            assert_eq!(generator.generate_account("alice").cash_balance(), 0.0);
        }
    }

    #[test]
    fn test_seeded_account_numbers_repeat() {
        let mut a = RecordGenerator::from_config(config());
        let mut b = RecordGenerator::from_config(config());
        assert_eq!(
            a.generate_account("u").account_number(),
            b.generate_account("u").account_number()
        );
    }
}
