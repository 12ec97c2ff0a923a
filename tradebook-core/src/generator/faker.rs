use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tradebook::FakeDataProvider;

const FIRST_NAMES: &[&str] = &[
    "james", "mary", "robert", "patricia", "john", "jennifer", "michael", "linda", "david",
    "elizabeth", "william", "barbara", "richard", "susan", "joseph", "jessica", "thomas", "sarah",
    "charles", "karen", "amara", "kenji", "lucia", "mateo", "noor", "olga", "pavel", "rhea",
];

const LAST_NAMES: &[&str] = &[
    "smith", "johnson", "williams", "brown", "jones", "garcia", "miller", "davis", "rodriguez",
    "martinez", "hernandez", "lopez", "gonzalez", "wilson", "anderson", "thomas", "taylor",
    "moore", "jackson", "martin", "lee", "perez", "thompson", "white", "harris", "sanchez",
    "clark", "ramirez", "lewis", "robinson", "walker", "young", "allen", "king", "wright",
];

const SYMBOLS: &[&str] = &[
    "AAPL", "MSFT", "AMZN", "GOOGL", "META", "NVDA", "TSLA", "BRK.B", "JPM", "JNJ", "V", "PG",
    "XOM", "UNH", "HD", "MA", "CVX", "MRK", "ABBV", "PEP", "KO", "AVGO", "COST", "WMT", "MCD",
    "CSCO", "ACN", "TMO", "ABT", "DHR", "NKE", "ORCL", "INTC", "AMD", "QCOM", "IBM", "BA", "GE",
    "CAT", "GS",
];

const SEPARATORS: &[&str] = &[".", "_", ""];

/// Default [`FakeDataProvider`]: word lists and a seedable RNG.
///
/// The same seed always yields the same sequence of values.
pub struct MarketFaker {
    rng: StdRng,
}

impl MarketFaker {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    fn pick(&mut self, words: &'static [&'static str]) -> &'static str {
        words.choose(&mut self.rng).copied().unwrap_or_default()
    }
}

impl FakeDataProvider for MarketFaker {
    fn next_username(&mut self) -> String {
        let first = self.pick(FIRST_NAMES);
        let separator = self.pick(SEPARATORS);
        let last = self.pick(LAST_NAMES);
        if self.rng.gen_bool(0.5) {
            format!("{}{}{}{}", first, separator, last, self.rng.gen_range(1..100))
        } else {
            format!("{}{}{}", first, separator, last)
        }
    }

    fn next_symbol(&mut self) -> String {
        self.pick(SYMBOLS).to_string()
    }

    fn next_price(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    fn next_account_name(&mut self) -> String {
        let letters: String = (0..self.rng.gen_range(2..=4))
            .map(|_| self.rng.gen_range(b'A'..=b'Z') as char)
            .collect();
        format!("ORG-{}{}-RIPE", letters, self.rng.gen_range(1..100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let mut a = MarketFaker::new(Some(7));
        let mut b = MarketFaker::new(Some(7));
        for _ in 0..20 {
            assert_eq!(a.next_username(), b.next_username());
            assert_eq!(a.next_symbol(), b.next_symbol());
            assert_eq!(a.next_account_name(), b.next_account_name());
        }
    }

    #[test]
    fn test_prices_stay_in_range() {
        let mut faker = MarketFaker::new(Some(1));
        for _ in 0..1000 {
            let price = faker.next_price(0.1, 3000.0);
            assert!((0.1..3000.0).contains(&price));
        }
        assert_eq!(faker.next_price(5.0, 5.0), 5.0);
    }

    #[test]
    fn test_value_shapes() {
        let mut faker = MarketFaker::new(Some(3));
        for _ in 0..50 {
            let name = faker.next_account_name();
            assert!(name.starts_with("ORG-") && name.ends_with("-RIPE"), "{}", name);
            assert!(SYMBOLS.contains(&faker.next_symbol().as_str()));
            let username = faker.next_username();
            assert!(!username.is_empty());
            assert!(username.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_'));
        }
    }
}
