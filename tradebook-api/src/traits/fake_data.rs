//! Defines the `FakeDataProvider` trait used by the record generator.
//!
//! The generator never invents names or prices itself. It asks a provider,
//! which lets tests pin every attribute and lets callers swap in richer
//! fake-data sources without touching the generation logic.

/// A source of plausible, randomized attribute values.
///
/// Providers are not required to produce unique values: two calls to
/// `next_username` may return the same name, which the data model treats as
/// the same user.
///
/// # Examples
///
/// ```
/// use tradebook::traits::fake_data::FakeDataProvider;
///
/// struct Fixed;
///
/// impl FakeDataProvider for Fixed {
///     fn next_username(&mut self) -> String {
///         "alice".to_string()
///     }
///     fn next_symbol(&mut self) -> String {
///         "AAPL".to_string()
///     }
///     fn next_price(&mut self, min: f64, _max: f64) -> f64 {
///         min
///     }
///     fn next_account_name(&mut self) -> String {
///         "ORG-AL1-RIPE".to_string()
///     }
/// }
///
/// assert_eq!(Fixed.next_price(1.5, 9.0), 1.5);
/// ```
pub trait FakeDataProvider {
    /// Returns a username.
    fn next_username(&mut self) -> String;

    /// Returns an instrument ticker symbol.
    fn next_symbol(&mut self) -> String;

    /// Returns a price in `[min, max)`.
    fn next_price(&mut self, min: f64, max: f64) -> f64;

    /// Returns a display label for a new account.
    fn next_account_name(&mut self) -> String;
}

impl FakeDataProvider for Box<dyn FakeDataProvider + Send> {
    fn next_username(&mut self) -> String {
        (**self).next_username()
    }

    fn next_symbol(&mut self) -> String {
        (**self).next_symbol()
    }

    fn next_price(&mut self, min: f64, max: f64) -> f64 {
        (**self).next_price(min, max)
    }

    fn next_account_name(&mut self) -> String {
        (**self).next_account_name()
    }
}
