use chrono::Utc;
use tradebook::TradeId;

/// Hands out strictly increasing trade ids based on wall-clock time.
///
/// Two trades generated within the same microsecond (or after the clock
/// stepped back) still get distinct, ordered ids.
#[derive(Debug, Default)]
pub struct TradeClock {
    last: Option<i64>,
}

impl TradeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> TradeId {
        self.next_id_at(Utc::now().timestamp_micros())
    }

    /// Id for a trade observed at `now_micros`.
    pub fn next_id_at(&mut self, now_micros: i64) -> TradeId {
        let micros = match self.last {
            Some(last) => now_micros.max(last.saturating_add(1)),
            None => now_micros,
        };
        self.last = Some(micros);
        TradeId::from_micros(micros)
    }
}
