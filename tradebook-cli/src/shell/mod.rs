//! The interactive menu.
//!
//! Input and output are generic so the whole loop can run against
//! scripted input. An operation that fails prints its error and returns
//! to the menu; only terminal IO errors end the loop.

pub mod menu;
pub mod render;

use crate::error::{CliError, Result};
use chrono::Utc;
use log::{debug, warn};
use menu::{MainChoice, parse_count, parse_trade_choice};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use tradebook::{Trade, TradeType};
use tradebook_core::catalog::{ACCOUNTS_BY_USER, POSITIONS_BY_ACCOUNT};
use tradebook_core::config::{AppConfig, GeneratorConfig};
use tradebook_core::fanout::TradeWriter;
use tradebook_core::generator::RecordGenerator;
use tradebook_core::inventory::inventory;
use tradebook_core::pager::QueryWalker;
use tradebook_core::queries::{self, TradeFilter, TradeQueryKind};
use tradebook_core::records::{account_from_row, position_from_row, trade_from_row};
use tradebook_core::seeder::{seed, SeedReport};
use tradebook_core::store::{Select, Session};
use tradebook_core::TradebookError;

pub struct Shell<'a, S: Session, R: BufRead, W: Write> {
    session: &'a S,
    config: AppConfig,
    input: R,
    output: W,
    rng: StdRng,
}

impl<'a, S: Session, R: BufRead, W: Write> Shell<'a, S, R, W> {
    pub fn new(session: &'a S, config: AppConfig, input: R, output: W) -> Self {
        let rng = match config.generator.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            session,
            config,
            input,
            output,
            rng,
        }
    }

    /// Runs the menu until the user exits or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            menu::write_main_menu(&mut self.output)?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                return Ok(());
            };
            let result = match MainChoice::parse(&line) {
                Some(MainChoice::Exit) => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                Some(MainChoice::Generate) => self.generate(),
                Some(MainChoice::Inventory) => self.inventory(),
                Some(MainChoice::UserAccounts) => self.user_accounts(),
                Some(MainChoice::AccountPositions) => self.account_positions(),
                Some(MainChoice::Trades) => self.trades(),
                None => {
                    writeln!(self.output, "Invalid choice '{}'", line.trim())?;
                    Ok(())
                }
            };
            self.report(result)?;
        }
    }

    /// Prints a failed operation. Only terminal IO errors are passed on.
    fn report(&mut self, result: Result<()>) -> io::Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(CliError::Io(err)) => Err(err),
            Err(err) => {
                warn!("Operation failed: {}", err);
                writeln!(self.output, "Error: {}", err)
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prints `label` and reads the answer. End of input reads as blank.
    fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    fn walker(&self) -> QueryWalker<&'a S> {
        QueryWalker::new(self.session)
    }

    fn page_size(&self) -> usize {
        self.config.query.page_size
    }

    fn generate(&mut self) -> Result<()> {
        let users = parse_count(&self.prompt("Number of users [10]")?, 10)?;
        let defaults = self.config.generator.clone();
        let accounts = parse_count(
            &self.prompt(&format!(
                "Max accounts per user [{}]",
                defaults.accounts_per_user_max
            ))?,
            defaults.accounts_per_user_max,
        )?;
        let trades = parse_count(
            &self.prompt(&format!(
                "Max transactions per account [{}]",
                defaults.transactions_per_account_max
            ))?,
            defaults.transactions_per_account_max,
        )?;

        let mut generator_config = defaults;
        generator_config.accounts_per_user_max = accounts.max(1);
        generator_config.transactions_per_account_max = trades.max(1);
        let report = generate(self.session, generator_config, users)?;
        writeln!(self.output, "Generated {}", report)?;
        Ok(())
    }

    fn inventory(&mut self) -> Result<()> {
        let counts = inventory(self.session)?;
        render::inventory(&mut self.output, &counts)?;
        Ok(())
    }

    /// Draws a random row of `query`, a result with `total` rows.
    fn pick(&mut self, query: Select, total: u64, column: &str) -> Result<Option<String>> {
        if total == 0 {
            return Ok(None);
        }
        let walker = self.walker();
        let row = walker.random_row(query, self.page_size(), total as usize, &mut self.rng)?;
        let value = row
            .text(column)
            .map_err(TradebookError::from)?
            .to_string();
        debug!("Picked {} {}", column, value);
        Ok(Some(value))
    }

    fn random_username(&mut self) -> Result<Option<String>> {
        let total = self
            .session
            .count(ACCOUNTS_BY_USER)
            .map_err(TradebookError::from)?;
        self.pick(queries::usernames(), total, "username")
    }

    fn random_account(&mut self) -> Result<Option<String>> {
        let total = self
            .session
            .count(POSITIONS_BY_ACCOUNT)
            .map_err(TradebookError::from)?;
        self.pick(queries::position_accounts(), total, "account")
    }

    fn no_data(&mut self) -> Result<()> {
        writeln!(self.output, "No data yet. Generate some first (option 1).")?;
        Ok(())
    }

    fn user_accounts(&mut self) -> Result<()> {
        let Some(username) = self.random_username()? else {
            return self.no_data();
        };
        let rows = self
            .walker()
            .collect(queries::accounts_for_user(&username), self.page_size())?;
        let accounts = rows
            .iter()
            .map(account_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(TradebookError::from)?;
        writeln!(self.output, "Accounts of {}:", username)?;
        render::accounts(&mut self.output, &accounts)?;
        Ok(())
    }

    fn account_positions(&mut self) -> Result<()> {
        let Some(account) = self.random_account()? else {
            return self.no_data();
        };
        let rows = self
            .walker()
            .collect(queries::positions_for_account(&account), self.page_size())?;
        let positions = rows
            .iter()
            .map(position_from_row)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(TradebookError::from)?;
        writeln!(self.output, "Positions of account {}:", account)?;
        render::positions(&mut self.output, &positions)?;
        Ok(())
    }

    /// The trade submenu, shown again after every search until Cancel.
    fn trades(&mut self) -> Result<()> {
        loop {
            menu::write_trade_menu(&mut self.output)?;
            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };
            let result = match parse_trade_choice(&line) {
                Some(Some(kind)) => self.trade_query(kind),
                Some(None) => break,
                None => {
                    writeln!(self.output, "Invalid choice '{}'", line.trim())?;
                    Ok(())
                }
            };
            self.report(result)?;
        }
        writeln!(self.output, "Going back to main menu...")?;
        Ok(())
    }

    fn trade_query(&mut self, kind: TradeQueryKind) -> Result<()> {
        let Some(account) = self.random_account()? else {
            return self.no_data();
        };
        let filter = self.trade_filter(kind, &account)?;
        writeln!(self.output, "{} for account {}:", kind, account)?;
        self.page_through(filter.to_select())
    }

    fn trade_filter(&mut self, kind: TradeQueryKind, account: &str) -> Result<TradeFilter> {
        let mut filter = TradeFilter::for_account(account);
        if kind.uses_range() {
            let (default_from, default_to) = menu::default_range(Utc::now());
            let from = self.prompt("From date (YYYY-MM-DD) [one month ago]")?;
            let to = self.prompt("To date (YYYY-MM-DD) [today]")?;
            let from = if from.trim().is_empty() {
                default_from
            } else {
                menu::day_start(&from)?
            };
            let to = if to.trim().is_empty() {
                default_to
            } else {
                menu::day_end(&to)?
            };
            filter = filter.between(from, to);
        }
        if kind.uses_type() {
            let answer = self.prompt("Type (BUY/SELL) [BUY]")?;
            let trade_type = if answer.trim().is_empty() {
                TradeType::Buy
            } else {
                answer
                    .parse::<TradeType>()
                    .map_err(|e| CliError::Input(e.to_string()))?
            };
            filter = filter.of_type(trade_type);
        }
        if kind.uses_symbol() {
            let held = self.held_symbol(account)?;
            let answer = self.prompt(&format!("Symbol [{}]", held))?;
            let symbol = match answer.trim() {
                "" => held,
                symbol => symbol.to_uppercase(),
            };
            filter = filter.on_symbol(symbol);
        }
        Ok(filter)
    }

    /// A random symbol the account holds a position in.
    fn held_symbol(&mut self, account: &str) -> Result<String> {
        let rows = self
            .walker()
            .collect(queries::symbols_for_account(account), self.page_size())?;
        let symbols = rows
            .iter()
            .map(|row| row.text("symbol").map(str::to_string))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(TradebookError::from)?;
        symbols
            .choose(&mut self.rng)
            .cloned()
            .ok_or_else(|| CliError::Input(format!("account {} holds no positions", account)))
    }

    /// Shows `query` one page at a time until the user stops or rows run out.
    fn page_through(&mut self, query: Select) -> Result<()> {
        let walker = self.walker();
        let mut cursor = walker.open(query, self.page_size())?;
        loop {
            let page = walker.next_page(cursor)?;
            let trades = page
                .rows
                .iter()
                .map(trade_from_row)
                .collect::<std::result::Result<Vec<Trade>, _>>()
                .map_err(TradebookError::from)?;
            render::trades(&mut self.output, &trades)?;
            if !page.has_more {
                return Ok(());
            }
            let answer = self.prompt("Enter for more, q to stop")?;
            if answer.trim().eq_ignore_ascii_case("q") {
                return Ok(());
            }
            cursor = page.cursor;
        }
    }
}

/// Seeds the store with generated data using `config`.
pub fn generate<S: Session>(
    session: &S,
    config: GeneratorConfig,
    users: u32,
) -> Result<SeedReport> {
    let writer = TradeWriter::new(session, config.position_updates);
    let mut generator = RecordGenerator::from_config(config);
    Ok(seed(&mut generator, &writer, users)?)
}
