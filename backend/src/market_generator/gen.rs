use std::collections::{HashMap, VecDeque};
use chrono::{DateTime, Duration, Utc};
use portal_viewmodel::{
  domain::{Bbo, DepthLevel, LastSale, Quote, Side, SymbolEntry, SymbolStatus},
  TableRecord
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Normal, Uniform};
use rust_decimal::{prelude::FromPrimitive, Decimal};
use tracing::debug;

use crate::{market_generator::seed, midwares::app_state::AppError};

const MARKET_CENTERS: [&str; 4] = ["XNAS", "XNYS", "ARCX", "BATS"];
const SALE_CONDITIONS: [&str; 4] = ["@", "F", "T", "I"];
const DEPTH_LEVELS: u32 = 5;
const MAX_SALES: usize = 500;
const MAX_PRINTS_PER_TICK: usize = 4;
/// Relative standard deviation of one tick's price move.
const TICK_VOLATILITY: f64 = 0.002;
/// Quoted spread as a fraction of the mid price.
const SPREAD_RATIO: f64 = 0.0005;
const NEW_LISTING_PRICE: f64 = 100.0;

struct Book {
  mid: f64,
  prev_close: f64,
  last: f64,
  volume: u64,
  updated_at: DateTime<Utc>
}

/// Random-walk market behind the demo endpoints.
///
/// Every [`tick`](MarketSimulator::tick) moves the mid of each active symbol, prints a few
/// trades and rebuilds the quote, BBO and depth snapshots the list endpoints serve.
pub struct MarketSimulator {
  rng: StdRng,
  symbols: Vec<SymbolEntry>,
  books: HashMap<String, Book>,
  sales: VecDeque<LastSale>,
  next_trade_id: u64,
  price_move: Normal<f64>,
  lots_dist: Uniform<u64>,
  side_dist: Bernoulli,
  quotes: Vec<Quote>,
  bbos: Vec<Bbo>,
  depth: Vec<DepthLevel>
}

impl MarketSimulator {
  pub fn new(rng_seed: Option<u64>, now: DateTime<Utc>) -> Result<Self, AppError> {
    let rng = match rng_seed {
      Some(value) => StdRng::seed_from_u64(value),
      None => StdRng::from_os_rng()
    };

    let mut symbols = Vec::new();
    let mut books = HashMap::new();
    for (entry, price) in seed::listings() {
      books.insert(entry.symbol.clone(), Book::new(price, now));
      symbols.push(entry);
    }

    let mut simulator = MarketSimulator {
      rng,
      symbols,
      books,
      sales: VecDeque::new(),
      next_trade_id: 1,
      price_move: Normal::new(0.0, TICK_VOLATILITY).map_err(|e| AppError::InternalError(e.to_string()))?,
      lots_dist: Uniform::new_inclusive(1, 20).map_err(|e| AppError::InternalError(e.to_string()))?,
      side_dist: Bernoulli::new(0.5).map_err(|e| AppError::InternalError(e.to_string()))?,
      quotes: Vec::new(),
      bbos: Vec::new(),
      depth: Vec::new()
    };
    simulator.rebuild(now);
    Ok(simulator)
  }

  pub fn tick(&mut self, now: DateTime<Utc>) {
    for entry in self.symbols.iter().filter(|e| e.status == SymbolStatus::Active) {
      if let Some(book) = self.books.get_mut(&entry.symbol) {
        let step = self.price_move.sample(&mut self.rng);
        let floor: f64 = entry.tick_size.try_into().unwrap_or(0.01);
        book.mid = (book.mid * (1.0 + step)).max(floor);
      }
    }

    let prints = self.rng.random_range(0..=MAX_PRINTS_PER_TICK);
    for _ in 0..prints {
      self.print_trade(now);
    }
    self.rebuild(now);
    debug!(prints, sales = self.sales.len(), "market tick");
  }

  fn print_trade(&mut self, now: DateTime<Utc>) {
    let active = self.symbols.iter()
      .filter(|e| e.status == SymbolStatus::Active)
      .collect::<Vec<_>>();
    if active.is_empty() {
      return;
    }
    let entry = active[self.rng.random_range(0..active.len())];
    let Some(book) = self.books.get_mut(&entry.symbol) else {
      return;
    };

    let side = if self.side_dist.sample(&mut self.rng) { Side::Buy } else { Side::Sell };
    let half_spread = book.mid * SPREAD_RATIO / 2.0;
    let raw_price = match side {
      Side::Buy => book.mid + half_spread,
      Side::Sell => book.mid - half_spread
    };
    let price = to_tick(raw_price, entry.tick_size);
    let quantity = self.lots_dist.sample(&mut self.rng) * entry.lot_size;
    let condition = SALE_CONDITIONS[self.rng.random_range(0..SALE_CONDITIONS.len())];
    let lag_ms = self.rng.random_range(0..2_000);

    book.last = raw_price;
    book.volume += quantity;
    book.updated_at = now;

    self.sales.push_front(LastSale {
      trade_id: self.next_trade_id,
      symbol: entry.symbol.clone(),
      price,
      quantity,
      side,
      condition: condition.to_string(),
      executed_at: now - Duration::milliseconds(lag_ms),
      reported_at: now
    });
    self.sales.truncate(MAX_SALES);
    self.next_trade_id += 1;
  }

  fn rebuild(&mut self, now: DateTime<Utc>) {
    self.quotes.clear();
    self.bbos.clear();
    self.depth.clear();

    for entry in self.symbols.iter().filter(|e| e.status != SymbolStatus::Delisted) {
      let Some(book) = self.books.get(&entry.symbol) else {
        continue;
      };
      let tick = entry.tick_size;
      let spread = to_tick(book.mid * SPREAD_RATIO, tick).max(tick);
      let bid = to_tick(book.mid, tick) - tick * Decimal::from(spread_ticks(spread, tick) / 2);
      let ask = bid + spread;
      let lot = entry.lot_size;

      let bid_size = self.lots_dist.sample(&mut self.rng) * lot;
      let ask_size = self.lots_dist.sample(&mut self.rng) * lot;
      self.quotes.push(Quote {
        symbol: entry.symbol.clone(),
        bid_price: bid,
        bid_size,
        ask_price: ask,
        ask_size,
        last_price: to_tick(book.last, tick),
        change: to_tick(book.last, tick) - to_tick(book.prev_close, tick),
        volume: book.volume,
        updated_at: book.updated_at
      });

      for center in MARKET_CENTERS {
        // away venues quote at or behind the consolidated touch
        let behind = Decimal::from(self.rng.random_range(0..3u32));
        self.bbos.push(Bbo {
          symbol: entry.symbol.clone(),
          market_center: center.to_string(),
          bid_price: bid - tick * behind,
          bid_size: self.lots_dist.sample(&mut self.rng) * lot,
          ask_price: ask + tick * behind,
          ask_size: self.lots_dist.sample(&mut self.rng) * lot,
          timestamp: now
        });
      }

      for level in 0..DEPTH_LEVELS {
        let offset = tick * Decimal::from(level);
        for (side, price) in [(Side::Buy, bid - offset), (Side::Sell, ask + offset)] {
          let orders = self.rng.random_range(1..=12u32);
          self.depth.push(DepthLevel {
            symbol: entry.symbol.clone(),
            side,
            level: level + 1,
            price,
            size: self.lots_dist.sample(&mut self.rng) * lot * u64::from(orders),
            orders
          });
        }
      }
    }
  }

  pub fn quotes(&self) -> Vec<Quote> {
    self.quotes.clone()
  }

  pub fn bbos(&self) -> Vec<Bbo> {
    self.bbos.clone()
  }

  pub fn depth(&self) -> Vec<DepthLevel> {
    self.depth.clone()
  }

  /// Most recent prints first.
  pub fn last_sales(&self) -> Vec<LastSale> {
    self.sales.iter().cloned().collect()
  }

  pub fn symbols(&self) -> Vec<SymbolEntry> {
    self.symbols.clone()
  }

  pub fn add_symbol(&mut self, entry: SymbolEntry, now: DateTime<Utc>) -> Result<SymbolEntry, AppError> {
    check(&entry)?;
    if self.position(&entry.symbol).is_some() {
      return Err(AppError::Conflict(format!("Symbol {} already exists", entry.symbol)));
    }
    self.books.insert(entry.symbol.clone(), Book::new(NEW_LISTING_PRICE, now));
    self.symbols.push(entry.clone());
    self.rebuild(now);
    Ok(entry)
  }

  pub fn update_symbol(&mut self, symbol: &str, entry: SymbolEntry, now: DateTime<Utc>) -> Result<SymbolEntry, AppError> {
    let idx = self.position(symbol)
      .ok_or_else(|| AppError::NotFound(format!("Symbol {} does not exist", symbol)))?;
    check(&entry)?;

    if entry.symbol != symbol {
      if self.position(&entry.symbol).is_some() {
        return Err(AppError::Conflict(format!("Symbol {} already exists", entry.symbol)));
      }
      if let Some(book) = self.books.remove(symbol) {
        self.books.insert(entry.symbol.clone(), book);
      }
    }
    self.symbols[idx] = entry.clone();
    self.rebuild(now);
    Ok(entry)
  }

  pub fn remove_symbol(&mut self, symbol: &str, now: DateTime<Utc>) -> Result<(), AppError> {
    let idx = self.position(symbol)
      .ok_or_else(|| AppError::NotFound(format!("Symbol {} does not exist", symbol)))?;
    self.symbols.remove(idx);
    self.books.remove(symbol);
    self.rebuild(now);
    Ok(())
  }

  fn position(&self, symbol: &str) -> Option<usize> {
    self.symbols.iter().position(|e| e.symbol == symbol)
  }
}

impl Book {
  fn new(price: f64, now: DateTime<Utc>) -> Self {
    Book { mid: price, prev_close: price, last: price, volume: 0, updated_at: now }
  }
}

fn check(entry: &SymbolEntry) -> Result<(), AppError> {
  let errors = entry.validate();
  if errors.is_empty() {
    Ok(())
  } else {
    Err(AppError::Validation(errors))
  }
}

/// Rounds a price to the nearest multiple of `tick`.
fn to_tick(price: f64, tick: Decimal) -> Decimal {
  let price = Decimal::from_f64(price).unwrap_or_default();
  if tick.is_zero() {
    return price;
  }
  (price / tick).round() * tick
}

fn spread_ticks(spread: Decimal, tick: Decimal) -> u64 {
  if tick.is_zero() {
    return 0;
  }
  (spread / tick).round().try_into().unwrap_or(1)
}
