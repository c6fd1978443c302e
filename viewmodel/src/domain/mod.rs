//! Row types of the portal's table blocks.

mod bbo;
mod depth;
mod last_sale;
mod quote;
mod symbol;

use std::fmt;
use serde::{Deserialize, Serialize};

pub use bbo::Bbo;
pub use depth::DepthLevel;
pub use last_sale::LastSale;
pub use quote::Quote;
pub use symbol::{AssetClass, SymbolEntry, SymbolStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
  Buy,
  Sell
}

impl fmt::Display for Side {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Side::Buy => write!(f, "BUY"),
      Side::Sell => write!(f, "SELL")
    }
  }
}
