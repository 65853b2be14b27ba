//! Order Management System
//!
//! Simulated exchange, wallets, portfolio, and immediate-fill order
//! execution. No order book and no matching: fills happen at the quoted
//! price less commission.

mod exchange;
mod orders;
mod wallets;

pub use exchange::{Exchange, ExchangeOptions};
pub use orders::{execute_order, Fill, MarketOrder, OrderSide};
pub use wallets::{Portfolio, Wallet};
