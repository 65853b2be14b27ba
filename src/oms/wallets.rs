//! Wallets and Portfolio

use rust_decimal::Decimal;

use super::Exchange;
use crate::error::{Result, TradeframeError};
use crate::instruments::{Instrument, Quantity};

/// A single-instrument balance held at one exchange
#[derive(Debug, Clone)]
pub struct Wallet {
    exchange_id: String,
    balance: Quantity,
}

impl Wallet {
    pub fn new(exchange: &Exchange, balance: Quantity) -> Self {
        Self {
            exchange_id: exchange.id().to_string(),
            balance,
        }
    }

    /// Wallet identifier, e.g. `USD@coinbase`
    pub fn id(&self) -> String {
        format!("{}@{}", self.balance.instrument.symbol, self.exchange_id)
    }

    pub fn instrument(&self) -> Instrument {
        self.balance.instrument
    }

    pub fn balance(&self) -> Quantity {
        self.balance
    }

    pub fn deposit(&mut self, quantity: Quantity) -> Result<()> {
        self.balance = self.balance.checked_add(&quantity)?;
        Ok(())
    }

    pub fn withdraw(&mut self, quantity: Quantity) -> Result<()> {
        if quantity.instrument != self.balance.instrument {
            return Err(TradeframeError::InstrumentMismatch {
                expected: self.balance.instrument.symbol.to_string(),
                got: quantity.instrument.symbol.to_string(),
            });
        }
        if quantity.amount > self.balance.amount {
            return Err(TradeframeError::InsufficientFunds {
                wallet: self.id(),
                requested: quantity.amount,
                available: self.balance.amount,
            });
        }
        self.balance = self.balance.checked_sub(&quantity)?;
        Ok(())
    }

    /// Force the balance, used when resetting an episode
    pub(crate) fn set_balance(&mut self, balance: Quantity) {
        self.balance = balance;
    }
}

/// A set of wallets valued in one base instrument
#[derive(Debug, Clone)]
pub struct Portfolio {
    base: Instrument,
    wallets: Vec<Wallet>,
}

impl Portfolio {
    pub fn new(base: Instrument, wallets: Vec<Wallet>) -> Self {
        Self { base, wallets }
    }

    pub fn base_instrument(&self) -> Instrument {
        self.base
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    pub fn wallet(&self, instrument: Instrument) -> Option<&Wallet> {
        self.wallets.iter().find(|w| w.instrument() == instrument)
    }

    pub fn wallet_mut(&mut self, instrument: Instrument) -> Result<&mut Wallet> {
        self.wallets
            .iter_mut()
            .find(|w| w.instrument() == instrument)
            .ok_or_else(|| {
                TradeframeError::Validation(format!("no wallet for instrument {instrument}"))
            })
    }

    /// Balance of an instrument across this portfolio (zero if no wallet)
    pub fn balance(&self, instrument: Instrument) -> Decimal {
        self.wallet(instrument)
            .map(|w| w.balance().amount)
            .unwrap_or(Decimal::ZERO)
    }

    /// Total value in base units, pricing every non-base wallet at `price`
    /// (base units per asset unit). The simulation trades one pair, so a
    /// single quote covers all asset wallets.
    pub fn net_worth(&self, price: Decimal) -> Decimal {
        self.wallets
            .iter()
            .map(|w| {
                let amount = w.balance().amount;
                if w.instrument() == self.base {
                    amount
                } else {
                    amount * price
                }
            })
            .sum()
    }

    /// Snapshot of all balances, paired with `restore` for episode resets
    pub(crate) fn snapshot(&self) -> Vec<Quantity> {
        self.wallets.iter().map(|w| w.balance()).collect()
    }

    pub(crate) fn restore(&mut self, snapshot: &[Quantity]) {
        for (wallet, balance) in self.wallets.iter_mut().zip(snapshot) {
            wallet.set_balance(*balance);
        }
    }
}
