use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub symbol: String,
}

impl Instrument {
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
        }
    }
}

/// Ordered name <-> symbol mapping. Names and symbols are each unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentSet {
    instruments: Vec<Instrument>,
}

impl InstrumentSet {
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, DashboardError> {
        if instruments.is_empty() {
            return Err(DashboardError::PreconditionViolation(
                "instrument set is empty".to_string(),
            ));
        }

        let mut names = HashSet::new();
        let mut symbols = HashSet::new();
        for instrument in &instruments {
            if !names.insert(instrument.name.as_str()) {
                return Err(DashboardError::PreconditionViolation(format!(
                    "duplicate instrument name {}",
                    instrument.name
                )));
            }
            if !symbols.insert(instrument.symbol.as_str()) {
                return Err(DashboardError::PreconditionViolation(format!(
                    "duplicate ticker symbol {}",
                    instrument.symbol
                )));
            }
        }

        Ok(Self { instruments })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instrument> {
        self.instruments.iter()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.instruments.iter().map(|i| i.symbol.clone()).collect()
    }

    pub fn symbol_of(&self, name: &str) -> Option<&str> {
        self.instruments
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.symbol.as_str())
    }

    pub fn name_of(&self, symbol: &str) -> Option<&str> {
        self.instruments
            .iter()
            .find(|i| i.symbol == symbol)
            .map(|i| i.name.as_str())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.symbol_of(name).is_some()
    }
}

pub fn default_instruments() -> Vec<Instrument> {
    vec![
        Instrument::new("apple", "AAPL"),
        Instrument::new("meta", "META"),
        Instrument::new("google", "GOOGL"),
        Instrument::new("microsoft", "MSFT"),
        Instrument::new("netflix", "NFLX"),
        Instrument::new("amazon", "AMZN"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_work_both_ways() {
        let set = InstrumentSet::new(default_instruments()).unwrap();
        assert_eq!(set.symbol_of("google"), Some("GOOGL"));
        assert_eq!(set.name_of("NFLX"), Some("netflix"));
        assert_eq!(set.symbol_of("tesla"), None);
        assert_eq!(set.iter().count(), 6);
    }

    #[test]
    fn rejects_duplicate_names_and_symbols() {
        let dup_name = vec![Instrument::new("apple", "AAPL"), Instrument::new("apple", "MSFT")];
        assert!(matches!(
            InstrumentSet::new(dup_name),
            Err(DashboardError::PreconditionViolation(_))
        ));

        let dup_symbol = vec![Instrument::new("apple", "AAPL"), Instrument::new("apple2", "AAPL")];
        assert!(matches!(
            InstrumentSet::new(dup_symbol),
            Err(DashboardError::PreconditionViolation(_))
        ));
    }

    #[test]
    fn rejects_empty_set() {
        assert!(InstrumentSet::new(Vec::new()).is_err());
    }
}
