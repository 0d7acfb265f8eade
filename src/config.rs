use crate::data::{default_instruments, Instrument, DEFAULT_BASE_URL};
use crate::pipeline::{ChartMode, PriceRange};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const PRICE_CEILING: f64 = 550.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub days: u32,
    pub price_range: PriceRange,
    pub mode: ChartMode,
    pub companies: Vec<String>,
    pub candlestick_company: String,
    pub instruments: Vec<Instrument>,
    pub base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            days: 30,
            price_range: PriceRange::new(0.0, PRICE_CEILING),
            mode: ChartMode::MultiLine,
            companies: ["google", "amazon", "meta", "apple"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            candlestick_company: "apple".to_string(),
            instruments: default_instruments(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Drops selections that name no configured instrument. Day count and
    /// price range are left alone; the pipeline reports them if invalid.
    pub fn sanitized(mut self) -> Self {
        if self.instruments.is_empty() {
            self.instruments = default_instruments();
        }

        let known = |name: &str| self.instruments.iter().any(|i| i.name == name);

        let mut companies: Vec<String> = Vec::new();
        for name in &self.companies {
            if known(name) && !companies.contains(name) {
                companies.push(name.clone());
            }
        }

        if !known(&self.candlestick_company) {
            self.candlestick_company = self.instruments[0].name.clone();
        }

        self.companies = companies;
        self
    }
}

pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".tickerview.json")
}

pub fn load_config(path: &Path) -> AppConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(_) => return AppConfig::default(),
    };

    match serde_json::from_str::<AppConfig>(&contents) {
        Ok(cfg) => cfg.sanitized(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &Path, config: &AppConfig) -> std::io::Result<()> {
    let payload = serde_json::to_string_pretty(config)?;
    std::fs::write(path, payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dashboard() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.days, 30);
        assert_eq!(cfg.price_range, PriceRange::new(0.0, 550.0));
        assert_eq!(cfg.companies, vec!["google", "amazon", "meta", "apple"]);
        assert_eq!(cfg.candlestick_company, "apple");
        assert_eq!(cfg.instruments.len(), 6);
    }

    #[test]
    fn sanitized_drops_unknown_and_duplicate_companies() {
        let cfg = AppConfig {
            companies: vec!["tesla".into(), "meta".into(), "meta".into()],
            candlestick_company: "tesla".into(),
            days: 500,
            ..AppConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.companies, vec!["meta"]);
        assert_eq!(cfg.candlestick_company, "apple");
        assert_eq!(cfg.days, 500);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let cfg: AppConfig = serde_json::from_str(r#"{ "days": 7, "mode": "candlestick" }"#).unwrap();
        assert_eq!(cfg.days, 7);
        assert_eq!(cfg.mode, ChartMode::Candlestick);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let path = std::env::temp_dir().join(format!("tickerview-{}.json", std::process::id()));
        let cfg = AppConfig {
            days: 12,
            companies: vec!["netflix".into()],
            ..AppConfig::default()
        };
        save_config(&path, &cfg).unwrap();
        let loaded = load_config(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("tickerview-does-not-exist.json");
        assert_eq!(load_config(&path), AppConfig::default());
    }
}
