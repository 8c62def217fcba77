// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::month::YearMonth;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Saldo", "saldo"));

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_path: Option<PathBuf>,
    /// First month of the ledger; it never receives an opening balance.
    pub ledger_start: YearMonth,
    /// Last month either cascade writes to.
    pub horizon: YearMonth,
    pub default_user: i64,
    pub labels: Labels,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub opening_balance: String,
    pub invoice_prefix: String,
    /// Caption for the full invoice total shown on shared cards.
    pub invoice_total: String,
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_path: None,
            ledger_start: YearMonth::at(2026, 1),
            horizon: YearMonth::at(2030, 12),
            default_user: 1,
            labels: Labels::default(),
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            opening_balance: "Opening Balance".into(),
            invoice_prefix: "Previsão CC".into(),
            invoice_total: "Fatura Total".into(),
            currency_symbol: "R$".into(),
        }
    }
}

impl Settings {
    /// Defaults, then the TOML file (if any), then `SALDO_*` environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut settings = match config_file_path() {
            Some(p) if p.exists() => Self::from_file(&p)?,
            _ => Settings::default(),
        };
        settings.apply_env()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let contents = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(db) = env::var("SALDO_DB") {
            self.database_path = Some(PathBuf::from(db));
        }
        if let Ok(h) = env::var("SALDO_HORIZON") {
            self.horizon = h.parse()?;
        }
        if let Ok(s) = env::var("SALDO_START") {
            self.ledger_start = s.parse()?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.ledger_start > self.horizon {
            return Err(Error::Config(format!(
                "ledger_start {} is after horizon {}",
                self.ledger_start, self.horizon
            )));
        }
        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        if let Some(p) = &self.database_path {
            return Ok(p.clone());
        }
        let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
            .ok_or_else(|| Error::Config("Could not determine platform-specific data dir".into()))?;
        let data_dir = proj.data_dir();
        fs::create_dir_all(data_dir)
            .map_err(|e| Error::Config(format!("Failed to create data dir: {}", e)))?;
        Ok(data_dir.join("saldo.sqlite"))
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(p) = env::var("SALDO_CONFIG") {
        return Some(PathBuf::from(p));
    }
    ProjectDirs::from(APP.0, APP.1, APP.2).map(|p| p.config_dir().join("saldo.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let s: Settings = toml::from_str(
            r#"
            horizon = "2027-06"
            [labels]
            opening_balance = "Saldo Inicial"
            "#,
        )
        .unwrap();
        assert_eq!(s.horizon.to_string(), "2027-06");
        assert_eq!(s.ledger_start.to_string(), "2026-01");
        assert_eq!(s.labels.opening_balance, "Saldo Inicial");
        assert_eq!(s.labels.invoice_prefix, "Previsão CC");
    }

    #[test]
    fn start_after_horizon_is_rejected() {
        let s = Settings {
            ledger_start: "2031-01".parse().unwrap(),
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }
}
