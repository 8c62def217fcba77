// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod balances;
pub mod cards;
pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod reports;
pub mod transactions;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::config::Settings;

/// `--user` if given, else the configured default.
pub fn user_id(settings: &Settings, m: &ArgMatches) -> i64 {
    m.get_one::<i64>("user")
        .copied()
        .unwrap_or(settings.default_user)
}

pub(crate) fn required<'a>(m: &'a ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("Missing required argument '{}'", name))
}

/// Parses an optional argument with `parse`, keeping `None` when absent.
pub(crate) fn optional<T, E>(
    m: &ArgMatches,
    name: &str,
    parse: impl FnOnce(&str) -> std::result::Result<T, E>,
) -> Result<Option<T>>
where
    E: std::error::Error + Send + Sync + 'static,
{
    m.get_one::<String>(name)
        .map(|s| parse(s))
        .transpose()
        .with_context(|| format!("Invalid value for '--{}'", name))
}
