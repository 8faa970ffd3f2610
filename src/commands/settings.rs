// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{SETTING_KEYS, currency_symbol, get_setting, set_setting};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

fn known_key(raw: &str) -> Result<&'static str> {
    let key = raw.trim();
    SETTING_KEYS
        .into_iter()
        .find(|k| k.eq_ignore_ascii_case(key))
        .ok_or_else(|| {
            anyhow!(
                "Unknown setting '{}' (known: {})",
                key,
                SETTING_KEYS.join(", ")
            )
        })
}

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = known_key(sub.get_one::<String>("key").unwrap())?;
            let value = match get_setting(conn, key)? {
                Some(v) => v,
                None => currency_symbol(conn)?,
            };
            println!("{} = {}", key, value);
        }
        Some(("set", sub)) => {
            let key = known_key(sub.get_one::<String>("key").unwrap())?;
            let value = sub.get_one::<String>("value").unwrap().trim();
            if value.is_empty() {
                return Err(anyhow!("Value for '{}' must not be empty", key));
            }
            set_setting(conn, key, value)?;
            tracing::info!(key, value, "updated setting");
            println!("Set {} = {}", key, value);
        }
        _ => {}
    }
    Ok(())
}
