use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("REPORTBOOK_PORT", "3000"),
            data_dir: try_load("REPORTBOOK_DATA", "data"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        info!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_env() {
        // Process env is shared across tests; only exercise the unset keys.
        let port: u16 = try_load("REPORTBOOK_TEST_UNSET_PORT", "3000");
        assert_eq!(port, 3000);
        let dir: PathBuf = try_load("REPORTBOOK_TEST_UNSET_DATA", "data");
        assert_eq!(dir, PathBuf::from("data"));
    }
}
