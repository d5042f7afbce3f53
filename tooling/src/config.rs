// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::path::Path;

use displaydoc::Display;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{cache, logging, source};

/// Prefix of the environment variables of the config.
pub const ENV_PREFIX: &str = "XAYN_SUMMARIZER__";

#[derive(Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub logging: logging::Config,
    pub summarizer: xayn_summarizer::Config,
    pub cache: cache::Config,
    pub source: source::Config,
}

/// Errors of the application configuration.
#[derive(Debug, Display, Error)]
pub enum ConfigError {
    /// Invalid summarizer configuration: {0}
    Summarizer(#[from] xayn_summarizer::ConfigError),
    /// Invalid characters per page, expected positive value
    CharsPerPage,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.summarizer.validate()?;
        if self.source.chars_per_page == 0 {
            return Err(ConfigError::CharsPerPage);
        }

        Ok(())
    }
}

/// Loads the configuration.
///
/// # Load order/priority
///
/// This will by ascending priority load:
///
/// 1. `./config.toml` or the `config` file
/// 2. `./.env`
/// 3. `./.env.local`
/// 4. process environment
/// 5. options passed through `update_with`
///
/// Config values loaded from higher priority sources override such from lower
/// priority sources. E.g. values defined in `update_with` override values
/// from any other source.
///
/// The `config` is either a path or an inline toml configuration prefixed with `inline:`.
///
/// # Env and .env
///
/// Environment variables from `.env` and `.env.local` will be loaded into the process
/// environment if they don't already exist there (keeping priority as described above).
///
/// Only environment variables with the [`ENV_PREFIX`] are considered, split at `__`. I.e.
/// `XAYN_SUMMARIZER__SUMMARIZER__CHUNK_SIZE=1000` will be treated like the json
/// `{ "summarizer": { "chunk_size": 1000 } }` wrt. deserializing the config.
pub fn load_config<U>(config: Option<&str>, update_with: U) -> Result<AppConfig, figment::Error>
where
    U: Serialize,
{
    // the order must be from highest to lowest priority
    load_dotenv(".env.local")?;
    load_dotenv(".env")?;

    let figment = Figment::new()
        .join(Serialized::defaults(update_with))
        .join(Env::prefixed(ENV_PREFIX).split("__"));

    let provider = if let Some(content_or_path) = config {
        if let Some(content) = content_or_path.strip_prefix("inline:") {
            Toml::string(content)
        } else {
            let path = Path::new(content_or_path);
            if path.is_file() {
                Toml::file(path)
            } else {
                return Err(figment::Error::from(format!(
                    "Config file missing or not a file: {}",
                    path.display()
                )));
            }
        }
    } else {
        // doesn't fail if there is no config file
        Toml::file("config.toml")
    };

    figment.join(provider).extract()
}

fn load_dotenv(file_name: &str) -> Result<(), figment::Error> {
    match dotenvy::from_filename(file_name) {
        Err(error) if !error.not_found() => {
            Err(figment::Error::from(error.to_string()).with_path(file_name))
        }
        _ => Ok(()),
    }
}
