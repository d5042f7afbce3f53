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

//! Setup of the tracing subscriber of the `summarize` binary.

use std::{
    fs::{File, OpenOptions},
    io,
    panic::PanicInfo,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{error, Dispatch};
use tracing_subscriber::{
    filter::LevelFilter,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

/// Log levels in config files, eg `level = "debug"`.
mod level_serde {
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};
    use tracing_subscriber::filter::LevelFilter;

    #[allow(clippy::trivially_copy_pass_by_ref)] // required by serde
    pub(super) fn serialize<S>(level: &LevelFilter, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        level.to_string().serialize(serializer)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<LevelFilter, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level = String::deserialize(deserializer)?;
        level.parse().map_err(D::Error::custom)
    }
}

#[derive(Debug, Deserialize, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Log additionally to this file, it is truncated on startup.
    pub file: Option<PathBuf>,
    /// Events below this level are discarded.
    #[serde(with = "level_serde")]
    pub level: LevelFilter,
    /// Log panics as errors before the default panic output.
    pub install_panic_hook: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: None,
            level: LevelFilter::WARN,
            install_panic_hook: true,
        }
    }
}

/// Installs the global subscriber.
///
/// The summary is the only output on stdout, so it can be piped into other tools. All events go
/// as json lines to stderr and, if configured, to the log file.
///
/// Fails if a global subscriber is already installed.
pub fn initialize_global(config: &Config) -> Result<(), TryInitError> {
    subscriber(config).try_init()?;
    if config.install_panic_hook {
        std::panic::set_hook(Box::new(log_panic));
    }

    Ok(())
}

fn subscriber(config: &Config) -> Dispatch {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_writer(io::stderr);
    let file_layer = config.file.as_deref().and_then(open_log_file).map(|file| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(file)
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .with(config.level)
        .into()
}

/// Opens the log file, a failure only disables the file logging.
fn open_log_file(path: &Path) -> Option<File> {
    OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)
        .map_err(|error| eprintln!("Failed to open log file {}: {error}", path.display()))
        .ok()
}

fn log_panic(panic: &PanicInfo<'_>) {
    match panic.location() {
        Some(location) => error!(
            message = %panic,
            panic.file = location.file(),
            panic.line = location.line(),
        ),
        None => error!(message = %panic),
    }
}
