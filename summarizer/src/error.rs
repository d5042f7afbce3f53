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

use displaydoc::Display;
use thiserror::Error;

use crate::config::ConfigError;

/// Signals of the adaptive summary which are not a summary.
///
/// Empty or very short texts are not errors, they yield empty or trivial summaries.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// The summary was cancelled
    Cancelled,
    /// The text is likely extracted from images and needs OCR first
    NeedsOcr,
    /// Invalid summarizer configuration: {0}
    InvalidConfig(#[from] ConfigError),
}
