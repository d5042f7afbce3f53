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

//! Summarizes a text file.

#![forbid(unsafe_code, unsafe_op_in_unsafe_fn)]
#![deny(
    clippy::pedantic,
    noop_method_call,
    rust_2018_idioms,
    unused_qualifications
)]
#![warn(unreachable_pub, rustdoc::missing_crate_level_docs)]

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use xayn_summarizer::CancellationToken;
use xayn_summarizer_tooling::{
    build_summarizer,
    cache::{self, SingleFlight},
    cli::Args,
    config::load_config,
    logging,
    render,
    source::Document,
    summarize_document,
};

fn main() -> Result<()> {
    let mut args = Args::parse();
    let config = load_config(args.config.take().as_deref(), args.to_config_overrides())?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    config.validate()?;
    logging::initialize_global(&config.logging)?;

    let file = args.file.context("missing text file")?;
    let summarizer = build_summarizer(
        &config.summarizer,
        args.embeddings.as_deref(),
        args.tagger.as_deref(),
    )?;
    let document = Document::read(&file, args.pages, &config.source)
        .with_context(|| format!("failed to read {}", file.display()))?;
    debug!(pages = document.pages, key = %document.key, "read document");

    let cache = SingleFlight::new(cache::open(&config.cache)?);
    let summary = summarize_document(&summarizer, &cache, document, &CancellationToken::new())?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render(&summary));
    }

    Ok(())
}
