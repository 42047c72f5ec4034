// Copyright 2026 Hector Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

use crate::aggregate::DEFAULT_PREFIX;

#[derive(Parser, Debug)]
#[command(
    name = "hector",
    version,
    about = "Discover, score, and categorize open-source healthcare repositories"
)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a starter hector.toml
    Init {
        /// Directory to write the config into
        path: Option<PathBuf>,
    },

    /// Search, score, categorize, and render a report
    Scan(ScanArgs),

    /// Re-run categorization over existing reports
    Recategorize(RecategorizeArgs),

    /// Copy the newest dated report to the stable path
    Aggregate(AggregateArgs),

    /// Generate Shields.io endpoint badges from a report
    Badges(BadgesArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to the config file
    #[arg(long, default_value = "hector.toml")]
    pub config: PathBuf,

    /// Maximum number of repositories to collect
    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    /// Validate the config and exit without network access
    #[arg(long, conflicts_with = "live")]
    pub dry_run: bool,

    /// Force a live run even if the config sets dry_run
    #[arg(long)]
    pub live: bool,

    /// Report path (overrides output.file)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct RecategorizeArgs {
    /// Report files to rewrite
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Path to the config file
    #[arg(long, default_value = "hector.toml")]
    pub config: PathBuf,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Directory holding dated reports
    #[arg(long, default_value = "result")]
    pub dir: PathBuf,

    /// Destination (defaults to <dir>/<prefix>.md)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Report file name prefix
    #[arg(long, default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BadgesArgs {
    /// Report to read scores from
    #[arg(long, default_value = "result/healthtech-tools.md")]
    pub input: PathBuf,

    /// Directory for badge JSON files
    #[arg(long, default_value = "docs")]
    pub docs_dir: PathBuf,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}
