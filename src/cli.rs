//! Command-line interface definitions for the European Parliament harvester.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables.

use clap::Parser;

/// Command-line arguments for the harvester.
///
/// This struct defines all configuration options that can be passed to the
/// application at runtime. Options include the output directory and the
/// Hugging Face credentials used when publishing datasets.
///
/// # Examples
///
/// ```sh
/// # Basic usage with required arguments
/// europarl_harvest -o ./datasets
///
/// # With Hugging Face credentials
/// europarl_harvest -o ./datasets --hf-username my-user --hf-token hf_xxx
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the JSONL dataset shards
    #[arg(short, long)]
    pub output_dir: String,

    /// Hugging Face username that owns the published datasets
    #[arg(long, env = "HF_USERNAME", default_value = "YOUR_HUGGINGFACE_USERNAME")]
    pub hf_username: String,

    /// Hugging Face access token (publication is skipped when unset)
    #[arg(long, env = "HF_TOKEN")]
    pub hf_token: Option<String>,
}
