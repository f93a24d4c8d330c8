//! Output generation for harvested record sets.
//!
//! This module contains the submodule responsible for persisting each
//! source's records once its harvest completes:
//!
//! # Submodules
//!
//! - [`dataset`]: Writes per-source record batches as dated JSON Lines shards
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── {hf_username}/
//!     ├── Dutch-European-Parliament-Adopted-Texts/
//!     │   └── 2026-08-21.jsonl
//!     ├── Dutch-European-Parliament-Minutes/
//!     │   └── 2026-08-21.jsonl
//!     └── Dutch-European-Parliament-Verbatim-Reports/
//!         └── 2026-08-21.jsonl
//! ```

pub mod dataset;
