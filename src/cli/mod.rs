//! CLI module for sioprobe.
//!
//! Flags seed the interactive form; everything can still be edited once the
//! UI is up.
//!
//! ```ignore
//! use clap::Parser;
//! use sioprobe::cli::Args;
//!
//! let args = Args::parse();
//! let config = args.client_config();
//! ```

pub mod args;

pub use args::Args;
