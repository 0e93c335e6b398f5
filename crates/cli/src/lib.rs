//! cmdpad CLI Library
//!
//! This crate provides the command-line front end for cmdpad. It is the
//! reference caller workflow for the engine: it loads the command library,
//! collects variable values, gates dangerous commands behind confirmation,
//! selects the execution mode and runs the command, mirroring the session
//! console to stdout.
//!
//! # Architecture
//!
//! - [`cli_args`]: command-line argument parsing
//! - [`parameters`]: `-p name=value` parsing
//! - [`prompts`]: interactive value prompts and the confirmation gate
//!
//! # Examples
//!
//! ```bash
//! # List every command in the library
//! cmdpad --list
//!
//! # Run a command by ID
//! cmdpad deploy -p environment=prod
//!
//! # Force a dev server into tracked background mode and stream its output
//! cmdpad dev-server -b
//! ```

pub mod cli_args;
pub mod parameters;
pub mod prompts;
