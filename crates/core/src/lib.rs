//! cmdpad Core Library
//!
//! This crate provides the execution engine for cmdpad, a command-pad tool
//! that turns parameterized command templates into shell processes the user
//! can watch and cancel.
//!
//! # Key Features
//!
//! - **Command Specs**: JSON-backed command library with typed variables
//! - **Templating**: `{{name}}` placeholder resolution with ordered
//!   placeholder extraction for editors
//! - **Risk Classification**: destructive-command signatures gating a
//!   confirmation step
//! - **Execution Modes**: synchronous capture-and-return, or tracked
//!   background processes with streaming output and cooperative kill
//! - **Session Console**: append-only log of execution events for observer
//!   surfaces
//!
//! # Examples
//!
//! Resolving a template and checking whether it needs confirmation:
//!
//! ```
//! use std::collections::HashMap;
//! use cmdpad_core::command_specs::{Variable, VariableKind};
//! use cmdpad_core::{risk, template};
//!
//! let variables = vec![Variable {
//!     name: "branch".to_string(),
//!     label: "Branch".to_string(),
//!     kind: VariableKind::Text,
//! }];
//! let mut values = HashMap::new();
//! values.insert("branch".to_string(), "main".to_string());
//!
//! let resolved = template::resolve("git push --force origin {{branch}}", &variables, &values);
//! assert_eq!(resolved, "git push --force origin main");
//! assert!(risk::is_dangerous(&resolved));
//! ```

pub mod command_specs;
pub mod config;
pub mod console;
pub mod error;
pub mod library;
pub mod lifecycle;
pub mod mode;
pub mod risk;
pub mod template;
