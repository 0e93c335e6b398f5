//! Configuration path utilities.
//!
//! Resolves the command-library directory and expands shell variables like
//! `~` in paths.

/// Default directory holding the per-domain command library files
const DEFAULT_LIBRARY_DIR: &str = "~/.cmdpad";

/// Shell used to run resolved command strings
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Resolves the command-library directory.
///
/// If a custom directory is provided, uses that. Otherwise, uses the default
/// library directory. Shell expansions like `~` are resolved.
pub fn get_library_dir(library_dir_arg: &Option<String>) -> String {
    let library_dir = match library_dir_arg {
        Some(library_dir) => library_dir,
        None => DEFAULT_LIBRARY_DIR,
    };

    shellexpand::tilde(library_dir).to_string()
}

/// Expands shell variables in a working directory path.
///
/// Returns None if no working directory is provided.
pub fn expand_working_directory(working_directory: &Option<String>) -> Option<String> {
    working_directory
        .as_ref()
        .map(|working_directory| shellexpand::tilde(working_directory).to_string())
}
