//! Parsing of `-p name=value` arguments into a value lookup.

use std::collections::HashMap;

use cmdpad_core::error::{Error, Result};

/// Parses repeated `name=value` arguments. Later duplicates win, so a value
/// can be overridden on the same command line.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] when an argument has no `=` or an
/// empty name.
pub fn parse_named_values(parameters: &[String]) -> Result<HashMap<String, String>> {
    let mut values = HashMap::new();

    for parameter in parameters {
        let Some((name, value)) = parameter.split_once('=') else {
            return Err(Error::InvalidParameter(parameter.clone()));
        };

        if name.is_empty() {
            return Err(Error::InvalidParameter(parameter.clone()));
        }

        values.insert(name.to_string(), value.to_string());
    }

    Ok(values)
}
