//! Command-library loading and validation.
//!
//! The library is a set of JSON files, one per command domain, each holding
//! an ordered array of command specs. The engine only ever reads these
//! files; the library editor (an external surface) owns writes.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use log::debug;

use crate::command_specs::{Category, CommandSpec, Variable, VariableKind};
use crate::error::Error::{
    EmptyId, IdWithColon, IdWithSpace, NonUniqueCommandId, NonUniqueVariableName, NumericId,
};
use crate::error::{Error, Result};

fn get_reader(file_description: &str, path: &str) -> Result<File> {
    match File::open(path) {
        Ok(reader) => Ok(reader),
        Err(e) => Err(Error::io_error(
            file_description.to_string(),
            path.to_string(),
            e,
        )),
    }
}

fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(EmptyId);
    }

    if id.contains(' ') {
        return Err(IdWithSpace(id.to_string()));
    }

    if id.contains(':') {
        return Err(IdWithColon(id.to_string()));
    }

    if id.chars().all(|c| c.is_numeric()) {
        return Err(NumericId(id.to_string()));
    }

    Ok(())
}

fn validate_variables(spec: &CommandSpec, variables: &[Variable]) -> Result<()> {
    let mut names = HashSet::new();

    for variable in variables {
        if !names.insert(variable.name.clone()) {
            return Err(NonUniqueVariableName(
                format!("{spec}"),
                variable.name.clone(),
            ));
        }

        match &variable.kind {
            VariableKind::Text => {}
            VariableKind::Dropdown { options } => {
                if options.is_empty() {
                    return Err(Error::EmptyDropdown(
                        format!("{spec}"),
                        variable.name.clone(),
                    ));
                }
            }
        }
    }

    Ok(())
}

fn validate_specs(specs: &[CommandSpec], seen_ids: &mut HashSet<String>) -> Result<()> {
    for spec in specs {
        validate_id(&spec.id)?;

        if !seen_ids.insert(spec.id.clone()) {
            return Err(NonUniqueCommandId(spec.id.clone()));
        }

        validate_variables(spec, &spec.variables)?;
    }

    Ok(())
}

/// Loads and validates the command specs of a single domain file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the JSON is malformed, the
/// file is empty, or any command/variable fails validation.
pub fn load_command_specs(path: &str) -> Result<Vec<CommandSpec>> {
    let reader = get_reader("command library", path)?;

    let specs: Vec<CommandSpec> = serde_json::from_reader(reader).map_err(|e| {
        Error::json_error(
            "reading".to_string(),
            "command library".to_string(),
            path.to_string(),
            e,
        )
    })?;

    if specs.is_empty() {
        return Err(Error::empty_command_library(path.to_string()));
    }

    let mut seen_ids = HashSet::new();
    validate_specs(&specs, &mut seen_ids)?;

    Ok(specs)
}

/// Loads every domain file present in the library directory, in the fixed
/// category order. Command IDs must be unique across the whole library.
///
/// Missing domain files are skipped; an entirely empty library is an error.
///
/// # Errors
///
/// Returns an error if any present file cannot be read or parsed, any
/// command/variable fails validation, or no commands exist at all.
pub fn load_library(library_dir: &str) -> Result<Vec<CommandSpec>> {
    let mut specs: Vec<CommandSpec> = Vec::new();
    let mut seen_ids = HashSet::new();

    for category in Category::ALL {
        let path = Path::new(library_dir).join(category.file_name());
        if !path.exists() {
            debug!("No {category} library file at {}", path.display());
            continue;
        }

        let path = path.to_string_lossy().to_string();
        let reader = get_reader("command library", &path)?;

        let mut domain_specs: Vec<CommandSpec> =
            serde_json::from_reader(reader).map_err(|e| {
                Error::json_error(
                    "reading".to_string(),
                    "command library".to_string(),
                    path.clone(),
                    e,
                )
            })?;

        validate_specs(&domain_specs, &mut seen_ids)?;
        specs.append(&mut domain_specs);
    }

    if specs.is_empty() {
        return Err(Error::empty_command_library(library_dir.to_string()));
    }

    Ok(specs)
}

/// Finds a command spec by ID.
///
/// # Errors
///
/// Returns [`Error::CommandNotFound`] if no spec carries the ID.
pub fn find_command<'a>(specs: &'a [CommandSpec], command_id: &str) -> Result<&'a CommandSpec> {
    specs
        .iter()
        .find(|spec| spec.id == command_id)
        .ok_or_else(|| Error::CommandNotFound(command_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn spec_with_id(id: &str) -> CommandSpec {
        CommandSpec {
            id: id.to_string(),
            name: format!("Command {id}"),
            template: "echo test".to_string(),
            variables: Vec::new(),
            category: Category::Project,
            requires_confirmation: false,
        }
    }

    #[test]
    fn test_validate_id_valid() {
        assert!(validate_id("valid_id").is_ok());
        assert!(validate_id("test123").is_ok());
        assert!(validate_id("my-command").is_ok());
        assert!(validate_id("_underscore").is_ok());
    }

    #[test]
    fn test_validate_id_empty() {
        assert!(matches!(validate_id(""), Err(EmptyId)));
    }

    #[test]
    fn test_validate_id_with_space() {
        assert!(matches!(validate_id("has space"), Err(IdWithSpace(_))));
    }

    #[test]
    fn test_validate_id_with_colon() {
        assert!(matches!(validate_id("has:colon"), Err(IdWithColon(_))));
    }

    #[test]
    fn test_validate_id_numeric_only() {
        assert!(matches!(validate_id("123"), Err(NumericId(_))));
    }

    #[test]
    fn test_validate_specs_rejects_duplicates() {
        let specs = vec![spec_with_id("one"), spec_with_id("two"), spec_with_id("one")];
        let result = validate_specs(&specs, &mut HashSet::new());
        assert!(matches!(result, Err(NonUniqueCommandId(_))));
    }

    #[test]
    fn test_validate_variables_rejects_duplicate_names() {
        let mut spec = spec_with_id("dup_vars");
        spec.variables = vec![
            Variable {
                name: "target".to_string(),
                label: "Target".to_string(),
                kind: VariableKind::Text,
            },
            Variable {
                name: "target".to_string(),
                label: "Target again".to_string(),
                kind: VariableKind::Text,
            },
        ];

        let result = validate_variables(&spec, &spec.variables);
        assert!(matches!(result, Err(NonUniqueVariableName(_, _))));
    }

    #[test]
    fn test_validate_variables_rejects_empty_dropdown() {
        let mut spec = spec_with_id("empty_dropdown");
        spec.variables = vec![Variable {
            name: "env".to_string(),
            label: "Environment".to_string(),
            kind: VariableKind::Dropdown { options: Vec::new() },
        }];

        let result = validate_variables(&spec, &spec.variables);
        assert!(matches!(result, Err(Error::EmptyDropdown(_, _))));
    }

    #[test]
    fn test_load_command_specs_valid_json() {
        let json = r#"[
            {
                "id": "greet",
                "name": "Greet",
                "template": "echo Hello {{name}}!",
                "variables": [
                    {"name": "name", "label": "Name", "kind": "text"}
                ],
                "category": "project"
            }
        ]"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{json}").unwrap();
        let temp_path = temp_file.path().to_str().unwrap();

        let specs = load_command_specs(temp_path).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].id, "greet");
        assert_eq!(specs[0].variables[0].kind, VariableKind::Text);
        assert!(!specs[0].requires_confirmation);
    }

    #[test]
    fn test_load_command_specs_empty_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "[]").unwrap();
        let temp_path = temp_file.path().to_str().unwrap();

        let result = load_command_specs(temp_path);
        assert!(matches!(result, Err(Error::EmptyCommandLibrary { .. })));
    }

    #[test]
    fn test_load_command_specs_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{{not json").unwrap();
        let temp_path = temp_file.path().to_str().unwrap();

        let result = load_command_specs(temp_path);
        assert!(matches!(result, Err(Error::Json { .. })));
    }

    #[test]
    fn test_load_command_specs_file_not_found() {
        let result = load_command_specs("/this/path/does/not/exist.json");
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_load_library_merges_domains_in_order() {
        let dir = tempfile::tempdir().unwrap();

        std::fs::write(
            dir.path().join("source-control.json"),
            r#"[{"id": "git_status", "name": "Git Status", "template": "git status", "category": "source-control"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("system.json"),
            r#"[{"id": "disk_usage", "name": "Disk Usage", "template": "df -h", "category": "system"}]"#,
        )
        .unwrap();

        let specs = load_library(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].id, "git_status");
        assert_eq!(specs[1].id, "disk_usage");
    }

    #[test]
    fn test_load_library_rejects_cross_file_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();

        std::fs::write(
            dir.path().join("source-control.json"),
            r#"[{"id": "status", "name": "Git Status", "template": "git status", "category": "source-control"}]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("system.json"),
            r#"[{"id": "status", "name": "System Status", "template": "uptime", "category": "system"}]"#,
        )
        .unwrap();

        let result = load_library(dir.path().to_str().unwrap());
        assert!(matches!(result, Err(NonUniqueCommandId(_))));
    }

    #[test]
    fn test_load_library_empty_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_library(dir.path().to_str().unwrap());
        assert!(matches!(result, Err(Error::EmptyCommandLibrary { .. })));
    }

    #[test]
    fn test_find_command() {
        let specs = vec![spec_with_id("one"), spec_with_id("two")];

        assert_eq!(find_command(&specs, "two").unwrap().id, "two");
        assert!(matches!(
            find_command(&specs, "three"),
            Err(Error::CommandNotFound(_))
        ));
    }
}
