use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// How a variable's value is collected from the user.
///
/// This is a closed set: resolution and rendering code match on it
/// exhaustively, so adding a kind forces every boundary to handle it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VariableKind {
    Text,
    Dropdown { options: Vec<String> },
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: VariableKind,
}

impl Variable {
    /// Builds a text variable for a placeholder that has no declared
    /// definition, using the capitalized identifier as its label.
    pub fn synthesized(name: &str) -> Self {
        let mut label = String::with_capacity(name.len());
        let mut chars = name.chars();
        if let Some(first) = chars.next() {
            label.extend(first.to_uppercase());
            label.push_str(chars.as_str());
        }

        Self {
            name: name.to_string(),
            label,
            kind: VariableKind::Text,
        }
    }
}

impl Display for Variable {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "`{}`", self.name)?;

        if self.label != self.name {
            write!(formatter, " ({})", self.label)?;
        }

        Ok(())
    }
}

/// Command domain. Each domain has its own library file and its own set of
/// destructive-command signatures.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SourceControl,
    System,
    Project,
    Prompt,
}

impl Category {
    /// All categories, in the order library files are loaded and commands
    /// are listed.
    pub const ALL: [Category; 4] = [
        Category::SourceControl,
        Category::System,
        Category::Project,
        Category::Prompt,
    ];

    /// File name of this category's library file.
    pub fn file_name(self) -> &'static str {
        match self {
            Category::SourceControl => "source-control.json",
            Category::System => "system.json",
            Category::Project => "project.json",
            Category::Prompt => "prompt.json",
        }
    }
}

impl Display for Category {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Category::SourceControl => "source-control",
            Category::System => "system",
            Category::Project => "project",
            Category::Prompt => "prompt",
        };
        formatter.write_str(name)
    }
}

/// A named, parameterized command template plus metadata.
///
/// Immutable during a single execution; the library editor owns mutation.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct CommandSpec {
    pub id: String,
    pub name: String,
    /// Command text with `{{name}}` placeholders.
    pub template: String,
    #[serde(default)]
    pub variables: Vec<Variable>,
    pub category: Category,
    #[serde(default)]
    pub requires_confirmation: bool,
}

impl Display for CommandSpec {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            formatter.write_str(&self.id)
        } else {
            write!(formatter, "{} ({})", self.name, self.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthesized_variable_capitalizes_label() {
        let variable = Variable::synthesized("branch");
        assert_eq!(variable.name, "branch");
        assert_eq!(variable.label, "Branch");
        assert_eq!(variable.kind, VariableKind::Text);
    }

    #[test]
    fn test_variable_kind_round_trips_dropdown_options() {
        let json = r#"{"name":"env","label":"Environment","kind":"dropdown","options":["dev","prod"]}"#;
        let variable: Variable = serde_json::from_str(json).unwrap();

        match &variable.kind {
            VariableKind::Dropdown { options } => {
                assert_eq!(options, &vec!["dev".to_string(), "prod".to_string()]);
            }
            VariableKind::Text => panic!("expected dropdown"),
        }
    }

    #[test]
    fn test_category_kebab_case_serde() {
        let category: Category = serde_json::from_str(r#""source-control""#).unwrap();
        assert_eq!(category, Category::SourceControl);
        assert_eq!(
            serde_json::to_string(&Category::SourceControl).unwrap(),
            r#""source-control""#
        );
    }

    #[test]
    fn test_command_spec_display() {
        let spec = CommandSpec {
            id: "git_status".to_string(),
            name: "Git Status".to_string(),
            template: "git status".to_string(),
            variables: Vec::new(),
            category: Category::SourceControl,
            requires_confirmation: false,
        };
        assert_eq!(format!("{spec}"), "Git Status (git_status)");

        let unnamed = CommandSpec {
            name: String::new(),
            ..spec
        };
        assert_eq!(format!("{unnamed}"), "git_status");
    }
}
