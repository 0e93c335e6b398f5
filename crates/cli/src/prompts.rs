//! Interactive prompts: variable values and the danger confirmation gate.

use std::io::{stdin, stdout, Write};

use cmdpad_core::command_specs::{Variable, VariableKind};
use cmdpad_core::error::Result;
use crossterm::style::Stylize;

fn read_line() -> Result<String> {
    let mut input = String::new();
    stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Prompts the user for one variable's value.
///
/// Text variables accept free input (an empty line resolves to the empty
/// string, matching the engine's missing-value policy). Dropdown variables
/// present a numbered choice and loop until a valid selection is made.
pub fn prompt_value(variable: &Variable) -> Result<String> {
    match &variable.kind {
        VariableKind::Text => {
            print!("Value for {variable}: ");
            stdout().flush()?;
            read_line()
        }
        VariableKind::Dropdown { options } => loop {
            println!("Choose a value for {variable}:");
            for (index, option) in options.iter().enumerate() {
                println!("  [{}] {option}", index + 1);
            }
            print!("Selection (1-{}): ", options.len());
            stdout().flush()?;

            let input = read_line()?;
            if let Ok(selection) = input.parse::<usize>() {
                if (1..=options.len()).contains(&selection) {
                    return Ok(options[selection - 1].clone());
                }
            }

            println!("{}", "Not a valid selection.".dark_yellow());
        },
    }
}

/// Asks the user to confirm a command before it runs. `dangerous` switches
/// the prompt to the red warning variant used for destructive commands.
pub fn confirm_execution(resolved_command: &str, dangerous: bool) -> Result<bool> {
    if dangerous {
        println!(
            "{} {}",
            "This command is flagged as destructive:".dark_red(),
            resolved_command.bold()
        );
    } else {
        println!("About to run: {}", resolved_command.bold());
    }

    loop {
        print!("Are you sure you want to run? ([y]es/[N]o): ");
        stdout().flush()?;

        match read_line()?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => {}
        }
    }
}
