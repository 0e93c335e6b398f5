use std::collections::HashMap;
use std::process::ExitCode;

use clap::Parser;
use cmdpad_core::command_specs::{CommandSpec, Variable};
use cmdpad_core::console::{ConsoleEntry, ConsoleSink, EntryKind};
use cmdpad_core::error::Result;
use cmdpad_core::lifecycle::{OutputStream, ProcessEvent, ProcessLifecycleManager};
use cmdpad_core::{config, library, mode, risk, template};
use crossterm::style::Stylize;
use itertools::Itertools;
use log::{debug, info, warn};
use tokio::sync::broadcast::error::RecvError;

use crate::cli_args::Args;

mod cli_args;
mod parameters;
mod prompts;

/// Appends to the session console and mirrors the entry to stdout. The CLI
/// is a single observer surface, so it renders inline instead of consuming
/// the console's subscription channel.
fn emit(console: &ConsoleSink, kind: EntryKind, message: impl Into<String>) {
    let entry = console.append(kind, message);
    render(&entry);
}

fn render(entry: &ConsoleEntry) {
    match entry.kind {
        EntryKind::Command => println!("{}", entry.message.as_str().bold()),
        EntryKind::Info => println!("{}", entry.message),
        EntryKind::Success => println!("{}", entry.message.as_str().dark_green()),
        EntryKind::Warning => println!("{}", entry.message.as_str().dark_yellow()),
        EntryKind::Error => eprintln!("{}", entry.message.as_str().dark_red()),
    }
}

fn list_commands(specs: &[CommandSpec]) {
    for (category, group) in &specs.iter().chunk_by(|spec| spec.category) {
        println!("{}", format!("[{category}]").bold());
        for spec in group {
            println!("  {spec}: {}", spec.template);
        }
    }
}

/// Collects a value for every variable the command declares or references.
/// Values given with `-p` win; the rest are prompted for.
fn collect_values(args: &Args, variables: &[Variable]) -> Result<HashMap<String, String>> {
    let mut values = parameters::parse_named_values(&args.parameters)?;

    for variable in variables {
        if !values.contains_key(&variable.name) {
            let value = prompts::prompt_value(variable)?;
            values.insert(variable.name.clone(), value);
        }
    }

    Ok(values)
}

async fn run_sync(
    manager: &ProcessLifecycleManager,
    console: &ConsoleSink,
    resolved: &str,
    working_directory: Option<&str>,
) -> Result<ExitCode> {
    emit(console, EntryKind::Command, format!("$ {resolved}"));

    let outcome = manager.execute_sync(resolved, working_directory).await?;

    if !outcome.stdout.is_empty() {
        emit(console, EntryKind::Info, outcome.stdout.trim_end());
    }
    if !outcome.stderr.is_empty() {
        emit(console, EntryKind::Error, outcome.stderr.trim_end());
    }

    if outcome.success {
        emit(console, EntryKind::Success, "Command finished successfully");
        Ok(ExitCode::SUCCESS)
    } else {
        emit(
            console,
            EntryKind::Error,
            format!("Command exited with code {:?}", outcome.exit_code),
        );
        Ok(ExitCode::FAILURE)
    }
}

async fn run_background(
    manager: &ProcessLifecycleManager,
    console: &ConsoleSink,
    command_id: &str,
    resolved: &str,
    working_directory: Option<&str>,
) -> Result<ExitCode> {
    // Subscribe before spawning so no early chunk is missed.
    let mut events = manager.subscribe();

    emit(console, EntryKind::Command, format!("$ {resolved}"));
    manager.execute_background(command_id, resolved, working_directory)?;
    emit(
        console,
        EntryKind::Info,
        format!("`{command_id}` running in background; Ctrl-C to stop"),
    );

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(ProcessEvent::Output { command_id: event_id, stream, chunk }) => {
                    if event_id != command_id {
                        continue;
                    }
                    let kind = match stream {
                        OutputStream::Stdout => EntryKind::Info,
                        OutputStream::Stderr => EntryKind::Error,
                    };
                    emit(console, kind, chunk.trim_end());
                }
                Ok(ProcessEvent::Finished { command_id: event_id, exit_code, killed }) => {
                    if event_id != command_id {
                        continue;
                    }
                    return if killed {
                        emit(console, EntryKind::Warning, format!("`{command_id}` killed"));
                        Ok(ExitCode::SUCCESS)
                    } else if exit_code == Some(0) {
                        emit(console, EntryKind::Success, format!("`{command_id}` finished"));
                        Ok(ExitCode::SUCCESS)
                    } else {
                        emit(
                            console,
                            EntryKind::Error,
                            format!("`{command_id}` exited with code {exit_code:?}"),
                        );
                        Ok(ExitCode::FAILURE)
                    };
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Event stream lagged; {missed} events dropped");
                }
                Err(RecvError::Closed) => {
                    warn!("Event channel closed before a terminal event");
                    return Ok(ExitCode::FAILURE);
                }
            },
            _ = tokio::signal::ctrl_c() => {
                emit(console, EntryKind::Warning, format!("Stopping `{command_id}`..."));
                if let Err(error) = manager.kill(command_id) {
                    debug!("Kill after Ctrl-C failed: {error}");
                }
            }
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let library_dir = config::get_library_dir(&args.library_dir);
    debug!("Loading command library from {library_dir}");
    let specs = library::load_library(&library_dir)?;

    if args.list {
        list_commands(&specs);
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command_id) = args.command_id.as_deref() else {
        eprintln!("No command ID given. Use --list to see the library.");
        return Ok(ExitCode::FAILURE);
    };

    let spec = library::find_command(&specs, command_id)?;

    // Placeholders the template uses but never declares still get a prompt.
    let mut variables = spec.variables.clone();
    variables.extend(template::synthesize_variables(&spec.template, &spec.variables));

    let values = collect_values(&args, &variables)?;
    let resolved = template::resolve(&spec.template, &variables, &values);
    let working_directory = config::expand_working_directory(&args.working_directory);

    if args.dry_run {
        println!("{resolved}");
        return Ok(ExitCode::SUCCESS);
    }

    let dangerous = risk::is_dangerous(&resolved);
    if (spec.requires_confirmation || dangerous) && !args.yes {
        if !prompts::confirm_execution(&resolved, dangerous)? {
            println!("Not running.");
            return Ok(ExitCode::SUCCESS);
        }
    } else if dangerous {
        info!("Dangerous command allowed through by --yes: {resolved}");
    }

    let background = args.background || (!args.foreground && mode::is_continuous(&resolved));

    let manager = ProcessLifecycleManager::new();
    let console = ConsoleSink::new();

    if background {
        run_background(
            &manager,
            &console,
            command_id,
            &resolved,
            working_directory.as_deref(),
        )
        .await
    } else {
        run_sync(&manager, &console, &resolved, working_directory.as_deref()).await
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("{}", error.to_string().as_str().dark_red());
            ExitCode::FAILURE
        }
    }
}
