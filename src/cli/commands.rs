use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, Script, ScriptRunner};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::render::TreeRender;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run { script }) => _run(script, &load_settings(cli)?),
        Some(Commands::Check { script }) => _check(script),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => _config_show(&load_settings(cli)?),
            ConfigCommands::Path => _config_path(cli),
        },
        Some(Commands::Completion { shell }) => _completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see `hierarchy --help`".to_string(),
        )),
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!(?settings, "settings loaded");
    Ok(settings)
}

#[instrument(skip(settings))]
fn _run(path: &Path, settings: &Settings) -> CliResult<()> {
    let script = Script::load(path)?;
    let options = settings.render_options();

    let mut runner = ScriptRunner::new();
    runner.setup(&script.setup)?;
    if settings.output.tree {
        output::header("before");
        output::info(runner.document().store().to_tree_string(&options));
    }

    let actions = runner.run_batch(&script.batch)?;
    if settings.output.actions {
        output::header(format!("actions ({})", actions.len()));
        for action in &actions {
            output::action_line(action);
        }
    }
    if settings.output.tree {
        output::header("after");
        output::info(runner.document().store().to_tree_string(&options));
    }
    Ok(())
}

#[instrument]
fn _check(path: &Path) -> CliResult<()> {
    let script = Script::load(path)?;
    let outcome = ScriptRunner::run(&script)?;
    let store = outcome.document.store();
    store.validate().map_err(ApplicationError::from)?;
    output::success(format!(
        "{} items, depth {}, {} actions",
        store.len(),
        store.depth(),
        outcome.actions.len()
    ));
    Ok(())
}

fn _config_show(settings: &Settings) -> CliResult<()> {
    output::info(settings.to_toml()?);
    Ok(())
}

fn _config_path(cli: &Cli) -> CliResult<()> {
    match global_config_path() {
        Some(path) if path.exists() => output::action("global", path.display()),
        Some(path) => output::detail(format!("global: {} (not found)", path.display())),
        None => output::warning("no config directory available"),
    }
    if let Some(path) = &cli.config {
        output::action("explicit", path.display());
    }
    Ok(())
}

fn _completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
