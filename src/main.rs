use clap::Parser;

use revpace::adapter::inbound::cli::command::{Cli, ColorChoice, Commands, ConfigCommand};
use revpace::adapter::inbound::cli::context::Context;
use revpace::adapter::inbound::cli::output::{self, OutputConfig};
use revpace::adapter::inbound::cli::{
    config, curve, forecast, import, kpi, pace, paths, pickup, snapshots,
};
use revpace::error::Result;
use revpace::infrastructure::config::logging::LoggingConfig;

fn apply_color(choice: &ColorChoice) {
    match choice {
        ColorChoice::Auto => {}
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

fn context(cli: &Cli) -> Result<Context> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend.into();
    }
    if let Some(store) = &cli.store {
        config.storage.path = Some(store.clone());
    }
    config
        .logging
        .clone()
        .with_verbosity(cli.verbose, cli.quiet)
        .init();
    tracing::debug!(config = %cli.config.display(), backend = %config.storage.backend, "configuration loaded");
    Context::new(config, paths::home_dir())
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Config(command) => {
            LoggingConfig::default()
                .with_verbosity(cli.verbose, cli.quiet)
                .init();
            match command {
                ConfigCommand::Init(args) => config::execute_init(&cli.config, args.force),
                ConfigCommand::Show => config::execute_show(&cli.config),
                ConfigCommand::Validate => config::execute_validate(&cli.config),
            }
        }
        Commands::Import(args) => import::execute(&context(cli)?, args),
        Commands::Pickup(args) => pickup::execute(&context(cli)?, args),
        Commands::Curve(args) => curve::execute(&context(cli)?, args),
        Commands::Snapshots => snapshots::execute(&context(cli)?),
        Commands::Forecast(args) => forecast::execute(&context(cli)?, args),
        Commands::Kpi(args) => {
            context(cli)?;
            kpi::execute(args)
        }
        Commands::Pace(args) => {
            context(cli)?;
            pace::execute(args)
        }
    }
}

fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    apply_color(&cli.color);
    output::configure(OutputConfig::new(cli.json, cli.quiet, cli.verbose));

    if let Err(e) = run(&cli) {
        output::error(&e.to_string());
        if e.is_recoverable() {
            output::hint("nothing was changed, the command can be retried as is");
        }
        std::process::exit(1);
    }
}
