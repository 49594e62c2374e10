use clap::Parser;

use picam_hq::cli::{self, Args, Command, CommandError};
use picam_hq::config::{Config, Settings};
use picam_hq::signal;

fn init_logging(args: &Args) {
    env_logger::Builder::new()
        .filter_level(args.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run(args: Args) -> Result<(), CommandError> {
    // If --config is specified, require the file to exist.
    // Otherwise, fall back to defaults if the default config is not found.
    let cfg = match args.config.as_deref() {
        Some(path) => Config::load_from_explicit(path)?,
        None => Config::load(None).unwrap_or_else(|e| {
            eprintln!("Warning: {}", e);
            eprintln!("Using default settings.\n");
            Config::default()
        }),
    };
    let settings = Settings::resolve(&cfg, &args.overrides())?;
    log::debug!("resolved settings: {:?}", settings);

    let mut stdout = std::io::stdout();
    match args.command {
        Some(Command::ListCameras) => cli::list_cameras(&settings, &mut stdout),
        Some(Command::Info) => cli::show_info(&settings, &mut stdout),
        Some(Command::Capture { mode }) => cli::capture_once(&settings, mode.into(), &mut stdout),
        Some(Command::Config { action }) => {
            cli::handle_config_action(action, args.config.as_deref(), &settings, &mut stdout)
        }
        None => cli::run_interactive(&settings),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(&args);

    if let Err(e) = signal::setup_ctrlc_handler() {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
