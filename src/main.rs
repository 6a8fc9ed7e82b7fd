use attrform::app::AttrFormApp;
use attrform::app::app_events::OpenDocumentEvent;
use attrform::cli::Args;
use attrform::config;

use clap::Parser;
use eframe::egui;
use log::{debug, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments first (needed for log setup)
    let args = Args::parse();

    // Create path configuration from CLI args and environment
    let path_config = config::PathConfig::from_env_and_cli(args.config_dir.clone());

    // Ensure directories exist
    if let Err(e) = config::ensure_dirs(&path_config) {
        eprintln!("Warning: Failed to create application directories: {}", e);
    }

    // Determine log level based on verbosity flags
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    // Initialize logger based on --log flag
    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .as_ref()
            .cloned()
            .unwrap_or_else(|| config::data_file(config::LOG_FILE, &path_config));

        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!(
            "Logging to file: {} (level: {:?})",
            log_path.display(),
            log_level
        );
    } else {
        // Console logging with specified verbosity level (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .format_timestamp_millis()
            .init();
    }

    info!("AttrForm starting...");
    debug!("Command-line args: {:?}", args);

    let state_path = config::config_file(config::STATE_FILE, &path_config);
    info!("Config path: {}", state_path.display());

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!("AttrForm v{}", env!("CARGO_PKG_VERSION")))
            .with_inner_size([960.0, 640.0])
            .with_resizable(true),
        persist_window: true,
        persistence_path: Some(state_path),
        ..Default::default()
    };

    let path_config_for_app = path_config.clone();

    eframe::run_native(
        "AttrForm",
        native_options,
        Box::new(move |cc| {
            // Load persisted app state if available, otherwise create default
            let mut app: AttrFormApp = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| AttrFormApp::from_state_json(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted state found, creating default app");
                    AttrFormApp::default()
                });

            // Recreate worker pool with CLI/settings override if specified
            let desired_workers = args.workers.or(if app.settings.workers_override > 0 {
                Some(app.settings.workers_override as usize)
            } else {
                None
            });
            if let Some(num_workers) = desired_workers {
                app.set_workers(num_workers);
            }

            app.path_config = path_config_for_app;

            // Open the CLI document on the first frame
            if let Some(path) = args.file_path.clone() {
                info!("Input file: {}", path.display());
                app.event_bus.emit(OpenDocumentEvent(Some(path)));
            }

            Ok(Box::new(app))
        }),
    )?;

    Ok(())
}
