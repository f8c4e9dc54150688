//! Texmark - CommonMark with LaTeX math.
//!
//! This binary parses files or stdin and prints the rendered document.
//! Run without input, it prints usage followed by a rendered demo.

mod cli;

use clap::Parser as ClapParser;
use cli::Cli;
use log::{debug, error, info, LevelFilter};
use std::io::{self, Write};
use std::path::Path;

use texmark::{Config, Driver, Result, DEMO_DOCUMENT};

fn main() {
    let cli = <Cli as ClapParser>::parse();

    // Handle --paths flag
    if cli.show_paths {
        cli::show_paths();
        return;
    }

    if cli.list_extensions {
        cli::list_extensions();
        return;
    }

    // Set up logging
    setup_logging(&cli.log_level);
    info!("texmark v{}", env!("CARGO_PKG_VERSION"));

    // Run the main application
    if let Err(e) = run(&cli) {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Set up logging based on the log level argument.
fn setup_logging(level: &str) {
    let filter = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Main application logic.
fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let format = config.render.format;
    let driver = Driver::from_config(&config)?;
    debug!("{:?}, format {}", driver, format);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.files.is_empty() {
        writeln!(out, "{}", cli::usage())?;
        write!(out, "\n==========\n\n")?;
        out.write_all(driver.render_str(DEMO_DOCUMENT, format).as_bytes())?;
    }

    for file in &cli.files {
        let doc = if file == Path::new("-") {
            driver.parse_reader(io::stdin().lock())?
        } else {
            driver.parse_file(file)?
        };
        out.write_all(driver.render(&doc, format).as_bytes())?;
    }

    out.flush()?;
    Ok(())
}

/// Load configuration, then apply the override and command-line flags.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load_with_override(cli.config.as_deref())?;
    cli.apply(&mut config);
    debug!("Loaded config: {:?}", config);
    Ok(config)
}
