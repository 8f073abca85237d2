use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tsdual_driver::{compile, locate_config, BuildError, BuildSettings, Progress};

#[derive(Parser)]
#[command(
    name = "tsdual",
    version,
    about = "Compile TypeScript projects to CommonJS and ES modules",
    long_about = "Compiles a TypeScript project, or a tree of project references, to CommonJS\n\
                  `.js` files in its outDir and to ES module `.mjs` files in a sibling `es` directory."
)]
struct Cli {
    /// Path to the root tsconfig.json (or its directory)
    #[arg(short = 'c', long = "config-file")]
    config_file: Option<PathBuf>,

    /// Do not make the default export the CommonJS root export
    #[arg(short = 'R', long = "no-cjs-root-export")]
    no_cjs_root_export: bool,

    /// Remove previous outputs before building
    #[arg(long)]
    clean: bool,

    /// Build project references incrementally, skipping up-to-date projects
    #[arg(long)]
    incremental: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = error
                .downcast_ref::<BuildError>()
                .map(BuildError::exit_code)
                .unwrap_or(1);
            eprintln!("{}", error);
            eprintln!("Process exiting with error code '{}'.", code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("Could not read the working directory")?;
    let config_path = locate_config(cli.config_file.as_deref(), &cwd)?;
    let settings = BuildSettings {
        use_cjs_transformers: !cli.no_cjs_root_export,
        clean: cli.clean,
        incremental: cli.incremental,
    };
    compile(&config_path, settings, &Progress::new())?;
    Ok(())
}
