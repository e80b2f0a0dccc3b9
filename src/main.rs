use clap::{Parser, Subcommand};
use image_guard::config::{self, CliOverrides, Mode};
use image_guard::resize::ImageEncoder;
use image_guard::{check, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "image-guard")]
#[command(about = "Image size gate for Git pre-push hooks")]
#[command(long_about = "\
Image size gate for Git pre-push hooks

Scans the configured directories for image files over the size limit and
exits non-zero when any are found, so a pre-push hook can reject the push.
In resize mode, oversized images are shrunk in place first and only files
that could not be brought under the limit block the push.

Configuration lives in image-guard.toml at the repository root; every flag
below overrides the corresponding file setting for one run.

Examples:
  image-guard                          # check with config file / defaults
  image-guard --max-size 500KB         # override the limit
  image-guard -d public,static -e jpg,png,webp
  image-guard --mode resize            # shrink violations in place
  image-guard gen-config > image-guard.toml

Hook setup (.git/hooks/pre-push):
  #!/bin/sh
  exec image-guard")]
#[command(version)]
struct Cli {
    /// Maximum image size (e.g. 1MB, 500KB, 1048576)
    #[arg(short = 's', long)]
    max_size: Option<String>,

    /// Directories to check, comma-separated
    #[arg(short = 'd', long = "dirs", value_delimiter = ',')]
    directories: Option<Vec<String>>,

    /// Extensions to check, comma-separated
    #[arg(short = 'e', long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Oversized-file handling: block or resize
    #[arg(long)]
    mode: Option<Mode>,

    /// Config file path
    #[arg(long, default_value = "image-guard.toml")]
    config: PathBuf,

    /// Emit the result as JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print a stock image-guard.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(Command::GenConfig) = cli.command {
        print!("{}", config::stock_config_toml());
        return ExitCode::SUCCESS;
    }

    let file_config = match config::load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("image-guard: {e}");
            return ExitCode::FAILURE;
        }
    };

    let merged = file_config.merge_cli(&CliOverrides {
        max_size: cli.max_size,
        directories: cli.directories,
        extensions: cli.extensions,
        mode: cli.mode,
    });

    #[cfg(feature = "encoder")]
    let rust_encoder = image_guard::resize::RustEncoder::new();
    #[cfg(feature = "encoder")]
    let encoder: Option<&dyn ImageEncoder> = Some(&rust_encoder);
    #[cfg(not(feature = "encoder"))]
    let encoder: Option<&dyn ImageEncoder> = None;

    let report = check::run(&merged, encoder);

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("image-guard: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        output::print_check_output(&report, &merged);
    }

    if report.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
