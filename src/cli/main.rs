use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use exiftool_decode::exif::Exif;
use exiftool_decode::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exiftool-decode",
    version,
    about = "Print capture time, lens/exposure settings, and GPS coordinates of images using exiftool"
)]
struct Cli {
    /// Image files or directories to decode
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Decode a single image streamed on standard input
    #[arg(long, conflicts_with = "paths")]
    stdin: bool,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// exiftool executable to run (overrides config)
    #[arg(long, value_name = "PATH")]
    exiftool: Option<String>,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Load config
    let mut config = config::Config::load(cli.config.as_deref())?;

    if let Some(exiftool) = cli.exiftool {
        config.exiftool.path = exiftool;
    }
    if cli.json {
        config.output.json = true;
    }

    let decoder = config.decoder();

    let results = if cli.stdin {
        vec![pipeline::decode_stdin(&decoder).await]
    } else {
        if cli.paths.is_empty() {
            anyhow::bail!("No input files or directories specified. Use --help for usage.");
        }

        let images = pipeline::collect_images(&cli.paths);
        if images.is_empty() {
            anyhow::bail!("No supported image files found in the specified paths.");
        }

        log::info!("Found {} image(s) to decode", images.len());
        pipeline::decode_images(&images, &decoder).await
    };

    if config.output.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            if let Some(ref exif) = result.exif {
                print_exif(&result.path, exif);
            }
        }
    }

    // Summary
    let total = results.len();
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    log::info!(
        "Done: {} succeeded, {failed} failed out of {total} images",
        total - failed
    );

    if failed > 0 && cli.stdin {
        anyhow::bail!("Failed to decode image from standard input");
    }

    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print the decoded fields of one image as a table.
fn print_exif(path: &std::path::Path, exif: &Exif) {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let fields: [(&str, &str); 7] = [
        ("DateTimeOriginal", exif.date_time_original.as_str()),
        ("LensModel", exif.lens_model.as_str()),
        ("LensID", exif.lens_id.as_str()),
        ("ShutterSpeed", exif.shutter_speed.as_str()),
        ("Aperture", exif.aperture.as_str()),
        ("ISO", exif.iso.as_str()),
        ("FocalLength", exif.focal_length.as_str()),
    ];
    for (tag, val) in fields {
        if !val.is_empty() {
            print_row(tag, val);
        }
    }

    print_row("GPSLatitude", &format!("{:.6}", exif.gps.latitude));
    print_row("GPSLongitude", &format!("{:.6}", exif.gps.longitude));
}

/// Print a single row in the EXIF display table.
fn print_row(tag: &str, val: &str) {
    println!("  {tag:<22} : {val}");
}
