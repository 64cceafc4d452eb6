use blockpix::config::{self, Mode, PixelateConfig};
use blockpix::imaging::Quality;
use blockpix::{output, process};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Image and square parameters shared by `pixelate` and `check`.
#[derive(clap::Args, Clone)]
struct TargetArgs {
    /// Image to pixelate (JPEG, PNG, TIFF or WebP)
    image: PathBuf,

    /// Square edge in pixels; must not exceed the image width or height
    /// [default: pixelate.square_size from config]
    #[arg(allow_negative_numbers = true)]
    square_size: Option<i64>,

    /// Processing mode: S (single worker) or M (one worker per strip)
    /// [default: pixelate.mode from config]
    mode: Option<String>,

    /// Output file [default: result.<ext> next to the image]
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct RunArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Print the run report as JSON instead of progress lines
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
#[command(name = "blockpix")]
#[command(about = "Pixelate an image by averaging fixed-size squares")]
#[command(long_about = "\
Pixelate an image by averaging fixed-size squares

The image is divided into squares of SQUARE_SIZE pixels and every square is
repainted with its average color. Squares at the right and bottom edges are
cut to fit the image.

In multi mode the image is split into vertical strips, one square wide, and
each strip is processed by its own worker in parallel. Single mode uses one
worker for the whole image. Both modes produce identical output.

Example:
  blockpix pixelate monalisa.jpg 30 M      # writes result.jpg next to it

Run 'blockpix gen-config' to generate a documented blockpix.toml.")]
#[command(version)]
struct Cli {
    /// Config file [default: ./blockpix.toml when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pixelate an image and write the result
    Pixelate(RunArgs),
    /// Validate parameters and show the worker plan without processing
    Check(TargetArgs),
    /// Print a stock blockpix.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Pixelate(args) => {
            let config = config::load_config(cli.config.as_deref(), Path::new("."))?;
            init_thread_pool(&config.processing);
            let request = build_request(&args.target, &config)?;

            if args.json {
                let report = process::run(&request, None)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
                return Ok(());
            }

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::run(&request, Some(tx));
            printer.join().ok();
            output::print_run_summary(&result?);
        }
        Command::Check(target) => {
            let config = config::load_config(cli.config.as_deref(), Path::new("."))?;
            let request = build_request(&target, &config)?;
            let plan = process::plan(&request)?;
            output::print_plan(&plan);
            println!("==> Parameters are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Merge command-line arguments over the loaded config.
fn build_request(
    args: &TargetArgs,
    config: &PixelateConfig,
) -> Result<process::PixelateRequest, config::ConfigError> {
    let mode = match &args.mode {
        Some(token) => token.parse::<Mode>()?,
        None => config.pixelate.mode,
    };
    Ok(process::PixelateRequest {
        input: args.image.clone(),
        output: args.output.clone(),
        square_size: args
            .square_size
            .unwrap_or_else(|| i64::from(config.pixelate.square_size)),
        mode,
        quality: Quality::new(config.output.quality),
        file_stem: config.output.file_stem.clone(),
    })
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores; config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
