use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framegrab::{ExtractOptions, FfmpegLogLevel, Thumbnailer};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framegrab dimensions upload.webm --json\n  framegrab thumbnail upload.mp4 --out thumb.jpg --max-dimension 320\n  framegrab completions zsh > _framegrab";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Probe video dimensions and grab a JPEG thumbnail",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging from framegrab.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the width and height of the first video stream.
    #[command(
        visible_alias = "probe",
        after_help = "Examples:\n  framegrab dimensions input.mkv\n  framegrab dimensions input.mkv --json"
    )]
    Dimensions {
        /// Input media file.
        input: PathBuf,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write a JPEG thumbnail of the first video stream.
    #[command(
        after_help = "Examples:\n  framegrab thumbnail input.webm --out thumb.jpg\n  framegrab thumbnail input.mp4 --out thumb.jpg --width 160 --height 90 --overwrite"
    )]
    Thumbnail {
        /// Input media file.
        input: PathBuf,
        /// Output JPEG path.
        #[arg(long)]
        out: PathBuf,
        /// Which decoded frame to keep, counting from 1.
        #[arg(long, default_value_t = 1)]
        frame_count: u32,
        /// Output width (requires --height).
        #[arg(long, requires = "height", conflicts_with = "max_dimension")]
        width: Option<u32>,
        /// Output height (requires --width).
        #[arg(long, requires = "width", conflicts_with = "max_dimension")]
        height: Option<u32>,
        /// Scale the longer side to this many pixels.
        #[arg(long)]
        max_dimension: Option<u32>,
        /// Replace the output file if it exists.
        #[arg(long)]
        overwrite: bool,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "framegrab=debug" } else { "framegrab=warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(global.verbose);
    let level = match &global.log_level {
        Some(value) => value.parse::<FfmpegLogLevel>()?,
        None => FfmpegLogLevel::Error,
    };
    framegrab::set_ffmpeg_log_level(level);
    Ok(())
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn build_options(
    frame_count: u32,
    width: Option<u32>,
    height: Option<u32>,
    max_dimension: Option<u32>,
) -> ExtractOptions {
    let options = ExtractOptions::new().with_frame_count(frame_count);
    match (width, height, max_dimension) {
        (Some(width), Some(height), _) => options.with_output_size(width, height),
        (_, _, Some(max_dimension)) => options.with_max_dimension(max_dimension),
        _ => options,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Dimensions { input, json } => {
            let bytes = fs::read(&input)?;
            let dimensions = framegrab::get_dimensions(&bytes)?;
            if json {
                let payload = json!({
                    "input": input.display().to_string(),
                    "width": dimensions.width,
                    "height": dimensions.height,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("{}x{}", dimensions.width, dimensions.height);
            }
        }
        Commands::Thumbnail {
            input,
            out,
            frame_count,
            width,
            height,
            max_dimension,
            overwrite,
        } => {
            ensure_writable_path(&out, overwrite)?;
            let options = build_options(frame_count, width, height, max_dimension);
            let thumbnailer = Thumbnailer::new(options)?;
            let image = thumbnailer.extract_from_path(&input)?;
            image.save(&out)?;
            println!(
                "{} {} ({}x{}, {} bytes)",
                "saved".green().bold(),
                out.display(),
                image.width(),
                image.height(),
                image.len()
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framegrab", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use framegrab::{FfmpegLogLevel, OutputSize};

    use super::{Cli, Commands, build_options};

    #[test]
    fn parse_thumbnail_with_exact_size() {
        let cli = Cli::try_parse_from([
            "framegrab", "thumbnail", "in.mp4", "--out", "t.jpg", "--width", "160", "--height",
            "90",
        ])
        .unwrap();
        match cli.command {
            Commands::Thumbnail { width, height, frame_count, .. } => {
                assert_eq!((width, height, frame_count), (Some(160), Some(90), 1));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn width_without_height_is_rejected() {
        let result =
            Cli::try_parse_from(["framegrab", "thumbnail", "in.mp4", "--out", "t.jpg", "--width", "160"]);
        assert!(result.is_err());
    }

    #[test]
    fn exact_size_conflicts_with_max_dimension() {
        let result = Cli::try_parse_from([
            "framegrab", "thumbnail", "in.mp4", "--out", "t.jpg", "--width", "160", "--height",
            "90", "--max-dimension", "64",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "framegrab", "dimensions", "in.webm", "--json", "--verbose", "--log-level", "quiet",
        ])
        .unwrap();
        assert!(cli.global.verbose);
        assert_eq!(cli.global.log_level.as_deref(), Some("quiet"));
    }

    #[test]
    fn log_level_names_parse() {
        assert_eq!("warn".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Warning));
        assert_eq!("QUIET".parse::<FfmpegLogLevel>(), Ok(FfmpegLogLevel::Quiet));
        assert!("loud".parse::<FfmpegLogLevel>().is_err());
    }

    #[test]
    fn options_follow_size_flags() {
        assert_eq!(build_options(2, None, None, None).output_size, OutputSize::Source);
        assert_eq!(build_options(1, None, None, Some(320)).output_size, OutputSize::FitWithin(320));
        assert_eq!(
            build_options(1, Some(64), Some(48), None).output_size,
            OutputSize::Exact { width: 64, height: 48 }
        );
        assert_eq!(build_options(3, None, None, None).frame_count, 3);
    }
}
