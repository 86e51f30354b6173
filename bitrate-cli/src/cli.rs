// bitrate-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use bitrate_core::{ResolverConfig, ResolverConfigBuilder};
use clap::Parser;
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Calculate audio and video bitrates for media files.",
    long_about = "Reports the bitrate of every audio track and, for video files, the video \
                  bitrate. Container metadata is used when present; otherwise tracks are \
                  extracted with ffmpeg and measured."
)]
pub struct Cli {
    /// Path to video (e.g., .mkv, .mp4) or audio (e.g., .mp3, .ogg) file
    #[arg(required = true, value_name = "FILE_PATH")]
    pub file_path: PathBuf,

    /// Print the result as JSON instead of one line per track
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,

    /// Optional: Directory for temporary track extractions (defaults to the system temp dir)
    #[arg(long, value_name = "DIR", env = "BITRATE_CALC_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Optional: Base name for temporary files; must be unique per concurrent run
    #[arg(long, value_name = "NAME", env = "BITRATE_CALC_TEMP_BASE")]
    pub temp_base: Option<String>,
}

impl Cli {
    /// Builds the resolver configuration from the parsed arguments.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        let mut builder = ResolverConfigBuilder::new();
        if let Some(dir) = &self.temp_dir {
            builder = builder.temp_dir(dir);
        }
        if let Some(base) = &self.temp_base {
            builder = builder.temp_base(base.as_str());
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positional_path() {
        let cli = Cli::try_parse_from(["bitrate-calc", "movie.mkv"]).unwrap();
        assert_eq!(cli.file_path, PathBuf::from("movie.mkv"));
        assert!(!cli.json);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_missing_path_fails() {
        assert!(Cli::try_parse_from(["bitrate-calc"]).is_err());
    }

    #[test]
    fn test_temp_options_reach_config() {
        let cli = Cli::try_parse_from([
            "bitrate-calc",
            "--temp-dir",
            "/scratch",
            "--temp-base",
            "job42",
            "--json",
            "song.mp3",
        ])
        .unwrap();

        let config = cli.resolver_config();
        assert_eq!(config.temp_dir, PathBuf::from("/scratch"));
        assert_eq!(config.temp_base, "job42");
        assert!(cli.json);
    }
}
