use std::path::PathBuf;

use tracing::info;

use crate::app::App;
use crate::config;
use crate::player::PlaybackEngine;

/// Command line: `mixtape [--print-config] [PATH...]`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Cli {
    pub print_config: bool,
    pub paths: Vec<PathBuf>,
}

impl Cli {
    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut cli = Cli::default();
        let mut only_paths = false;
        for arg in args {
            match arg.as_str() {
                "--" if !only_paths => only_paths = true,
                "--print-config" if !only_paths => cli.print_config = true,
                _ => cli.paths.push(PathBuf::from(arg)),
            }
        }
        cli
    }
}

/// Seed the song list with the paths given on the command line.
pub fn add_initial_songs<E: PlaybackEngine>(
    app: &mut App<E>,
    paths: &[PathBuf],
    settings: &config::Settings,
) {
    if paths.is_empty() {
        return;
    }
    let added = app.add_paths(paths, &settings.upload);
    info!(added, "seeded song list from command line");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_collects_paths_and_flags() {
        let cli = Cli::parse(args(&["a.mp3", "--print-config", "music"]));
        assert!(cli.print_config);
        assert_eq!(cli.paths, vec![PathBuf::from("a.mp3"), PathBuf::from("music")]);
    }

    #[test]
    fn parse_treats_everything_after_double_dash_as_paths() {
        let cli = Cli::parse(args(&["--", "--print-config"]));
        assert!(!cli.print_config);
        assert_eq!(cli.paths, vec![PathBuf::from("--print-config")]);
    }
}
