use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "subtitle-utils")]
#[command(
    about = "Extract softsubs and fonts from a series of videos, naming the subtitles after another series if asked",
    long_about = "Extract softsubs and fonts from a series of videos.\n\n\
        Globs, episode patterns and track numbers are read from \"subtitle-utils-patterns.json\" \
        in the video directory. Patterns pick the episode number out of each video name so that \
        extracted subtitles can be named after a second series of videos. A template is written \
        if the file does not exist."
)]
pub struct Cli {
    /// Directory holding the videos and the batch config; extracted subtitles are written here
    #[arg(default_value = ".")]
    pub video_directory: PathBuf,

    /// Batch config to use instead of the one in the video directory
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rename loose subtitles after the videos instead of extracting
    #[arg(long)]
    pub rename: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Do not extract font attachments
    #[arg(long)]
    pub no_fonts: bool,
}
