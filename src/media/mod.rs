pub mod ffmpeg;
pub mod subtitles;
