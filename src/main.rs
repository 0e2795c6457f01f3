mod cli;
mod config;
mod domain;
mod infra;
mod media;
mod workflows;

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use cli::Cli;
use config::{BatchConfig, ExtractionConfig, Tools};
use domain::models::FileRef;
use infra::scanner;
use media::subtitles::FfprobeProbe;
use workflows::confirm::{Confirm, FixedAnswer, PromptConfirm};
use workflows::executor::{self, PlannedCommand};
use workflows::matcher::{match_episodes, print_episode_map};
use workflows::planner::{self, Target};
use workflows::renamer;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("subtitle_utils=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.video_directory.join(config::BATCH_CONFIG_NAME));
    let config = BatchConfig::load(&config_path)?;

    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(FixedAnswer(true))
    } else {
        Box::new(PromptConfirm::new()?)
    };

    if cli.rename {
        return rename(&cli.video_directory, &config, confirm.as_mut());
    }

    let config = config.extraction()?;
    let tools = Tools::load()?;
    let origin_files = scanner::collect_files(&cli.video_directory, &config.origin_video_glob)?;
    println!("Found {} origin video(s)", origin_files.len());

    extract_subtitles(&cli.video_directory, config, &tools, &origin_files, confirm.as_mut())?;

    if config.extract_fonts && !cli.no_fonts {
        extract_fonts(&tools, &origin_files, confirm.as_mut())?;
    }

    Ok(())
}

fn extract_subtitles(
    video_dir: &Path,
    config: &ExtractionConfig,
    tools: &Tools,
    origin_files: &[FileRef],
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let target_episodes = match &config.target {
        Some(target) => {
            let target_files = scanner::collect_files(video_dir, &target.video_glob)?;
            let episodes = match_episodes(&target_files, &target.target_ep_pattern);
            print_episode_map(&episodes);
            println!();
            Some(episodes)
        }
        None => None,
    };
    let target = match (&config.target, &target_episodes) {
        (Some(target), Some(episodes)) => Some(Target {
            episodes,
            origin_pattern: &target.origin_ep_pattern,
        }),
        _ => None,
    };

    let probe = FfprobeProbe {
        program: tools.ffprobe.clone(),
    };
    let pending = planner::plan_subtitle_extraction(
        &tools.ffmpeg,
        origin_files,
        &config.tracks,
        &config.sub_formats,
        target.as_ref(),
        &probe,
    )?;

    run_batch(&pending, "Start subtitle extraction?", confirm)
}

fn extract_fonts(
    tools: &Tools,
    origin_files: &[FileRef],
    confirm: &mut dyn Confirm,
) -> Result<()> {
    let plan = planner::plan_font_extraction(&tools.ffmpeg, origin_files)?;
    let Some(dest_dir) = plan.dest_dir else {
        return Ok(());
    };

    print_commands(&plan.commands);
    if !confirm.confirm(&format!("Extract fonts to folder {dest_dir:?}?"))? {
        println!("Skipped.");
        return Ok(());
    }
    planner::prepare_font_dir(&dest_dir)?;
    report(executor::execute(&plan.commands)?);
    Ok(())
}

fn rename(video_dir: &Path, config: &BatchConfig, confirm: &mut dyn Confirm) -> Result<()> {
    let rename = &config.rename;
    let videos = scanner::collect_files(video_dir, &rename.video_glob)?;
    let episodes = match_episodes(&videos, &rename.video_ep_pattern);
    print_episode_map(&episodes);
    println!();

    renamer::rename_subtitles(
        &episodes,
        &rename.sub_glob,
        &rename.sub_ep_pattern,
        rename.sub_lang.as_deref(),
        video_dir,
        confirm,
    )
}

fn run_batch(pending: &[PlannedCommand], prompt: &str, confirm: &mut dyn Confirm) -> Result<()> {
    if pending.is_empty() {
        println!("Nothing to extract.");
        return Ok(());
    }
    print_commands(pending);
    if !confirm.confirm(prompt)? {
        println!("Skipped.");
        return Ok(());
    }
    report(executor::execute(pending)?);
    Ok(())
}

fn print_commands(commands: &[PlannedCommand]) {
    for command in commands {
        println!("{command}");
    }
}

fn report(summary: executor::ExecutionSummary) {
    println!(
        "Done: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    );
}
