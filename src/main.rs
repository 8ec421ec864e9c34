// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};
use pitchdrill::config::Project;
use pitchdrill::encoder::Encoder;
use pitchdrill::lesson;
use pitchdrill::render;
use pitchdrill::sfz::RegionCatalog;
use pitchdrill::util::duration_minutes_seconds;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Renders note clips from SFZ instruments and builds passive pitch lessons."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders every note of an instrument and transcodes the results into lesson clips.
    Render {
        /// The path to the project file.
        config: PathBuf,
        /// The name of the instrument in the project file.
        instrument: String,
    },
    /// Creates any missing canned silence clips.
    Silence {
        /// The path to the project file.
        config: PathBuf,
    },
    /// Lists the configured lessons.
    Lessons {
        /// The path to the project file.
        config: PathBuf,
    },
    /// Builds the thumbnail, audio and video of lessons.
    Build {
        /// The path to the project file.
        config: PathBuf,
        /// Only build the lesson with this level.
        #[arg(short, long)]
        level: Option<u32>,
    },
    /// Prints the regions parsed from an SFZ file.
    Inspect {
        /// The path to the SFZ file.
        sfz: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render { config, instrument } => {
            let project = Project::deserialize(&config)?;
            let Some(settings) = project.instrument(&instrument) else {
                return Err(format!(
                    "no instrument named {} in {}",
                    instrument,
                    config.display()
                )
                .into());
            };

            let (catalog, source_dir) = RegionCatalog::parse_file(&project.sfz_path(settings))?;
            if catalog.is_empty() {
                return Err(format!("no regions found for instrument {}", instrument).into());
            }

            let layout = project.layout();
            let rendered_dir = layout.rendered_dir(&instrument);
            let summary = render::render_instrument(
                &catalog,
                &source_dir,
                &rendered_dir,
                settings.notes(),
                settings.selection(),
            )?;

            println!(
                "Rendered {} notes into {}.",
                summary.rendered.len(),
                rendered_dir.display()
            );
            if !summary.skipped.is_empty() {
                println!("Skipped (count: {}):", summary.skipped.len());
                for note in summary.skipped.iter() {
                    println!("- {}", note);
                }
            }

            let encoder = Encoder::locate(project.encoder().program())?;
            let transcoded = encoder.transcode_directory(
                &rendered_dir,
                &layout.instrument_dir(&instrument),
                layout.extension(),
                &project.encoder().clip_format(),
                project.encoder().clip_seconds(),
            )?;
            println!("Transcoded {} clips.", transcoded.transcoded);
            if !transcoded.failed.is_empty() {
                return Err(format!("{} clips failed to transcode", transcoded.failed.len()).into());
            }
        }
        Commands::Silence { config } => {
            let project = Project::deserialize(&config)?;
            let encoder = Encoder::locate(project.encoder().program())?;
            let library = project.layout().silence_library();

            let created = library.ensure(&encoder, &project.encoder().clip_format())?;
            if created.is_empty() {
                println!("All silence clips already exist in {}.", library.dir().display());
                return Ok(());
            }

            println!("Created (count: {}):", created.len());
            for clip in created {
                println!("- {}", library.path(clip).display());
            }
        }
        Commands::Lessons { config } => {
            let project = Project::deserialize(&config)?;
            let layout = project.layout();
            let lessons = project.lessons()?;

            if lessons.is_empty() {
                println!("No lessons found in {}.", config.display());
                return Ok(());
            }

            println!("Lessons (count: {}):", lessons.len());
            for lesson in lessons.iter() {
                println!(
                    "- level {}: {} (at least {})",
                    lesson.level(),
                    layout.lesson_audio(lesson).display(),
                    duration_minutes_seconds(lesson.estimated_silence())
                );
            }
        }
        Commands::Build { config, level } => {
            let project = Project::deserialize(&config)?;
            let layout = project.layout();
            let lessons: Vec<_> = project
                .lessons()?
                .into_iter()
                .filter(|lesson| level.is_none_or(|level| lesson.level() == level))
                .collect();

            if lessons.is_empty() {
                return Err(match level {
                    Some(level) => format!("no lesson with level {}", level),
                    None => format!("no lessons found in {}", config.display()),
                }
                .into());
            }

            let encoder = Encoder::locate(project.encoder().program())?;
            for lesson in lessons.iter() {
                let files = lesson::generate_lesson_files(
                    &layout,
                    &encoder,
                    lesson,
                    project.encoder().video_quality(),
                )?;
                println!("Built level {}:", lesson.level());
                println!("- {}", files.audio.display());
                println!("- {}", files.thumbnail.display());
                println!("- {}", files.video.display());
            }
        }
        Commands::Inspect { sfz } => {
            let (catalog, source_dir) = RegionCatalog::parse_file(&sfz)?;
            println!(
                "Regions (count: {}, samples relative to {}):",
                catalog.len(),
                source_dir.display()
            );
            print!("{}", serde_yml::to_string(&catalog)?);
        }
    }

    Ok(())
}
