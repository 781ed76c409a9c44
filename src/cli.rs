// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for archive operations
//!
//! This module provides command-line functionality for:
//! - Archiving a batch of edit results
//! - Inspecting metadata embedded in an archived image
//! - Listing archived images

use camera_archive::media::read_info_from_file;
use camera_archive::storage::list_archived_images;
use camera_archive::{
    AppError, ArchiveOutcome, ArchiveSummary, BatchArchiver, Config, ExportItem, Media, MediaInfo,
};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

/// One export slot given on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotSpec {
    Empty,
    Image { edited: PathBuf, original: PathBuf },
    Video { edited: PathBuf, original: PathBuf },
}

impl FromStr for SlotSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(SlotSpec::Empty);
        }

        let (kind, paths) = s
            .split_once(':')
            .ok_or_else(|| format!("expected KIND:EDITED,ORIGINAL or '-', got '{}'", s))?;
        let (edited, original) = paths
            .split_once(',')
            .filter(|(e, o)| !e.is_empty() && !o.is_empty())
            .ok_or_else(|| format!("expected EDITED,ORIGINAL after '{}:'", kind))?;
        let (edited, original) = (PathBuf::from(edited), PathBuf::from(original));

        match kind {
            "image" => Ok(SlotSpec::Image { edited, original }),
            "video" => Ok(SlotSpec::Video { edited, original }),
            other => Err(format!("unknown slot kind '{}' (expected image or video)", other)),
        }
    }
}

/// A `KEY=VALUE` metadata entry; values that parse as JSON keep their type
#[derive(Debug, Clone, PartialEq)]
pub struct InfoEntry {
    pub key: String,
    pub value: Value,
}

impl FromStr for InfoEntry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, raw) = s
            .split_once('=')
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok(InfoEntry {
            key: key.to_string(),
            value,
        })
    }
}

/// Command-line overrides applied on top of the loaded configuration
#[derive(Debug, Default)]
pub struct ArchiveOverrides {
    pub save_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
}

impl ArchiveOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.save_dir {
            config.save_dir = dir;
        }
        if let Some(dir) = self.temp_dir {
            config.temp_dir = dir;
        }
        if let Some(jobs) = self.jobs {
            config.max_concurrent_saves = Some(jobs);
        }
    }
}

#[derive(Serialize)]
struct OutcomeRecord<'a> {
    index: usize,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    media: Option<&'a Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct BatchReport<'a> {
    outcomes: Vec<OutcomeRecord<'a>>,
    summary: ArchiveSummary,
}

/// Archive the given slots and print one line per outcome
pub fn archive(
    config_path: Option<&Path>,
    overrides: ArchiveOverrides,
    slots: Vec<SlotSpec>,
    info: Vec<InfoEntry>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default(config_path)?;
    overrides.apply(&mut config);

    let info: MediaInfo = info.into_iter().map(|e| (e.key, e.value)).collect();
    let items = slots
        .iter()
        .map(|slot| load_slot(slot, &info))
        .collect::<Result<Vec<_>, _>>()?;

    info!(slots = items.len(), "Archiving from command line");

    let rt = tokio::runtime::Runtime::new()?;
    let outcomes = rt.block_on(async {
        let archiver = BatchArchiver::new(&config)?;
        let outcomes = archiver.archive_all(items).await?;
        Ok::<_, AppError>(outcomes)
    })?;

    let summary = ArchiveSummary::from_outcomes(&outcomes);

    if json {
        let report = BatchReport {
            outcomes: outcomes
                .iter()
                .enumerate()
                .map(|(index, outcome)| OutcomeRecord {
                    index,
                    status: status_label(outcome),
                    media: outcome.media(),
                    error: outcome.error().map(|e| e.to_string()),
                })
                .collect(),
            summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (index, outcome) in outcomes.iter().enumerate() {
            match outcome {
                ArchiveOutcome::Archived(media) => println!(
                    "  [{}] archived  edited: {}  original: {}",
                    index,
                    media.edited_path().display(),
                    media.original_path().display()
                ),
                ArchiveOutcome::Empty => println!("  [{}] empty", index),
                ArchiveOutcome::Failed(e) => println!("  [{}] failed    {}", index, e),
            }
        }
        println!();
        println!(
            "Archived {}, empty {}, failed {}",
            summary.archived, summary.empty, summary.failed
        );
    }

    if !summary.is_complete_success() {
        return Err(format!("{} of {} slots failed", summary.failed, summary.total()).into());
    }
    Ok(())
}

/// Print metadata embedded in an archived image
pub fn inspect(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    match read_info_from_file(file)? {
        Some(info) => println!("{}", serde_json::to_string_pretty(&info)?),
        None => println!("No archive metadata in {}", file.display()),
    }
    Ok(())
}

/// List archived images in `dir` or the configured save directory
pub fn list(config_path: Option<&Path>, dir: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match dir {
        Some(dir) => dir,
        None => Config::load_or_default(config_path)?.save_dir,
    };

    let rt = tokio::runtime::Runtime::new()?;
    let files = rt.block_on(list_archived_images(dir.clone()))?;

    if files.is_empty() {
        println!("No archived images in {}", dir.display());
        return Ok(());
    }

    for file in files {
        let modified = file
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("{}  {:>10}  {}", modified, file.size, file.path.display());
    }
    Ok(())
}

fn load_slot(slot: &SlotSpec, info: &MediaInfo) -> Result<Option<ExportItem>, Box<dyn std::error::Error>> {
    match slot {
        SlotSpec::Empty => Ok(None),
        SlotSpec::Image { edited, original } => Ok(Some(ExportItem::image(
            open_image(edited)?,
            open_image(original)?,
            info.clone(),
        ))),
        SlotSpec::Video { edited, original } => Ok(Some(ExportItem::video(
            edited.clone(),
            original.clone(),
            info.clone(),
        ))),
    }
}

fn open_image(path: &Path) -> Result<image::DynamicImage, String> {
    image::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))
}

fn status_label(outcome: &ArchiveOutcome) -> &'static str {
    match outcome {
        ArchiveOutcome::Archived(_) => "archived",
        ArchiveOutcome::Empty => "empty",
        ArchiveOutcome::Failed(_) => "failed",
    }
}
