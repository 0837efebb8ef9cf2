use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::parser::{parse_sections, SectionMap, SectionName};
use crate::render::assemble_grid;
use crate::splice::{splice_section, MissingMarker};
use crate::store::SiteRoot;

pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Why a section was left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    Unconfigured,
    MissingFile { file: String },
    MissingMarker { file: String, detail: String },
    Io { file: String, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SectionOutcome {
    Applied {
        file: String,
        items: usize,
        backup: String,
    },
    Skipped(SkipReason),
}

/// One outcome per section, in section order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub sections: BTreeMap<SectionName, SectionOutcome>,
}

impl SyncReport {
    /// Item counts for the sections that were written.
    pub fn updated(&self) -> BTreeMap<SectionName, usize> {
        self.sections
            .iter()
            .filter_map(|(&section, outcome)| match outcome {
                SectionOutcome::Applied { items, .. } => Some((section, *items)),
                SectionOutcome::Skipped(_) => None,
            })
            .collect()
    }

    /// Target files that were overwritten, in section order.
    pub fn files(&self) -> Vec<String> {
        self.sections
            .values()
            .filter_map(|outcome| match outcome {
                SectionOutcome::Applied { file, .. } => Some(file.clone()),
                SectionOutcome::Skipped(_) => None,
            })
            .collect()
    }
}

fn sync_section(
    site: &SiteRoot,
    file: String,
    items: usize,
    fragment: &str,
    stamp: &str,
) -> SectionOutcome {
    if !site.exists(&file) {
        return SectionOutcome::Skipped(SkipReason::MissingFile { file });
    }
    let original = match site.read_text(&file) {
        Ok(text) => text,
        Err(e) => {
            return SectionOutcome::Skipped(SkipReason::Io {
                file,
                detail: e.to_string(),
            })
        }
    };
    let replaced = match splice_section(&original, fragment) {
        Ok(text) => text,
        Err(missing) => return skipped_marker(file, missing),
    };

    // A second run in the same second must not clobber the first backup.
    let backup = site.unused_name(&format!("{}.bak-{}", file, stamp), "");
    if let Err(e) = site.write_text(&backup, &original) {
        return SectionOutcome::Skipped(SkipReason::Io {
            file,
            detail: format!("backup {}: {}", backup, e),
        });
    }
    if let Err(e) = site.write_text(&file, &replaced) {
        return SectionOutcome::Skipped(SkipReason::Io {
            file,
            detail: e.to_string(),
        });
    }

    SectionOutcome::Applied {
        file,
        items,
        backup,
    }
}

fn skipped_marker(file: String, missing: MissingMarker) -> SectionOutcome {
    SectionOutcome::Skipped(SkipReason::MissingMarker {
        file,
        detail: missing.to_string(),
    })
}

/// Write each section's card grid into its target document.
///
/// Best effort: a section that cannot be applied is recorded as skipped and the
/// rest still run. Earlier writes are never rolled back. Every backup written
/// in one call shares `stamp`.
pub fn synchronize<F>(site: &SiteRoot, sections: &SectionMap, targets: F, stamp: &str) -> SyncReport
where
    F: Fn(SectionName) -> Option<String>,
{
    let mut report = SyncReport::default();

    for (&section, items) in sections {
        let outcome = match targets(section) {
            None => SectionOutcome::Skipped(SkipReason::Unconfigured),
            Some(file) => {
                let fragment = assemble_grid(items);
                sync_section(site, file, items.len(), &fragment, stamp)
            }
        };

        match &outcome {
            SectionOutcome::Applied { file, items, backup } => {
                info!(section = %section, file = %file, items, backup = %backup, "section updated");
            }
            SectionOutcome::Skipped(reason) => {
                warn!(section = %section, reason = ?reason, "section skipped");
            }
        }
        report.sections.insert(section, outcome);
    }

    report
}

/// Parse a spreadsheet export and apply it to the site. Only a CSV payload
/// that cannot be tokenized is an error.
pub fn parse_and_synchronize<F>(site: &SiteRoot, csv_text: &str, targets: F) -> Result<SyncReport>
where
    F: Fn(SectionName) -> Option<String>,
{
    let sections = parse_sections(csv_text)?;
    let stamp = chrono::Local::now().format(STAMP_FORMAT).to_string();
    Ok(synchronize(site, &sections, targets, &stamp))
}

// ── Tests ──
