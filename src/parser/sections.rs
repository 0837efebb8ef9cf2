use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::Result;

/// Minimum row width; the image column (26) is the last one read.
const ROW_WIDTH: usize = 27;

const COL_INCLUDES: usize = 6;
const COL_NAME: usize = 7;
const COL_PRICE: usize = 8;
const COL_REG: usize = 17;
const COL_QTY: usize = 24;
const COL_BADGE: usize = 25;
const COL_IMG: usize = 26;

const SEPARATOR: &str = "NEW PRODUCT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionName {
    LivingRoom,
    Bedroom,
    DiningRoom,
    Recliner,
}

impl SectionName {
    pub const ALL: [SectionName; 4] = [
        SectionName::LivingRoom,
        SectionName::Bedroom,
        SectionName::DiningRoom,
        SectionName::Recliner,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SectionName::LivingRoom => "living room",
            SectionName::Bedroom => "bedroom",
            SectionName::DiningRoom => "dining room",
            SectionName::Recliner => "recliner",
        }
    }

    /// Recognize a header cell. Case-insensitive; accepts the old "dinning room" spelling.
    pub fn from_header(cell: &str) -> Option<Self> {
        match cell.trim().to_lowercase().as_str() {
            "living room" => Some(SectionName::LivingRoom),
            "bedroom" => Some(SectionName::Bedroom),
            "dining room" | "dinning room" => Some(SectionName::DiningRoom),
            "recliner" => Some(SectionName::Recliner),
            _ => None,
        }
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl Serialize for SectionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One product row. Every field is the raw trimmed cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ItemRecord {
    pub includes: String,
    pub name: String,
    pub price_text: String,
    pub reg_text: String,
    pub qty_text: String,
    pub badge_text: String,
    pub image_ref: String,
}

impl ItemRecord {
    fn from_row(mut row: Vec<String>) -> Self {
        if row.len() < ROW_WIDTH {
            row.resize(ROW_WIDTH, String::new());
        }
        let mut take = |idx: usize| std::mem::take(&mut row[idx]);
        ItemRecord {
            includes: take(COL_INCLUDES),
            name: take(COL_NAME),
            price_text: take(COL_PRICE),
            reg_text: take(COL_REG),
            qty_text: take(COL_QTY),
            badge_text: take(COL_BADGE),
            image_ref: take(COL_IMG),
        }
    }
}

pub type SectionMap = BTreeMap<SectionName, Vec<ItemRecord>>;

/// All four sections, each with no items.
pub fn empty_section_map() -> SectionMap {
    SectionName::ALL.iter().map(|&s| (s, Vec::new())).collect()
}

enum Row {
    Blank,
    Header(SectionName),
    Separator,
    Item(Vec<String>),
}

fn classify_row(cells: Vec<String>) -> Row {
    if cells.iter().all(|c| c.is_empty()) {
        return Row::Blank;
    }
    let first = cells[0].as_str();
    if let Some(section) = SectionName::from_header(first) {
        return Row::Header(section);
    }
    if first.eq_ignore_ascii_case(SEPARATOR) {
        return Row::Separator;
    }
    Row::Item(cells)
}

/// Scan one row with the current section, returning the section for the next row.
fn scan_row(
    sections: &mut SectionMap,
    current: Option<SectionName>,
    cells: Vec<String>,
) -> Option<SectionName> {
    match classify_row(cells) {
        Row::Blank | Row::Separator => current,
        Row::Header(section) => Some(section),
        Row::Item(cells) => {
            // Rows before the first header have nowhere to go.
            if let Some(section) = current {
                sections
                    .entry(section)
                    .or_default()
                    .push(ItemRecord::from_row(cells));
            }
            current
        }
    }
}

/// Split a spreadsheet export into per-section item lists.
pub fn parse_sections(csv_text: &str) -> Result<SectionMap> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let mut sections = empty_section_map();
    let mut current: Option<SectionName> = None;

    for record in reader.records() {
        let record = record?;
        let cells: Vec<String> = record.iter().map(|c| c.trim().to_string()).collect();
        current = scan_row(&mut sections, current, cells);
    }

    Ok(sections)
}

// ── Tests ──
