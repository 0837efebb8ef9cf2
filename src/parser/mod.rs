pub mod money;
pub mod sections;

pub use money::{extract_money, extract_quantity};
pub use sections::{parse_sections, ItemRecord, SectionMap, SectionName};
