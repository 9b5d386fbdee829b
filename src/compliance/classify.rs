use std::sync::LazyLock;

use chrono::{Months, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::models::{WarrantyType, WorkCategory};

/// Months of cover for structural trades (plumbing, electrical, heating).
pub const STRUCTURAL_WARRANTY_MONTHS: u32 = 24;
pub const STANDARD_WARRANTY_MONTHS: u32 = 12;
/// Suggested delay before the next maintenance visit, any trade.
pub const MAINTENANCE_INTERVAL_MONTHS: u32 = 12;

struct CategoryPattern {
    regex: Regex,
    category: WorkCategory,
}

/// Keyword groups in priority order. First match wins, so "chauffe-eau"
/// lands in plumbing before the heating group sees "chauff".
static CATEGORY_PATTERNS: LazyLock<Vec<CategoryPattern>> = LazyLock::new(|| {
    vec![
        CategoryPattern {
            regex: Regex::new(r"(?i)plomb|fuite|robinet|chauffe-eau|sanitaire|\bwc\b|évier|plumb|leak|faucet").unwrap(),
            category: WorkCategory::Plumbing,
        },
        CategoryPattern {
            regex: Regex::new(r"(?i)électri|electri|tableau|\bprises?\b|disjoncteur|éclairage|wiring").unwrap(),
            category: WorkCategory::Electrical,
        },
        CategoryPattern {
            regex: Regex::new(r"(?i)chauff|chaudi|radiat|climatis|pompe à chaleur|heating|boiler").unwrap(),
            category: WorkCategory::Heating,
        },
        CategoryPattern {
            regex: Regex::new(r"(?i)serrur|verrou|\bclés?\b|\block").unwrap(),
            category: WorkCategory::Locksmith,
        },
        CategoryPattern {
            regex: Regex::new(r"(?i)peint|enduit|paint").unwrap(),
            category: WorkCategory::Painting,
        },
        CategoryPattern {
            regex: Regex::new(r"(?i)menuis|\bbois\b|parquet|fenêtre|\bportes?\b|carpent|wood").unwrap(),
            category: WorkCategory::Carpentry,
        },
    ]
});

/// Trade of an intervention, inferred from its service name.
pub fn classify_service(name: &str) -> WorkCategory {
    CATEGORY_PATTERNS
        .iter()
        .find(|p| p.regex.is_match(name))
        .map(|p| p.category)
        .unwrap_or(WorkCategory::Other)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Warranty {
    pub kind: WarrantyType,
    pub end_date: NaiveDate,
}

pub fn warranty_for(category: WorkCategory, completed_on: NaiveDate) -> Warranty {
    let (kind, months) = if category.is_structural() {
        (WarrantyType::Structural, STRUCTURAL_WARRANTY_MONTHS)
    } else {
        (WarrantyType::Standard, STANDARD_WARRANTY_MONTHS)
    };
    Warranty {
        kind,
        end_date: add_months(completed_on, months),
    }
}

pub fn next_maintenance(completed_on: NaiveDate) -> NaiveDate {
    add_months(completed_on, MAINTENANCE_INTERVAL_MONTHS)
}

/// Calendar-month addition; 29 Feb + 12 months gives 28 Feb.
pub(crate) fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}
