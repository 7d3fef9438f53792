//! Header normalization.
//!
//! Source files name their columns in many ways ("School Year", "SY",
//! "Employee ID"). This module renames headers to the canonical names in
//! [`columns`] using a fixed alias table. Matching ignores case, spaces,
//! underscores and hyphens, and is exact otherwise: no fuzzy matching and no
//! inference.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::{RawTable, columns};

/// Alias table, keyed by the squashed form of the header.
///
/// Duration headers map to `duration_hours`, never to `absence_days`: a
/// duration is in hours and would inflate day totals by the workday length.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("periodid", columns::PERIOD_ID),
    ("schoolyear", columns::PERIOD_ID),
    ("sy", columns::PERIOD_ID),
    ("employeeid", columns::EMPLOYEE_ID),
    ("employeeidentifier", columns::EMPLOYEE_ID),
    ("empid", columns::EMPLOYEE_ID),
    ("occurredon", columns::OCCURRED_ON),
    ("date", columns::OCCURRED_ON),
    ("absencedate", columns::OCCURRED_ON),
    ("employeecategory", columns::EMPLOYEE_CATEGORY),
    ("employeetype", columns::EMPLOYEE_CATEGORY),
    ("absencetype", columns::ABSENCE_TYPE),
    ("durationhours", columns::DURATION_HOURS),
    ("duration", columns::DURATION_HOURS),
    ("hours", columns::DURATION_HOURS),
    ("wasfilled", columns::WAS_FILLED),
    ("filled", columns::WAS_FILLED),
    ("needssubstitute", columns::NEEDS_SUBSTITUTE),
    ("absencedays", columns::ABSENCE_DAYS),
    ("percentofday", columns::ABSENCE_DAYS),
];

/// A header that was renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRename {
    /// Header as it appeared in the source.
    pub from: String,
    /// Canonical name it was mapped to.
    pub to: String,
}

/// A table with canonical headers plus the renames that were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedTable {
    /// The renamed table.
    pub table: RawTable,
    /// Renames in header order.
    pub renames: Vec<HeaderRename>,
}

fn squash(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Returns the canonical column name for a header, if it has one.
///
/// # Examples
///
/// ```
/// use absence_rating::calculation::canonical_column;
///
/// assert_eq!(canonical_column("School Year"), Some("period_id"));
/// assert_eq!(canonical_column("Duration"), Some("duration_hours"));
/// assert_eq!(canonical_column("Hire Date"), None);
/// ```
pub fn canonical_column(header: &str) -> Option<&'static str> {
    let key = squash(header);
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

/// Renames headers to canonical names.
///
/// The first header claiming a canonical name wins; later headers mapping
/// to the same name keep their original spelling and pass through as extra
/// columns. A later header whose spelling would collide with an earlier
/// target gets a numeric suffix (`occurred_on_2`), so no cell is overwritten.
/// Day-value headers are exempt: validation discards all of them.
pub fn normalize_headers(table: RawTable) -> MappedTable {
    let mut claimed: Vec<&'static str> = Vec::new();
    let mut renames = Vec::new();
    let mut targets: Vec<String> = Vec::with_capacity(table.columns.len());

    for header in &table.columns {
        let canonical = canonical_column(header);
        let mut target = match canonical {
            Some(canonical) if !claimed.contains(&canonical) => {
                claimed.push(canonical);
                canonical.to_string()
            }
            _ => header.clone(),
        };
        if canonical != Some(columns::ABSENCE_DAYS) && targets.contains(&target) {
            target = unclaimed_name(header, &table.columns, &targets);
        }
        if &target != header {
            renames.push(HeaderRename {
                from: header.clone(),
                to: target.clone(),
            });
        }
        targets.push(target);
    }

    if renames.is_empty() {
        return MappedTable { table, renames };
    }

    let rows = table
        .rows
        .into_iter()
        .map(|mut row| {
            let mut renamed = Map::new();
            for (header, target) in table.columns.iter().zip(&targets) {
                if let Some(value) = row.remove(header) {
                    renamed.insert(target.clone(), value);
                }
            }
            // Keys outside the header are carried over as-is.
            for (key, value) in row {
                renamed.entry(key).or_insert(value);
            }
            renamed
        })
        .collect::<Vec<Map<String, Value>>>();

    MappedTable {
        table: RawTable {
            columns: targets,
            rows,
        },
        renames,
    }
}

/// First `{header}_{n}` not used by any source header or earlier target.
fn unclaimed_name(header: &str, headers: &[String], targets: &[String]) -> String {
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", header, n);
        if !headers.contains(&candidate) && !targets.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
