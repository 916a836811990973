//! Component resolver
//!
//! Maps the fields scraped from a BOM click to one table entry:
//!
//! 1. An exact key match on the part number wins outright.
//! 2. Otherwise every record is scored on parameter, part-number/parameter
//!    cross match and footprint, and the best record scoring above
//!    [`MATCH_THRESHOLD`] wins. Ties go to the record earlier in the table.
//!
//! All comparisons are case-insensitive.

use serde::{Serialize, Serializer};
use std::fmt;

use super::normalize::{normalize_footprint, normalize_parameter};
use super::record::ComponentRecord;
use super::table::LookupTable;
use crate::logger;

/// Query parameter equals the stored parameter
pub const PARAMETER_EXACT_POINTS: u32 = 10;
/// Query parameter and stored parameter contain one another
pub const PARAMETER_PARTIAL_POINTS: u32 = 5;
/// Stored parameter equals the query part number (catalog code used as part number)
pub const CROSS_EXACT_POINTS: u32 = 20;
/// Stored parameter is contained in the query part number, e.g. `SPX3819` in
/// `SPX3819M5-3.3`. A short catalog code inside a long manufacturer part number
/// is strong evidence on its own, so it scores as high as equality.
pub const CROSS_CONTAINED_POINTS: u32 = 20;
/// Query part number is contained in the stored parameter
pub const CROSS_CONTAINS_POINTS: u32 = 5;
/// Query footprint equals the stored footprint
pub const FOOTPRINT_EXACT_POINTS: u32 = 10;
/// Query footprint and stored footprint contain one another
pub const FOOTPRINT_PARTIAL_POINTS: u32 = 5;

/// A record qualifies only when its score is strictly greater than this.
///
/// Two independent medium signals (footprint exact + parameter exact = 20)
/// pass; any single medium signal (10) does not. This keeps coincidental
/// substring overlaps from lighting the wrong box.
pub const MATCH_THRESHOLD: u32 = 19;

/// Number of runner-up candidates reported alongside the best match
const RUNNERS_UP_REPORTED: usize = 3;

/// Fields extracted from one BOM click; empty strings mean "no constraint"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub part_number: Option<String>,
    pub parameter: Option<String>,
    pub footprint: Option<String>,
}

impl SearchQuery {
    pub fn new(
        part_number: Option<String>,
        parameter: Option<String>,
        footprint: Option<String>,
    ) -> Self {
        Self {
            part_number: part_number.filter(|s| !s.is_empty()),
            parameter: parameter.filter(|s| !s.is_empty()),
            footprint: footprint.filter(|s| !s.is_empty()),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.part_number.is_none() && self.parameter.is_none() && self.footprint.is_none()
    }
}

/// Why a record earned points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchReason {
    ParameterExact(String),
    ParameterPartial(String),
    CrossExact(String),
    CrossContained(String),
    CrossContains(String),
    FootprintExact(String),
    FootprintPartial(String),
}

impl MatchReason {
    pub const fn points(&self) -> u32 {
        match self {
            Self::ParameterExact(_) => PARAMETER_EXACT_POINTS,
            Self::ParameterPartial(_) => PARAMETER_PARTIAL_POINTS,
            Self::CrossExact(_) => CROSS_EXACT_POINTS,
            Self::CrossContained(_) => CROSS_CONTAINED_POINTS,
            Self::CrossContains(_) => CROSS_CONTAINS_POINTS,
            Self::FootprintExact(_) => FOOTPRINT_EXACT_POINTS,
            Self::FootprintPartial(_) => FOOTPRINT_PARTIAL_POINTS,
        }
    }
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterExact(v) => write!(f, "parameter exact ({v})"),
            Self::ParameterPartial(v) => write!(f, "parameter partial ({v})"),
            Self::CrossExact(v) => write!(f, "part number equals parameter ({v})"),
            Self::CrossContained(v) => write!(f, "part number contains parameter ({v})"),
            Self::CrossContains(v) => write!(f, "parameter contains part number ({v})"),
            Self::FootprintExact(v) => write!(f, "footprint exact ({v})"),
            Self::FootprintPartial(v) => write!(f, "footprint partial ({v})"),
        }
    }
}

impl Serialize for MatchReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A scored record
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate<'a> {
    pub part_number: &'a str,
    pub record: &'a ComponentRecord,
    pub score: u32,
    pub reasons: Vec<MatchReason>,
}

/// Outcome of resolving one query
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<'a> {
    Exact {
        part_number: &'a str,
        record: &'a ComponentRecord,
    },
    Fuzzy {
        best: MatchCandidate<'a>,
        runners_up: Vec<MatchCandidate<'a>>,
    },
    NotFound,
}

impl<'a> Resolution<'a> {
    /// Resolved key and record, if any
    pub const fn matched(&self) -> Option<(&'a str, &'a ComponentRecord)> {
        match self {
            Self::Exact {
                part_number,
                record,
            } => Some((*part_number, *record)),
            Self::Fuzzy { best, .. } => Some((best.part_number, best.record)),
            Self::NotFound => None,
        }
    }
}

/// Query fields after normalization, uppercased for comparison
struct PreparedQuery {
    part_number: Option<String>,
    parameter: Option<String>,
    footprint: Option<String>,
}

impl PreparedQuery {
    fn from_query(query: &SearchQuery) -> Self {
        let footprint = query.footprint.as_deref().map(|raw| {
            let normalized = normalize_footprint(raw);
            if normalized != raw.to_uppercase() {
                logger::log_normalized("footprint", raw, &normalized);
            }
            normalized
        });

        let parameter = query.parameter.as_deref().map(|raw| {
            let normalized = normalize_parameter(raw);
            if normalized != raw {
                logger::log_normalized("parameter", raw, &normalized);
            }
            normalized.to_uppercase()
        });

        Self {
            part_number: query.part_number.as_deref().map(str::to_uppercase),
            parameter,
            footprint,
        }
    }
}

/// Resolve a query against the table
pub fn resolve<'a>(query: &SearchQuery, table: &'a LookupTable) -> Resolution<'a> {
    if let Some(pn) = query.part_number.as_deref() {
        if let Some((part_number, record)) = table.get_key_value(pn) {
            return Resolution::Exact {
                part_number,
                record,
            };
        }
    }

    if query.is_empty() || table.is_empty() {
        return Resolution::NotFound;
    }

    logger::log_fuzzy_search(
        query.part_number.as_deref(),
        query.parameter.as_deref(),
        query.footprint.as_deref(),
    );

    let prepared = PreparedQuery::from_query(query);
    let mut candidates: Vec<MatchCandidate<'a>> = table
        .iter()
        .map(|(part_number, record)| score_record(&prepared, part_number, record))
        .filter(|candidate| candidate.score > MATCH_THRESHOLD)
        .collect();

    // Stable sort: equal scores keep table order
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    if candidates.is_empty() {
        return Resolution::NotFound;
    }

    let total = candidates.len();
    let best = candidates.remove(0);
    candidates.truncate(RUNNERS_UP_REPORTED);

    logger::log_best_match(best.part_number, best.score, &join_reasons(&best.reasons), total);
    for runner in &candidates {
        logger::log_runner_up(runner.part_number, runner.score, &join_reasons(&runner.reasons));
    }

    Resolution::Fuzzy {
        best,
        runners_up: candidates,
    }
}

/// Score one record; the three contributions are independent and summed
fn score_record<'a>(
    query: &PreparedQuery,
    part_number: &'a str,
    record: &'a ComponentRecord,
) -> MatchCandidate<'a> {
    let mut reasons = Vec::new();
    let stored_parameter = record.parameter.to_uppercase();
    let stored_footprint = record.footprint.to_uppercase();

    if let Some(wanted) = query.parameter.as_deref() {
        if !wanted.is_empty() && !stored_parameter.is_empty() {
            if wanted == stored_parameter {
                reasons.push(MatchReason::ParameterExact(record.parameter.clone()));
            } else if stored_parameter.contains(wanted) || wanted.contains(&stored_parameter) {
                reasons.push(MatchReason::ParameterPartial(record.parameter.clone()));
            }
        }
    }

    if let Some(pn) = query.part_number.as_deref() {
        if !stored_parameter.is_empty() {
            if stored_parameter == pn {
                reasons.push(MatchReason::CrossExact(record.parameter.clone()));
            } else if pn.contains(&stored_parameter) {
                reasons.push(MatchReason::CrossContained(record.parameter.clone()));
            } else if stored_parameter.contains(pn) {
                reasons.push(MatchReason::CrossContains(record.parameter.clone()));
            }
        }
    }

    // An empty stored footprint would be "contained" in every query footprint
    if let Some(wanted) = query.footprint.as_deref() {
        if !wanted.is_empty() && !stored_footprint.is_empty() {
            if wanted == stored_footprint {
                reasons.push(MatchReason::FootprintExact(record.footprint.clone()));
            } else if stored_footprint.contains(wanted) || wanted.contains(&stored_footprint) {
                reasons.push(MatchReason::FootprintPartial(record.footprint.clone()));
            }
        }
    }

    MatchCandidate {
        part_number,
        record,
        score: reasons.iter().map(MatchReason::points).sum(),
        reasons,
    }
}

fn join_reasons(reasons: &[MatchReason]) -> String {
    reasons
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
