//! Resolve endpoint (`GET /lightup`)
//!
//! Maps the fields scraped from a BOM click to a storage location and the
//! serial line the browser should write.

use hyper::StatusCode;
use serde::Serialize;

use crate::catalog::{
    resolve, ComponentRecord, LookupTable, MatchReason, Resolution, SearchQuery, Slot,
};
use crate::http::QueryParams;
use crate::logger;
use crate::serial::{DeviceCommand, SerialCommand};

/// Response body, tagged by `status`
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LightupResponse<'a> {
    Success {
        message: &'static str,
        matched_part_number: &'a str,
        location: Location<'a>,
        details: &'a ComponentRecord,
        #[serde(rename = "match")]
        match_info: MatchInfo<'a>,
        #[serde(skip_serializing_if = "Option::is_none")]
        command: Option<String>,
    },
    NotFound {
        message: &'static str,
        searched: Searched<'a>,
    },
    Error {
        message: &'static str,
    },
}

#[derive(Debug, Serialize)]
pub struct Location<'a> {
    pub box_id: Option<&'a Slot>,
    pub led_id: Option<&'a Slot>,
}

/// How the record was found
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchInfo<'a> {
    Exact,
    Fuzzy {
        score: u32,
        reasons: Vec<MatchReason>,
        runners_up: Vec<RunnerUp<'a>>,
    },
}

#[derive(Debug, Serialize)]
pub struct RunnerUp<'a> {
    pub part_number: &'a str,
    pub score: u32,
}

impl<'a> From<Resolution<'a>> for MatchInfo<'a> {
    fn from(resolution: Resolution<'a>) -> Self {
        match resolution {
            Resolution::Fuzzy { best, runners_up } => Self::Fuzzy {
                score: best.score,
                reasons: best.reasons,
                runners_up: runners_up
                    .iter()
                    .map(|c| RunnerUp {
                        part_number: c.part_number,
                        score: c.score,
                    })
                    .collect(),
            },
            Resolution::Exact { .. } | Resolution::NotFound => Self::Exact,
        }
    }
}

/// Fields as received, echoed back on a miss
#[derive(Debug, Serialize)]
pub struct Searched<'a> {
    pub part_number: &'a str,
    pub parameter: &'a str,
    pub footprint: &'a str,
}

/// Resolve the query string against the table
pub fn lookup<'a>(
    params: &'a QueryParams,
    table: &'a LookupTable,
) -> (StatusCode, LightupResponse<'a>) {
    let part_number = params.get("part_number").unwrap_or_default();
    let parameter = params.get("parameter").unwrap_or_default();
    let footprint = params.get("footprint").unwrap_or_default();

    let query = SearchQuery::new(
        params.get_non_empty("part_number"),
        params.get_non_empty("parameter"),
        params.get_non_empty("footprint"),
    );
    if query.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            LightupResponse::Error {
                message: "At least one of part_number, parameter or footprint is required",
            },
        );
    }

    logger::log_lightup_request(part_number, parameter, footprint);

    let resolution = resolve(&query, table);
    let Some((matched_part_number, record)) = resolution.matched() else {
        logger::log_not_found();
        return (
            StatusCode::OK,
            LightupResponse::NotFound {
                message: "No matching component",
                searched: Searched {
                    part_number,
                    parameter,
                    footprint,
                },
            },
        );
    };
    if matches!(resolution, Resolution::Exact { .. }) {
        logger::log_exact_match(matched_part_number);
    }
    let match_info = MatchInfo::from(resolution);

    let command = serial_line(matched_part_number, record);
    (
        StatusCode::OK,
        LightupResponse::Success {
            message: "Component found",
            matched_part_number,
            location: Location {
                box_id: record.box_id.as_ref(),
                led_id: record.led_id.as_ref(),
            },
            details: record,
            match_info,
            command,
        },
    )
}

/// Serial line for the record, `None` when it has no complete location
fn serial_line(part_number: &str, record: &ComponentRecord) -> Option<String> {
    let (Some(box_id), Some(led_id)) = (&record.box_id, &record.led_id) else {
        logger::log_warning(&format!("{part_number} has no box_id/led_id, nothing to light"));
        return None;
    };

    let line = SerialCommand::new(box_id.clone(), led_id.clone()).encode();
    match DeviceCommand::parse(&line) {
        Ok(cmd) => logger::log_location(part_number, cmd.box_id, cmd.led_id),
        Err(e) => logger::log_warning(&format!(
            "{part_number}: controller will ignore '{}': {e}",
            line.trim_end()
        )),
    }
    Some(line)
}
