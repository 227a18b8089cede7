//! Row codec: agent <-> raw store row conversions.
//!
//! The store offers a single free-text name field per row; tags are
//! multiplexed into it as sentinel-prefixed lines below the procedure
//! line. Booleans travel as Y/N tokens, timestamps as unix seconds, and
//! the interval as its flattened seconds value.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use agentry_storage::{RawRow, Truth, schema};

use crate::error::{AgentError, Result};
use crate::models::{Agent, CalendarInterval, ModuleId, ScheduleType};

/// Marker prefixing every tag line inside the name field.
pub const TAG_PREFIX: &str = "//@";

/// Build the persisted name field from a procedure and its tags.
pub fn encode_name(procedure: &str, tags: &[String]) -> String {
    let mut name = procedure.to_string();
    for tag in tags {
        name.push('\n');
        name.push_str(TAG_PREFIX);
        name.push_str(tag);
    }
    name
}

/// Split a persisted name field back into procedure and tags.
///
/// The procedure occupies exactly the first line. Every later line
/// starting with the sentinel yields a tag; other lines are ignored.
pub fn decode_name(name: &str) -> (String, Vec<String>) {
    let mut lines = name.lines();
    let procedure = lines.next().unwrap_or_default().to_string();
    let tags = lines
        .filter_map(|line| line.strip_prefix(TAG_PREFIX))
        .map(str::to_string)
        .collect();
    (procedure, tags)
}

/// Build the raw row persisted for an agent. The id is not part of the
/// row; insert and update key it separately.
pub fn encode_row(agent: &Agent) -> RawRow {
    let mut row = RawRow::new();
    row.insert(
        schema::MODULE_ID.to_string(),
        Value::from(agent.module().as_str()),
    );
    row.insert(schema::SORT.to_string(), Value::from(agent.sort()));
    row.insert(
        schema::NAME.to_string(),
        Value::from(encode_name(agent.procedure(), agent.tags())),
    );
    row.insert(
        schema::ACTIVE.to_string(),
        Value::from(Truth::from_bool(agent.active()).as_str()),
    );
    row.insert(
        schema::LAST_EXEC.to_string(),
        timestamp_value(agent.executed_at()),
    );
    row.insert(
        schema::NEXT_EXEC.to_string(),
        timestamp_value(Some(agent.scheduled_at())),
    );
    row.insert(
        schema::DATE_CHECK.to_string(),
        timestamp_value(agent.retry_at()),
    );
    row.insert(
        schema::AGENT_INTERVAL.to_string(),
        Value::from(agent.seconds_interval()),
    );
    row.insert(
        schema::IS_PERIOD.to_string(),
        Value::from(agent.schedule_type().to_periodic().as_str()),
    );
    // Owner assignment is not modelled; the column is always written null.
    row.insert(schema::USER_ID.to_string(), Value::Null);
    row.insert(
        schema::RUNNING.to_string(),
        Value::from(Truth::from_bool(agent.running()).as_str()),
    );
    row
}

/// Normalize and decode a fetched row into an agent.
pub fn decode_row(row: &RawRow) -> Result<Agent> {
    let id = positive_int_field(row, schema::ID)?;
    let module = string_field(row, schema::MODULE_ID)?;
    let sort = int_field(row, schema::SORT)?;
    let (procedure, tags) = decode_name(string_field(row, schema::NAME)?);
    let active = truth_field(row, schema::ACTIVE)?.to_bool();
    let executed_at = optional_timestamp_field(row, schema::LAST_EXEC)?;
    let scheduled_at = timestamp_field(row, schema::NEXT_EXEC)?;
    let retry_at = optional_timestamp_field(row, schema::DATE_CHECK)?;
    let interval = interval_field(row, schema::AGENT_INTERVAL)?;
    let schedule_type = ScheduleType::from_periodic(truth_field(row, schema::IS_PERIOD)?);
    // Validated for shape even though the owner column is unused.
    optional_positive_int_field(row, schema::USER_ID)?;
    let running = truth_field(row, schema::RUNNING)?.to_bool();

    Agent::wake_up(
        id,
        procedure,
        ModuleId::new(module),
        schedule_type,
        scheduled_at,
        interval,
        active,
        sort,
        executed_at,
        retry_at,
        running,
        tags,
    )
    .map_err(|err| AgentError::Decode(format!("row [{id}] rejected: {err}")))
}

fn timestamp_value(time: Option<DateTime<Utc>>) -> Value {
    match time {
        Some(time) => Value::from(time.timestamp()),
        None => Value::Null,
    }
}

fn require<'a>(row: &'a RawRow, field: &str) -> Result<&'a Value> {
    row.get(field)
        .ok_or_else(|| AgentError::Decode(format!("row is missing expected field [{field}]")))
}

fn int_field(row: &RawRow, field: &str) -> Result<i64> {
    require(row, field)?
        .as_i64()
        .ok_or_else(|| AgentError::Decode(format!("field [{field}] is not an integer")))
}

fn positive_int_field(row: &RawRow, field: &str) -> Result<i64> {
    let value = int_field(row, field)?;
    if value < 1 {
        return Err(AgentError::Decode(format!(
            "field [{field}] must be a positive integer, got [{value}]"
        )));
    }
    Ok(value)
}

fn optional_positive_int_field(row: &RawRow, field: &str) -> Result<Option<i64>> {
    if require(row, field)?.is_null() {
        return Ok(None);
    }
    positive_int_field(row, field).map(Some)
}

fn string_field<'a>(row: &'a RawRow, field: &str) -> Result<&'a str> {
    let value = require(row, field)?
        .as_str()
        .ok_or_else(|| AgentError::Decode(format!("field [{field}] is not a string")))?;
    if value.is_empty() {
        return Err(AgentError::Decode(format!(
            "field [{field}] must not be an empty string"
        )));
    }
    Ok(value)
}

fn truth_field(row: &RawRow, field: &str) -> Result<Truth> {
    let token = require(row, field)?
        .as_str()
        .ok_or_else(|| AgentError::Decode(format!("field [{field}] is not a string")))?;
    Truth::parse(token)
        .ok_or_else(|| AgentError::Decode(format!("field [{field}] holds unknown token [{token}]")))
}

fn timestamp_field(row: &RawRow, field: &str) -> Result<DateTime<Utc>> {
    let seconds = int_field(row, field)?;
    Utc.timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| AgentError::Decode(format!("field [{field}] is not a valid timestamp")))
}

fn optional_timestamp_field(row: &RawRow, field: &str) -> Result<Option<DateTime<Utc>>> {
    if require(row, field)?.is_null() {
        return Ok(None);
    }
    timestamp_field(row, field).map(Some)
}

fn interval_field(row: &RawRow, field: &str) -> Result<CalendarInterval> {
    let seconds = int_field(row, field)?;
    let seconds = u32::try_from(seconds)
        .map_err(|_| AgentError::Decode(format!("field [{field}] is out of range: [{seconds}]")))?;
    Ok(CalendarInterval::from_seconds(seconds))
}
