//! The agent entity: a recurring or one-shot background task descriptor.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{AgentError, Result};
use crate::models::{CalendarInterval, ScheduleType};
use crate::repository::codec::TAG_PREFIX;

/// Identifier assigned by the store on first persistence. Always positive.
pub type AgentId = i64;

/// Shared handle to a live agent. The repository hands out one handle per
/// persisted id, so mutations through any clone are visible to all holders.
pub type SharedAgent = Arc<Mutex<Agent>>;

const DEFAULT_SORT: i64 = 500;

/// Opaque identifier of the module owning an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A background task entry.
///
/// Starts life without an id; gains one exactly once through the
/// repository's insert path. Field invariants (positive id, non-empty
/// procedure and tags) are enforced at every construction and mutation
/// point, never silently corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: Option<AgentId>,
    procedure: String,
    module: ModuleId,
    schedule_type: ScheduleType,
    scheduled_at: DateTime<Utc>,
    interval: CalendarInterval,
    active: bool,
    sort: i64,
    executed_at: Option<DateTime<Utc>>,
    retry_at: Option<DateTime<Utc>>,
    running: bool,
    tags: Vec<String>,
}

impl Agent {
    /// Restore an agent previously persisted by the store. Every field is
    /// explicit and the id must be present.
    #[allow(clippy::too_many_arguments)]
    pub fn wake_up(
        id: AgentId,
        procedure: impl Into<String>,
        module: ModuleId,
        schedule_type: ScheduleType,
        scheduled_at: DateTime<Utc>,
        interval: CalendarInterval,
        active: bool,
        sort: i64,
        executed_at: Option<DateTime<Utc>>,
        retry_at: Option<DateTime<Utc>>,
        running: bool,
        tags: Vec<String>,
    ) -> Result<Self> {
        Self::new(
            Some(id),
            procedure.into(),
            module,
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
    }

    /// Create a fresh one-shot agent on a flexible schedule. The sort key
    /// defaults to 500 when not given.
    pub fn flexible(
        procedure: impl Into<String>,
        module: ModuleId,
        scheduled_at: DateTime<Utc>,
        interval: CalendarInterval,
        sort: Option<i64>,
    ) -> Result<Self> {
        Self::new(
            None,
            procedure.into(),
            module,
            ScheduleType::Flexible,
            scheduled_at,
            interval,
            true,
            sort.unwrap_or(DEFAULT_SORT),
            None,
            None,
            false,
            Vec::new(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        id: Option<AgentId>,
        procedure: String,
        module: ModuleId,
        schedule_type: ScheduleType,
        scheduled_at: DateTime<Utc>,
        interval: CalendarInterval,
        active: bool,
        sort: i64,
        executed_at: Option<DateTime<Utc>>,
        retry_at: Option<DateTime<Utc>>,
        running: bool,
        tags: Vec<String>,
    ) -> Result<Self> {
        if let Some(id) = id
            && id < 1
        {
            return Err(AgentError::Validation(format!(
                "agent id must be a positive integer, got [{id}]"
            )));
        }
        if procedure.is_empty() {
            return Err(AgentError::Validation(
                "agent procedure must not be an empty string".to_string(),
            ));
        }
        for tag in &tags {
            check_tag(tag)?;
        }

        Ok(Self {
            id,
            procedure,
            module,
            schedule_type,
            scheduled_at,
            interval,
            active,
            sort,
            executed_at,
            retry_at,
            running,
            tags,
        })
    }

    /// Overwrite every field from another instance with the same id.
    ///
    /// This is the identity-preserving update path: the repository uses it
    /// to refresh instances it handed out earlier without replacing them.
    pub fn sync_from(&mut self, other: &Agent) -> Result<()> {
        if self.id != other.id {
            return Err(AgentError::Validation(format!(
                "expected matching agent ids for sync, got [{:?}] and [{:?}]",
                self.id, other.id
            )));
        }

        self.id = other.id;
        self.procedure = other.procedure.clone();
        self.module = other.module.clone();
        self.schedule_type = other.schedule_type;
        self.scheduled_at = other.scheduled_at;
        self.interval = other.interval;
        self.active = other.active;
        self.sort = other.sort;
        self.executed_at = other.executed_at;
        self.retry_at = other.retry_at;
        self.running = other.running;
        self.tags = other.tags.clone();

        Ok(())
    }

    pub fn id(&self) -> Option<AgentId> {
        self.id
    }

    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    pub fn sort(&self) -> i64 {
        self.sort
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// Timestamp of the last completed execution, if any.
    pub fn executed_at(&self) -> Option<DateTime<Utc>> {
        self.executed_at
    }

    /// Timestamp of the next intended execution.
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Retry marker. When the agent is flagged as running but this moment
    /// has passed, the executor treats the previous run as hung or crashed
    /// and retries.
    pub fn retry_at(&self) -> Option<DateTime<Utc>> {
        self.retry_at
    }

    pub fn interval(&self) -> CalendarInterval {
        self.interval
    }

    /// Interval flattened to whole seconds for the persistence column.
    pub fn seconds_interval(&self) -> i64 {
        self.interval.total_seconds()
    }

    pub fn schedule_type(&self) -> ScheduleType {
        self.schedule_type
    }

    pub fn running(&self) -> bool {
        self.running
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Append a tag. Duplicates are kept; empty tags, tags with line
    /// breaks, and tags starting with the tag marker are rejected since
    /// the name field could not encode them reversibly.
    pub fn tag(&mut self, tag: impl Into<String>) -> Result<()> {
        let tag = tag.into();
        check_tag(&tag)?;

        self.tags.push(tag);
        Ok(())
    }

    /// Reschedule the next execution.
    pub fn schedule_at(&mut self, next_recurrence: DateTime<Utc>) {
        self.scheduled_at = next_recurrence;
    }

    /// Assign the id handed back by the store after a successful insert.
    /// Assigning twice is a programming error and fails loudly.
    pub fn persist_as(&mut self, id: AgentId) -> Result<()> {
        if id < 1 {
            return Err(AgentError::Validation(format!(
                "agent id must be a positive integer, got [{id}]"
            )));
        }
        if let Some(existing) = self.id {
            return Err(AgentError::Validation(format!(
                "agent is already persisted under id [{existing}]"
            )));
        }

        self.id = Some(id);
        Ok(())
    }

    /// Wrap into the shared handle form used by the repository.
    pub fn into_shared(self) -> SharedAgent {
        Arc::new(Mutex::new(self))
    }
}

fn check_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(AgentError::Validation(
            "agent tag must not be an empty string".to_string(),
        ));
    }
    if tag.contains('\n') {
        return Err(AgentError::Validation(
            "agent tag must not contain a line break".to_string(),
        ));
    }
    if tag.starts_with(TAG_PREFIX) {
        return Err(AgentError::Validation(format!(
            "agent tag must not start with the tag marker [{TAG_PREFIX}]"
        )));
    }
    Ok(())
}
