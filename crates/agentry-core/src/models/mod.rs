pub mod agent;
pub mod collection;
pub mod interval;
pub mod schedule_type;

pub use agent::{Agent, AgentId, ModuleId, SharedAgent};
pub use collection::AgentCollection;
pub use interval::CalendarInterval;
pub use schedule_type::ScheduleType;
