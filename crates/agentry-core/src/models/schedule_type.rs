//! Schedule kind of an agent.

use agentry_storage::Truth;

/// How the external executor derives an agent's next run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleType {
    /// Fixed schedule: the run count depends only on the interval. The
    /// next execution time is the previously scheduled time plus the
    /// interval, regardless of when the run actually finished. Stored as
    /// a periodic agent.
    Fixed,
    /// Flexible schedule: the next execution time is the completion time
    /// of the previous run plus the interval. Stored as a non-periodic
    /// agent.
    Flexible,
}

impl ScheduleType {
    /// Translate the store's periodic flag into a schedule kind.
    pub fn from_periodic(periodic: Truth) -> Self {
        match periodic {
            Truth::Yes => ScheduleType::Fixed,
            Truth::No => ScheduleType::Flexible,
        }
    }

    /// Translate the schedule kind back into the store's periodic flag.
    pub fn to_periodic(&self) -> Truth {
        match self {
            ScheduleType::Fixed => Truth::Yes,
            ScheduleType::Flexible => Truth::No,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_periodic() {
        assert_eq!(ScheduleType::from_periodic(Truth::Yes), ScheduleType::Fixed);
        assert_eq!(
            ScheduleType::from_periodic(Truth::No),
            ScheduleType::Flexible
        );
    }

    #[test]
    fn test_to_periodic() {
        assert_eq!(ScheduleType::Fixed.to_periodic(), Truth::Yes);
        assert_eq!(ScheduleType::Flexible.to_periodic(), Truth::No);
    }

    #[test]
    fn test_periodic_round_trip() {
        for kind in [ScheduleType::Fixed, ScheduleType::Flexible] {
            assert_eq!(ScheduleType::from_periodic(kind.to_periodic()), kind);
        }
    }
}
