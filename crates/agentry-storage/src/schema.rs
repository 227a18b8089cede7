//! Agent table schema: field names and the store's boolean token pair.
//!
//! Both the row encoder and the row decoder key fields through these
//! constants, so the two directions cannot drift apart.

/// Name of the agent table in the underlying store.
pub const TABLE_NAME: &str = "agents";

pub const ID: &str = "ID";
pub const MODULE_ID: &str = "MODULE_ID";
pub const SORT: &str = "SORT";
pub const NAME: &str = "NAME";
pub const ACTIVE: &str = "ACTIVE";
pub const LAST_EXEC: &str = "LAST_EXEC";
pub const NEXT_EXEC: &str = "NEXT_EXEC";
pub const DATE_CHECK: &str = "DATE_CHECK";
pub const AGENT_INTERVAL: &str = "AGENT_INTERVAL";
pub const IS_PERIOD: &str = "IS_PERIOD";
pub const USER_ID: &str = "USER_ID";
pub const RUNNING: &str = "RUNNING";

/// The store's two-valued boolean representation.
///
/// Boolean flags are persisted as `"Y"`/`"N"` tokens rather than native
/// booleans; this enum is the translation boundary between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truth {
    Yes,
    No,
}

impl Truth {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Truth::Yes => "Y",
            Truth::No => "N",
        }
    }

    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "Y" => Some(Truth::Yes),
            "N" => Some(Truth::No),
            _ => None,
        }
    }

    pub fn from_bool(value: bool) -> Self {
        if value { Truth::Yes } else { Truth::No }
    }

    pub fn to_bool(self) -> bool {
        self == Truth::Yes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truth_tokens() {
        assert_eq!(Truth::Yes.as_str(), "Y");
        assert_eq!(Truth::No.as_str(), "N");
    }

    #[test]
    fn test_truth_parse() {
        assert_eq!(Truth::parse("Y"), Some(Truth::Yes));
        assert_eq!(Truth::parse("N"), Some(Truth::No));
        assert_eq!(Truth::parse("yes"), None);
        assert_eq!(Truth::parse(""), None);
    }

    #[test]
    fn test_truth_bool_round_trip() {
        assert!(Truth::from_bool(true).to_bool());
        assert!(!Truth::from_bool(false).to_bool());
    }
}
