use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(
    /// Divergent students get a mesh-shaped graph, convergent ones a tree.
    ThinkingType {
        Divergent => "divergent",
        Convergent => "convergent",
    }
);

impl Default for ThinkingType {
    fn default() -> Self {
        Self::Divergent
    }
}

str_enum!(TaskStatus {
    Pending => "pending",
    Completed => "completed",
    Skipped => "skipped",
});

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl TaskStatus {
    /// Whether a task in this status no longer blocks its batch.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Completed | Self::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn thinking_type_round_trip() {
        for (variant, s) in [
            (ThinkingType::Divergent, "divergent"),
            (ThinkingType::Convergent, "convergent"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(ThinkingType::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn task_status_round_trip() {
        for (variant, s) in [
            (TaskStatus::Pending, "pending"),
            (TaskStatus::Completed, "completed"),
            (TaskStatus::Skipped, "skipped"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(TaskStatus::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = ThinkingType::from_str("lateral").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ThinkingType::Convergent).unwrap();
        assert_eq!(json, "\"convergent\"");
        let parsed: TaskStatus = serde_json::from_str("\"skipped\"").unwrap();
        assert_eq!(parsed, TaskStatus::Skipped);
    }

    #[test]
    fn settled_statuses() {
        assert!(TaskStatus::Completed.is_settled());
        assert!(TaskStatus::Skipped.is_settled());
        assert!(!TaskStatus::Pending.is_settled());
    }

    #[test]
    fn defaults() {
        assert_eq!(ThinkingType::default(), ThinkingType::Divergent);
        assert_eq!(TaskStatus::default(), TaskStatus::Pending);
    }
}
