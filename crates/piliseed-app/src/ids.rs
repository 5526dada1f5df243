// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! route_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the id can be placed between two `/` of a route.
            pub fn is_path_segment(&self) -> bool {
                !self.0.is_empty() && !self.0.contains(['/', '?', '#'])
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

route_id!(UserId);
route_id!(GreenhouseId);
route_id!(SensorId);
route_id!(SessionId);
route_id!(FilterId);

#[cfg(test)]
mod tests {
    use super::{GreenhouseId, SessionId};

    #[test]
    fn path_segment_rejects_separators_and_empty() {
        assert!(SessionId::new("abc123").is_path_segment());
        assert!(!SessionId::new("").is_path_segment());
        assert!(!SessionId::new("a/b").is_path_segment());
        assert!(!GreenhouseId::new("x?y").is_path_segment());
        assert!(!GreenhouseId::new("x#y").is_path_segment());
    }

    #[test]
    fn ids_serialize_as_plain_strings() -> anyhow::Result<()> {
        let json = serde_json::to_string(&SessionId::new("s-1"))?;
        assert_eq!(json, "\"s-1\"");
        let parsed: SessionId = serde_json::from_str("\"s-2\"")?;
        assert_eq!(parsed.as_str(), "s-2");
        Ok(())
    }
}
