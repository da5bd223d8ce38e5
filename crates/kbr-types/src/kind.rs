use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kinds of resource managed through the Kibana API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// A Kibana user space (`/api/spaces/space`).
    UserSpace,
    /// A Kibana role (`/api/security/role`).
    Role,
    /// A Logstash pipeline managed by Kibana (`/api/logstash/pipeline`).
    LogstashPipeline,
}

impl ResourceKind {
    /// All kinds, in declaration order.
    pub const ALL: [ResourceKind; 3] = [Self::UserSpace, Self::Role, Self::LogstashPipeline];

    /// Stable snake_case name, used in logs and lock keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserSpace => "user_space",
            Self::Role => "role",
            Self::LogstashPipeline => "logstash_pipeline",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user_space" | "space" => Ok(Self::UserSpace),
            "role" => Ok(Self::Role),
            "logstash_pipeline" | "pipeline" => Ok(Self::LogstashPipeline),
            other => Err(TypeError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_as_str() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn parse_round_trips_canonical_names() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_accepts_short_aliases() {
        assert_eq!("space".parse::<ResourceKind>().unwrap(), ResourceKind::UserSpace);
        assert_eq!(
            "pipeline".parse::<ResourceKind>().unwrap(),
            ResourceKind::LogstashPipeline
        );
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "dashboard".parse::<ResourceKind>().unwrap_err();
        assert_eq!(err, TypeError::UnknownKind("dashboard".into()));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&ResourceKind::LogstashPipeline).unwrap();
        assert_eq!(json, "\"logstash_pipeline\"");
    }
}
