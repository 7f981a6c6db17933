use crate::error::{BlockholeError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// How strict a domain block is. Ordered `None < Silence < Suspend`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityLevel {
    /// No-op block, used to carry comments or media/report rejection only
    None,
    /// Limit the domain: hide it from public timelines
    Silence,
    /// Full suspension: defederate from the domain
    #[default]
    Suspend,
}

impl SeverityLevel {
    /// Canonical string form used by the Mastodon API and list files
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "noop",
            Self::Silence => "silence",
            Self::Suspend => "suspend",
        }
    }

    /// Parse an optional severity string. A missing value means [`SeverityLevel::None`].
    pub fn from_opt(value: Option<&str>) -> Result<Self> {
        value.map_or(Ok(Self::None), str::parse)
    }
}

impl FromStr for SeverityLevel {
    type Err = BlockholeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "noop" => Ok(Self::None),
            "silence" => Ok(Self::Silence),
            "suspend" => Ok(Self::Suspend),
            other => Err(BlockholeError::InvalidSeverity(other.to_string())),
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SeverityLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SeverityLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Self::from_opt(value.as_deref()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_mapping() {
        assert_eq!("".parse::<SeverityLevel>().unwrap(), SeverityLevel::None);
        assert_eq!("noop".parse::<SeverityLevel>().unwrap(), SeverityLevel::None);
        assert_eq!("silence".parse::<SeverityLevel>().unwrap(), SeverityLevel::Silence);
        assert_eq!("suspend".parse::<SeverityLevel>().unwrap(), SeverityLevel::Suspend);
        assert_eq!(SeverityLevel::from_opt(None).unwrap(), SeverityLevel::None);
        assert_eq!(SeverityLevel::None.to_string(), "noop");
    }

    #[test]
    fn test_invalid_severity() {
        let err = "ban".parse::<SeverityLevel>().unwrap_err();
        assert!(matches!(err, BlockholeError::InvalidSeverity(s) if s == "ban"));
        // Case matters: the API only ever emits lowercase
        assert!("Suspend".parse::<SeverityLevel>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(SeverityLevel::None < SeverityLevel::Silence);
        assert!(SeverityLevel::Silence < SeverityLevel::Suspend);
        assert!(SeverityLevel::Suspend >= SeverityLevel::Suspend);
        assert!(SeverityLevel::Silence <= SeverityLevel::Suspend);
        assert_eq!(
            SeverityLevel::Silence.max(SeverityLevel::None),
            SeverityLevel::Silence
        );
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&SeverityLevel::Silence).unwrap();
        assert_eq!(json, "\"silence\"");
        let level: SeverityLevel = serde_json::from_str("null").unwrap();
        assert_eq!(level, SeverityLevel::None);
        assert!(serde_json::from_str::<SeverityLevel>("\"ban\"").is_err());
    }
}
