use std::fmt;
use std::str::FromStr;

/// Returned when a string is not one of the recognised notice keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown notice '{value}', expected one of: {expected}")]
pub struct NoticeKeyError {
    pub value: String,
    pub expected: String,
}

/// The notices a user can dismiss.
///
/// This enum is deliberately *closed*: a new notice requires a new variant, and every
/// boundary (HTTP, CLI, stored keys) validates against it. The wire form is the
/// camelCase name used by the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticeKey {
    EducationPrinciples,
    SonarlintAd,
    IssueCleanCodeGuide,
    QualityGateCaycConditionsSimplification,
}

impl NoticeKey {
    /// Every recognised notice, in declaration order.
    pub const ALL: [NoticeKey; 4] = [
        NoticeKey::EducationPrinciples,
        NoticeKey::SonarlintAd,
        NoticeKey::IssueCleanCodeGuide,
        NoticeKey::QualityGateCaycConditionsSimplification,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            NoticeKey::EducationPrinciples => "educationPrinciples",
            NoticeKey::SonarlintAd => "sonarlintAd",
            NoticeKey::IssueCleanCodeGuide => "issueCleanCodeGuide",
            NoticeKey::QualityGateCaycConditionsSimplification => {
                "qualityGateCaYCConditionsSimplification"
            }
        }
    }

    /// Comma-separated list of accepted wire values, for error messages and docs.
    pub fn accepted_values() -> String {
        Self::ALL
            .iter()
            .map(NoticeKey::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for NoticeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoticeKey {
    type Err = NoticeKeyError;

    /// Parses the exact wire value. Matching is case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| NoticeKeyError {
                value: s.to_owned(),
                expected: Self::accepted_values(),
            })
    }
}

impl TryFrom<&str> for NoticeKey {
    type Error = NoticeKeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl serde::Serialize for NoticeKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for NoticeKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_parses_from_its_wire_value() {
        for key in NoticeKey::ALL {
            assert_eq!(key.as_str().parse::<NoticeKey>().unwrap(), key);
        }
    }

    #[test]
    fn test_caycc_wire_value_keeps_original_casing() {
        assert_eq!(
            NoticeKey::QualityGateCaycConditionsSimplification.as_str(),
            "qualityGateCaYCConditionsSimplification"
        );
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = "notAThing".parse::<NoticeKey>().unwrap_err();
        assert_eq!(err.value, "notAThing");
        assert!(err.expected.contains("sonarlintAd"));
    }

    #[test]
    fn test_parsing_is_case_sensitive() {
        assert!("SonarlintAd".parse::<NoticeKey>().is_err());
        assert!(" sonarlintAd".parse::<NoticeKey>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_value() {
        let json = serde_json::to_string(&NoticeKey::IssueCleanCodeGuide).unwrap();
        assert_eq!(json, "\"issueCleanCodeGuide\"");
        assert!(serde_json::from_str::<NoticeKey>("\"bogus\"").is_err());
    }
}
