use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("variant count must be at least 1")]
    ZeroVariantCount,
    #[error("invalid variant count '{0}': expected a whole number")]
    InvalidVariantCount(String),
}

/// Number of rewrites requested per node. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct VariantCount(u32);

impl VariantCount {
    pub const ONE: VariantCount = VariantCount(1);

    /// Strict constructor: zero is rejected.
    pub fn new(count: u32) -> Result<Self, RequestError> {
        if count == 0 {
            return Err(RequestError::ZeroVariantCount);
        }
        Ok(Self(count))
    }

    /// Lenient constructor for raw user input: anything below 1 becomes 1.
    pub fn clamped(count: i64) -> Self {
        Self(count.clamp(1, u32::MAX as i64) as u32)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for VariantCount {
    fn default() -> Self {
        Self(3)
    }
}

impl fmt::Display for VariantCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for VariantCount {
    type Error = RequestError;

    fn try_from(count: u32) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl From<VariantCount> for u32 {
    fn from(count: VariantCount) -> u32 {
        count.0
    }
}

/// Parses user input the way the count field does: surrounding whitespace is
/// ignored and non-positive numbers are clamped up to 1.
impl FromStr for VariantCount {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        trimmed
            .parse::<i64>()
            .map(Self::clamped)
            .map_err(|_| RequestError::InvalidVariantCount(trimmed.to_string()))
    }
}

/// Everything one generation run needs from the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub reference_text: String,
    pub instruction: String,
    pub variant_count: VariantCount,
}

impl GenerationRequest {
    pub fn new(
        reference_text: impl Into<String>,
        instruction: impl Into<String>,
        variant_count: VariantCount,
    ) -> Self {
        Self {
            reference_text: reference_text.into(),
            instruction: instruction.into(),
            variant_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_rejected() {
        assert_eq!(VariantCount::new(0), Err(RequestError::ZeroVariantCount));
        assert_eq!(VariantCount::new(4).unwrap().get(), 4);
    }

    #[test]
    fn clamped_raises_non_positive_to_one() {
        assert_eq!(VariantCount::clamped(0), VariantCount::ONE);
        assert_eq!(VariantCount::clamped(-7), VariantCount::ONE);
        assert_eq!(VariantCount::clamped(5).get(), 5);
        assert_eq!(VariantCount::clamped(i64::MAX).get(), u32::MAX);
    }

    #[test]
    fn parse_from_user_input() {
        assert_eq!(" 3 ".parse::<VariantCount>().unwrap().get(), 3);
        assert_eq!("-2".parse::<VariantCount>().unwrap(), VariantCount::ONE);
        assert!(matches!(
            "three".parse::<VariantCount>(),
            Err(RequestError::InvalidVariantCount(s)) if s == "three"
        ));
    }

    #[test]
    fn request_serde_rejects_zero_count() {
        let ok: GenerationRequest = serde_json::from_str(
            r#"{"reference_text":"a","instruction":"b","variant_count":2}"#,
        )
        .unwrap();
        assert_eq!(ok.variant_count.get(), 2);

        let bad = serde_json::from_str::<GenerationRequest>(
            r#"{"reference_text":"a","instruction":"b","variant_count":0}"#,
        );
        assert!(bad.is_err());
    }
}
