//! Enumerated image generation options.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Invalid {option}: {value:?}, expected one of {allowed:?}")]
pub struct OptionParseError {
    option: &'static str,
    value: String,
    allowed: &'static [&'static str],
}

impl OptionParseError {
    fn new(option: &'static str, value: &str, allowed: &'static [&'static str]) -> Self {
        Self {
            option,
            value: value.to_string(),
            allowed,
        }
    }
}

/// Aspect ratio of generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "9:16")]
    Portrait9x16,
    #[serde(rename = "16:9")]
    Landscape16x9,
    #[serde(rename = "4:3")]
    Landscape4x3,
    #[serde(rename = "3:4")]
    Portrait3x4,
}

impl AspectRatio {
    pub const ALLOWED: &'static [&'static str] = &["1:1", "9:16", "16:9", "4:3", "3:4"];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait9x16 => "9:16",
            AspectRatio::Landscape16x9 => "16:9",
            AspectRatio::Landscape4x3 => "4:3",
            AspectRatio::Portrait3x4 => "3:4",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "9:16" => Ok(AspectRatio::Portrait9x16),
            "16:9" => Ok(AspectRatio::Landscape16x9),
            "4:3" => Ok(AspectRatio::Landscape4x3),
            "3:4" => Ok(AspectRatio::Portrait3x4),
            _ => Err(OptionParseError::new("aspect_ratio", s, Self::ALLOWED)),
        }
    }
}

/// Encoding of generated images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputMimeType {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
}

impl OutputMimeType {
    pub const ALLOWED: &'static [&'static str] = &["image/png", "image/jpeg"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMimeType::Png => "image/png",
            OutputMimeType::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for OutputMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputMimeType {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image/png" => Ok(OutputMimeType::Png),
            "image/jpeg" => Ok(OutputMimeType::Jpeg),
            _ => Err(OptionParseError::new("output_mime_type", s, Self::ALLOWED)),
        }
    }
}

/// Strictness of the service's safety filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyFilterLevel {
    BlockLowAndAbove,
    BlockMediumAndAbove,
    BlockOnlyHigh,
}

impl SafetyFilterLevel {
    pub const ALLOWED: &'static [&'static str] = &[
        "block_low_and_above",
        "block_medium_and_above",
        "block_only_high",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyFilterLevel::BlockLowAndAbove => "block_low_and_above",
            SafetyFilterLevel::BlockMediumAndAbove => "block_medium_and_above",
            SafetyFilterLevel::BlockOnlyHigh => "block_only_high",
        }
    }
}

impl fmt::Display for SafetyFilterLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SafetyFilterLevel {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "block_low_and_above" => Ok(SafetyFilterLevel::BlockLowAndAbove),
            "block_medium_and_above" => Ok(SafetyFilterLevel::BlockMediumAndAbove),
            "block_only_high" => Ok(SafetyFilterLevel::BlockOnlyHigh),
            _ => Err(OptionParseError::new("safety_filter_level", s, Self::ALLOWED)),
        }
    }
}

/// Whether the model may depict people.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonGeneration {
    DontAllow,
    AllowAdult,
}

impl PersonGeneration {
    pub const ALLOWED: &'static [&'static str] = &["dont_allow", "allow_adult"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PersonGeneration::DontAllow => "dont_allow",
            PersonGeneration::AllowAdult => "allow_adult",
        }
    }
}

impl fmt::Display for PersonGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PersonGeneration {
    type Err = OptionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dont_allow" => Ok(PersonGeneration::DontAllow),
            "allow_adult" => Ok(PersonGeneration::AllowAdult),
            _ => Err(OptionParseError::new("person_generation", s, Self::ALLOWED)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse() {
        for s in AspectRatio::ALLOWED {
            assert_eq!(s.parse::<AspectRatio>().unwrap().as_str(), *s);
        }
        let err = "2:1".parse::<AspectRatio>().unwrap_err();
        assert!(err.to_string().contains("aspect_ratio"));
        assert!(err.to_string().contains("16:9"));
    }

    #[test]
    fn test_mime_type_parse() {
        assert_eq!("IMAGE/PNG".parse::<OutputMimeType>().unwrap(), OutputMimeType::Png);
        assert!("image/gif".parse::<OutputMimeType>().is_err());
    }

    #[test]
    fn test_safety_and_person_parse() {
        for s in SafetyFilterLevel::ALLOWED {
            assert_eq!(s.parse::<SafetyFilterLevel>().unwrap().to_string(), *s);
        }
        for s in PersonGeneration::ALLOWED {
            assert_eq!(s.parse::<PersonGeneration>().unwrap().to_string(), *s);
        }
        assert!("block_most".parse::<SafetyFilterLevel>().is_err());
        assert!("allow_all".parse::<PersonGeneration>().is_err());
    }

    #[test]
    fn test_serde_matches_display() {
        assert_eq!(
            serde_json::to_value(AspectRatio::Landscape16x9).unwrap(),
            serde_json::json!("16:9")
        );
        assert_eq!(
            serde_json::to_value(SafetyFilterLevel::BlockOnlyHigh).unwrap(),
            serde_json::json!("block_only_high")
        );
    }
}
