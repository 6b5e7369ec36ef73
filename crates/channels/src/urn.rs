//! Normalized sender/recipient addresses.
//!
//! A [`Urn`] can only be built through the normalizing constructors, so any
//! value that reaches the canonical model is already in its canonical form.

use {
    phonenumber::{Mode, country},
    serde::{Deserialize, Deserializer, Serialize, Serializer},
};

use crate::{Error, Result};

/// Longest digit string accepted as a short code when it is not a valid
/// international number.
const MAX_SHORTCODE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrnScheme {
    Tel,
    External,
}

impl UrnScheme {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Tel => "tel",
            Self::External => "ext",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn {
    scheme: UrnScheme,
    path: String,
}

impl Urn {
    /// Normalize a phone number into E.164 using `country` when the number
    /// carries no international prefix. Short codes are kept as bare digits.
    pub fn tel(raw: &str, country: Option<&str>) -> Result<Self> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
            .collect();
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::address(raw, "not a phone number"));
        }

        let region = match country {
            Some(code) if !code.trim().is_empty() => Some(
                code.trim()
                    .to_ascii_uppercase()
                    .parse::<country::Id>()
                    .map_err(|_| Error::address(raw, format!("unknown country '{code}'")))?,
            ),
            _ => None,
        };

        if let Ok(number) = phonenumber::parse(region, &cleaned)
            && phonenumber::is_valid(&number)
        {
            return Ok(Self {
                scheme: UrnScheme::Tel,
                path: number.format().mode(Mode::E164).to_string(),
            });
        }

        if !cleaned.starts_with('+') && digits.len() <= MAX_SHORTCODE_LEN {
            return Ok(Self {
                scheme: UrnScheme::Tel,
                path: digits.to_string(),
            });
        }

        Err(Error::address(raw, "not a valid phone number"))
    }

    /// Opaque provider identifier with no country context.
    pub fn external(raw: &str) -> Result<Self> {
        let path = raw.trim();
        if path.is_empty() {
            return Err(Error::address(raw, "empty external id"));
        }
        if path.chars().any(char::is_whitespace) {
            return Err(Error::address(raw, "external id contains whitespace"));
        }
        Ok(Self {
            scheme: UrnScheme::External,
            path: path.to_string(),
        })
    }

    /// Parse `scheme:path`, re-normalizing the path.
    pub fn parse(urn: &str, country: Option<&str>) -> Result<Self> {
        let (scheme, path) = urn
            .split_once(':')
            .ok_or_else(|| Error::address(urn, "missing scheme"))?;
        match scheme {
            "tel" => Self::tel(path, country),
            "ext" => Self::external(path),
            other => Err(Error::address(urn, format!("unsupported scheme '{other}'"))),
        }
    }

    pub fn scheme(&self) -> UrnScheme {
        self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Display for Urn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scheme.prefix(), self.path)
    }
}

impl Serialize for Urn {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Urn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw, None).map_err(serde::de::Error::custom)
    }
}
