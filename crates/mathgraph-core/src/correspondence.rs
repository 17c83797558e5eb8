//! Claimed subtree correspondences between two trees.
//!
//! JSON shape: `[{ "id": "<source>", "matches": [{ "id": "<target>", "type": "identical" }] }]`.
//! Match types are validated while decoding, so a list that decodes can always be applied.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Identical,
    Similar,
}

impl MatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchKind::Identical => "identical",
            MatchKind::Similar => "similar",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "identical" => Ok(MatchKind::Identical),
            "similar" => Ok(MatchKind::Similar),
            other => Err(Error::UnsupportedMatchType {
                kind: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Correspondence {
    /// Source subtree root in the first tree (unprefixed).
    pub id: String,
    pub matches: Vec<Match>,
}

impl Correspondence {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            matches: Vec::new(),
        }
    }

    pub fn with_match(mut self, target: impl Into<String>, kind: MatchKind) -> Self {
        self.matches.push(Match {
            id: target.into(),
            kind,
        });
        self
    }

    pub fn identical(self, target: impl Into<String>) -> Self {
        self.with_match(target, MatchKind::Identical)
    }

    pub fn similar(self, target: impl Into<String>) -> Self {
        self.with_match(target, MatchKind::Similar)
    }
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    id: RawId,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct RawCorrespondence {
    id: RawId,
    #[serde(default)]
    matches: Vec<RawMatch>,
}

// Ids are usually strings, but numeric ids show up in hand-written lists.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Str(String),
    Num(serde_json::Number),
}

impl From<RawId> for String {
    fn from(id: RawId) -> Self {
        match id {
            RawId::Str(s) => s,
            RawId::Num(n) => n.to_string(),
        }
    }
}

pub fn parse_correspondences(json: &str) -> Result<Vec<Correspondence>> {
    let raw: Vec<RawCorrespondence> = serde_json::from_str(json)?;
    convert(raw)
}

pub fn correspondences_from_value(value: serde_json::Value) -> Result<Vec<Correspondence>> {
    let raw: Vec<RawCorrespondence> = serde_json::from_value(value)?;
    convert(raw)
}

fn convert(raw: Vec<RawCorrespondence>) -> Result<Vec<Correspondence>> {
    raw.into_iter()
        .map(|c| -> Result<Correspondence> {
            let matches = c
                .matches
                .into_iter()
                .map(|m| -> Result<Match> {
                    Ok(Match {
                        id: m.id.into(),
                        kind: m.kind.parse()?,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Correspondence {
                id: c.id.into(),
                matches,
            })
        })
        .collect()
}
