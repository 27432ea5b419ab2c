use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The engagement kinds a campaign can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engagement {
    Like,
    Recast,
    Reply,
}

impl Engagement {
    pub const ALL: [Engagement; 3] = [Engagement::Like, Engagement::Recast, Engagement::Reply];

    pub fn as_str(&self) -> &'static str {
        match self {
            Engagement::Like => "like",
            Engagement::Recast => "recast",
            Engagement::Reply => "reply",
        }
    }
}

impl fmt::Display for Engagement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown engagement `{0}`, expected one of: like, recast, reply")]
pub struct ParseEngagementError(pub String);

impl FromStr for Engagement {
    type Err = ParseEngagementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(Engagement::Like),
            "recast" => Ok(Engagement::Recast),
            "reply" => Ok(Engagement::Reply),
            other => Err(ParseEngagementError(other.to_string())),
        }
    }
}

/// One like or recast on a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reaction {
    pub fid: u64,
}

/// One reply in a cast's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub author_fid: u64,
    pub text: String,
}
