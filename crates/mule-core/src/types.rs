use crate::error::MuleError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Input name → value, passed through to the API untouched
/// (`text:foo`, `cred:BAR`, `env:...`).
pub type Inputs = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// ExecutableType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutableType {
    #[default]
    Auto,
    RightScriptName,
    RightScriptHref,
    RecipeName,
}

impl ExecutableType {
    pub fn all() -> &'static [ExecutableType] {
        &[
            ExecutableType::Auto,
            ExecutableType::RightScriptName,
            ExecutableType::RightScriptHref,
            ExecutableType::RecipeName,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExecutableType::Auto => "auto",
            ExecutableType::RightScriptName => "right_script_name",
            ExecutableType::RightScriptHref => "right_script_href",
            ExecutableType::RecipeName => "recipe_name",
        }
    }
}

impl fmt::Display for ExecutableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExecutableType {
    type Err = MuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(ExecutableType::Auto),
            "right_script_name" => Ok(ExecutableType::RightScriptName),
            "right_script_href" => Ok(ExecutableType::RightScriptHref),
            "recipe_name" => Ok(ExecutableType::RecipeName),
            _ => Err(MuleError::UnknownExecutableType(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Revision
// ---------------------------------------------------------------------------

/// Which revision of a RightScript lineage to run. Revision 0 is HEAD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Revision {
    #[default]
    Latest,
    Number(i64),
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Latest => f.write_str("latest"),
            Revision::Number(n) => write!(f, "{n}"),
        }
    }
}

impl std::str::FromStr for Revision {
    type Err = MuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "latest" {
            return Ok(Revision::Latest);
        }
        s.parse::<i64>().map(Revision::Number).map_err(|_| {
            MuleError::InvalidConfig(format!(
                "right_script_revision must be 'latest' or a revision number, got '{s}'"
            ))
        })
    }
}

impl From<i64> for Revision {
    fn from(n: i64) -> Self {
        Revision::Number(n)
    }
}

// ---------------------------------------------------------------------------
// TagMatchStrategy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatchStrategy {
    #[default]
    All,
    Any,
}

impl TagMatchStrategy {
    /// The `match_all` flag sent with a by-tag query.
    pub fn match_all(self) -> bool {
        matches!(self, TagMatchStrategy::All)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TagMatchStrategy::All => "all",
            TagMatchStrategy::Any => "any",
        }
    }
}

impl fmt::Display for TagMatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TagMatchStrategy {
    type Err = MuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(TagMatchStrategy::All),
            "any" => Ok(TagMatchStrategy::Any),
            _ => Err(MuleError::InvalidConfig(format!(
                "tag_match_strategy must be 'all' or 'any', got '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// UpdateTarget
// ---------------------------------------------------------------------------

/// An object related to a matched instance whose inputs get updated after
/// the executable runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTarget {
    CurrentInstance,
    NextInstance,
    Deployment,
}

impl UpdateTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateTarget::CurrentInstance => "current_instance",
            UpdateTarget::NextInstance => "next_instance",
            UpdateTarget::Deployment => "deployment",
        }
    }
}

impl fmt::Display for UpdateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UpdateTarget {
    type Err = MuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "current_instance" => Ok(UpdateTarget::CurrentInstance),
            "next_instance" => Ok(UpdateTarget::NextInstance),
            "deployment" => Ok(UpdateTarget::Deployment),
            _ => Err(MuleError::InvalidConfig(format!(
                "update_inputs must be one of current_instance, next_instance, deployment, got '{s}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// UpdateTargets
// ---------------------------------------------------------------------------

/// Ordered set of update targets. Duplicates collapse to the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTargets(Vec<UpdateTarget>);

impl UpdateTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: UpdateTarget) {
        if !self.0.contains(&target) {
            self.0.push(target);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = UpdateTarget> + '_ {
        self.0.iter().copied()
    }
}

impl From<UpdateTarget> for UpdateTargets {
    fn from(target: UpdateTarget) -> Self {
        Self(vec![target])
    }
}

impl FromIterator<UpdateTarget> for UpdateTargets {
    fn from_iter<I: IntoIterator<Item = UpdateTarget>>(iter: I) -> Self {
        let mut set = Self::new();
        for t in iter {
            set.insert(t);
        }
        set
    }
}

impl From<Vec<UpdateTarget>> for UpdateTargets {
    fn from(targets: Vec<UpdateTarget>) -> Self {
        targets.into_iter().collect()
    }
}

impl From<&[UpdateTarget]> for UpdateTargets {
    fn from(targets: &[UpdateTarget]) -> Self {
        targets.iter().copied().collect()
    }
}

// ---------------------------------------------------------------------------
// TagSet
// ---------------------------------------------------------------------------

/// Tags used to select instances. A single string becomes a one-element set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<&str> for TagSet {
    fn from(tag: &str) -> Self {
        Self(vec![tag.to_string()])
    }
}

impl From<String> for TagSet {
    fn from(tag: String) -> Self {
        Self(vec![tag])
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

impl From<&[&str]> for TagSet {
    fn from(tags: &[&str]) -> Self {
        Self(tags.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TagSet {
    fn from(tags: [&str; N]) -> Self {
        Self(tags.iter().map(|t| t.to_string()).collect())
    }
}
