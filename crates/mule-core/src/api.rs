//! The slice of the cloud management API the dispatcher relies on.
//!
//! Everything else about the remote service (authentication, transport,
//! media types) stays behind [`RightApi`], so the dispatcher can be driven by
//! the HTTP client in [`crate::client`] or by an in-memory fake in tests.

use crate::error::{MuleError, Result};
use crate::types::Inputs;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Resource records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// A resource as returned by a `show` call: its own href plus named links to
/// related resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub href: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Resource {
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel == rel)
            .map(|l| l.href.as_str())
    }

    pub fn require_link(&self, rel: &str) -> Result<&str> {
        self.link(rel).ok_or_else(|| MuleError::MissingLink {
            href: self.href.clone(),
            rel: rel.to_string(),
        })
    }
}

/// One entry of a by-tag query: the tagged resource's links and its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedResource {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl TaggedResource {
    /// The tagged resource itself is the first link of the entry.
    pub fn resource_href(&self) -> Result<&str> {
        self.links
            .first()
            .map(|l| l.href.as_str())
            .ok_or_else(|| MuleError::MissingLink {
                href: "<tag query result>".to_string(),
                rel: "resource".to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// One revision of a RightScript lineage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightScript {
    pub name: String,
    pub revision: i64,
    pub href: String,
}

// ---------------------------------------------------------------------------
// ExecuteParams
// ---------------------------------------------------------------------------

/// The executable a `run_executable` call should run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Executable {
    RightScriptHref(String),
    RecipeName(String),
}

impl Executable {
    pub fn kind(&self) -> &'static str {
        match self {
            Executable::RightScriptHref(_) => "right_script_href",
            Executable::RecipeName(_) => "recipe_name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Executable::RightScriptHref(v) | Executable::RecipeName(v) => v,
        }
    }
}

/// Body of a `run_executable` call. Serializes to
/// `{"right_script_href": "..."}` or `{"recipe_name": "..."}`, plus
/// `"inputs"` when there are any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecuteParams {
    #[serde(flatten)]
    pub executable: Executable,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Inputs>,
}

impl ExecuteParams {
    /// Attach `inputs` only when non-empty.
    pub fn new(executable: Executable, inputs: &Inputs) -> Self {
        Self {
            executable,
            inputs: (!inputs.is_empty()).then(|| inputs.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// RightApi
// ---------------------------------------------------------------------------

pub trait RightApi {
    /// Instances carrying the given tags. `match_all` selects every-tag vs
    /// any-tag matching.
    fn instances_by_tag(&self, tags: &[String], match_all: bool) -> Result<Vec<TaggedResource>>;

    /// All revisions of the RightScripts whose name is exactly `name`.
    fn right_script_lineage(&self, name: &str) -> Result<Vec<RightScript>>;

    /// Fetch a resource by href.
    fn show(&self, href: &str) -> Result<Resource>;

    fn run_executable(&self, instance_href: &str, params: &ExecuteParams) -> Result<()>;

    /// Inputs 2.0 `multi_update` on the inputs of the resource at `owner_href`.
    fn multi_update_inputs(&self, owner_href: &str, inputs: &Inputs) -> Result<()>;
}

impl<T: RightApi + ?Sized> RightApi for &T {
    fn instances_by_tag(&self, tags: &[String], match_all: bool) -> Result<Vec<TaggedResource>> {
        (**self).instances_by_tag(tags, match_all)
    }

    fn right_script_lineage(&self, name: &str) -> Result<Vec<RightScript>> {
        (**self).right_script_lineage(name)
    }

    fn show(&self, href: &str) -> Result<Resource> {
        (**self).show(href)
    }

    fn run_executable(&self, instance_href: &str, params: &ExecuteParams) -> Result<()> {
        (**self).run_executable(instance_href, params)
    }

    fn multi_update_inputs(&self, owner_href: &str, inputs: &Inputs) -> Result<()> {
        (**self).multi_update_inputs(owner_href, inputs)
    }
}
