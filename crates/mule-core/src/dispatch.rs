//! Resolve an executable once, then run it on every instance matching a tag
//! set, optionally pushing the inputs onto related objects afterwards.

use crate::api::{ExecuteParams, Executable, Resource, RightApi, RightScript};
use crate::classifier::{classify, Classification};
use crate::config::RunOptions;
use crate::error::{MuleError, Result};
use crate::types::{ExecutableType, Inputs, Revision, TagSet, UpdateTarget};
use serde::Serialize;

// ---------------------------------------------------------------------------
// DispatchReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub executable: Executable,
    pub instances: Vec<String>,
}

// ---------------------------------------------------------------------------
// RunExecutable
// ---------------------------------------------------------------------------

pub struct RunExecutable<A> {
    api: A,
}

impl<A: RightApi> RunExecutable<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Run `executable` on every instance matching `tags`.
    ///
    /// There is no per-instance error isolation: the first failure (lookup,
    /// execution, or input propagation) aborts the remaining instances.
    pub fn run(
        &self,
        tags: impl Into<TagSet>,
        executable: &str,
        options: &RunOptions,
    ) -> Result<DispatchReport> {
        let tags = tags.into();
        if tags.is_empty() {
            return Err(MuleError::InvalidConfig(
                "at least one tag is required".into(),
            ));
        }

        let resolved = self.resolve(executable, options)?;
        let params = ExecuteParams::new(resolved.clone(), &options.inputs);
        tracing::debug!(
            kind = resolved.kind(),
            executable = resolved.value(),
            "resolved executable"
        );

        let matches = self
            .api
            .instances_by_tag(tags.as_slice(), options.tag_match_strategy.match_all())?;
        tracing::info!(
            count = matches.len(),
            strategy = %options.tag_match_strategy,
            "matched instances by tag"
        );

        let mut instances = Vec::with_capacity(matches.len());
        for tagged in &matches {
            let instance = self.api.show(tagged.resource_href()?)?;
            tracing::info!(instance = %instance.href, executable = resolved.value(), "running executable");
            self.api.run_executable(&instance.href, &params)?;
            for target in options.update_inputs.iter() {
                self.update_inputs(&instance, &options.inputs, target)?;
            }
            instances.push(instance.href);
        }

        Ok(DispatchReport {
            executable: resolved,
            instances,
        })
    }

    /// Turn the identifier into a concrete executable without touching any
    /// instance.
    pub fn resolve(&self, executable: &str, options: &RunOptions) -> Result<Executable> {
        let by_name = |name: &str| -> Result<Executable> {
            let lineage = self.find_lineage(name)?;
            let script = revision_from_lineage(&lineage, options.revision)?;
            Ok(Executable::RightScriptHref(script.href.clone()))
        };

        match options.executable_type {
            ExecutableType::RightScriptHref => Ok(Executable::RightScriptHref(executable.to_string())),
            ExecutableType::RecipeName => Ok(Executable::RecipeName(executable.to_string())),
            ExecutableType::RightScriptName => by_name(executable),
            ExecutableType::Auto => match classify(executable) {
                Classification::Recipe => Ok(Executable::RecipeName(executable.to_string())),
                Classification::RightScriptHref => {
                    Ok(Executable::RightScriptHref(executable.to_string()))
                }
                Classification::RightScriptName => by_name(executable),
            },
        }
    }

    fn find_lineage(&self, name: &str) -> Result<Vec<RightScript>> {
        let lineage: Vec<RightScript> = self
            .api
            .right_script_lineage(name)?
            .into_iter()
            .filter(|rs| rs.name == name)
            .collect();
        if lineage.is_empty() {
            return Err(MuleError::RightScriptNotFound(format!(
                "no RightScripts with the name ({name}) were found"
            )));
        }
        Ok(lineage)
    }

    fn update_inputs(&self, instance: &Resource, inputs: &Inputs, target: UpdateTarget) -> Result<()> {
        let owner = match target {
            UpdateTarget::CurrentInstance => instance.href.clone(),
            UpdateTarget::NextInstance => {
                let parent = self.api.show(instance.require_link("parent")?)?;
                parent.require_link("next_instance")?.to_string()
            }
            UpdateTarget::Deployment => instance.require_link("deployment")?.to_string(),
        };
        tracing::info!(update = %target, owner = %owner, "updating inputs");
        self.api.multi_update_inputs(&owner, inputs)
    }
}

/// Pick a revision out of a lineage. `Latest` takes the highest revision
/// number; on a tie the last one wins.
pub fn revision_from_lineage(lineage: &[RightScript], revision: Revision) -> Result<&RightScript> {
    match revision {
        Revision::Latest => lineage.iter().max_by_key(|rs| rs.revision).ok_or_else(|| {
            MuleError::RightScriptNotFound("lineage is empty".into())
        }),
        Revision::Number(n) => lineage.iter().find(|rs| rs.revision == n).ok_or_else(|| {
            let available: Vec<String> = lineage.iter().map(|rs| rs.revision.to_string()).collect();
            MuleError::RightScriptNotFound(format!(
                "revision ({n}) was not found; available revisions are ({})",
                available.join(", ")
            ))
        }),
    }
}
