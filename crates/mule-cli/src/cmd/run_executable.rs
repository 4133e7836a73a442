use crate::output::{print_json, print_report};
use anyhow::Context;
use clap::Args;
use mule_core::config::{AuthConfig, RunOptions};
use mule_core::types::{ExecutableType, Revision, TagMatchStrategy, UpdateTarget, UpdateTargets};
use mule_core::{HttpRightApi, RunExecutable};
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RunExecutableArgs {
    /// RightScript name or href, or a recipe name (cookbook::recipe)
    pub executable: String,

    /// Tags selecting the instances to run on
    #[arg(long, required = true, num_args = 1..)]
    pub tags: Vec<String>,

    /// With several tags: "all" matches instances carrying every tag, "any"
    /// matches instances carrying at least one
    #[arg(long, default_value = "all")]
    pub tag_match_strategy: String,

    /// What the executable argument is: auto, right_script_name, right_script_href, or recipe_name
    #[arg(long, default_value = "auto")]
    pub executable_type: String,

    /// RightScript revision to run when a name is given: "latest" or a revision number (0 is HEAD)
    #[arg(long, default_value = "latest")]
    pub right_script_revision: String,

    /// NAME=VALUE input for this run (value uses API syntax, e.g. text:foo)
    #[arg(long = "input", value_parser = parse_kv, value_name = "NAME=VALUE")]
    pub inputs: Vec<(String, String)>,

    /// Also store the inputs on: current_instance, next_instance, deployment
    #[arg(long, num_args = 1..)]
    pub update_inputs: Vec<String>,

    /// Auth parameters as key:value pairs (email:foo@bar.baz password:pw account_id:12345)
    #[arg(long, num_args = 1.., value_name = "KEY:VALUE")]
    pub rs_auth_hash: Vec<String>,

    /// YAML file containing auth parameters
    #[arg(long, env = "RS_MULE_AUTH_FILE")]
    pub rs_auth_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_kv(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, _)) if k.trim().is_empty() => Err(format!("input name cannot be empty in: {s}")),
        Some((k, v)) => Ok((k.trim().to_string(), v.to_string())),
        None => Err(format!("expected NAME=VALUE, got: {s}")),
    }
}

/// Inline pairs win over the file when both are given.
fn load_auth(args: &RunExecutableArgs) -> anyhow::Result<AuthConfig> {
    if !args.rs_auth_hash.is_empty() {
        return AuthConfig::from_pairs(&args.rs_auth_hash).context("invalid --rs-auth-hash");
    }
    if let Some(path) = &args.rs_auth_file {
        return AuthConfig::load(path)
            .with_context(|| format!("failed to load auth file {}", path.display()));
    }
    anyhow::bail!(
        "no authentication details\n\
         Supply --rs-auth-hash key:value... or --rs-auth-file <path> (or set RS_MULE_AUTH_FILE)"
    )
}

fn build_options(args: &RunExecutableArgs) -> anyhow::Result<RunOptions> {
    let executable_type: ExecutableType = args.executable_type.parse()?;
    let revision: Revision = args.right_script_revision.parse()?;
    let tag_match_strategy: TagMatchStrategy = args.tag_match_strategy.parse()?;
    let update_inputs = args
        .update_inputs
        .iter()
        .map(|s| s.parse::<UpdateTarget>())
        .collect::<Result<UpdateTargets, _>>()?;

    Ok(RunOptions {
        executable_type,
        revision,
        tag_match_strategy,
        inputs: args.inputs.iter().cloned().collect(),
        update_inputs,
    })
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(args: RunExecutableArgs, json: bool) -> anyhow::Result<()> {
    let auth = load_auth(&args)?;
    let options = build_options(&args)?;

    let api = HttpRightApi::connect(&auth)
        .with_context(|| format!("failed to authenticate against {}", auth.api_url()))?;
    tracing::info!(api_url = %auth.api_url(), "authenticated");

    let report = RunExecutable::new(api)
        .run(args.tags.clone(), &args.executable, &options)
        .with_context(|| format!("failed to run '{}'", args.executable))?;
    tracing::info!(instances = report.instances.len(), "dispatch complete");

    if json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RunExecutableArgs,
    }

    fn parse(argv: &[&str]) -> RunExecutableArgs {
        let mut full = vec!["rs-mule"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    #[test]
    fn defaults_match_library_defaults() {
        let args = parse(&["barbaz", "--tags", "foo"]);
        let opts = build_options(&args).unwrap();
        assert_eq!(opts.executable_type, ExecutableType::Auto);
        assert_eq!(opts.revision, Revision::Latest);
        assert_eq!(opts.tag_match_strategy, TagMatchStrategy::All);
        assert!(opts.inputs.is_empty());
        assert!(opts.update_inputs.is_empty());
    }

    #[test]
    fn all_options_are_parsed() {
        let args = parse(&[
            "barbaz",
            "--tags",
            "foo",
            "bar",
            "--tag-match-strategy",
            "any",
            "--executable-type",
            "right_script_name",
            "--right-script-revision",
            "3",
            "--input",
            "APP=text:shop",
            "--update-inputs",
            "deployment",
            "current_instance",
        ]);
        assert_eq!(args.tags, vec!["foo", "bar"]);
        let opts = build_options(&args).unwrap();
        assert_eq!(opts.executable_type, ExecutableType::RightScriptName);
        assert_eq!(opts.revision, Revision::Number(3));
        assert_eq!(opts.tag_match_strategy, TagMatchStrategy::Any);
        assert_eq!(opts.inputs.get("APP").map(String::as_str), Some("text:shop"));
        assert_eq!(
            opts.update_inputs.iter().collect::<Vec<_>>(),
            vec![UpdateTarget::Deployment, UpdateTarget::CurrentInstance]
        );
    }

    #[test]
    fn bogus_executable_type_is_rejected() {
        let args = parse(&["barbaz", "--tags", "foo", "--executable-type", "bogus"]);
        let err = build_options(&args).unwrap_err();
        assert!(err.to_string().contains("unknown executable_type (bogus)"));
    }

    #[test]
    fn tags_are_required() {
        assert!(TestCli::try_parse_from(["rs-mule", "barbaz"]).is_err());
    }

    #[test]
    fn missing_auth_is_an_error() {
        let args = RunExecutableArgs {
            rs_auth_file: None,
            ..parse(&["barbaz", "--tags", "foo"])
        };
        let err = load_auth(&args).unwrap_err();
        assert!(err.to_string().contains("no authentication details"));
    }

    #[test]
    fn auth_hash_wins_over_file() {
        let args = parse(&[
            "barbaz",
            "--tags",
            "foo",
            "--rs-auth-file",
            "/does/not/exist.yaml",
            "--rs-auth-hash",
            "email:a@b.c",
            "password:pw",
            "account_id:1",
        ]);
        let auth = load_auth(&args).unwrap();
        assert_eq!(auth.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn parse_kv_rejects_missing_equals() {
        assert!(parse_kv("APP").is_err());
        assert!(parse_kv("=x").is_err());
        assert_eq!(
            parse_kv("APP=text:a=b").unwrap(),
            ("APP".to_string(), "text:a=b".to_string())
        );
    }
}
