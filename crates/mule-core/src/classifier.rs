use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// What an `auto` executable identifier turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// `cookbook::recipe`
    Recipe,
    /// `/api/right_scripts/<id>`
    RightScriptHref,
    /// Anything else; resolved through a lineage lookup.
    RightScriptName,
}

static RECIPE_RE: OnceLock<Regex> = OnceLock::new();
static RIGHT_SCRIPT_HREF_RE: OnceLock<Regex> = OnceLock::new();

fn recipe_re() -> &'static Regex {
    RECIPE_RE.get_or_init(|| Regex::new(r"::").unwrap())
}

fn right_script_href_re() -> &'static Regex {
    RIGHT_SCRIPT_HREF_RE.get_or_init(|| Regex::new(r"^/api/right_scripts/[a-zA-Z0-9]*").unwrap())
}

/// Classify an executable identifier. The recipe shape is checked first, so
/// an href that somehow contains `::` is treated as a recipe.
pub fn classify(identifier: &str) -> Classification {
    if recipe_re().is_match(identifier) {
        Classification::Recipe
    } else if right_script_href_re().is_match(identifier) {
        Classification::RightScriptHref
    } else {
        Classification::RightScriptName
    }
}
