//! # Alias Resolver
//!
//! Variable aliases map an identifier used at call sites (for example a
//! constant holding the key) to the canonical variable key it stands for.
//! The resolver filters the configured map down to the alias names standing
//! for one target key; that set feeds both the scanner and the options
//! handed to rewrite engines.

use std::collections::{BTreeMap, BTreeSet};

use crate::errors::SweepError;

/// Parse repeatable `ALIAS=KEY` flag values into an alias map. A malformed
/// entry invalidates every subsequent match, so it fails the run early.
pub fn parse_alias_flags(values: &[String]) -> Result<BTreeMap<String, String>, SweepError> {
    let mut map = BTreeMap::new();
    for value in values {
        let (alias, key) = value.split_once('=').ok_or_else(|| {
            SweepError::Config(format!(
                "malformed variable alias '{value}' (expected ALIAS=KEY)"
            ))
        })?;
        let (alias, key) = (alias.trim(), key.trim());
        if alias.is_empty() || key.is_empty() {
            return Err(SweepError::Config(format!(
                "malformed variable alias '{value}' (expected ALIAS=KEY)"
            )));
        }
        map.insert(alias.to_string(), key.to_string());
    }
    Ok(map)
}

/// Merge CLI alias flags over the repo config's alias map; a flag wins when
/// both define the same alias name.
pub fn merge_alias_maps(
    configured: &BTreeMap<String, String>,
    flags: BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut merged = configured.clone();
    merged.extend(flags);
    merged
}

/// Filter an alias map down to the aliases whose canonical key equals the
/// target key.
pub fn aliases_for_key(
    configured: &BTreeMap<String, String>,
    target_key: &str,
) -> BTreeSet<String> {
    configured
        .iter()
        .filter(|(_, key)| key.as_str() == target_key)
        .map(|(alias, _)| alias.clone())
        .collect()
}
