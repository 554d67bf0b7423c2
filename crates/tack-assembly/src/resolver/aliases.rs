//! Alias table lookup for module locations.
//!
//! This module handles resolution of aliases (e.g., "@folio/users" → "../ui-users").

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use super::AliasTable;

/// Resolve `module` through the alias table.
///
/// An exact key wins; otherwise the longest key that is a path prefix of the
/// module name (`"@folio"` matches `"@folio/users"`) is used with the rest of
/// the name appended. Relative targets are taken from `base_path`.
pub fn resolve_alias(module: &str, base_path: &Path, aliases: &AliasTable) -> Option<PathBuf> {
    let (target, rest) = match aliases.get(module) {
        Some(target) => (target, ""),
        None => aliases
            .iter()
            .filter_map(|(alias, target)| {
                module
                    .strip_prefix(alias.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|rest| (alias.len(), target, rest))
            })
            .max_by_key(|(len, _, _)| *len)
            .map(|(_, target, rest)| (target, rest))?,
    };

    let mut resolved = if target.is_absolute() {
        target.clone()
    } else {
        base_path.join(target)
    };
    if !rest.is_empty() {
        resolved.push(rest);
    }

    Some(resolved.clean())
}
