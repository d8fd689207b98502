//! Permission resolution from file metadata and global settings.

use serde::{Deserialize, Serialize};

use crate::frontmatter::{MetaValue, Metadata};
use crate::settings::ImportSettings;

/// Access level assigned to a store entry. Mirrors the target store's
/// numeric ownership levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    /// No access.
    None = 0,
    /// Name-only visibility.
    Limited = 1,
    /// Read access.
    Observer = 2,
    /// Full control.
    Owner = 3,
}

impl PermissionLevel {
    /// Map a numeric metadata value onto a level.
    pub fn from_number(value: i64) -> Option<PermissionLevel> {
        match value {
            0 => Some(PermissionLevel::None),
            1 => Some(PermissionLevel::Limited),
            2 => Some(PermissionLevel::Observer),
            3 => Some(PermissionLevel::Owner),
            _ => None,
        }
    }

    /// Match a level name case-insensitively.
    pub fn from_name(name: &str) -> Option<PermissionLevel> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => Some(PermissionLevel::None),
            "limited" => Some(PermissionLevel::Limited),
            "observer" => Some(PermissionLevel::Observer),
            "owner" => Some(PermissionLevel::Owner),
            _ => None,
        }
    }
}

/// Derive the access level for a new entry. `None` means the entry
/// inherits the store default.
///
/// Priority, first match wins: an explicit `permission` metadata
/// property, then the GM-only exclusion, then the global observe flag.
pub fn resolve(metadata: &Metadata, settings: &ImportSettings) -> Option<PermissionLevel> {
    if let Some(value) = metadata.get("permission") {
        return Some(explicit_level(value));
    }

    let gm_only = metadata
        .get("gm-only")
        .and_then(MetaValue::as_bool)
        .unwrap_or(false);
    if settings.exclude_gm_only && gm_only {
        return Some(PermissionLevel::None);
    }

    if settings.player_observe {
        return Some(PermissionLevel::Observer);
    }

    None
}

/// Interpret an explicit `permission` metadata value. Numeric values are
/// used as-is; names are matched case-insensitively; anything
/// unrecognized falls back to observer.
fn explicit_level(value: &MetaValue) -> PermissionLevel {
    let MetaValue::Str(raw) = value else {
        return PermissionLevel::Observer;
    };
    if let Ok(number) = raw.trim().parse::<i64>() {
        return PermissionLevel::from_number(number).unwrap_or(PermissionLevel::Observer);
    }
    PermissionLevel::from_name(raw).unwrap_or(PermissionLevel::Observer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(player_observe: bool, exclude_gm_only: bool) -> ImportSettings {
        ImportSettings {
            player_observe,
            exclude_gm_only,
            ..ImportSettings::default()
        }
    }

    fn meta(pairs: &[(&str, MetaValue)]) -> Metadata {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn explicit_permission_wins_over_observe() {
        let metadata = meta(&[("permission", MetaValue::Str("owner".to_string()))]);
        assert_eq!(
            resolve(&metadata, &settings(true, false)),
            Some(PermissionLevel::Owner)
        );
    }

    #[test]
    fn explicit_permission_is_case_insensitive() {
        let metadata = meta(&[("permission", MetaValue::Str("LIMITED".to_string()))]);
        assert_eq!(
            resolve(&metadata, &settings(false, false)),
            Some(PermissionLevel::Limited)
        );
    }

    #[test]
    fn numeric_permission_is_used_as_is() {
        let metadata = meta(&[("permission", MetaValue::Str("3".to_string()))]);
        assert_eq!(
            resolve(&metadata, &settings(false, false)),
            Some(PermissionLevel::Owner)
        );
    }

    #[test]
    fn unrecognized_permission_defaults_to_observer() {
        let metadata = meta(&[("permission", MetaValue::Str("sovereign".to_string()))]);
        assert_eq!(
            resolve(&metadata, &settings(false, false)),
            Some(PermissionLevel::Observer)
        );
    }

    #[test]
    fn gm_only_exclusion_beats_observe() {
        let metadata = meta(&[("gm-only", MetaValue::Bool(true))]);
        assert_eq!(
            resolve(&metadata, &settings(true, true)),
            Some(PermissionLevel::None)
        );
    }

    #[test]
    fn gm_only_string_true_is_not_a_flag() {
        let metadata = meta(&[("gm-only", MetaValue::Str("true".to_string()))]);
        assert_eq!(
            resolve(&metadata, &settings(false, true)),
            None
        );
    }

    #[test]
    fn observe_applies_without_metadata() {
        assert_eq!(
            resolve(&Metadata::new(), &settings(true, false)),
            Some(PermissionLevel::Observer)
        );
    }

    #[test]
    fn default_is_inherited() {
        assert_eq!(resolve(&Metadata::new(), &settings(false, false)), None);
    }
}
