//! Merge rules for the `characters` list.
//!
//! Entries are matched by their `name` key. List order is the reviewable part of a
//! registry diff, so existing entries never move: appends go to the end and
//! upserts replace in place.

use crate::document::{DocumentError, RegistryDocument};
use crate::error::RegistryError;
use crate::model::{Character, MergeStrategy};
use serde_yaml::Value;

/// Executable merge strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    Append,
    Upsert,
}

impl TryFrom<MergeStrategy> for MergePolicy {
    type Error = RegistryError;

    fn try_from(strategy: MergeStrategy) -> Result<Self, Self::Error> {
        match strategy {
            MergeStrategy::Append => Ok(Self::Append),
            MergeStrategy::Upsert => Ok(Self::Upsert),
            MergeStrategy::PerFile => Err(RegistryError::NotImplemented {
                message: "per-file strategy not implemented".into(),
                context: None,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Added,
    Updated { index: usize },
}

impl MergeOutcome {
    #[must_use]
    pub fn default_commit_message(self, name: &str) -> String {
        match self {
            Self::Added => format!("chore: add character {name}"),
            Self::Updated { .. } => format!("chore: update character {name}"),
        }
    }
}

/// Index of the entry whose `name` equals `name`.
#[must_use]
pub fn position_of(entries: &[Value], name: &str) -> Option<usize> {
    entries.iter().position(|entry| entry.get("name").and_then(Value::as_str) == Some(name))
}

/// Merges an already serialized record into `entries`.
///
/// # Errors
/// Returns [`RegistryError::Conflict`] when appending a name that is already present;
/// `entries` is left untouched in that case.
pub fn merge_entry(
    entries: &mut Vec<Value>,
    name: &str,
    record: Value,
    policy: MergePolicy,
) -> Result<MergeOutcome, RegistryError> {
    match (position_of(entries, name), policy) {
        (Some(_), MergePolicy::Append) => Err(RegistryError::Conflict {
            message: format!("Character {name} already exists").into(),
            context: None,
        }),
        (Some(index), MergePolicy::Upsert) => {
            entries[index] = record;
            Ok(MergeOutcome::Updated { index })
        }
        (None, _) => {
            entries.push(record);
            Ok(MergeOutcome::Added)
        }
    }
}

/// Merges `character` into the document's `characters` list.
///
/// # Errors
/// See [`merge_entry`]; also fails if the character cannot be represented as YAML.
pub fn merge_character(
    document: &mut RegistryDocument,
    character: &Character,
    policy: MergePolicy,
) -> Result<MergeOutcome, RegistryError> {
    let record = serde_yaml::to_value(character).map_err(DocumentError::from)?;
    merge_entry(document.characters_mut(), &character.name, record, policy)
}
