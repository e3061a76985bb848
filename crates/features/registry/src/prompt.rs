//! Flattens a character into an image-prompt tag list.

use crate::model::Character;
use serde_yaml::Value;
use std::collections::HashSet;

const BASE_TAGS: [&str; 2] = ["same face identity", "imaginary adult woman"];

/// Insertion-ordered set of tags; the first occurrence wins.
#[derive(Debug, Default)]
struct Tags {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl Tags {
    fn add(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if tag.trim().is_empty() || self.seen.contains(&tag) {
            return;
        }
        self.seen.insert(tag.clone());
        self.order.push(tag);
    }
}

/// Builds a comma-separated prompt from a character and scene-specific extras.
///
/// Tags are collected in this order: the base identity tags, the `face_blueprint`
/// values, the character's `always_add` tags, then `extras`. A string blueprint
/// value is used as is; for a mapping or list value each inner value is used
/// (lists joined with commas, deeper mappings skipped). Other values are ignored.
#[must_use]
pub fn build_prompt<S: AsRef<str>>(character: &Character, extras: &[S]) -> String {
    let mut tags = Tags::default();
    BASE_TAGS.into_iter().for_each(|tag| tags.add(tag));

    for value in character.face_blueprint.values() {
        match value {
            Value::String(text) => tags.add(text.as_str()),
            Value::Mapping(inner) => inner.values().filter_map(flatten).for_each(|t| tags.add(t)),
            Value::Sequence(inner) => inner.iter().filter_map(flatten).for_each(|t| tags.add(t)),
            _ => {}
        }
    }

    for tag in character.always_add.iter().flatten() {
        tags.add(tag.as_str());
    }
    for tag in extras {
        tags.add(tag.as_ref());
    }

    tags.order.join(", ")
}

fn flatten(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some("null".to_owned()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Sequence(items) => {
            Some(items.iter().filter_map(flatten).collect::<Vec<_>>().join(","))
        }
        Value::Mapping(_) => None,
        Value::Tagged(tagged) => flatten(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(blueprint: &str, always_add: Option<&[&str]>) -> Character {
        Character {
            name: "LUNA".to_owned(),
            face_blueprint: serde_yaml::from_str(blueprint).unwrap(),
            always_add: always_add.map(|tags| tags.iter().map(|&t| t.to_owned()).collect()),
            ..Character::default()
        }
    }

    #[test]
    fn flattens_in_order_and_deduplicates() {
        let luna = character(
            "eyes: blue eyes\nhair:\n  color: silver hair\n  length: long\nage: 30\n",
            Some(&["freckles", "blue eyes"]),
        );

        let prompt = build_prompt(&luna, &["beach", "freckles"]);

        assert_eq!(
            prompt,
            "same face identity, imaginary adult woman, blue eyes, silver hair, long, freckles, beach"
        );
    }

    #[test]
    fn nested_lists_are_joined_and_deep_mappings_skipped() {
        let luna = character(
            "features:\n  marks: [mole, scar]\n  shape: {jaw: soft}\n  ratio: 1.5\n",
            None,
        );

        let prompt = build_prompt::<&str>(&luna, &[]);

        assert_eq!(prompt, "same face identity, imaginary adult woman, mole,scar, 1.5");
    }
}
