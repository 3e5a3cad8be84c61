//! Vendor field-name remapping applied before typed decoding

use serde_json::{Map, Value};

/// Canonical field and the vendor names folded into it, highest priority first
type AliasTable = &'static [(&'static str, &'static [&'static str])];

/// Reasoning text appears under different names depending on the backend
const MESSAGE_ALIASES: AliasTable = &[("thought", &["reasoning_content", "reasoning"])];

/// Which part of a choice carries the message fields
#[derive(Debug, Clone, Copy)]
pub(crate) enum ChoiceField {
    Message,
    Delta,
}

impl ChoiceField {
    const fn key(self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Delta => "delta",
        }
    }
}

/// Rewrite `choices[*].<field>` in place using the message alias table
pub(crate) fn apply_choice_aliases(root: &mut Value, field: ChoiceField) {
    let Some(choices) = root.get_mut("choices").and_then(Value::as_array_mut) else {
        return;
    };

    for choice in choices {
        if let Some(object) = choice.get_mut(field.key()).and_then(Value::as_object_mut) {
            apply(object, MESSAGE_ALIASES);
        }
    }
}

fn apply(object: &mut Map<String, Value>, table: AliasTable) {
    for (target, sources) in table {
        let mut chosen = None;
        for source in *sources {
            // every source is removed, only the first non-null one is kept
            if let Some(value) = object.remove(*source)
                && chosen.is_none()
                && !value.is_null()
            {
                chosen = Some(value);
            }
        }

        if let Some(value) = chosen {
            object.insert((*target).to_owned(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reasoning_content_becomes_thought() {
        let mut tree = json!({"choices": [{"message": {"content": "4", "reasoning_content": "2+2"}}]});
        apply_choice_aliases(&mut tree, ChoiceField::Message);
        assert_eq!(tree, json!({"choices": [{"message": {"content": "4", "thought": "2+2"}}]}));
    }

    #[test]
    fn reasoning_content_wins_over_reasoning() {
        let mut tree = json!({"choices": [{"delta": {"reasoning": "b", "reasoning_content": "a"}}]});
        apply_choice_aliases(&mut tree, ChoiceField::Delta);
        assert_eq!(tree, json!({"choices": [{"delta": {"thought": "a"}}]}));
    }

    #[test]
    fn null_source_falls_through() {
        let mut tree = json!({"choices": [{"delta": {"reasoning_content": null, "reasoning": "r"}}]});
        apply_choice_aliases(&mut tree, ChoiceField::Delta);
        assert_eq!(tree, json!({"choices": [{"delta": {"thought": "r"}}]}));
    }

    #[test]
    fn only_requested_field_is_touched() {
        let mut tree = json!({"choices": [{"message": {"reasoning": "kept"}}]});
        apply_choice_aliases(&mut tree, ChoiceField::Delta);
        assert_eq!(tree, json!({"choices": [{"message": {"reasoning": "kept"}}]}));
    }

    #[test]
    fn missing_choices_is_noop() {
        let mut tree = json!({"object": "embedding"});
        apply_choice_aliases(&mut tree, ChoiceField::Message);
        assert_eq!(tree, json!({"object": "embedding"}));
    }
}
