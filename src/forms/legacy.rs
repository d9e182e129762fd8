use serde_json::{Map, Value};

use super::Draft;
use crate::models::Model;

/// Builds a draft from a request body that may use current column names,
/// camelCase names or historical names for the same value.
///
/// For every field the first present, non-null, non-empty source wins, in the
/// order: column name, then the field's aliases. Historical status
/// vocabularies are mapped through [`Model::legacy_value`]. When the model has
/// a derived maximum and only the base value is supplied, the maximum is set
/// to `base * multiple`.
pub fn normalize<M: Model>(raw: &Map<String, Value>) -> Draft {
    let mut draft = Draft::new();

    for spec in M::FIELDS {
        let sources = std::iter::once(spec.column).chain(spec.aliases.iter().copied());
        let Some(value) = sources.filter_map(|name| raw.get(name).and_then(scalar)).next() else {
            continue;
        };

        let value = match M::legacy_value(spec.column, &value) {
            Some(mapped) => mapped.to_string(),
            None => value,
        };
        draft.set(spec.column, value);
    }

    if let Some(rule) = M::DERIVED_MAX {
        if !draft.is_filled(rule.max) {
            let base = draft.get(rule.base).trim().parse::<i32>().ok();
            if let Some(derived) = base.and_then(|base| base.checked_mul(rule.multiple)) {
                draft.set(rule.max, derived.to_string());
            }
        }
    }

    draft
}

/// Same as [`normalize`] for flat string pairs such as an HTML form body.
pub fn normalize_pairs<M: Model, I, K, V>(pairs: I) -> Draft
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let raw: Map<String, Value> = pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect();
    normalize::<M>(&raw)
}

fn scalar(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}
