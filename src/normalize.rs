//! Turns repaired generator JSON into fully populated expression records.
//!
//! Only a parse failure or a missing/empty record array is an error. Every
//! malformed or missing field is replaced with a placeholder and logged.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{instrument, warn};

use crate::domain::{expression_id, Expression, Intent, Level};
use crate::error::ValidationError;
use crate::prompt::RECORDS_KEY;

pub const TEXT_PLACEHOLDER: &str = "한국어";
pub const CONTEXT_PLACEHOLDER: &str = "Context not provided";
pub const GRAMMAR_PLACEHOLDER: &str = "Grammar information not available";
pub const CULTURAL_NOTE_PLACEHOLDER: &str = "Cultural context not provided";

/// Older prompts asked for `korean` instead of `text`.
const TEXT_KEYS: [&str; 2] = ["text", "korean"];

#[instrument(level = "debug", skip(repaired, intent), fields(repaired_len = repaired.len()))]
pub fn normalize(repaired: &str, intent: &Intent) -> Result<Vec<Expression>, ValidationError> {
  normalize_at(repaired, intent, Utc::now().timestamp_millis())
}

/// Same as [`normalize`] with an explicit id timestamp.
pub fn normalize_at(repaired: &str, intent: &Intent, millis: i64) -> Result<Vec<Expression>, ValidationError> {
  let parsed: Value = serde_json::from_str(repaired).map_err(|e| ValidationError::Parse(e.to_string()))?;
  let items = match parsed.get(RECORDS_KEY) {
    None | Some(Value::Null) => return Err(ValidationError::MissingArray(RECORDS_KEY)),
    Some(Value::Array(items)) => items,
    Some(_) => return Err(ValidationError::NotAnArray(RECORDS_KEY)),
  };
  if items.is_empty() {
    return Err(ValidationError::EmptyArray(RECORDS_KEY));
  }

  let empty = Map::new();
  let records = items
    .iter()
    .enumerate()
    .map(|(idx, item)| {
      let obj = item.as_object().unwrap_or_else(|| {
        warn!(target: "expressions", index = idx, "Record is not an object; using defaults for every field");
        &empty
      });
      normalize_record(obj, idx, intent, millis)
    })
    .collect();
  Ok(records)
}

fn normalize_record(obj: &Map<String, Value>, idx: usize, intent: &Intent, millis: i64) -> Expression {
  let level = match non_empty_str(obj, "level") {
    Some(raw) => raw.parse::<Level>().unwrap_or_else(|_| {
      warn!(target: "expressions", index = idx, raw_level = raw, "Unknown level; defaulting to formal");
      Level::Formal
    }),
    None => {
      defaulted(idx, "level");
      Level::Formal
    }
  };

  let text = TEXT_KEYS
    .iter()
    .find_map(|k| non_empty_str(obj, k))
    .map(str::to_string)
    .unwrap_or_else(|| {
      defaulted(idx, "text");
      TEXT_PLACEHOLDER.to_string()
    });

  Expression {
    id: expression_id(millis, idx),
    level,
    text,
    translation: str_or(obj, "translation", idx, intent.as_str()),
    context: str_or(obj, "context", idx, CONTEXT_PLACEHOLDER),
    grammar_points: grammar_points(obj, idx),
    cultural_note: str_or(obj, "culturalNote", idx, CULTURAL_NOTE_PLACEHOLDER),
    vocabulary: Vec::new(),
  }
}

/// Non-string array items are dropped; an array with no usable strings counts as missing.
fn grammar_points(obj: &Map<String, Value>, idx: usize) -> Vec<String> {
  let points: Vec<String> = match obj.get("grammarPoints") {
    Some(Value::Array(items)) => items
      .iter()
      .filter_map(Value::as_str)
      .filter(|s| !s.trim().is_empty())
      .map(str::to_string)
      .collect(),
    _ => Vec::new(),
  };
  if points.is_empty() {
    defaulted(idx, "grammarPoints");
    vec![GRAMMAR_PLACEHOLDER.to_string()]
  } else {
    points
  }
}

fn str_or(obj: &Map<String, Value>, key: &str, idx: usize, default: &str) -> String {
  match non_empty_str(obj, key) {
    Some(s) => s.to_string(),
    None => {
      defaulted(idx, key);
      default.to_string()
    }
  }
}

fn non_empty_str<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
  obj.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn defaulted(idx: usize, field: &str) {
  warn!(target: "expressions", index = idx, field, "Field missing or malformed; using default");
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn intent() -> Intent {
    Intent::parse("I want to casually ask a friend to hang out").unwrap()
  }

  #[test]
  fn level_only_record_is_fully_defaulted() {
    let out = normalize(r#"{"expressions": [{"level": "slang"}]}"#, &intent()).unwrap();
    assert_eq!(out.len(), 1);
    let r = &out[0];
    assert_eq!(r.level, Level::Slang);
    assert_eq!(r.text, TEXT_PLACEHOLDER);
    assert_eq!(r.translation, intent().as_str());
    assert_eq!(r.context, CONTEXT_PLACEHOLDER);
    assert_eq!(r.grammar_points, vec![GRAMMAR_PLACEHOLDER.to_string()]);
    assert_eq!(r.cultural_note, CULTURAL_NOTE_PLACEHOLDER);
    assert!(r.vocabulary.is_empty());
    assert!(!r.id.is_empty());
  }

  #[test]
  fn complete_records_are_copied_verbatim() {
    let input = json!({
      "expressions": [
        {
          "level": "informal",
          "text": "우리 놀자!",
          "translation": "Let's hang out!",
          "context": "Close friends",
          "grammarPoints": ["-자 suggestion ending"],
          "culturalNote": "Only with peers"
        }
      ]
    });
    let out = normalize_at(&input.to_string(), &intent(), 1_700_000_000_000).unwrap();
    let r = &out[0];
    assert_eq!(r.id, "expr-1700000000000-0");
    assert_eq!(r.level, Level::Informal);
    assert_eq!(r.text, "우리 놀자!");
    assert_eq!(r.translation, "Let's hang out!");
    assert_eq!(r.context, "Close friends");
    assert_eq!(r.grammar_points, vec!["-자 suggestion ending".to_string()]);
    assert_eq!(r.cultural_note, "Only with peers");
    assert!(r.vocabulary.is_empty());
  }

  #[test]
  fn korean_key_is_accepted_for_text() {
    let out = normalize(r#"{"expressions": [{"level": "formal", "korean": "감사합니다"}]}"#, &intent()).unwrap();
    assert_eq!(out[0].text, "감사합니다");
  }

  #[test]
  fn malformed_fields_fall_back_to_defaults() {
    let input = json!({
      "expressions": [
        { "level": "casual", "text": "", "translation": 42, "grammarPoints": [], "culturalNote": null },
        { "level": "slang", "grammarPoints": "not a list" },
        { "level": "formal", "grammarPoints": [1, " ", "honorific -시-"] },
        "just a string"
      ]
    });
    let out = normalize(&input.to_string(), &intent()).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(out[0].level, Level::Formal);
    assert_eq!(out[0].text, TEXT_PLACEHOLDER);
    assert_eq!(out[0].translation, intent().as_str());
    assert_eq!(out[0].grammar_points, vec![GRAMMAR_PLACEHOLDER.to_string()]);
    assert_eq!(out[0].cultural_note, CULTURAL_NOTE_PLACEHOLDER);
    assert_eq!(out[1].grammar_points, vec![GRAMMAR_PLACEHOLDER.to_string()]);
    assert_eq!(out[2].grammar_points, vec!["honorific -시-".to_string()]);
    assert_eq!(out[3].level, Level::Formal);
    assert_eq!(out[3].context, CONTEXT_PLACEHOLDER);
  }

  #[test]
  fn order_is_preserved_and_ids_are_unique() {
    let input = json!({ "expressions": [{"level": "slang"}, {"level": "formal"}, {"level": "slang"}] });
    let out = normalize(&input.to_string(), &intent()).unwrap();
    let levels: Vec<Level> = out.iter().map(|r| r.level).collect();
    assert_eq!(levels, vec![Level::Slang, Level::Formal, Level::Slang]);
    let mut ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);
  }

  #[test]
  fn unusable_arrays_are_validation_errors() {
    let i = intent();
    assert!(matches!(normalize("{not json", &i), Err(ValidationError::Parse(_))));
    assert_eq!(normalize(r#"{"other": []}"#, &i), Err(ValidationError::MissingArray("expressions")));
    assert_eq!(normalize(r#"{"expressions": null}"#, &i), Err(ValidationError::MissingArray("expressions")));
    assert_eq!(normalize(r#"{"expressions": {}}"#, &i), Err(ValidationError::NotAnArray("expressions")));
    assert_eq!(normalize(r#"{"expressions": []}"#, &i), Err(ValidationError::EmptyArray("expressions")));
  }
}
