//! Domain models: intent, formality levels, expression records and the 4-record batch.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::error::{InputValidationError, ValidationError};

/// Upper bound on intent length, in characters.
pub const MAX_INTENT_CHARS: usize = 500;

/// What the learner wants to say, already validated (1..=500 chars, not blank).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intent(String);

impl Intent {
  /// Validate raw user input. Length is checked on the raw text, the stored value is trimmed.
  pub fn parse(raw: &str) -> Result<Self, InputValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return Err(InputValidationError::Missing);
    }
    if raw.chars().count() > MAX_INTENT_CHARS {
      return Err(InputValidationError::TooLong { max: MAX_INTENT_CHARS });
    }
    Ok(Self(trimmed.to_string()))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Intent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Formality register. Closed set; wire names are kebab-case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
  Formal,
  Informal,
  PoliteCasual,
  Slang,
}

impl Level {
  /// Canonical batch order.
  pub const ALL: [Level; 4] = [Level::Formal, Level::Informal, Level::PoliteCasual, Level::Slang];

  pub fn as_str(&self) -> &'static str {
    match self {
      Level::Formal => "formal",
      Level::Informal => "informal",
      Level::PoliteCasual => "polite-casual",
      Level::Slang => "slang",
    }
  }
}

impl fmt::Display for Level {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Level {
  type Err = String;

  /// Lenient: case-insensitive, `_` and spaces accepted in place of `-`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let key = s.trim().to_lowercase().replace(['_', ' '], "-");
    match key.as_str() {
      "formal" => Ok(Level::Formal),
      "informal" => Ok(Level::Informal),
      "polite-casual" => Ok(Level::PoliteCasual),
      "slang" => Ok(Level::Slang),
      _ => Err(format!("unknown level: {}", s)),
    }
  }
}

/// One generated expression. Built once by the normalizer or the fallback, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expression {
  /// Batch-scoped id, see [`expression_id`].
  pub id: String,
  pub level: Level,
  pub text: String,
  pub translation: String,
  pub context: String,
  pub grammar_points: Vec<String>,
  pub cultural_note: String,
  pub vocabulary: Vec<String>,
}

impl Expression {
  /// Same record with `vocabulary` replaced.
  pub fn with_vocabulary(self, vocabulary: Vec<String>) -> Self {
    Self { vocabulary, ..self }
  }
}

/// `expr-<unix millis>-<index>`. Unique within one batch only.
pub fn expression_id(millis: i64, index: usize) -> String {
  format!("expr-{}-{}", millis, index)
}

/// Exactly one record per [`Level`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Batch(Vec<Expression>);

impl Batch {
  /// Assemble a batch from generator records.
  ///
  /// The first record seen for each level wins and generator order is kept.
  /// Fails if any level has no record at all.
  pub fn from_records(records: Vec<Expression>) -> Result<Self, ValidationError> {
    let mut kept: Vec<Expression> = Vec::with_capacity(Level::ALL.len());
    for rec in records {
      if kept.iter().all(|k| k.level != rec.level) {
        kept.push(rec);
      }
    }

    let missing: Vec<&str> = Level::ALL
      .iter()
      .filter(|lvl| kept.iter().all(|k| k.level != **lvl))
      .map(Level::as_str)
      .collect();
    if !missing.is_empty() {
      return Err(ValidationError::IncompleteBatch(missing.join(", ")));
    }
    Ok(Self(kept))
  }

  /// Build one record per level in canonical order.
  /// `make` receives the position and level and must return a record of that level.
  pub fn from_levels(mut make: impl FnMut(usize, Level) -> Expression) -> Self {
    let records = Level::ALL
      .iter()
      .enumerate()
      .map(|(idx, lvl)| {
        let rec = make(idx, *lvl);
        debug_assert_eq!(rec.level, *lvl);
        Expression { level: *lvl, ..rec }
      })
      .collect();
    Self(records)
  }

  /// Attach vocabulary to every record. Levels and order are untouched.
  pub fn with_vocabulary(self, extract: impl Fn(&Expression) -> Vec<String>) -> Self {
    Self(
      self.0
        .into_iter()
        .map(|rec| {
          let vocab = extract(&rec);
          rec.with_vocabulary(vocab)
        })
        .collect(),
    )
  }

  #[cfg(test)]
  pub fn records(&self) -> &[Expression] {
    &self.0
  }

  pub fn levels(&self) -> Vec<Level> {
    self.0.iter().map(|r| r.level).collect()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn into_records(self) -> Vec<Expression> {
    self.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rec(level: Level, text: &str) -> Expression {
    Expression {
      id: format!("t-{}", text),
      level,
      text: text.into(),
      translation: "t".into(),
      context: "c".into(),
      grammar_points: vec!["g".into()],
      cultural_note: "n".into(),
      vocabulary: vec![],
    }
  }

  #[test]
  fn intent_bounds() {
    assert_eq!(Intent::parse(""), Err(InputValidationError::Missing));
    assert_eq!(Intent::parse("   \n\t"), Err(InputValidationError::Missing));
    assert!(Intent::parse("a").is_ok());
    assert!(Intent::parse(&"a".repeat(500)).is_ok());
    assert_eq!(
      Intent::parse(&"a".repeat(501)),
      Err(InputValidationError::TooLong { max: 500 })
    );
    // Counted in characters, not bytes.
    assert!(Intent::parse(&"가".repeat(500)).is_ok());
  }

  #[test]
  fn intent_is_trimmed() {
    let i = Intent::parse("  say hi  ").unwrap();
    assert_eq!(i.as_str(), "say hi");
  }

  #[test]
  fn level_wire_names() {
    assert_eq!(serde_json::to_string(&Level::PoliteCasual).unwrap(), "\"polite-casual\"");
    assert_eq!("Polite_Casual".parse::<Level>(), Ok(Level::PoliteCasual));
    assert_eq!(" SLANG ".parse::<Level>(), Ok(Level::Slang));
    assert!("casual".parse::<Level>().is_err());
  }

  #[test]
  fn expression_serializes_camel_case() {
    let v = serde_json::to_value(rec(Level::Slang, "ㅋㅋ")).unwrap();
    assert_eq!(v["level"], "slang");
    assert!(v.get("grammarPoints").is_some());
    assert!(v.get("culturalNote").is_some());
    assert_eq!(v["vocabulary"], serde_json::json!([]));
  }

  #[test]
  fn batch_keeps_generator_order_and_first_duplicate() {
    let b = Batch::from_records(vec![
      rec(Level::Slang, "a"),
      rec(Level::Formal, "b"),
      rec(Level::Slang, "dup"),
      rec(Level::PoliteCasual, "c"),
      rec(Level::Informal, "d"),
    ])
    .unwrap();
    assert_eq!(b.len(), 4);
    assert_eq!(b.levels(), vec![Level::Slang, Level::Formal, Level::PoliteCasual, Level::Informal]);
    assert_eq!(b.records()[0].text, "a");
  }

  #[test]
  fn batch_rejects_missing_levels() {
    let err = Batch::from_records(vec![rec(Level::Formal, "a"), rec(Level::Formal, "b")]).unwrap_err();
    assert_eq!(err, ValidationError::IncompleteBatch("informal, polite-casual, slang".into()));
  }

  #[test]
  fn from_levels_is_canonical() {
    let b = Batch::from_levels(|i, lvl| rec(lvl, &i.to_string()));
    assert_eq!(b.levels(), Level::ALL.to_vec());
  }

  #[test]
  fn with_vocabulary_keeps_levels() {
    let b = Batch::from_levels(|i, lvl| rec(lvl, &i.to_string()));
    let b = b.with_vocabulary(|r| vec![format!("v{}", r.text)]);
    assert_eq!(b.levels(), Level::ALL.to_vec());
    assert_eq!(b.records()[2].vocabulary, vec!["v2".to_string()]);
  }
}
