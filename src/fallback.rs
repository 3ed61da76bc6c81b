//! Built-in replacement batch used whenever generation does not produce one.
//!
//! Content is fixed per level; only the ids carry a timestamp.

use chrono::Utc;

use crate::domain::{expression_id, Batch, Expression, Intent, Level};

struct FallbackEntry {
  text: &'static str,
  translation: &'static str,
  context: &'static str,
  grammar_points: [&'static str; 2],
  cultural_note: &'static str,
}

fn entry(level: Level) -> FallbackEntry {
  match level {
    Level::Formal => FallbackEntry {
      text: "죄송합니다, 서비스 오류가 발생했습니다",
      translation: "I apologize, a service error has occurred",
      context: "Formal announcement",
      grammar_points: ["Formal ending -습니다", "Apology form 죄송합니다"],
      cultural_note: "This is a very formal way to apologize and announce an error",
    },
    Level::Informal => FallbackEntry {
      text: "지금 안 돼",
      translation: "It's not working right now",
      context: "Informal explanation to close friends or family",
      grammar_points: ["Informal ending without -요", "Short negative 안 되다"],
      cultural_note: "Used with very close friends or people younger than you",
    },
    Level::PoliteCasual => FallbackEntry {
      text: "지금은 서비스를 사용할 수 없어요",
      translation: "The service is unavailable right now",
      context: "Polite casual explanation in everyday situations",
      grammar_points: ["Polite ending -요", "Negative potential form -을 수 없다"],
      cultural_note: "Most commonly used polite form for everyday conversations",
    },
    Level::Slang => FallbackEntry {
      text: "에러 났어 ㅠㅠ",
      translation: "Got an error ㅠㅠ",
      context: "Very informal texting/internet style",
      grammar_points: ["Past tense -었어", "Internet slang with emoticons"],
      cultural_note: "ㅠㅠ represents crying face, commonly used in Korean texting and online",
    },
  }
}

/// The fallback batch. The intent does not change the content.
pub fn fallback_batch(_intent: &Intent) -> Batch {
  fallback_batch_at(Utc::now().timestamp_millis())
}

pub fn fallback_batch_at(millis: i64) -> Batch {
  Batch::from_levels(|idx, level| {
    let e = entry(level);
    Expression {
      id: expression_id(millis, idx),
      level,
      text: e.text.into(),
      translation: e.translation.into(),
      context: e.context.into(),
      grammar_points: e.grammar_points.iter().map(|g| g.to_string()).collect(),
      cultural_note: e.cultural_note.into(),
      vocabulary: Vec::new(),
    }
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn one_record_per_level_in_canonical_order() {
    let b = fallback_batch(&Intent::parse("anything").unwrap());
    assert_eq!(b.len(), 4);
    assert_eq!(b.levels(), Level::ALL.to_vec());
    for r in b.records() {
      assert!(!r.text.is_empty());
      assert_eq!(r.grammar_points.len(), 2);
      assert!(r.vocabulary.is_empty());
    }
  }

  #[test]
  fn content_is_fixed_apart_from_ids() {
    let a = fallback_batch_at(1);
    let b = fallback_batch_at(2);
    for (x, y) in a.records().iter().zip(b.records()) {
      assert_ne!(x.id, y.id);
      assert_eq!(Expression { id: String::new(), ..x.clone() }, Expression { id: String::new(), ..y.clone() });
    }
    assert_eq!(a.records()[3].text, "에러 났어 ㅠㅠ");
    assert_eq!(a.records()[0].id, "expr-1-0");
  }
}
