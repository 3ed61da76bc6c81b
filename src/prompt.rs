//! Instruction text sent to the generator.
//!
//! The schema block is a literal so every prompt describes the same four levels
//! and field names the normalizer expects.

use crate::config::Prompts;
use crate::domain::Intent;
use crate::util::fill_template;

/// Key of the record array in generator output.
pub const RECORDS_KEY: &str = "expressions";

pub const EXPRESSIONS_SCHEMA: &str = r#"{
  "expressions": [
    {
      "level": "formal",
      "text": "한국어 formal version",
      "translation": "English translation",
      "context": "When to use this (e.g., business meetings, formal speeches)",
      "grammarPoints": ["Key grammar point 1", "Key grammar point 2"],
      "culturalNote": "Cultural context about formality"
    },
    {
      "level": "informal",
      "text": "한국어 informal version",
      "translation": "English translation",
      "context": "When to use this (e.g., close friends, family)",
      "grammarPoints": ["Key grammar point 1", "Key grammar point 2"],
      "culturalNote": "Cultural context about informal speech"
    },
    {
      "level": "polite-casual",
      "text": "한국어 polite-casual version",
      "translation": "English translation",
      "context": "When to use this (e.g., everyday situations, acquaintances)",
      "grammarPoints": ["Key grammar point 1", "Key grammar point 2"],
      "culturalNote": "Cultural context about polite casual speech"
    },
    {
      "level": "slang",
      "text": "한국어 slang version",
      "translation": "English translation",
      "context": "When to use this (e.g., texting with close friends, internet)",
      "grammarPoints": ["Key grammar point 1", "Key grammar point 2"],
      "culturalNote": "Cultural context about slang usage"
    }
  ]
}"#;

/// Build the user instruction for `intent`.
///
/// A configured template missing `{schema}` or `{intent}` still gets both: the
/// missing pieces are appended. The intent is substituted last so braces in user
/// text are never expanded.
pub fn build_prompt(prompts: &Prompts, intent: &Intent) -> String {
  let mut tpl = prompts.user_template.clone();
  if !tpl.contains("{intent}") {
    tpl.push_str("\n\nWhat the learner wants to say: \"{intent}\"");
  }
  if !tpl.contains("{schema}") {
    tpl.push_str("\n\nReturn ONLY this JSON shape, with no surrounding text:\n{schema}");
  }
  fill_template(&tpl, &[("schema", EXPRESSIONS_SCHEMA), ("intent", intent.as_str())])
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Level;

  #[test]
  fn default_prompt_embeds_intent_and_schema() {
    let intent = Intent::parse("I want to casually ask a friend to hang out").unwrap();
    let p = build_prompt(&Prompts::default(), &intent);
    assert!(p.contains("\"I want to casually ask a friend to hang out\""));
    assert!(p.contains(EXPRESSIONS_SCHEMA));
    assert!(p.contains("ONLY the JSON object"));
    for lvl in Level::ALL {
      assert!(p.contains(&format!("\"level\": \"{}\"", lvl)));
    }
    assert!(!p.contains("{intent}") && !p.contains("{schema}"));
  }

  #[test]
  fn template_without_placeholders_still_gets_both() {
    let prompts = Prompts { user_template: "Be brief.".into(), ..Prompts::default() };
    let intent = Intent::parse("thank my boss").unwrap();
    let p = build_prompt(&prompts, &intent);
    assert!(p.starts_with("Be brief."));
    assert!(p.contains("thank my boss"));
    assert!(p.contains(EXPRESSIONS_SCHEMA));
  }

  #[test]
  fn braces_in_intent_are_left_alone() {
    let intent = Intent::parse("say {schema} literally").unwrap();
    let p = build_prompt(&Prompts::default(), &intent);
    assert!(p.contains("say {schema} literally"));
    assert_eq!(p.matches(EXPRESSIONS_SCHEMA).count(), 1);
  }
}
