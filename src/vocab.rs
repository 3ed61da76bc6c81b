//! Candidate vocabulary from a generated Korean sentence.
//!
//! Placeholder for a dictionary lookup: split, drop one-character tokens and
//! bare particles, keep the first few in order.

pub const MAX_VOCABULARY: usize = 4;

/// Grammatical particles that are never useful on their own.
const PARTICLES: [&str; 14] = ["은", "는", "이", "가", "을", "를", "에", "와", "과", "의", "도", "에서", "부터", "까지"];

fn is_separator(ch: char) -> bool {
  ch.is_whitespace() || matches!(ch, ',' | '.' | '!' | '?' | '，' | '。' | '！' | '？')
}

pub fn extract_vocabulary(text: &str) -> Vec<String> {
  text
    .split(is_separator)
    .filter(|w| w.chars().count() > 1)
    .filter(|w| !PARTICLES.contains(w))
    .take(MAX_VOCABULARY)
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keeps_content_words_in_order() {
    assert_eq!(extract_vocabulary("사랑해요 정말 좋아요"), vec!["사랑해요", "정말", "좋아요"]);
  }

  #[test]
  fn drops_short_tokens_and_particles() {
    let out = extract_vocabulary("나 는 학교 에서 공부해요, 까지!");
    assert_eq!(out, vec!["학교", "공부해요"]);
  }

  #[test]
  fn caps_at_four_tokens() {
    let out = extract_vocabulary("오늘 저녁에 친구랑 같이 영화 보러 갈래?");
    assert_eq!(out, vec!["오늘", "저녁에", "친구랑", "같이"]);
  }

  #[test]
  fn empty_and_punctuation_only_input() {
    assert!(extract_vocabulary("").is_empty());
    assert!(extract_vocabulary(" ?!.. ").is_empty());
  }
}
