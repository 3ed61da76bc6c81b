//! Best-effort recovery of a JSON object from raw generator text.
//!
//! Each pass is a total `&str -> String` transform, applied in this order:
//!
//! 1. strip markdown code fences (tagged or bare)
//! 2. cut the region from the first `{` to the `]` closing the records array
//! 3. close the object if the region does not end with `}`
//! 4. drop trailing commas before `]` / `}`
//! 5. collapse line breaks and runs of whitespace
//!
//! Later passes assume earlier ones ran. Only pass 2 can fail; nothing here
//! looks at field contents.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use crate::error::RepairError;
use crate::prompt::RECORDS_KEY;

#[instrument(level = "debug", skip(raw), fields(raw_len = raw.len()))]
pub fn repair(raw: &str) -> Result<String, RepairError> {
  let unfenced = strip_code_fences(raw);
  let region = extract_records_region(&unfenced).ok_or(RepairError { marker: RECORDS_KEY })?;
  let closed = close_object(region);
  let no_trailing = remove_trailing_commas(&closed);
  let out = collapse_whitespace(&no_trailing);
  debug!(target: "expressions", repaired_len = out.len(), "Generator output repaired");
  Ok(out)
}

// Pass 1
fn strip_code_fences(text: &str) -> String {
  static FENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"```[A-Za-z0-9_+-]*[ \t]*\r?\n?").expect("valid regex")
  });
  FENCE_RE.replace_all(text, "").trim().to_string()
}

// Pass 2. Ends at the bracket that closes the records array, so prose after the
// object is left out. If that array never closes (truncated output), the region
// runs to the last `]` after the records key.
fn extract_records_region(text: &str) -> Option<&str> {
  static ARRAY_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r#"(?s)\{{.*?"{}"\s*:\s*\["#, regex::escape(RECORDS_KEY));
    Regex::new(&pattern).expect("valid regex")
  });
  static GREEDY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r#"(?s)\{{.*"{}".*\]"#, regex::escape(RECORDS_KEY));
    Regex::new(&pattern).expect("valid regex")
  });

  if let Some(m) = ARRAY_START_RE.find(text) {
    let open = m.end() - 1;
    if let Some(close) = closing_bracket(text, open) {
      return Some(&text[m.start()..=close]);
    }
  }
  GREEDY_RE.find(text).map(|m| m.as_str())
}

/// Byte index of the `]` matching the `[` at `open`. Brackets inside string
/// literals are ignored. None if the array is unterminated or mis-nested.
fn closing_bracket(text: &str, open: usize) -> Option<usize> {
  let mut depth = 0usize;
  let mut in_string = false;
  let mut escaped = false;

  for (i, ch) in text[open..].char_indices() {
    if in_string {
      if escaped {
        escaped = false;
      } else if ch == '\\' {
        escaped = true;
      } else if ch == '"' {
        in_string = false;
      }
      continue;
    }
    match ch {
      '"' => in_string = true,
      '[' | '{' => depth += 1,
      ']' | '}' => {
        depth = depth.checked_sub(1)?;
        if depth == 0 {
          return (ch == ']').then_some(open + i);
        }
      }
      _ => {}
    }
  }
  None
}

// Pass 3
fn close_object(region: &str) -> String {
  if region.trim_end().ends_with('}') {
    region.to_string()
  } else {
    format!("{}\n}}", region)
  }
}

// Pass 4
fn remove_trailing_commas(text: &str) -> String {
  static TRAILING_COMMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",(\s*[}\]])").expect("valid regex")
  });
  TRAILING_COMMA_RE.replace_all(text, "$1").into_owned()
}

// Pass 5
fn collapse_whitespace(text: &str) -> String {
  static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
  let flattened = text.replace(['\r', '\n'], " ");
  WS_RE.replace_all(&flattened, " ").into_owned()
}
