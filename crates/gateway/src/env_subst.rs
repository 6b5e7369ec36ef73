//! `${VAR}` placeholder expansion for config files.
//!
//! `${VAR:-fallback}` uses `fallback` when `VAR` is unset. Placeholders that
//! cannot be resolved stay in the text verbatim and are reported back so the
//! caller can warn about them.

/// Expanded text plus the names of variables that had no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expanded {
    pub text: String,
    pub unresolved: Vec<String>,
}

/// Expand placeholders from the process environment.
pub fn expand_env(input: &str) -> Expanded {
    expand_with(input, |name| std::env::var(name).ok())
}

/// Expand placeholders using `lookup` instead of the process environment.
pub fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> Expanded {
    let mut text = String::with_capacity(input.len());
    let mut unresolved = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        text.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            // Unterminated: keep the remainder as-is.
            text.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let inner = &after[..end];
        let (name, fallback) = match inner.split_once(":-") {
            Some((name, fallback)) => (name, Some(fallback)),
            None => (inner, None),
        };

        match lookup(name).or_else(|| fallback.map(str::to_string)) {
            Some(value) if !name.is_empty() => text.push_str(&value),
            _ => {
                text.push_str(&rest[start..start + 2 + end + 1]);
                if !name.is_empty() && !unresolved.iter().any(|n| n == name) {
                    unresolved.push(name.to_string());
                }
            },
        }
        rest = &after[end + 1..];
    }
    text.push_str(rest);

    Expanded { text, unresolved }
}
