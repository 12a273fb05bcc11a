//! Conditional-comment expression evaluation
//!
//! The boolean mini-grammar of legacy down-level conditional comments.
//! The quirks are load-bearing and preserved: the first `&` or `|` found
//! splits the expression (no precedence), bare `lt`/`gt` ignore their
//! operand entirely, and parenthesized groups span first-`(` to
//! first-`)` only, so nested parentheses do not group correctly.

/// Evaluate a conditional-comment expression against a browser version.
///
/// Unrecognized forms evaluate to false. Stateless and side-effect-free.
pub fn evaluate_condition(condition: &str, version: f32) -> bool {
    let condition = condition.trim();
    match condition {
        "IE" | "true" => return true,
        "false" => return false,
        _ => {}
    }

    // `&` splits before `|`; both split at the first occurrence
    if let Some((left, right)) = condition.split_once('&') {
        return evaluate_condition(left, version) && evaluate_condition(right, version);
    }
    if let Some((left, right)) = condition.split_once('|') {
        return evaluate_condition(left, version) || evaluate_condition(right, version);
    }
    if let Some(rest) = condition.strip_prefix('!') {
        return !evaluate_condition(rest, version);
    }

    if let Some(rest) = condition.strip_prefix("lte IE") {
        return parse_version(rest).is_some_and(|v| version <= v);
    }
    if let Some(rest) = condition.strip_prefix("lt IE") {
        return parse_version(rest).is_some_and(|v| version < v);
    }
    if let Some(rest) = condition.strip_prefix("gte IE") {
        return parse_version(rest).is_some_and(|v| version >= v);
    }
    if let Some(rest) = condition.strip_prefix("gt IE") {
        return parse_version(rest).is_some_and(|v| version > v);
    }
    if let Some(rest) = condition.strip_prefix("IE") {
        return version_string(version).starts_with(rest.trim());
    }

    // bare comparisons without "IE" ignore their operand
    if condition.starts_with("lt") {
        return true;
    }
    if condition.starts_with("gt") {
        return false;
    }

    if condition.starts_with('(') {
        if let Some(inner) = substring_between(condition, '(', ')') {
            return evaluate_condition(inner, version);
        }
    }

    false
}

fn parse_version(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok()
}

/// Version rendered the way the original runtime prints floats: whole
/// numbers keep a trailing `.0`.
fn version_string(version: f32) -> String {
    if version == version.trunc() {
        format!("{version:.1}")
    } else {
        version.to_string()
    }
}

/// Substring between the first `open` and the first `close` after it.
fn substring_between(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)? + open.len_utf8();
    let end = start + text[start..].find(close)?;
    Some(&text[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literals() {
        assert!(evaluate_condition("IE", 6.0));
        assert!(evaluate_condition("true", 6.0));
        assert!(!evaluate_condition("false", 6.0));
        assert!(evaluate_condition(" IE ", 6.0));
    }

    #[test]
    fn test_version_comparisons() {
        assert!(evaluate_condition("lt IE 7", 6.0));
        assert!(!evaluate_condition("lt IE 7", 7.0));
        assert!(evaluate_condition("lte IE 7", 7.0));
        assert!(!evaluate_condition("lte IE 7", 8.0));
        assert!(evaluate_condition("gt IE 7", 8.0));
        assert!(!evaluate_condition("gt IE 7", 7.0));
        assert!(evaluate_condition("gte IE 7", 7.0));
        assert!(!evaluate_condition("gte IE 7", 6.0));
    }

    #[test]
    fn test_version_prefix_match() {
        assert!(evaluate_condition("IE 7", 7.0));
        assert!(evaluate_condition("IE 7", 7.5));
        assert!(!evaluate_condition("IE 7", 8.0));
        assert!(evaluate_condition("IE 6.0", 6.0));
    }

    #[test]
    fn test_negation_and_parentheses() {
        assert!(evaluate_condition("!false", 6.0));
        assert!(!evaluate_condition("!IE", 6.0));
        assert!(evaluate_condition("(IE)", 6.0));
        assert!(evaluate_condition("(lt IE 9)", 6.0));
    }

    #[test]
    fn test_boolean_splitting() {
        assert!(evaluate_condition("IE & true", 6.0));
        assert!(!evaluate_condition("IE & false", 6.0));
        assert!(evaluate_condition("false | IE", 6.0));
        // first & splits before |, left to right
        assert!(evaluate_condition("(IE) & (lt IE 9)", 6.0));
    }

    #[test]
    fn test_bare_lt_gt_quirk() {
        // historical behavior: operand ignored entirely
        assert!(evaluate_condition("lt 5", 99.0));
        assert!(evaluate_condition("lt", 99.0));
        assert!(!evaluate_condition("gt 5", 1.0));
        assert!(!evaluate_condition("gt", 1.0));
    }

    #[test]
    fn test_unrecognized_forms_are_false() {
        assert!(!evaluate_condition("foo", 6.0));
        assert!(!evaluate_condition("", 6.0));
        assert!(!evaluate_condition("lt IE seven", 6.0));
        assert!(!evaluate_condition("IE 9 extra", 6.0));
    }
}
