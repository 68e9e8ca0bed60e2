use crate::errors::ErrorKind;

/// Substrings rejected before evaluation (matched case-insensitively).
///
/// This is a plain substring scan, so it also fires inside harmless words:
/// `cos(` contains `os`.
pub const BLOCKED_PATTERNS: [&str; 6] = ["__", "exec", "eval", "import", "os", "sys"];

/// Reject oversized or suspicious input before it reaches the evaluator.
pub fn validate(expression: &str, max_length: usize) -> Result<(), ErrorKind> {
    if expression.chars().count() > max_length {
        return Err(ErrorKind::TooLong);
    }

    let lower = expression.to_lowercase();
    if BLOCKED_PATTERNS.iter().any(|pat| lower.contains(pat)) {
        return Err(ErrorKind::InvalidSyntax);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_arithmetic() {
        assert_eq!(validate("5+3×2", 100), Ok(()));
        assert_eq!(validate("sqrt(25)", 100), Ok(()));
    }

    #[test]
    fn rejects_over_max_length() {
        let s = "1".repeat(101);
        assert_eq!(validate(&s, 100), Err(ErrorKind::TooLong));
        assert_eq!(validate(&"1".repeat(100), 100), Ok(()));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 50 glyphs of two bytes each.
        let s = "×".repeat(50);
        assert_eq!(validate(&s, 50), Ok(()));
    }

    #[test]
    fn too_long_wins_over_denylist() {
        let s = format!("__{}", "1".repeat(10));
        assert_eq!(validate(&s, 5), Err(ErrorKind::TooLong));
    }

    #[test]
    fn rejects_blocked_patterns_case_insensitively() {
        for s in ["__class__", "EXEC(1)", "Eval", "import", "OS", "sys.exit"] {
            assert_eq!(validate(s, 100), Err(ErrorKind::InvalidSyntax), "{s}");
        }
    }

    #[test]
    fn denylist_also_matches_inside_function_names() {
        assert_eq!(validate("cos(0)", 100), Err(ErrorKind::InvalidSyntax));
    }
}
