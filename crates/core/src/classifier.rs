use crate::models::{Category, Classification, Severity};

struct KeywordRule {
    category: Category,
    severity: Severity,
    keywords: &'static [&'static str],
}

/// Rules are checked in order and the first hit wins, so security outranks
/// everything else and a comment never gets two labels.
const RULES: &[KeywordRule] = &[
    KeywordRule {
        category: Category::Security,
        severity: Severity::High,
        keywords: &["sql injection", "xss", "csrf", "secret", "password"],
    },
    KeywordRule {
        category: Category::Performance,
        severity: Severity::Medium,
        keywords: &["performance", "slow", "optimize", "n+1", "cache"],
    },
    KeywordRule {
        category: Category::Testing,
        severity: Severity::Medium,
        keywords: &["test", "coverage", "mock", "assert"],
    },
    KeywordRule {
        category: Category::Documentation,
        severity: Severity::Low,
        keywords: &["doc", "comment", "readme", "jsdoc"],
    },
    KeywordRule {
        category: Category::CodeQuality,
        severity: Severity::Low,
        keywords: &["naming", "variable", "function name", "readable"],
    },
];

const FALLBACK: Classification = Classification {
    category: Category::Style,
    severity: Severity::Low,
};

/// Labels a comment body by substring match over the rule table.
pub fn classify(body: &str) -> Classification {
    let lowered = body.to_lowercase();
    for rule in RULES {
        if rule.keywords.iter().any(|k| lowered.contains(k)) {
            return Classification {
                category: rule.category,
                severity: rule.severity,
            };
        }
    }
    FALLBACK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_keyword_yields_high() {
        let c = classify("This endpoint is vulnerable to SQL injection");
        assert_eq!(c.category, Category::Security);
        assert_eq!(c.severity, Severity::High);
    }

    #[test]
    fn security_wins_over_later_rules() {
        // "password" and "slow" both match; the earlier rule decides.
        let c = classify("storing the password this way is slow");
        assert_eq!(c.category, Category::Security);
        assert_eq!(c.severity, Severity::High);
    }

    #[test]
    fn match_is_case_insensitive() {
        let c = classify("Please add TEST coverage for this branch");
        assert_eq!(c.category, Category::Testing);
        assert_eq!(c.severity, Severity::Medium);
    }

    #[test]
    fn unmatched_body_falls_back_to_style() {
        let c = classify("Looks good to me");
        assert_eq!(c.category, Category::Style);
        assert_eq!(c.severity, Severity::Low);
    }

    #[test]
    fn empty_body_falls_back_to_style() {
        let c = classify("");
        assert_eq!(c.category, Category::Style);
        assert_eq!(c.severity, Severity::Low);
    }

    #[test]
    fn same_body_always_gets_same_label() {
        let body = "consider a cache here to avoid the n+1 query";
        let first = classify(body);
        let second = classify(body);
        assert_eq!(first, second);
        assert_eq!(first.category, Category::Performance);
    }

    #[test]
    fn substring_matches_inside_words() {
        // "doc" matches "docstring"; substring semantics are intentional.
        let c = classify("add a docstring for this function");
        assert_eq!(c.category, Category::Documentation);
    }
}
