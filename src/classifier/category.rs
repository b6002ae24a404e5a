//! Path → category classification
//!
//! Categories drive bar colors in the race and the presence/threshold
//! milestone triggers. Matching is plain substring containment.

use super::{first_match, MatchRule};
use serde::{Deserialize, Serialize};

/// Category assigned to paths no rule claims.
pub const FALLBACK_CATEGORY: &str = "other";
pub const FALLBACK_COLOR: &str = "#94a3b8";

/// One row of the category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub color: String,
    /// Substrings of the path; an empty list matches every path
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl CategoryRule {
    pub fn new(name: &str, color: &str, patterns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn is_catch_all(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl MatchRule for CategoryRule {
    fn accepts(&self, path: &str) -> bool {
        self.is_catch_all() || self.patterns.iter().any(|p| path.contains(p.as_str()))
    }
}

/// Result of classifying one path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category<'a> {
    pub name: &'a str,
    pub color: &'a str,
}

/// Built-in table, in priority order.
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("component", "#8b5cf6", &["js/components/"]),
        CategoryRule::new("service", "#22c55e", &["js/services/"]),
        CategoryRule::new("ai", "#f59e0b", &["js/ai/", "ai/"]),
        CategoryRule::new("css", "#3b82f6", &["css/"]),
        CategoryRule::new("html", "#ec4899", &[".html"]),
        CategoryRule::new("engine", "#06b6d4", &["js/engines/"]),
        CategoryRule::new("manager", "#14b8a6", &["js/managers/"]),
        CategoryRule::new("repository", "#a855f7", &["js/repositories/"]),
        CategoryRule::new("test", "#64748b", &["tests/"]),
        CategoryRule::new(FALLBACK_CATEGORY, FALLBACK_COLOR, &[]),
    ]
}

/// Ordered first-match classifier over a category table.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    rules: Vec<CategoryRule>,
}

impl CategoryClassifier {
    /// Build a classifier; a catch-all is appended when the table lacks one.
    pub fn new(mut rules: Vec<CategoryRule>) -> Self {
        if !rules.last().is_some_and(CategoryRule::is_catch_all) {
            rules.push(CategoryRule::new(FALLBACK_CATEGORY, FALLBACK_COLOR, &[]));
        }
        Self { rules }
    }

    pub fn classify(&self, path: &str) -> Category<'_> {
        match first_match(&self.rules, path) {
            Some(rule) => Category {
                name: &rule.name,
                color: &rule.color,
            },
            None => Category {
                name: FALLBACK_CATEGORY,
                color: FALLBACK_COLOR,
            },
        }
    }

    /// Category legend in table order.
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        Self::new(default_category_rules())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_categories() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("js/components/Nav.js").name, "component");
        assert_eq!(classifier.classify("js/services/api.js").name, "service");
        assert_eq!(classifier.classify("css/main.css").name, "css");
        assert_eq!(classifier.classify("index.html").name, "html");
        assert_eq!(classifier.classify("tests/app.test.js").name, "test");
        assert_eq!(classifier.classify("js/main.js").name, "other");
        assert_eq!(classifier.classify("js/main.js").color, FALLBACK_COLOR);
    }

    #[test]
    fn test_priority_order_wins() {
        // Matches both `ai/` and `css/`; `ai` comes first
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("ai/css/theme.css").name, "ai");
        // A component html template is still a component
        assert_eq!(classifier.classify("js/components/card.html").name, "component");
    }

    #[test]
    fn test_catch_all_appended_when_missing() {
        let classifier = CategoryClassifier::new(vec![CategoryRule::new("docs", "#fff", &["docs/"])]);
        assert_eq!(classifier.rules().len(), 2);
        assert_eq!(classifier.classify("src/lib.rs").name, FALLBACK_CATEGORY);
        assert_eq!(classifier.classify("docs/intro.md").name, "docs");
    }

    #[test]
    fn test_custom_catch_all_kept() {
        let classifier = CategoryClassifier::new(vec![CategoryRule::new("misc", "#000", &[])]);
        assert_eq!(classifier.rules().len(), 1);
        assert_eq!(classifier.classify("anything").name, "misc");
    }
}
