//! Category classifier: raw product label → canonical vegetable category.
//!
//! Ordered rule table, evaluated top to bottom; the first matching rule wins.
//! Explicit aliases sit before the default first-word heuristic because
//! multi-word names ("POMME DE TERRE") and synonyms ("COURGE BUTTERNUT")
//! would otherwise land in the wrong bucket.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercase, decompose, drop combining marks: "Pièce" → "piece".
pub fn fold_accents(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// First letter upper-case, the rest lower-case.
pub fn capitalize(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// What a rule looks for in the accent-folded label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPredicate {
    /// Folded label contains this (folded) fragment anywhere
    Contains(String),
    /// Folded first word equals this (folded) token
    FirstWord(String),
}

impl LabelPredicate {
    fn matches(&self, folded_label: &str) -> bool {
        match self {
            LabelPredicate::Contains(fragment) => folded_label.contains(fragment.as_str()),
            LabelPredicate::FirstWord(token) => {
                folded_label.split_whitespace().next() == Some(token.as_str())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub predicate: LabelPredicate,
    pub category: String,
}

impl ClassificationRule {
    pub fn contains(fragment: &str, category: &str) -> Self {
        Self {
            predicate: LabelPredicate::Contains(fold_accents(fragment)),
            category: category.to_string(),
        }
    }

    pub fn first_word(token: &str, category: &str) -> Self {
        Self {
            predicate: LabelPredicate::FirstWord(fold_accents(token)),
            category: category.to_string(),
        }
    }
}

/// Outcome of classification. `rule` is `None` when the default heuristic applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub rule: Option<usize>,
}

impl Classification {
    pub fn is_fallback(&self) -> bool {
        self.rule.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(vec![
            ClassificationRule::contains("BUTTERNUT", "Butternut"),
            ClassificationRule::contains("POTIMARRON", "Potimarron"),
            ClassificationRule::contains("POMME", "Pomme de terre"),
        ])
    }
}

impl Classifier {
    pub fn new(rules: Vec<ClassificationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    /// Append a rule after the existing ones (lower priority).
    pub fn push(&mut self, rule: ClassificationRule) {
        self.rules.push(rule);
    }

    /// Classify a label. Never fails: without a matching rule, the first word
    /// of the label (accent-folded, capitalized) is the category.
    pub fn classify(&self, label: &str) -> Classification {
        let folded = fold_accents(label);

        if let Some((i, rule)) = self
            .rules
            .iter()
            .enumerate()
            .find(|(_, r)| r.predicate.matches(&folded))
        {
            return Classification {
                category: rule.category.clone(),
                rule: Some(i),
            };
        }

        let first = folded.split_whitespace().next().unwrap_or("");
        Classification {
            category: capitalize(first),
            rule: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("Pièce"), "piece");
        assert_eq!(fold_accents("  ÉCHALOTE "), "echalote");
        assert_eq!(fold_accents("l'unité"), "l'unite");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("CAROTTE"), "Carotte");
        assert_eq!(capitalize("haricots VERTS"), "Haricots verts");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_aliases_override_first_word() {
        let c = Classifier::default();
        assert_eq!(c.classify("COURGE BUTTERNUT France").category, "Butternut");
        assert_eq!(c.classify("COURGE POTIMARRON (le kg)").category, "Potimarron");
        assert_eq!(c.classify("POMME DE TERRE de consommation").category, "Pomme de terre");
        assert_eq!(c.classify("Butternut bio").rule, Some(0));
    }

    #[test]
    fn test_default_heuristic() {
        let c = Classifier::default();
        let result = c.classify("CAROTTE France biologique");
        assert_eq!(result.category, "Carotte");
        assert!(result.is_fallback());
        assert_eq!(c.classify("COURGE longue").category, "Courge");
        assert_eq!(c.classify("").category, "");
    }

    #[test]
    fn test_accent_and_case_insensitive() {
        let c = Classifier::default();
        assert_eq!(c.classify("ÉCHALOTE grise"), c.classify("echalote grise"));
        assert_eq!(c.classify("Échalote").category, "Echalote");
        assert_eq!(c.classify("pomme de terre"), c.classify("POMME DE TERRE"));
    }

    #[test]
    fn test_rule_order_is_priority() {
        let c = Classifier::new(vec![
            ClassificationRule::contains("courge", "Courge"),
            ClassificationRule::contains("butternut", "Butternut"),
        ]);
        assert_eq!(c.classify("COURGE BUTTERNUT").category, "Courge");
    }

    #[test]
    fn test_first_word_rule() {
        let mut c = Classifier::default();
        c.push(ClassificationRule::first_word("haricot", "Haricots verts"));
        assert_eq!(c.classify("HARICOT vert filet").category, "Haricots verts");
        assert_eq!(c.classify("HARICOTS beurre").category, "Haricots");
    }
}
