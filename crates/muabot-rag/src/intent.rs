//! Keyword-based intent detection.
//!
//! The rule table is configuration data, not control flow: an ordered list
//! of `(intent, keyword set)` pairs evaluated top to bottom against the
//! lower-cased message, first match wins. The default table carries the
//! Vietnamese shop vocabulary.

/// Question intents the composer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Price,
    Description,
    Availability,
}

/// One ordered dispatch rule.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    pub keywords: Vec<String>,
}

/// Ordered, first-match-wins intent table.
#[derive(Debug, Clone)]
pub struct IntentRules {
    rules: Vec<IntentRule>,
}

impl IntentRules {
    #[must_use]
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// The stock Vietnamese keyword sets, in documented priority order:
    /// price, then description, then availability.
    #[must_use]
    pub fn default_vietnamese() -> Self {
        let rule = |intent, words: &[&str]| IntentRule {
            intent,
            keywords: words.iter().map(|w| (*w).to_owned()).collect(),
        };
        Self::new(vec![
            rule(Intent::Price, &["giá", "price", "cost", "bao nhiêu"]),
            rule(
                Intent::Description,
                &["mô tả", "description", "thông tin", "info"],
            ),
            rule(Intent::Availability, &["có", "available", "còn hàng", "stock"]),
        ])
    }

    /// Detect the message's intent, if any rule matches.
    #[must_use]
    pub fn detect(&self, message: &str) -> Option<Intent> {
        let message = message.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| message.contains(kw.as_str())))
            .map(|rule| rule.intent)
    }

    /// Keywords configured for one intent (empty if absent from the table).
    #[must_use]
    pub fn keywords_for(&self, intent: Intent) -> &[String] {
        self.rules
            .iter()
            .find(|rule| rule.intent == intent)
            .map_or(&[], |rule| rule.keywords.as_slice())
    }
}

impl Default for IntentRules {
    fn default() -> Self {
        Self::default_vietnamese()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_intent() {
        let rules = IntentRules::default_vietnamese();
        assert_eq!(rules.detect("Giá sản phẩm này bao nhiêu?"), Some(Intent::Price));
        assert_eq!(rules.detect("what does it cost"), Some(Intent::Price));
    }

    #[test]
    fn description_intent() {
        let rules = IntentRules::default_vietnamese();
        assert_eq!(rules.detect("Cho tôi xem mô tả"), Some(Intent::Description));
    }

    #[test]
    fn availability_intent() {
        let rules = IntentRules::default_vietnamese();
        assert_eq!(rules.detect("Còn hàng không?"), Some(Intent::Availability));
    }

    #[test]
    fn priority_order_first_match_wins() {
        // "giá" (price) and "có" (availability) both present; price wins.
        let rules = IntentRules::default_vietnamese();
        assert_eq!(rules.detect("Có giá tốt không?"), Some(Intent::Price));
    }

    #[test]
    fn no_match() {
        let rules = IntentRules::default_vietnamese();
        assert_eq!(rules.detect("xin chào"), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let rules = IntentRules::default_vietnamese();
        assert_eq!(rules.detect("GIÁ bao nhiêu"), Some(Intent::Price));
    }

    #[test]
    fn keywords_for_price() {
        let rules = IntentRules::default_vietnamese();
        assert!(rules.keywords_for(Intent::Price).contains(&"giá".to_owned()));
    }

    #[test]
    fn custom_table_order_respected() {
        let rules = IntentRules::new(vec![
            IntentRule {
                intent: Intent::Availability,
                keywords: vec!["stock".into()],
            },
            IntentRule {
                intent: Intent::Price,
                keywords: vec!["stock".into()],
            },
        ]);
        assert_eq!(rules.detect("in stock?"), Some(Intent::Availability));
    }
}
