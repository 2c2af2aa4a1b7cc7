//! Bot-challenge detection.

use regex::{Regex, RegexBuilder};

/// Recognises an anti-bot interstitial in page markup.
///
/// Fragments match anywhere, so `captcha` also catches `g-recaptcha` and
/// `hcaptcha` widgets. Words match only on word boundaries, so `bot` does
/// not fire on `bottom`.
#[derive(Debug, Clone)]
pub struct BotDetector {
    pattern: Option<Regex>,
}

impl BotDetector {
    /// Build a detector; all matching is case-insensitive.
    pub fn new<F: AsRef<str>, W: AsRef<str>>(fragments: &[F], words: &[W]) -> Self {
        let fragments = escaped(fragments);
        let words = escaped(words);

        let mut alternatives = Vec::new();
        if !fragments.is_empty() {
            alternatives.push(format!("(?:{})", fragments.join("|")));
        }
        if !words.is_empty() {
            alternatives.push(format!(r"\b(?:{})\b", words.join("|")));
        }
        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        let pattern = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| tracing::warn!("Bot marker pattern rejected: {}", e))
            .ok();

        Self { pattern }
    }

    pub fn detect(&self, html: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(html))
    }
}

fn escaped<S: AsRef<str>>(markers: &[S]) -> Vec<String> {
    markers
        .iter()
        .map(AsRef::as_ref)
        .filter(|m| !m.trim().is_empty())
        .map(regex::escape)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryForm;

    fn detector() -> BotDetector {
        let form = RegistryForm::default();
        BotDetector::new(&form.challenge_fragments, &form.bot_markers)
    }

    #[test]
    fn test_detects_markers() {
        let detector = detector();
        assert!(detector.detect(r#"<div class="captcha"></div>"#));
        assert!(detector.detect("<p>Please UNBLOCK this request</p>"));
        assert!(detector.detect("<h1>Are you a bot?</h1>"));
    }

    #[test]
    fn test_detects_embedded_captcha_widgets() {
        let detector = detector();
        let recaptcha = concat!(
            r#"<html><head><script src="https://www.google.com/recaptcha/api.js"></script>"#,
            r#"</head><body><form><div class="g-recaptcha" data-sitekey="6Lc"></div>"#,
            "</form></body></html>",
        );
        assert!(detector.detect(recaptcha));
        assert!(detector.detect(r#"<div class="g-recaptcha"></div>"#));
        assert!(detector.detect(r#"<div data-hcaptcha-widget-id="0"></div>"#));
        assert!(detector.detect(r#"<iframe src="https://newassets.hcaptcha.com/v1"></iframe>"#));
    }

    #[test]
    fn test_ignores_embedded_words() {
        let detector = detector();
        assert!(!detector.detect(r#"<div style="margin-bottom: 4px">Robotics Co-op</div>"#));
        assert!(!detector.detect(r#"<div class="search-results"></div>"#));
    }

    #[test]
    fn test_empty_markers_never_detect() {
        let detector = BotDetector::new::<&str, &str>(&[], &[]);
        assert!(!detector.detect("captcha"));
    }

    #[test]
    fn test_words_only() {
        let detector = BotDetector::new::<&str, &str>(&[], &["bot"]);
        assert!(detector.detect("bot check"));
        assert!(!detector.detect("g-recaptcha"));
    }
}
