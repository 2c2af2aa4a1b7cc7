use std::fmt;

/// How to find one UI control on a page.
///
/// Controls with unstable markup are described as a priority-ordered list of
/// locators; callers evaluate them in order and stop at the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// A standard CSS selector.
    Css(String),
    /// The innermost element matching `scope` whose text contains `text`
    /// (case-insensitive).
    Text { scope: String, text: String },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn text(scope: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text {
            scope: scope.into(),
            text: text.into(),
        }
    }

    /// Any element containing `text`.
    pub fn any_text(text: impl Into<String>) -> Self {
        Self::text("*", text)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "{selector}"),
            Self::Text { scope, text } => write!(f, "{scope}:has-text('{text}')"),
        }
    }
}

/// How to pick an `<option>` inside a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectBy {
    /// Match the option's visible text exactly (after trimming).
    Label(String),
    /// Match the option's `value` attribute.
    Value(String),
}

impl SelectBy {
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self::Value(value.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Label(s) | Self::Value(s) => s,
        }
    }
}
