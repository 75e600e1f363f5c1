//! Builds the single substitution rule that a batch applies to every document.

use std::borrow::Cow;

use regex::{NoExpand, Regex, RegexBuilder};

use super::error::InvalidPatternError;

/// A compiled find-and-replace rule.
///
/// Every variant replaces all non-overlapping matches, left to right, in a
/// single pass over the content.
#[derive(Debug, Clone)]
pub enum CompiledMatcher {
    /// Exact, case-sensitive substring replacement.
    Literal { needle: String },
    /// A literal term that has been escaped and compiled case-insensitively.
    /// The replacement is inserted verbatim.
    FoldedLiteral { regex: Regex },
    /// A user-supplied pattern. The replacement may use `$1`, `${name}` and `$0`.
    Pattern { regex: Regex },
}

impl CompiledMatcher {
    /// Builds the matcher for a request.
    ///
    /// Fails only in pattern mode, when `find` is not valid regex syntax.
    pub fn build(
        find: &str,
        case_sensitive: bool,
        use_regex: bool,
    ) -> Result<Self, InvalidPatternError> {
        if use_regex {
            let regex = RegexBuilder::new(find)
                .case_insensitive(!case_sensitive)
                .build()?;
            return Ok(Self::Pattern { regex });
        }

        if case_sensitive {
            return Ok(Self::Literal {
                needle: find.to_string(),
            });
        }

        // An escaped literal always compiles; a failure here can only be the size limit.
        let regex = RegexBuilder::new(&regex::escape(find))
            .case_insensitive(true)
            .build()?;
        Ok(Self::FoldedLiteral { regex })
    }

    /// Applies the rule to `content`.
    ///
    /// Returns `Cow::Borrowed` when nothing matched.
    pub fn apply<'a>(&self, content: &'a str, replacement: &str) -> Cow<'a, str> {
        match self {
            Self::Literal { needle } => {
                if needle.is_empty() || !content.contains(needle.as_str()) {
                    Cow::Borrowed(content)
                } else {
                    Cow::Owned(content.replace(needle.as_str(), replacement))
                }
            }
            Self::FoldedLiteral { regex } => regex.replace_all(content, NoExpand(replacement)),
            Self::Pattern { regex } => regex.replace_all(content, replacement),
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Self::Literal { .. } => "literal",
            Self::FoldedLiteral { .. } => "literal (ignore case)",
            Self::Pattern { .. } => "regex",
        }
    }
}
