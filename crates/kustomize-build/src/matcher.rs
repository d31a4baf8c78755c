//! Ignore-file style glob matching.
//!
//! Patterns are evaluated in declaration order and the last one that matches
//! a path decides the verdict: a plain pattern selects the path, a pattern
//! prefixed with `!` deselects it. A path no pattern matches is not selected.
//!
//! A pattern matching a directory also matches everything below it, so
//! `b/api` selects `b/api/overlays` and `!a/app` deselects `a/app/base`.

use glob::{MatchOptions, Pattern};

use crate::error::ConfigError;
use crate::resource::{DirectoryBase, KustomizeBuildSpec};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A single compiled glob with its polarity.
#[derive(Debug, Clone)]
struct Rule {
    /// Pattern text after normalisation, kept for diagnostics.
    source: String,
    pattern: Pattern,
    negated: bool,
    /// Number of path components in the pattern.
    depth: usize,
}

impl Rule {
    /// Parses one pattern line. Returns `Ok(None)` for blank lines and comments.
    fn parse(line: &str) -> Result<Option<Self>, ConfigError> {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (negated, body) = match line.strip_prefix('!') {
            Some(stripped) => (true, stripped.trim()),
            None => (false, line),
        };

        if body.is_empty() {
            return Err(ConfigError::InvalidPattern {
                pattern: line.to_string(),
                reason: "exclusion pattern has nothing to exclude".to_string(),
            });
        }

        let source = negate_classes(&clean(body));
        let pattern = Pattern::new(&source).map_err(|e| ConfigError::InvalidPattern {
            pattern: line.to_string(),
            reason: e.to_string(),
        })?;

        let depth = source.split('/').count();
        Ok(Some(Rule {
            source,
            pattern,
            negated,
            depth,
        }))
    }

    /// Matches `path` itself, or its ancestor with as many components as
    /// the pattern has.
    fn matches(&self, path: &str) -> bool {
        if self.pattern.matches_with(path, MATCH_OPTIONS) {
            return true;
        }

        match path.match_indices('/').nth(self.depth - 1) {
            Some((end, _)) => self.pattern.matches_with(&path[..end], MATCH_OPTIONS),
            None => false,
        }
    }
}

/// An immutable, ordered set of glob rules for one directory base.
#[derive(Debug, Clone, Default)]
pub struct PatternMatcher {
    rules: Vec<Rule>,
}

impl PatternMatcher {
    /// Compiles `patterns` in order. Fails on the first invalid pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for pattern in patterns {
            if let Some(rule) = Rule::parse(pattern.as_ref())? {
                rules.push(rule);
            }
        }

        Ok(Self { rules })
    }

    /// Returns whether `path` is selected. Every rule is evaluated and the
    /// last one matching decides.
    pub fn matches(&self, path: &str) -> bool {
        let mut selected = false;
        for rule in &self.rules {
            if rule.matches(path) {
                selected = !rule.negated;
            }
        }
        selected
    }

    /// Normalised rule texts, negations prefixed with `!`.
    pub fn patterns(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|r| {
                if r.negated {
                    format!("!{}", r.source)
                } else {
                    r.source.clone()
                }
            })
            .collect()
    }
}

/// One compiled matcher per directory base referenced by a spec.
#[derive(Debug, Clone, Default)]
pub struct MatcherSet {
    matchers: Vec<(DirectoryBase, PatternMatcher)>,
}

impl MatcherSet {
    /// Merges the globs of all entries sharing a base, in declaration order,
    /// and compiles one matcher per base.
    pub fn from_spec(spec: &KustomizeBuildSpec) -> Result<Self, ConfigError> {
        let mut matchers = Vec::new();
        for base in spec.bases() {
            let matcher = PatternMatcher::new(spec.merged_globs(base))?;
            tracing::debug!(
                base = %base,
                patterns = ?matcher.patterns(),
                "compiled pattern matcher"
            );
            matchers.push((base, matcher));
        }

        Ok(Self { matchers })
    }

    pub fn iter(&self) -> impl Iterator<Item = (DirectoryBase, &PatternMatcher)> {
        self.matchers.iter().map(|(b, m)| (*b, m))
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}

/// Lexically cleans a slash-separated pattern: drops empty and `.` segments,
/// folds `x/..`, keeps leading `..`. A leading `/` is dropped since every
/// pattern is anchored at its base anyway.
fn clean(pattern: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in pattern.split('/') {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            _ => parts.push(part),
        }
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Rewrites `[^...]` class negation into the `[!...]` form `glob` expects.
/// The first class member is literal, so `[]]` and `[^]]` keep their `]`.
fn negate_classes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '[' {
            continue;
        }

        let mut first = chars.next();
        if let Some('^' | '!') = first {
            out.push('!');
            first = chars.next();
        }
        if let Some(first) = first {
            out.push(first);
        }
        for c in chars.by_ref() {
            out.push(c);
            if c == ']' {
                break;
            }
        }
    }

    out
}
