//! Named, ordered rule collection.
//!
//! A [`RuleSet`] keeps its rules in load order alongside a name index. The two
//! views are only changed together, so every name in the order resolves
//! through the index and the index holds nothing the order does not.

use crate::error::{Result, TallyError};
use regex::bytes::Regex;
use std::collections::HashMap;
use std::time::Duration;

/// 1-based position of a rule among the non-comment lines of its rule file.
pub type Sequence = usize;

/// A named regular expression plus the statistics gathered for it.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    pattern: String,
    regex: Regex,
    sequence: Sequence,
    hits: u64,
    elapsed: Duration,
}

impl Rule {
    /// Compile `pattern` into a rule named `name`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use regex_tally::Rule;
    ///
    /// let rule = Rule::new("sshd", r"sshd\[\d+\]", 1)?;
    /// assert!(rule.is_match(b"Jan  1 host sshd[42]: Accepted"));
    /// assert_eq!(rule.hits(), 0);
    /// # Ok::<(), regex_tally::TallyError>(())
    /// ```
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        sequence: Sequence,
    ) -> Result<Self> {
        let name = name.into();
        let pattern = pattern.into();
        let regex = Regex::new(&pattern).map_err(|source| TallyError::InvalidPattern {
            name: name.clone(),
            pattern: pattern.clone(),
            source,
        })?;

        Ok(Self {
            name,
            pattern,
            regex,
            sequence,
            hits: 0,
            elapsed: Duration::ZERO,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The pattern text as written in the rule file.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    /// Lines credited to this rule so far.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Accumulated time from line start to confirmed match, over all hits.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether the pattern matches anywhere in `line`.
    #[inline]
    pub fn is_match(&self, line: &[u8]) -> bool {
        self.regex.is_match(line)
    }

    #[inline]
    pub(crate) fn record_hit(&mut self, elapsed: Duration) {
        self.hits += 1;
        self.elapsed += elapsed;
    }

    /// Zero the hit count and accumulated duration.
    pub fn reset_stats(&mut self) {
        self.hits = 0;
        self.elapsed = Duration::ZERO;
    }
}

/// Rules in load order with lookup by name.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    index: HashMap<String, usize>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the end of the load order.
    ///
    /// A rule with the same name is overwritten in its existing slot: the new
    /// pattern and sequence number take effect but the name keeps its original
    /// position. The replaced rule is returned.
    pub fn insert(&mut self, rule: Rule) -> Option<Rule> {
        match self.index.get(rule.name()) {
            Some(&position) => Some(std::mem::replace(&mut self.rules[position], rule)),
            None => {
                self.index.insert(rule.name().to_string(), self.rules.len());
                self.rules.push(rule);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.index.get(name).map(|&position| &self.rules[position])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Rule> {
        match self.index.get(name) {
            Some(&position) => self.rules.get_mut(position),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Zero-based slot of `name` in load order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in load order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub(crate) fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    /// Rule names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(Rule::name)
    }

    /// Sum of every rule's hit count.
    pub fn total_hits(&self) -> u64 {
        self.rules.iter().map(Rule::hits).sum()
    }

    pub fn reset_stats(&mut self) {
        self.rules.iter_mut().for_each(Rule::reset_stats);
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
