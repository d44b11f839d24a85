//! A single `Host` block and typed access to its directives.

use crate::error::{ConfigError, Result};
use regex::{Regex, RegexBuilder};
use std::cell::RefCell;
use std::collections::HashMap;
use tracing::debug;

/// Value that removes a setting instead of assigning it.
pub const DELETE_MARKER: &str = "-";

/// Indentation used for lines written by `set`.
const INDENT: &str = "    ";

/// How a setting name is matched against the leading token of body lines.
///
/// Both modes are case-insensitive, so `Hostname` finds a hand-written
/// `HostName`. In `Pattern` mode the name is a live regular expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMatch {
    #[default]
    Pattern,
    Literal,
}

impl KeyMatch {
    fn compile(self, key: &str) -> Option<Regex> {
        let source = match self {
            KeyMatch::Pattern => key.to_string(),
            KeyMatch::Literal => regex::escape(key),
        };
        match build_key_regex(&source) {
            Ok(re) => Some(re),
            Err(e) if self == KeyMatch::Pattern => {
                debug!("key '{}' is not a valid pattern ({}), matching literally", key, e);
                build_key_regex(&regex::escape(key)).ok()
            }
            Err(_) => None,
        }
    }
}

fn build_key_regex(key: &str) -> std::result::Result<Regex, regex::Error> {
    RegexBuilder::new(&format!(r"^\s*(?:{key})(?:\s*=\s*|\s+)(?P<value>.*)$"))
        .case_insensitive(true)
        .build()
}

/// Rejects settings that would not come back as one line of this section.
pub(crate) fn validate_setting(key: &str, value: &str) -> Result<()> {
    let breaks_line = |s: &str| s.contains(['\n', '\r']);
    if key.trim().is_empty() || breaks_line(key) || breaks_line(value) {
        return Err(ConfigError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    opener: String,
    body: Vec<String>,
    key_match: KeyMatch,
    // key -> body position of the first matching line, filled on lookup
    lookups: RefCell<HashMap<String, Option<usize>>>,
}

impl Section {
    pub fn new(name: &str) -> Self {
        Self::with_opener(name, format!("Host {name}"))
    }

    /// Section read from a file, keeping the `Host` line exactly as written.
    pub fn with_opener(name: &str, opener: String) -> Self {
        Self {
            name: name.to_string(),
            opener,
            body: Vec::new(),
            key_match: KeyMatch::default(),
            lookups: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opener(&self) -> &str {
        &self.opener
    }

    pub fn body(&self) -> &[String] {
        &self.body
    }

    pub fn key_match(&self) -> KeyMatch {
        self.key_match
    }

    pub fn set_key_match(&mut self, key_match: KeyMatch) {
        self.key_match = key_match;
        self.invalidate();
    }

    /// Appends a raw line, as the parser does.
    pub fn push_line(&mut self, line: String) {
        self.body.push(line);
        self.invalidate();
    }

    /// Replaces the whole body with an independent copy of another one.
    pub fn replace_body(&mut self, body: Vec<String>) {
        self.body = body;
        self.invalidate();
    }

    /// The opener line followed by every body line.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.opener.as_str()).chain(self.body.iter().map(String::as_str))
    }

    pub fn render(&self, separator: &str) -> String {
        self.lines().collect::<Vec<_>>().join(separator)
    }

    /// Position in the body of the first line matching `key`.
    pub fn position(&self, key: &str) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        if let Some(&cached) = self.lookups.borrow().get(key) {
            return cached;
        }
        let found = self.key_match.compile(key).and_then(|re| {
            self.body.iter().position(|line| re.is_match(line))
        });
        self.lookups.borrow_mut().insert(key.to_string(), found);
        found
    }

    /// Body positions of every line matching `key`, in order.
    fn positions(&self, key: &str) -> Vec<usize> {
        if key.is_empty() {
            return Vec::new();
        }
        let Some(re) = self.key_match.compile(key) else {
            return Vec::new();
        };
        self.body
            .iter()
            .enumerate()
            .filter(|(_, line)| re.is_match(line))
            .map(|(i, _)| i)
            .collect()
    }

    /// Value of the first directive matching `key`: everything after the
    /// keyword and its separator.
    pub fn get(&self, key: &str) -> Option<&str> {
        let position = self.position(key)?;
        let re = self.key_match.compile(key)?;
        let line = &self.body[position];
        let value = re.captures(line)?.name("value")?.as_str();
        Some(value.trim_end())
    }

    /// Assigns `value` to `key`, or removes the setting when `value` is the
    /// deletion marker. Returns whether the body changed.
    ///
    /// The first matching line is rewritten in place as `    {key} {value}`
    /// and later lines matching the same key are dropped; without a match the
    /// line goes to the end of the body. Other lines are never touched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        validate_setting(key, value)?;
        if value == DELETE_MARKER {
            return Ok(self.unset(key));
        }

        let line = format!("{INDENT}{key} {value}");
        let positions = self.positions(key);
        let Some((&first, duplicates)) = positions.split_first() else {
            debug!("host '{}': appending '{}'", self.name, line);
            self.body.push(line);
            self.invalidate();
            return Ok(true);
        };

        let mut changed = false;
        for &position in duplicates.iter().rev() {
            let removed = self.body.remove(position);
            debug!("host '{}': dropped duplicate '{}'", self.name, removed);
            changed = true;
        }
        if self.body[first] != line {
            debug!("host '{}': replacing line {} with '{}'", self.name, first, line);
            self.body[first] = line;
            changed = true;
        }
        if changed {
            self.invalidate();
        }
        Ok(changed)
    }

    /// Removes the first line matching `key`. Returns whether one was removed.
    pub fn unset(&mut self, key: &str) -> bool {
        match self.position(key) {
            Some(position) => {
                let removed = self.body.remove(position);
                debug!("host '{}': removed '{}'", self.name, removed);
                self.invalidate();
                true
            }
            None => false,
        }
    }

    /// Rewrites the value of the first line matching `key` in place, keeping
    /// the keyword and indentation of that line. `edit` returns `None` to
    /// leave the value alone.
    pub fn edit_value<F>(&mut self, key: &str, edit: F) -> bool
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let Some(position) = self.position(key) else {
            return false;
        };
        let Some(re) = self.key_match.compile(key) else {
            return false;
        };
        let line = &self.body[position];
        let Some(span) = re.captures(line).and_then(|c| c.name("value")) else {
            return false;
        };
        let Some(value) = edit(span.as_str()) else {
            return false;
        };

        let mut rewritten = String::with_capacity(line.len() + value.len());
        rewritten.push_str(&line[..span.start()]);
        rewritten.push_str(&value);
        rewritten.push_str(&line[span.end()..]);
        self.body[position] = rewritten;
        self.invalidate();
        true
    }

    fn invalidate(&mut self) {
        self.lookups.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web1() -> Section {
        let mut section = Section::new("web1");
        for line in [
            "  # frontend",
            "  HostName web1.example.com",
            "\tUser admin",
            "",
        ] {
            section.push_line(line.to_string());
        }
        section
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let section = web1();
        assert_eq!(section.get("Hostname"), Some("web1.example.com"));
        assert_eq!(section.get("user"), Some("admin"));
        assert_eq!(section.get("Port"), None);
    }

    #[test]
    fn test_get_ignores_comments_and_prefixes() {
        let section = web1();
        assert_eq!(section.get("frontend"), None);
        assert_eq!(section.get("Host"), None);
    }

    #[test]
    fn test_get_with_equals_separator() {
        let mut section = Section::new("a");
        section.push_line("Port = 2222".to_string());
        assert_eq!(section.get("Port"), Some("2222"));
    }

    #[test]
    fn test_key_is_a_pattern() {
        let section = web1();
        assert_eq!(section.get("Host.*"), Some("web1.example.com"));
        assert_eq!(section.get("Us(er|r)"), Some("admin"));
    }

    #[test]
    fn test_literal_key_match() {
        let mut section = web1();
        section.set_key_match(KeyMatch::Literal);
        assert_eq!(section.get("Host.*"), None);
        assert_eq!(section.get("hostname"), Some("web1.example.com"));
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_literal() {
        let mut section = Section::new("a");
        section.push_line("Weird( yes".to_string());
        assert_eq!(section.get("Weird("), Some("yes"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut section = web1();
        assert!(section.set("User", "root").unwrap());
        assert_eq!(section.body()[2], "    User root");
        assert_eq!(section.body()[1], "  HostName web1.example.com");
        assert_eq!(section.body().len(), 4);
    }

    #[test]
    fn test_set_appends_new_key() {
        let mut section = web1();
        assert!(section.set("Port", "22").unwrap());
        assert_eq!(section.body().last().map(String::as_str), Some("    Port 22"));
        assert_eq!(section.get("Port"), Some("22"));
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut section = web1();
        section.set("Port", "22").unwrap();
        let once = section.body().to_vec();
        assert!(!section.set("Port", "22").unwrap());
        assert_eq!(section.body(), once.as_slice());
    }

    #[test]
    fn test_delete_marker_removes_line() {
        let mut section = web1();
        assert!(section.set("User", DELETE_MARKER).unwrap());
        assert_eq!(section.get("User"), None);
        assert_eq!(section.body().len(), 3);

        assert!(!section.set("User", DELETE_MARKER).unwrap());
        assert_eq!(section.body().len(), 3);
    }

    #[test]
    fn test_lookup_cache_invalidated_on_mutation() {
        let mut section = web1();
        assert_eq!(section.position("Port"), None);
        section.set("Port", "22").unwrap();
        assert_eq!(section.position("Port"), Some(4));
        section.unset("User");
        assert_eq!(section.position("Port"), Some(3));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let mut section = web1();
        assert!(matches!(
            section.set("", "value"),
            Err(ConfigError::InvalidSetting { .. })
        ));
        assert_eq!(section.get(""), None);
        assert_eq!(section.body().len(), 4);
    }

    #[test]
    fn test_multiline_setting_is_rejected() {
        let mut section = web1();
        for (key, value) in [("User", "root\nHost evil"), ("Port\r", "22"), ("User\nX", "-")] {
            assert!(matches!(
                section.set(key, value),
                Err(ConfigError::InvalidSetting { .. })
            ));
        }
        assert_eq!(section.get("User"), Some("admin"));
        assert_eq!(section.body().len(), 4);
    }

    #[test]
    fn test_set_drops_repeated_keys() {
        let mut section = Section::new("a");
        for line in ["  User x", "  # note", "  user y", "  Port 22", "  USER z"] {
            section.push_line(line.to_string());
        }
        assert!(section.set("User", "w").unwrap());
        assert_eq!(section.body(), ["    User w", "  # note", "  Port 22"]);
        assert!(!section.set("User", "w").unwrap());
    }

    #[test]
    fn test_delete_marker_removes_one_repeated_key() {
        let mut section = Section::new("a");
        section.push_line("  User x".to_string());
        section.push_line("  User y".to_string());
        assert!(section.set("User", DELETE_MARKER).unwrap());
        assert_eq!(section.body(), ["  User y"]);
    }

    #[test]
    fn test_edit_value_keeps_formatting() {
        let mut section = web1();
        assert!(section.edit_value("hostname", |v| Some(v.replacen("web1", "web2", 1))));
        assert_eq!(section.body()[1], "  HostName web2.example.com");
        assert!(!section.edit_value("hostname", |_| None));
    }

    #[test]
    fn test_render() {
        let section = web1();
        assert_eq!(
            section.render("\n"),
            "Host web1\n  # frontend\n  HostName web1.example.com\n\tUser admin\n"
        );
    }
}
