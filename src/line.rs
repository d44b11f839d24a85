//! Classification of raw ssh config lines.
//!
//! Classifying a line never changes it: the parser keeps every line verbatim
//! and only asks this module whether a line opens a new `Host` section.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLine<'a> {
    /// `Host <pattern>` at the start of a line
    Host { pattern: &'a str },
    Comment { text: &'a str },
    Empty,
    Include { paths: &'a str },
    /// `Key Value` or `Key=Value`, with any indentation
    Directive { key: &'a str, value: &'a str },
    /// A lone keyword without a value
    Other { text: &'a str },
}

impl<'a> ConfigLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        if let Some(pattern) = host_pattern(line) {
            return ConfigLine::Host { pattern };
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            return ConfigLine::Empty;
        }
        if trimmed.starts_with('#') {
            return ConfigLine::Comment { text: line };
        }

        match split_directive(trimmed) {
            Some((key, value)) if key.eq_ignore_ascii_case("include") => {
                ConfigLine::Include { paths: value }
            }
            Some((key, value)) => ConfigLine::Directive { key, value },
            None => ConfigLine::Other { text: line },
        }
    }
}

/// Returns the host name if `line` opens a section.
///
/// The `Host` keyword is case-sensitive and must start the line; `Hostname`
/// and indented `Host` lines are body lines. A `Host` keyword with nothing
/// after it does not open a section.
pub fn host_pattern(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Host")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let pattern = rest.trim();
    (!pattern.is_empty()).then_some(pattern)
}

/// Splits a trimmed line into its keyword and the remainder.
fn split_directive(trimmed: &str) -> Option<(&str, &str)> {
    let split_at = trimmed.find(|c: char| c.is_whitespace() || c == '=')?;
    let (key, rest) = trimmed.split_at(split_at);
    let rest = rest.trim_start();
    let value = rest.strip_prefix('=').unwrap_or(rest).trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}
