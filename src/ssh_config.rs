use crate::error::{ConfigError, Result};
use crate::line::ConfigLine;
use crate::line;
use crate::section::{KeyMatch, Section, validate_setting};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// The whole config file: lines before the first `Host`, then every section
/// in file order.
#[derive(Debug, Clone)]
pub struct SshConfig {
    header: Vec<String>,
    sections: Vec<Section>,
    // name -> position in `sections`; a repeated name resolves to its last block
    index: HashMap<String, usize>,
    line_ending: LineEnding,
    trailing_newline: bool,
    key_match: KeyMatch,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SshConfig {
    pub fn new() -> Self {
        Self {
            header: Vec::new(),
            sections: Vec::new(),
            index: HashMap::new(),
            line_ending: LineEnding::Lf,
            trailing_newline: true,
            key_match: KeyMatch::default(),
        }
    }

    /// Parses file content. Every line is kept verbatim; lines that do not
    /// open a `Host` section belong to the section above them, or to the
    /// header.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::new();
        if content.is_empty() {
            return config;
        }

        config.trailing_newline = content.ends_with('\n');
        let content = content.strip_suffix('\n').unwrap_or(content);
        let raw: Vec<&str> = content.split('\n').collect();

        // An unterminated last line says nothing about the file's line ending
        let terminated = if config.trailing_newline {
            raw.len()
        } else {
            raw.len() - 1
        };
        let crlf = terminated > 0 && raw[..terminated].iter().all(|l| l.ends_with('\r'));
        if crlf {
            config.line_ending = LineEnding::CrLf;
        }
        // Mixed endings keep their stray '\r' inside the line text
        let lines = raw.into_iter().enumerate().map(|(i, l)| {
            if crlf && i < terminated {
                &l[..l.len() - 1]
            } else {
                l
            }
        });

        for raw_line in lines {
            match ConfigLine::classify(raw_line) {
                ConfigLine::Host { pattern } => {
                    let section = Section::with_opener(pattern, raw_line.to_string());
                    config.push_section(section);
                }
                _ => match config.sections.last_mut() {
                    Some(section) => section.push_line(raw_line.to_string()),
                    None => config.header.push(raw_line.to_string()),
                },
            }
        }

        debug!(
            "parsed {} header line(s) and {} section(s)",
            config.header.len(),
            config.sections.len()
        );
        config
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn key_match(&self) -> KeyMatch {
        self.key_match
    }

    /// Switches how setting names are matched in every section.
    pub fn set_key_match(&mut self, key_match: KeyMatch) {
        self.key_match = key_match;
        for section in &mut self.sections {
            section.set_key_match(key_match);
        }
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.index.get(name).map(|&i| &self.sections[i])
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.index.get(name).map(|&i| &mut self.sections[i])
    }

    /// Indexed sections ordered by name.
    fn sorted_sections(&self) -> Vec<&Section> {
        let mut names: Vec<&String> = self.index.keys().collect();
        names.sort();
        names
            .into_iter()
            .map(|name| &self.sections[self.index[name]])
            .collect()
    }

    /// `Host <name>` for every host, sorted by name.
    pub fn list(&self) -> Vec<String> {
        self.sorted_sections()
            .into_iter()
            .map(|section| format!("Host {}", section.name()))
            .collect()
    }

    /// The rendered section, or `None` for an unknown host.
    pub fn show(&self, name: &str) -> Option<String> {
        self.section(name)
            .map(|section| section.render(self.line_ending.as_str()))
    }

    pub fn get(&self, name: &str, key: &str) -> Option<&str> {
        self.section(name)?.get(key)
    }

    /// Sections whose name or any body line matches `pattern`, sorted by name.
    pub fn search(&self, pattern: &Regex) -> Vec<&Section> {
        self.sorted_sections()
            .into_iter()
            .filter(|section| {
                pattern.is_match(section.name())
                    || section.body().iter().any(|line| pattern.is_match(line))
            })
            .collect()
    }

    /// Applies each key/value pair to `name`, creating the host at the end of
    /// the file when it does not exist yet. Invalid names or settings are
    /// rejected before anything changes.
    pub fn set<K, V>(&mut self, name: &str, settings: &[(K, V)]) -> Result<&Section>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        validate_host(name)?;
        for (key, value) in settings {
            validate_setting(key.as_ref(), value.as_ref())?;
        }

        let position = match self.index.get(name) {
            Some(&i) => i,
            None => {
                info!("adding host '{}'", name);
                self.push_section(Section::new(name))
            }
        };

        let section = &mut self.sections[position];
        for (key, value) in settings {
            section.set(key.as_ref(), value.as_ref())?;
        }
        Ok(section)
    }

    /// Removes one setting. Unknown hosts are left alone rather than created.
    pub fn unset(&mut self, name: &str, key: &str) -> bool {
        match self.section_mut(name) {
            Some(section) => section.unset(key),
            None => {
                debug!("unset: no host '{}'", name);
                false
            }
        }
    }

    /// Removes the section `name` resolves to.
    pub fn rm(&mut self, name: &str) -> bool {
        let Some(position) = self.index.remove(name) else {
            debug!("rm: no host '{}'", name);
            return false;
        };
        self.sections.remove(position);
        self.rebuild_index();
        info!("removed host '{}'", name);
        true
    }

    /// Duplicates the body of `old` into `new`, creating or overwriting it.
    /// When the copy's `Hostname` value contains `old`, the first occurrence
    /// becomes `new`. The `old` section is not modified.
    pub fn copy(&mut self, old: &str, new: &str) -> Result<bool> {
        validate_host(new)?;
        let Some(&source) = self.index.get(old) else {
            debug!("copy: no host '{}'", old);
            return Ok(false);
        };
        let body = self.sections[source].body().to_vec();

        let target = match self.index.get(new) {
            Some(&i) => {
                self.sections[i].replace_body(body);
                i
            }
            None => {
                let mut section = Section::new(new);
                section.replace_body(body);
                self.push_section(section)
            }
        };

        if !old.is_empty() {
            self.sections[target].edit_value("Hostname", |value| {
                value
                    .contains(old)
                    .then(|| value.replacen(old, new, 1))
            });
        }
        info!("copied host '{}' to '{}'", old, new);
        Ok(true)
    }

    /// Paths named by `Include` directives anywhere in the file, in order.
    pub fn include_patterns(&self) -> Vec<&str> {
        self.header
            .iter()
            .chain(self.sections.iter().flat_map(|s| s.body().iter()))
            .filter_map(|line| match ConfigLine::classify(line) {
                ConfigLine::Include { paths } => Some(paths),
                _ => None,
            })
            .flat_map(str::split_whitespace)
            .collect()
    }

    /// The full file content.
    pub fn dump(&self) -> String {
        self.to_string()
    }

    fn push_section(&mut self, mut section: Section) -> usize {
        section.set_key_match(self.key_match);
        let position = self.sections.len();
        if self.index.insert(section.name().to_string(), position).is_some() {
            debug!("host '{}' appears more than once; the last block wins", section.name());
        }
        self.sections.push(section);
        position
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .sections
            .iter()
            .enumerate()
            .map(|(i, section)| (section.name().to_string(), i))
            .collect();
    }
}

impl fmt::Display for SshConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = self.line_ending.as_str();
        let mut first = true;
        for line in self
            .header
            .iter()
            .map(String::as_str)
            .chain(self.sections.iter().flat_map(Section::lines))
        {
            if !first {
                f.write_str(separator)?;
            }
            f.write_str(line)?;
            first = false;
        }
        if self.trailing_newline && !first {
            f.write_str(separator)?;
        }
        Ok(())
    }
}

/// Compiles a user-supplied search pattern.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Accepts only names that read back as the same `Host` line.
fn validate_host(name: &str) -> Result<()> {
    let opener = format!("Host {name}");
    if name.contains(['\n', '\r']) || line::host_pattern(&opener) != Some(name) {
        return Err(ConfigError::InvalidHost {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Pairs up `key value key value ...` arguments.
pub fn settings_from_args(args: &[String]) -> Result<Vec<(&str, &str)>> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(ConfigError::OddArguments { count: args.len() });
    }
    Ok(args
        .chunks_exact(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect())
}
