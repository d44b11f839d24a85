//! Terminal highlighting of search matches.

use regex::Regex;

pub const BOLD: &str = "\x1b[1m";
pub const FG_RED: &str = "\x1b[31m";
pub const RESET: &str = "\x1b[0m";

/// Wraps every non-empty match of `pattern` in `text` with a bold red escape.
pub fn highlight(text: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in pattern.find_iter(text).filter(|m| !m.is_empty()) {
        out.push_str(&text[last..m.start()]);
        out.push_str(BOLD);
        out.push_str(FG_RED);
        out.push_str(m.as_str());
        out.push_str(RESET);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_wraps_matches() {
        let re = Regex::new("admin").unwrap();
        assert_eq!(
            highlight("User admin # admin", &re),
            "User \x1b[1m\x1b[31madmin\x1b[0m # \x1b[1m\x1b[31madmin\x1b[0m"
        );
    }

    #[test]
    fn test_highlight_skips_empty_matches() {
        let re = Regex::new("x*").unwrap();
        assert_eq!(highlight("abc", &re), "abc");
    }

    #[test]
    fn test_no_match_is_unchanged() {
        let re = Regex::new("zzz").unwrap();
        assert_eq!(highlight("Host web1", &re), "Host web1");
    }
}
