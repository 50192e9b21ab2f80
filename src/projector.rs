use crate::record::Record;
use colored::Colorize;
use std::collections::HashSet;

/// How each emitted column is rendered, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// `value` only
    ValuesOnly,
    /// `label:value`
    Plain,
    /// `label:value` with the label green and the value magenta
    Colored,
}

impl RenderMode {
    /// Pick the render mode from the `--no-key` flag and whether the output
    /// should be colored (normally: stdout is a terminal).
    pub fn select(no_key: bool, colorize: bool) -> Self {
        match (no_key, colorize) {
            (true, _) => RenderMode::ValuesOnly,
            (false, true) => RenderMode::Colored,
            (false, false) => RenderMode::Plain,
        }
    }

    fn push_column(&self, out: &mut String, label: &str, value: &str) {
        match self {
            RenderMode::ValuesOnly => out.push_str(value),
            RenderMode::Plain => {
                out.push_str(label);
                out.push(':');
                out.push_str(value);
            }
            RenderMode::Colored => {
                out.push_str(&label.green().to_string());
                out.push(':');
                out.push_str(&value.magenta().to_string());
            }
        }
    }
}

/// Which labels to emit and in what order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySelection {
    /// Exactly these labels, in this order; absent ones render as empty
    Explicit(Vec<String>),
    /// Every label in first-seen order, minus the ignored ones
    All { ignore: HashSet<String> },
}

impl KeySelection {
    /// An explicit key list wins over an ignore list. Empty labels (from
    /// `-k ""` or `-k foo,,bar`) are dropped.
    pub fn new(keys: Vec<String>, ignore: Vec<String>) -> Self {
        let keys: Vec<String> = keys.into_iter().filter(|k| !k.is_empty()).collect();
        if keys.is_empty() {
            KeySelection::All {
                ignore: ignore.into_iter().collect(),
            }
        } else {
            KeySelection::Explicit(keys)
        }
    }
}

impl Default for KeySelection {
    fn default() -> Self {
        KeySelection::All {
            ignore: HashSet::new(),
        }
    }
}

/// Renders records back into LTSV lines
#[derive(Debug, Clone)]
pub struct Projector {
    selection: KeySelection,
    mode: RenderMode,
}

impl Projector {
    pub fn new(selection: KeySelection, mode: RenderMode) -> Self {
        Self { selection, mode }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Render the selected columns of `record`, tab separated, without newline
    pub fn project(&self, record: &Record) -> String {
        let mut out = String::new();
        let mut first = true;
        let mut push = |label: &str| {
            if !first {
                out.push('\t');
            }
            first = false;
            self.mode
                .push_column(&mut out, label, record.value_or_empty(label));
        };

        match &self.selection {
            KeySelection::Explicit(keys) => keys.iter().for_each(|label| push(label.as_str())),
            KeySelection::All { ignore } => record
                .labels()
                .iter()
                .filter(|label| !ignore.contains(label.as_str()))
                .for_each(|label| push(label.as_str())),
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_round_trip_without_selection() {
        let line = "time:[10/Oct/2000:13:55:36 -0700]\thost:127.0.0.1\treq:GET / HTTP/1.1";
        let projector = Projector::new(KeySelection::default(), RenderMode::Plain);
        assert_eq!(projector.project(&Record::parse(line)), line);
    }

    #[test]
    fn test_explicit_keys_reorder() {
        let projector = Projector::new(
            KeySelection::new(keys(&["bar", "foo"]), vec![]),
            RenderMode::Plain,
        );
        assert_eq!(
            projector.project(&Record::parse("foo:aaa\tbar:bbb")),
            "bar:bbb\tfoo:aaa"
        );
    }

    #[test]
    fn test_explicit_missing_key_keeps_position() {
        let projector = Projector::new(
            KeySelection::new(keys(&["foo", "baz", "bar"]), vec![]),
            RenderMode::ValuesOnly,
        );
        assert_eq!(projector.project(&Record::parse("foo:aaa\tbar:bbb")), "aaa\t\tbbb");
    }

    #[test]
    fn test_values_only() {
        let projector = Projector::new(KeySelection::default(), RenderMode::ValuesOnly);
        assert_eq!(projector.project(&Record::parse("foo:aaa\tbar:bbb")), "aaa\tbbb");
    }

    #[test]
    fn test_ignore_keys() {
        let projector = Projector::new(
            KeySelection::new(vec![], keys(&["foo"])),
            RenderMode::Plain,
        );
        assert_eq!(
            projector.project(&Record::parse("foo:aaa\tbar:bbb\tbaz:ccc")),
            "bar:bbb\tbaz:ccc"
        );
    }

    #[test]
    fn test_explicit_keys_win_over_ignore() {
        let selection = KeySelection::new(keys(&["foo"]), keys(&["foo"]));
        assert_eq!(selection, KeySelection::Explicit(keys(&["foo"])));
    }

    #[test]
    fn test_empty_keys_are_dropped() {
        let selection = KeySelection::new(keys(&["foo", "", "bar"]), vec![]);
        assert_eq!(selection, KeySelection::Explicit(keys(&["foo", "bar"])));

        let selection = KeySelection::new(keys(&[""]), keys(&["foo"]));
        assert_eq!(
            selection,
            KeySelection::All {
                ignore: ["foo".to_string()].into_iter().collect()
            }
        );
    }

    #[test]
    fn test_colored_wraps_label_and_value() {
        colored::control::set_override(true);
        let projector = Projector::new(KeySelection::default(), RenderMode::Colored);
        let out = projector.project(&Record::parse("foo:aaa"));
        assert!(out.contains("\u{1b}[32mfoo\u{1b}[0m"));
        assert!(out.contains("\u{1b}[35maaa\u{1b}[0m"));
    }

    #[test]
    fn test_select_render_mode() {
        assert_eq!(RenderMode::select(true, true), RenderMode::ValuesOnly);
        assert_eq!(RenderMode::select(false, true), RenderMode::Colored);
        assert_eq!(RenderMode::select(false, false), RenderMode::Plain);
    }
}
