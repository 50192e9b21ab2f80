use std::collections::HashMap;

/// One parsed LTSV line: label -> value plus the order labels were first seen in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: HashMap<String, String>,
    order: Vec<String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one line of `label:value` columns separated by tabs.
    ///
    /// Columns without a colon are dropped. A repeated label keeps its first
    /// position in the order but takes the last value.
    pub fn parse(line: &str) -> Self {
        let mut record = Record::new();
        for column in line.split('\t') {
            if let Some((label, value)) = column.split_once(':') {
                record.insert(label, value);
            }
        }
        record
    }

    /// Set `label` to `value`, appending the label to the order if it is new.
    pub fn insert(&mut self, label: &str, value: &str) {
        match self.values.get_mut(label) {
            Some(existing) => {
                existing.clear();
                existing.push_str(value);
            }
            None => {
                self.order.push(label.to_string());
                self.values.insert(label.to_string(), value.to_string());
            }
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    /// Value for `label`, or the empty string when absent.
    pub fn value_or_empty(&self, label: &str) -> &str {
        self.get(label).unwrap_or("")
    }

    pub fn contains(&self, label: &str) -> bool {
        self.values.contains_key(label)
    }

    /// Labels in first-seen order.
    pub fn labels(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
