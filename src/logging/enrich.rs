//! Ad-hoc structured-field accumulation for a single log event.

use serde_json::{Map, Value};

/// Accumulates named values for one log event.
///
/// A property recorded exactly once flushes as a scalar field; recorded two
/// or more times it flushes as an ordered sequence, in call order. Empty and
/// whitespace-only values are ignored. Instances are built, flushed once,
/// and discarded; they are not meant to be shared across events or writers.
#[derive(Debug, Default)]
pub struct LogEnricher {
    properties: Vec<(String, Vec<String>)>,
}

impl LogEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a value for `property`; returns self for call chaining.
    pub fn with(mut self, property: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            return self;
        }

        match self.properties.iter_mut().find(|(name, _)| name == property) {
            Some((_, values)) => values.push(value),
            None => self.properties.push((property.to_owned(), vec![value])),
        }

        self
    }

    /// Flushes into a JSON object: scalar for single values, array otherwise.
    pub fn into_properties(self) -> Map<String, Value> {
        let mut map = Map::new();
        for (name, mut values) in self.properties {
            let value = if values.len() == 1 {
                Value::String(values.remove(0))
            } else {
                Value::Array(values.into_iter().map(Value::String).collect())
            };
            map.insert(name, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_value_flushes_as_scalar() {
        let properties = LogEnricher::new().with("User", "alice").into_properties();
        assert_eq!(properties.get("User"), Some(&json!("alice")));
    }

    #[test]
    fn repeated_values_flush_as_ordered_sequence() {
        let properties = LogEnricher::new()
            .with("Step", "parse")
            .with("Step", "validate")
            .with("Step", "store")
            .into_properties();
        assert_eq!(
            properties.get("Step"),
            Some(&json!(["parse", "validate", "store"]))
        );
    }

    #[test]
    fn empty_and_whitespace_values_are_ignored() {
        let properties = LogEnricher::new()
            .with("Empty", "")
            .with("Blank", "   ")
            .with("Kept", "value")
            .into_properties();
        assert!(!properties.contains_key("Empty"));
        assert!(!properties.contains_key("Blank"));
        assert_eq!(properties.len(), 1);
    }

    #[test]
    fn properties_keep_insertion_order() {
        let properties = LogEnricher::new()
            .with("B", "1")
            .with("A", "2")
            .with("C", "3")
            .into_properties();
        let keys: Vec<_> = properties.keys().cloned().collect();
        assert_eq!(keys, ["B", "A", "C"]);
    }
}
