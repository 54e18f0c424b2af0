use std::collections::HashMap;

/// Issues sequential blank node labels: `_:b0`, `_:b1`, etc.
///
/// One issuer lives for exactly one expansion call, so labels are unique
/// within a single expanded document only.
#[derive(Clone, Debug)]
pub struct BlankNodeIssuer {
    prefix: String,
    counter: u64,
    issued: HashMap<String, String>,
}

impl Default for BlankNodeIssuer {
    fn default() -> Self {
        Self::new("_:b")
    }
}

impl BlankNodeIssuer {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            counter: 0,
            issued: HashMap::new(),
        }
    }

    /// Issue a fresh label not tied to any existing identifier.
    pub fn fresh(&mut self) -> String {
        let label = format!("{}{}", self.prefix, self.counter);
        self.counter += 1;
        label
    }

    /// Issue a label for an existing blank node identifier.
    /// If already issued, returns the previously issued label.
    pub fn issue(&mut self, existing: &str) -> String {
        if let Some(label) = self.issued.get(existing) {
            return label.clone();
        }
        let label = self.fresh();
        self.issued.insert(existing.to_string(), label.clone());
        label
    }
}
