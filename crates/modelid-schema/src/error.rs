use std::{collections::BTreeMap, fmt};

///
/// err
/// push a formatted message onto an ErrorTree
///

#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

///
/// ErrorTree
///
/// Route-keyed collection of validation messages. Validation passes keep
/// going after the first failure so one run reports every problem.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    messages: Vec<String>,
    children: BTreeMap<String, ErrorTree>,
}

impl ErrorTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree holding a single top-level message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let mut tree = Self::new();
        tree.add(message);

        tree
    }

    pub fn add(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record a message under a named route (entity name, property path, ...).
    pub fn add_for(&mut self, route: impl Into<String>, message: impl Into<String>) {
        self.children
            .entry(route.into())
            .or_default()
            .add(message);
    }

    /// Graft another tree under a route, dropping it if it holds nothing.
    pub fn merge_for(&mut self, route: impl Into<String>, other: Self) {
        if other.is_empty() {
            return;
        }

        let child = self.children.entry(route.into()).or_default();
        child.messages.extend(other.messages);
        for (key, tree) in other.children {
            child.merge_for(key, tree);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Number of messages in the whole tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Flatten into `route: message` lines, routes joined with `.`.
    #[must_use]
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(None, &mut out);

        out
    }

    fn flatten_into(&self, prefix: Option<&str>, out: &mut Vec<String>) {
        for message in &self.messages {
            match prefix {
                Some(route) => out.push(format!("{route}: {message}")),
                None => out.push(message.clone()),
            }
        }

        for (key, child) in &self.children {
            let route = match prefix {
                Some(route) => format!("{route}.{key}"),
                None => key.clone(),
            };
            child.flatten_into(Some(&route), out);
        }
    }

    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.flatten().join("; "))
    }
}

impl std::error::Error for ErrorTree {}

///
/// TESTS
///
