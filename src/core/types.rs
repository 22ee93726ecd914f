//! Common types shared by the contract and the handler.

use serde::{Deserialize, Serialize};

/// Ordered request metadata.
///
/// Entries are kept exactly as given. Lookup helpers treat entries of the
/// form `Name: value` as fields and match names case-insensitively; entries
/// without a colon are only visible through iteration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headers(Vec<String>);

impl Headers {
    /// Create an empty header list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a raw header line.
    pub fn push(&mut self, line: impl Into<String>) {
        self.0.push(line.into());
    }

    /// Append a `Name: value` field.
    pub fn add(&mut self, name: &str, value: &str) {
        self.0.push(format!("{}: {}", name, value));
    }

    /// Builder form of [`Headers::add`].
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.add(name, value);
        self
    }

    /// First value for a field name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Remove every field with the given name. Returns how many were removed.
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|line| match split_field(line) {
            Some((n, _)) => !n.eq_ignore_ascii_case(name),
            None => true,
        });
        before - self.0.len()
    }

    /// Iterate over `(name, value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().filter_map(|line| split_field(line))
    }

    /// Borrow as the plain slice the contract takes.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

fn split_field(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    Some((name.trim(), value.trim()))
}

impl From<Vec<String>> for Headers {
    fn from(lines: Vec<String>) -> Self {
        Self(lines)
    }
}

impl From<&[&str]> for Headers {
    fn from(lines: &[&str]) -> Self {
        Self(lines.iter().map(|s| s.to_string()).collect())
    }
}

impl AsRef<[String]> for Headers {
    fn as_ref(&self) -> &[String] {
        &self.0
    }
}

/// ICAP method of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IcapMethod {
    /// Capability query
    Options,
    /// Request modification
    Reqmod,
    /// Response modification
    Respmod,
}

impl IcapMethod {
    /// Parse a method name. Case-insensitive.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "OPTIONS" => Some(IcapMethod::Options),
            "REQMOD" => Some(IcapMethod::Reqmod),
            "RESPMOD" => Some(IcapMethod::Respmod),
            _ => None,
        }
    }

    /// Wire name, also used as the module type passed to `initialize`.
    pub fn as_str(&self) -> &'static str {
        match self {
            IcapMethod::Options => "OPTIONS",
            IcapMethod::Reqmod => "REQMOD",
            IcapMethod::Respmod => "RESPMOD",
        }
    }
}

impl std::fmt::Display for IcapMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Set of ICAP methods a service module handles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModTypes(u8);

impl ModTypes {
    pub const NONE: ModTypes = ModTypes(0);
    pub const OPTIONS: ModTypes = ModTypes(0x01);
    pub const REQMOD: ModTypes = ModTypes(0x02);
    pub const RESPMOD: ModTypes = ModTypes(0x04);

    /// Whether the set contains a method.
    pub fn contains(&self, method: IcapMethod) -> bool {
        let bit = match method {
            IcapMethod::Options => Self::OPTIONS,
            IcapMethod::Reqmod => Self::REQMOD,
            IcapMethod::Respmod => Self::RESPMOD,
        };
        self.0 & bit.0 != 0
    }

    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for ModTypes {
    type Output = ModTypes;

    fn bitor(self, rhs: ModTypes) -> ModTypes {
        ModTypes(self.0 | rhs.0)
    }
}

/// Timestamp wrapper for consistent serialization.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Get current UTC timestamp.
pub fn now() -> Timestamp {
    chrono::Utc::now()
}
