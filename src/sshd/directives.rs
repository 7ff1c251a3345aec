//! Ordered set of sshd directives and their required values

/// Directives enforced on the daemon config, in the order they are appended
const HARDENED: &[(&str, &str)] = &[
    ("PubkeyAuthentication", "yes"),
    ("AuthorizedKeysFile", ".ssh/authorized_keys .ssh/authorized_keys2"),
    ("PasswordAuthentication", "no"),
    ("PermitRootLogin", "prohibit-password"),
    ("ClientAliveInterval", "60"),
    ("ClientAliveCountMax", "10"),
];

/// A single `name value` pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub value: String,
}

impl Directive {
    /// Render as a config line
    pub fn line(&self) -> String {
        format!("{} {}", self.name, self.value)
    }

    /// Whether a trimmed, active config line sets this directive
    pub fn matches(&self, trimmed: &str) -> bool {
        trimmed
            .strip_prefix(self.name.as_str())
            .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with('\t'))
    }
}

/// Directives keyed by unique name, iterated in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveSet {
    directives: Vec<Directive>,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key-only authentication profile this tool applies
    pub fn hardened() -> Self {
        HARDENED.iter().copied().collect()
    }

    /// Set `name` to `value`; an existing name keeps its position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.directives.iter_mut().find(|d| d.name == name) {
            Some(existing) => existing.value = value,
            None => self.directives.push(Directive { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.directives
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for DirectiveSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}
