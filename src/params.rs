//! Named path parameters.
//!
//! Both routers fill the same list: matchit's `{name}` segments for literal
//! routes, named capture groups (`(?P<name>…)`) for regex routes. Order is the
//! order of declaration in the route, and a repeated name appears twice.

/// A single `key = value` path parameter.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// Ordered list of path parameters attached to a [`Request`](crate::Request).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Params(Vec<Param>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push(Param { key: key.into(), value: value.into() });
    }

    /// First value registered under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Param> {
        self.0.iter()
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Param;
    type IntoIter = std::slice::Iter<'a, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.push(k, v);
        }
        params
    }
}
