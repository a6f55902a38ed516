use serde_json::Value;

use std::{slice, vec};

/// An ordered mapping of parameter names to values.
///
/// Inserting a name that is already present replaces its value
/// but keeps its original position, so later duplicates in a
/// query string or form body win.
#[derive(Clone, Debug, PartialEq)]
pub struct Params<V = String>(Vec<(String, V)>);

impl<V> Params<V> {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the value for the given name.
    pub fn get(&self, name: &str) -> Option<&V> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    /// Insert a parameter, returning the previous value if the
    /// name was already present.
    pub fn insert(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();

        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some((_, old)) => Some(std::mem::replace(old, value)),
            None => {
                self.0.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }
}

impl<V> Default for Params<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Extend<(String, V)> for Params<V> {
    fn extend<T>(&mut self, iter: T)
    where
        T: IntoIterator<Item = (String, V)>,
    {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<V> FromIterator<(String, V)> for Params<V> {
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (String, V)>,
    {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<V> IntoIterator for Params<V> {
    type Item = (String, V);
    type IntoIter = vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, V> IntoIterator for &'a Params<V> {
    type Item = &'a (String, V);
    type IntoIter = slice::Iter<'a, (String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Params<String>> for Params<Value> {
    fn from(params: Params<String>) -> Self {
        Params(
            params
                .0
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
        )
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Params<V>
where
    K: Into<String>,
{
    fn from(pairs: [(K, V); N]) -> Self {
        pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Params;

    #[test]
    fn later_duplicates_overwrite_in_place() {
        let params: Params = [("a", "1"), ("b", "2"), ("a", "3")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("a").map(String::as_str), Some("3"));
        assert!(params.keys().eq(["a", "b"]));
    }

    #[test]
    fn remove() {
        let mut params = Params::from([("a", 1), ("b", 2)]);
        assert_eq!(params.remove("a"), Some(1));
        assert_eq!(params.remove("a"), None);
        assert!(!params.contains("a"));
        assert_eq!(params.len(), 1);
    }
}
