//! Path parameters extracted during route lookup, e.g. the `12345` in
//! `/hotels/12345/cancel` matched against `/hotels/:id/cancel`.

use serde::Serialize;

/// A single URL path parameter (not a query string value).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathParam {
    pub key: String,
    pub value: String,
}

/// Ordered path parameters, in the order the pattern declares them.
///
/// Callers may rely on the iteration order matching segment order in
/// the route pattern.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathParams {
    params: Vec<PathParam>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of the first parameter with the given key, or an empty
    /// string if the key isn't present.
    pub fn get(&self, key: &str) -> &str {
        self.params
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathParam> {
        self.params.iter()
    }

    pub(crate) fn push(&mut self, key: &str, value: &str) {
        self.params.push(PathParam {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    /// Drop captures recorded past `len`. Used to unwind a failed
    /// parameter branch during tree descent.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.params.truncate(len);
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.params.reserve(additional);
    }

    pub(crate) fn get_mut(&mut self, key: &str) -> Option<&mut String> {
        self.params
            .iter_mut()
            .find(|p| p.key == key)
            .map(|p| &mut p.value)
    }
}

impl std::ops::Index<usize> for PathParams {
    type Output = PathParam;

    fn index(&self, index: usize) -> &Self::Output {
        &self.params[index]
    }
}

impl<'a> IntoIterator for &'a PathParams {
    type Item = &'a PathParam;
    type IntoIter = std::slice::Iter<'a, PathParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get() {
        let mut params = PathParams::new();
        params.push("dir", "js");
        params.push("filepath", "/inc/framework.js");

        assert_eq!(params.get("filepath"), "/inc/framework.js");
        assert_eq!(params.get("dir"), "js");
        assert_eq!(params.get("notfound"), "");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_first_match_wins() {
        let mut params = PathParams::new();
        params.push("id", "1");
        params.push("id", "2");

        assert_eq!(params.get("id"), "1");
    }

    #[test]
    fn test_order_is_insertion_order() {
        let mut params = PathParams::new();
        params.push("a", "1");
        params.push("b", "2");
        params.push("c", "3");

        let keys = params.iter().map(|p| p.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["a", "b", "c"]);

        assert_eq!(params[0].key, "a");
        assert_eq!(params[2].value, "3");
    }
}
