//! Compressed radix tree used for path matching.
//!
//! Each domain holds one tree per HTTP method. Patterns are made of
//! literal spans, named parameters (`:id`, one path segment) and a
//! trailing catch-all (`*filepath`, the entire remainder including its
//! leading slash). Literal spans merge by longest common prefix, so
//! `/hotels/near` and `/hotels/new` share a `/hotels/ne` node.
//!
//! Lookup prefers static edges over parameter edges over catch-all
//! edges, falling back in that order, and reports a trailing-slash
//! redirect when the path would match with a `/` added or removed.

use crate::error::Error;
use crate::params::PathParams;

#[derive(Debug)]
struct Node {
    /// Literal fragment, or `:name` / `/*name` for wildcard nodes.
    path: String,
    /// Static children, highest priority first.
    children: Vec<Node>,
    /// Parameter edge; a node carries at most one, with a fixed name.
    param: Option<Box<Node>>,
    /// Catch-all edge; at most one, always terminal.
    catch_all: Option<Box<Node>>,
    /// Route name when a pattern terminates here.
    name: Option<String>,
    /// Number of terminals in this subtree; orders sibling visits.
    priority: u32,
    /// Parameters on the path from the root down to this node.
    param_count: u8,
}

/// One routing tree, e.g. the GET tree of a domain.
#[derive(Debug)]
pub(crate) struct Tree {
    root: Node,
}

/// Lookup outcome. `name` and `rts` are mutually exclusive.
#[derive(Debug)]
pub(crate) struct Found<'a> {
    pub name: Option<&'a str>,
    pub params: PathParams,
    pub rts: bool,
}

impl Node {
    fn new(path: impl Into<String>, param_count: u8) -> Self {
        Self {
            path: path.into(),
            children: Vec::new(),
            param: None,
            catch_all: None,
            name: None,
            priority: 0,
            param_count,
        }
    }

    fn child_for(&self, byte: u8) -> Option<&Node> {
        self.children.iter().find(|c| c.path.as_bytes()[0] == byte)
    }

    fn child_index_for(&self, byte: u8) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.path.as_bytes()[0] == byte)
    }

    /// Split this static node at `at`: the node keeps the prefix, a new
    /// child takes the suffix along with the children, wildcard edges
    /// and terminal payload.
    fn split(&mut self, at: usize) {
        let suffix = self.path.split_off(at);
        let child = Node {
            path: suffix,
            children: std::mem::take(&mut self.children),
            param: self.param.take(),
            catch_all: self.catch_all.take(),
            name: self.name.take(),
            priority: self.priority,
            param_count: self.param_count,
        };
        self.children = vec![child];
    }

    /// Insert `rest` below this node. The node's own fragment has
    /// already been matched by the caller.
    fn insert_below(&mut self, rest: &str, full: &str, name: &str) -> Result<(), Error> {
        self.priority += 1;

        if rest.is_empty() {
            if self.name.is_some() {
                return Err(Error::RouteExists);
            }
            self.name = Some(name.to_string());
            return Ok(());
        }

        // parameter edge
        if let Some(pname) = rest.strip_prefix(':') {
            let end = pname.find('/').unwrap_or(pname.len());
            let (pname, after) = (&pname[..end], &pname[end..]);

            return match &mut self.param {
                Some(param) if param.path[1..] == *pname => param.insert_below(after, full, name),
                Some(param) => {
                    let prefix = &full[..full.len() - rest.len()];
                    Err(Error::Registration(format!(
                        "router: parameter based edge already exists[{}{}...] new[{}:{}...]",
                        prefix, param.path, prefix, pname
                    )))
                }
                None => {
                    let mut node =
                        Node::new(format!(":{}", pname), self.param_count + 1);
                    node.insert_below(after, full, name)?;
                    self.param = Some(Box::new(node));
                    Ok(())
                }
            };
        }

        // catch-all edge; the pattern validator guarantees it is last
        if let Some(cname) = rest.strip_prefix("/*") {
            return match &mut self.catch_all {
                Some(catch_all) if catch_all.path[2..] == *cname => {
                    catch_all.insert_below("", full, name)
                }
                Some(catch_all) => {
                    let prefix = &full[..full.len() - rest.len()];
                    Err(Error::Registration(format!(
                        "router: catch-all based edge already exists[{}{}...] new[{}{}...]",
                        prefix, catch_all.path, prefix, rest
                    )))
                }
                None => {
                    let mut node =
                        Node::new(format!("/*{}", cname), self.param_count + 1);
                    node.insert_below("", full, name)?;
                    self.catch_all = Some(Box::new(node));
                    Ok(())
                }
            };
        }

        // literal span, up to the next wildcard
        let lit_end = match rest.find(|c| c == ':' || c == '*') {
            Some(at) if rest.as_bytes()[at] == b':' => at,
            Some(at) => at - 1, // the catch-all edge keeps its leading '/'
            None => rest.len(),
        };
        let lit = &rest[..lit_end];

        match self.child_index_for(lit.as_bytes()[0]) {
            Some(i) => {
                let common = common_prefix(lit, &self.children[i].path);
                if common < self.children[i].path.len() {
                    self.children[i].split(common);
                }
                let result = self.children[i].insert_below(&rest[common..], full, name);
                if result.is_ok() {
                    self.reorder_child(i);
                }
                result
            }
            None => {
                let mut node = Node::new(lit, self.param_count);
                node.insert_below(&rest[lit_end..], full, name)?;
                self.children.push(node);
                Ok(())
            }
        }
    }

    /// Bubble the child at `i` towards the front until siblings are in
    /// descending priority order again.
    fn reorder_child(&mut self, mut i: usize) {
        while i > 0 && self.children[i - 1].priority < self.children[i].priority {
            self.children.swap(i - 1, i);
            i -= 1;
        }
    }

    /// Match `rest` below this node. Returns the terminal route name,
    /// or a trailing-slash indicator when the canonical form differs
    /// from the request by one `/`.
    fn descend<'a>(&'a self, rest: &str, params: &mut PathParams) -> (Option<&'a str>, bool) {
        if rest.is_empty() {
            if let Some(name) = &self.name {
                return (Some(name), false);
            }
            // would `rest + "/"` match?
            if self.catch_all.is_some() {
                return (None, true);
            }
            if let Some(slash) = self.child_for(b'/') {
                if slash.path == "/" && slash.name.is_some() {
                    return (None, true);
                }
            }
            return (None, false);
        }

        let mut rts = false;

        if let Some(child) = self.child_for(rest.as_bytes()[0]) {
            if rest.starts_with(child.path.as_str()) {
                let (name, r) = child.descend(&rest[child.path.len()..], params);
                if name.is_some() {
                    return (name, false);
                }
                rts |= r;
            } else if child.name.is_some()
                && child.path.len() == rest.len() + 1
                && child.path.starts_with(rest)
            {
                // the registered path only differs by a trailing '/'
                rts = true;
            }
        }

        if let Some(param) = &self.param {
            let end = rest.find('/').unwrap_or(rest.len());
            if end > 0 {
                let mark = params.len();
                params.reserve((param.param_count as usize).saturating_sub(mark));
                params.push(&param.path[1..], &rest[..end]);
                let (name, r) = param.descend(&rest[end..], params);
                if name.is_some() {
                    return (name, false);
                }
                rts |= r;
                params.truncate(mark);
            }
        }

        if let Some(catch_all) = &self.catch_all {
            if rest.as_bytes()[0] == b'/' {
                params.push(&catch_all.path[2..], rest);
                return (catch_all.name.as_deref(), false);
            }
        }

        // the request only differs by a trailing '/'
        if rest == "/" && self.name.is_some() {
            rts = true;
        }

        (None, rts)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            root: Node::new("", 0),
        }
    }
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` with the route `name` as its payload.
    pub fn insert(&mut self, path: &str, name: &str) -> Result<(), Error> {
        validate_pattern(path)?;
        self.root.insert_below(path, path, name)
    }

    /// Find the route registered for `path`.
    pub fn find(&self, path: &str) -> Found<'_> {
        let mut params = PathParams::new();
        let (name, rts) = self.root.descend(path, &mut params);

        if name.is_none() {
            params = PathParams::new();
        }

        Found { name, params, rts }
    }
}

/// Number of `:param` and `*catchall` segments in a pattern.
pub(crate) fn count_params(path: &str) -> usize {
    path.split('/')
        .filter(|s| s.starts_with(':') || s.starts_with('*'))
        .count()
}

fn common_prefix(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

fn validate_pattern(path: &str) -> Result<(), Error> {
    if !path.starts_with('/') {
        return Err(Error::Registration(format!(
            "router: path must begin with '/' given '{}'",
            path
        )));
    }

    let segments = path.split('/').skip(1).collect::<Vec<_>>();
    for (i, segment) in segments.iter().enumerate() {
        let wild = segment.starts_with(':') || segment.starts_with('*');

        if wild {
            let name = &segment[1..];
            if name.is_empty() || name.contains(':') || name.contains('*') {
                return Err(Error::Registration(format!(
                    "router: invalid wildcard segment '{}' in path '{}'",
                    segment, path
                )));
            }
            if segment.starts_with('*') && i != segments.len() - 1 {
                return Err(Error::Registration(format!(
                    "router: catch-all routes are only allowed at the end of the path '{}'",
                    path
                )));
            }
        } else if segment.contains(':') || segment.contains('*') {
            return Err(Error::Registration(format!(
                "router: invalid wildcard segment '{}' in path '{}'",
                segment, path
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn tree(patterns: &[(&str, &str)]) -> Tree {
        let mut tree = Tree::new();
        for (path, name) in patterns {
            tree.insert(path, name).expect(path);
        }
        tree
    }

    #[test]
    fn test_static_match() {
        let tree = tree(&[("/", "index"), ("/login", "login"), ("/logout", "logout")]);

        assert_eq!(tree.find("/").name, Some("index"));
        assert_eq!(tree.find("/login").name, Some("login"));
        assert_eq!(tree.find("/logout").name, Some("logout"));
        assert_eq!(tree.find("/missing").name, None);
        assert!(!tree.find("/missing").rts);
    }

    #[test]
    fn test_param_match() {
        let tree = tree(&[
            ("/hotels/:id/cancel", "cancel_booking"),
            ("/hotels/:id/booking", "book_hotels"),
            ("/hotels", "list_hotels"),
        ]);

        let found = tree.find("/hotels/12345/cancel");
        assert_eq!(found.name, Some("cancel_booking"));
        assert_eq!(found.params.get("id"), "12345");
        assert_eq!(found.params.len(), 1);
        assert!(!found.rts);

        let found = tree.find("/hotels/12345/booking");
        assert_eq!(found.name, Some("book_hotels"));
        assert_eq!(found.params.get("id"), "12345");

        // a parameter never matches an empty segment
        assert_eq!(tree.find("/hotels//cancel").name, None);
    }

    #[test]
    fn test_params_in_path_order() {
        let tree = tree(&[("/info/:user/project/:project", "project")]);

        let found = tree.find("/info/lev/project/switchyard");
        assert_eq!(found.name, Some("project"));
        let keys = found
            .params
            .iter()
            .map(|p| p.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["user", "project"]);
        assert_eq!(found.params.get("user"), "lev");
        assert_eq!(found.params.get("project"), "switchyard");
    }

    #[test]
    fn test_catch_all_keeps_leading_slash() {
        let tree = tree(&[("/static/*filepath", "public")]);

        let found = tree.find("/static/img/logo.png");
        assert_eq!(found.name, Some("public"));
        assert_eq!(found.params.get("filepath"), "/img/logo.png");

        // the catch-all also matches a bare trailing slash
        let found = tree.find("/static/");
        assert_eq!(found.name, Some("public"));
        assert_eq!(found.params.get("filepath"), "/");

        // without the slash the canonical form is one redirect away
        let found = tree.find("/static");
        assert_eq!(found.name, None);
        assert!(found.rts);

        // a sibling prefix is not the mount
        assert_eq!(tree.find("/staticfoo").name, None);
    }

    #[test]
    fn test_static_beats_param_beats_catch_all() {
        let tree = tree(&[
            ("/users/special", "special"),
            ("/users/:id", "by_id"),
            ("/users/*rest", "rest"),
        ]);

        assert_eq!(tree.find("/users/special").name, Some("special"));

        let found = tree.find("/users/123");
        assert_eq!(found.name, Some("by_id"));
        assert_eq!(found.params.get("id"), "123");

        let found = tree.find("/users/123/posts");
        assert_eq!(found.name, Some("rest"));
        assert_eq!(found.params.get("rest"), "/123/posts");
    }

    #[test]
    fn test_static_falls_back_to_param() {
        let tree = tree(&[("/user/new", "new_user"), ("/user/:id", "by_id")]);

        assert_eq!(tree.find("/user/new").name, Some("new_user"));

        // shares the "n" edge with /user/new but diverges after it
        let found = tree.find("/user/nick");
        assert_eq!(found.name, Some("by_id"));
        assert_eq!(found.params.get("id"), "nick");
    }

    #[test]
    fn test_prefix_split() {
        let tree = tree(&[
            ("/hotels/near", "near"),
            ("/hotels/new", "new"),
            ("/hotels", "hotels"),
        ]);

        assert_eq!(tree.find("/hotels/near").name, Some("near"));
        assert_eq!(tree.find("/hotels/new").name, Some("new"));
        assert_eq!(tree.find("/hotels").name, Some("hotels"));
        assert_eq!(tree.find("/hotels/ne").name, None);
    }

    #[test]
    fn test_redirect_trailing_slash() {
        let tree = tree(&[("/hotels/:id/cancel", "cancel_booking"), ("/about/", "about")]);

        // extra trailing slash
        let found = tree.find("/hotels/12345/cancel/");
        assert_eq!(found.name, None);
        assert!(found.rts);
        assert!(found.params.is_empty());

        // missing trailing slash
        let found = tree.find("/about");
        assert_eq!(found.name, None);
        assert!(found.rts);

        assert_eq!(tree.find("/about/").name, Some("about"));
    }

    #[test]
    fn test_match_wins_over_redirect() {
        let tree = tree(&[("/a/:id/", "with_slash"), ("/a/*all", "catch")]);

        // /a/5 matches the catch-all even though /a/5/ would match too
        let found = tree.find("/a/5");
        assert_eq!(found.name, Some("catch"));
        assert!(!found.rts);
    }

    #[test]
    fn test_duplicate_route() {
        let mut tree = Tree::new();
        tree.insert("/", "index").unwrap();

        let err = tree.insert("/", "index2").unwrap_err();
        assert_eq!(err.to_string(), "router: route already exists");
    }

    #[test]
    fn test_param_name_conflict() {
        let mut tree = Tree::new();
        tree.insert("/hotels/:id/booking", "book_hotels").unwrap();

        let err = tree.insert("/hotels/:user/test", "error_route").unwrap_err();
        assert_eq!(
            err.to_string(),
            "router: parameter based edge already exists[/hotels/:id...] new[/hotels/:user...]"
        );

        // same name extends the existing edge instead
        tree.insert("/hotels/:id/cancel", "cancel_booking").unwrap();
        assert_eq!(tree.find("/hotels/1/cancel").name, Some("cancel_booking"));
    }

    #[test]
    fn test_catch_all_name_conflict() {
        let mut tree = Tree::new();
        tree.insert("/static/*filepath", "public").unwrap();

        let err = tree.insert("/static/*file", "other").unwrap_err();
        assert_eq!(
            err.to_string(),
            "router: catch-all based edge already exists[/static/*filepath...] new[/static/*file...]"
        );
    }

    #[test]
    fn test_catch_all_must_be_last() {
        let mut tree = Tree::new();

        let err = tree.insert("/files/*path/preview", "preview").unwrap_err();
        assert_eq!(
            err.to_string(),
            "router: catch-all routes are only allowed at the end of the path '/files/*path/preview'"
        );
    }

    #[test]
    fn test_invalid_wildcard_segments() {
        let mut tree = Tree::new();

        assert!(tree.insert("/a/:", "empty").is_err());
        assert!(tree.insert("/a/:x:y", "double").is_err());
        assert!(tree.insert("/a/b*c", "inline").is_err());
        assert!(tree.insert("relative", "no_slash").is_err());
    }

    #[test]
    fn test_count_params() {
        assert_eq!(count_params("/"), 0);
        assert_eq!(count_params("/hotels"), 0);
        assert_eq!(count_params("/hotels/:id/booking"), 1);
        assert_eq!(count_params("/info/:user/project/:project"), 2);
        assert_eq!(count_params("/static/*filepath"), 1);
    }

    #[test]
    fn test_priority_reorders_children() {
        let mut tree = Tree::new();
        tree.insert("/a", "a").unwrap();
        tree.insert("/b/one", "b1").unwrap();
        tree.insert("/b/two", "b2").unwrap();
        tree.insert("/b/three", "b3").unwrap();

        // busier subtrees are visited first; all lookups still resolve
        assert_eq!(tree.find("/a").name, Some("a"));
        assert_eq!(tree.find("/b/one").name, Some("b1"));
        assert_eq!(tree.find("/b/two").name, Some("b2"));
        assert_eq!(tree.find("/b/three").name, Some("b3"));
    }
}
