//! Route records: one immutable descriptor per registered route.

use std::collections::HashMap;

use crate::cors::Cors;
use crate::method::Method;

/// A single route.
///
/// Routes are built by the configuration loader and never change after
/// registration. Static-asset routes carry either a directory (served
/// under a `*filepath` catch-all) or a single file, never both.
#[derive(Debug, Clone)]
pub struct Route {
    /// Unique within its domain; used for reverse lookup.
    pub name: String,
    /// Canonical pattern beginning with `/`.
    pub path: String,
    pub method: Method,
    /// Controller type, or WebSocket handler type for `WS` routes.
    pub target: String,
    pub action: String,
    /// Name of the enclosing route group, or empty.
    pub parent_name: String,
    /// Authentication scheme name, `anonymous` when unset.
    pub auth: String,
    /// Request body limit in bytes; 0 means inherit the process default.
    pub max_body_size: i64,
    pub anti_csrf_check: bool,
    pub cors: Option<Cors>,
    /// Parameter name → constraint expression, handed as-is to an
    /// external validator.
    pub constraints: HashMap<String, String>,

    // static route fields, in addition to the above
    pub is_static: bool,
    pub dir: String,
    pub file: String,
    pub list_dir: bool,
}

impl Default for Route {
    fn default() -> Self {
        Self {
            name: String::new(),
            path: String::new(),
            method: Method::Get,
            target: String::new(),
            action: String::new(),
            parent_name: String::new(),
            auth: String::new(),
            max_body_size: 0,
            anti_csrf_check: true,
            cors: None,
            constraints: HashMap::new(),
            is_static: false,
            dir: String::new(),
            file: String::new(),
            list_dir: false,
        }
    }
}

impl Route {
    /// True if this route serves a directory tree.
    pub fn is_dir(&self) -> bool {
        !self.dir.is_empty() && self.file.is_empty()
    }

    /// True if this route serves a single file.
    pub fn is_file(&self) -> bool {
        !self.file.is_empty()
    }

    /// Constraint expression for the given path parameter, if any.
    pub fn constraint(&self, name: &str) -> Option<&str> {
        self.constraints.get(name).map(|c| c.as_str())
    }
}

/// Parse a size-unit string (`"10kb"`, `"2.5mb"`, `"1gb"`, bare bytes)
/// into bytes.
pub(crate) fn parse_size(value: &str) -> Result<i64, ()> {
    let value = value.trim().to_lowercase();

    let (number, multiplier) = if let Some(number) = value.strip_suffix("kb") {
        (number, 1024.0)
    } else if let Some(number) = value.strip_suffix("mb") {
        (number, 1024.0 * 1024.0)
    } else if let Some(number) = value.strip_suffix("gb") {
        (number, 1024.0 * 1024.0 * 1024.0)
    } else if let Some(number) = value.strip_suffix("tb") {
        (number, 1024.0 * 1024.0 * 1024.0 * 1024.0)
    } else {
        (value.as_str(), 1.0)
    };

    let number = number.trim().parse::<f64>().map_err(|_| ())?;
    if number < 0.0 {
        return Err(());
    }

    Ok((number * multiplier) as i64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dir_file_flags() {
        let dir_route = Route {
            dir: "/public".to_string(),
            ..Default::default()
        };
        assert!(dir_route.is_dir());
        assert!(!dir_route.is_file());

        let file_route = Route {
            dir: "assets".to_string(),
            file: "img/favicon.png".to_string(),
            ..Default::default()
        };
        assert!(!file_route.is_dir());
        assert!(file_route.is_file());
    }

    #[test]
    fn test_constraint() {
        let mut constraints = HashMap::new();
        constraints.insert("id".to_string(), "gt=1,lt=10".to_string());

        let route = Route {
            constraints,
            ..Default::default()
        };

        assert_eq!(route.constraint("id"), Some("gt=1,lt=10"));
        assert_eq!(route.constraint("color"), None);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("0kb"), Ok(0));
        assert_eq!(parse_size("10kb"), Ok(10 * 1024));
        assert_eq!(parse_size("5mb"), Ok(5 * 1024 * 1024));
        assert_eq!(parse_size("1gb"), Ok(1024 * 1024 * 1024));
        assert_eq!(parse_size("2.5mb"), Ok((2.5 * 1024.0 * 1024.0) as i64));
        assert_eq!(parse_size("512"), Ok(512));
        assert!(parse_size("ten megabytes").is_err());
        assert!(parse_size("-1kb").is_err());
    }
}
