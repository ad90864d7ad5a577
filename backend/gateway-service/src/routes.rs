//! Path-prefix routing table
//!
//! Format of `GATEWAY_ROUTES`: comma-separated `prefix=url[;public]` entries.
//! The longest matching prefix wins; a prefix matches the path itself and
//! anything below it (`/member` matches `/member` and `/member/1`, not `/members`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: String,
    pub upstream: String,
    /// Public routes skip token checks
    pub public: bool,
}

impl Route {
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix == "/",
            None => false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("route entry '{0}' is not of the form prefix=url[;public]")]
    Syntax(String),

    #[error("route prefix '{0}' must start with '/'")]
    Prefix(String),

    #[error("route upstream '{0}' must be an http(s) URL")]
    Upstream(String),

    #[error("unknown route flag '{0}'")]
    Flag(String),

    #[error("no routes configured")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    // Sorted by prefix length, longest first
    routes: Vec<Route>,
}

const DEFAULT_ROUTES: &str = "/auth=http://member-service:8081;public,\
/member=http://member-service:8081,\
/diet=http://dietplan-service:8082,\
/plan=http://workoutplan-service:8083,\
/feed=http://feed-service:8084,\
/qna=http://qna-service:8085,\
/notification=http://notification-service:8086,\
/report=http://report-service:8087,\
/stats=http://stats-service:8088";

impl RouteTable {
    pub fn new(mut routes: Vec<Route>) -> Result<Self, RouteError> {
        if routes.is_empty() {
            return Err(RouteError::Empty);
        }
        routes.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        Ok(Self { routes })
    }

    pub fn parse(spec: &str) -> Result<Self, RouteError> {
        let routes = spec
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(routes)
    }

    pub fn resolve(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        let routes = DEFAULT_ROUTES
            .split(',')
            .filter_map(|entry| parse_entry(entry).ok())
            .collect::<Vec<_>>();
        let mut table = Self { routes };
        table
            .routes
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));
        table
    }
}

/// Whether `path` reaches the upstream exactly as routed here
///
/// The upstream URL parser resolves `.` and `..` segments (plain or
/// percent-encoded), treats `\` as `/` and drops tabs and newlines, so a path
/// containing any of them could match one route here and another upstream.
pub fn is_canonical_path(path: &str) -> bool {
    if !path.starts_with('/') || path.contains('\\') {
        return false;
    }
    if path.bytes().any(|b| b.is_ascii_control()) {
        return false;
    }

    path.split('/').all(|segment| {
        let segment = segment.to_ascii_lowercase().replace("%2e", ".");
        segment != "." && segment != ".."
    })
}

fn parse_entry(entry: &str) -> Result<Route, RouteError> {
    let (prefix, target) = entry
        .split_once('=')
        .ok_or_else(|| RouteError::Syntax(entry.to_string()))?;

    let mut parts = target.split(';').map(str::trim);
    let upstream = parts.next().unwrap_or_default();

    let mut public = false;
    for flag in parts {
        match flag {
            "public" => public = true,
            "" => {}
            other => return Err(RouteError::Flag(other.to_string())),
        }
    }

    let prefix = prefix.trim();
    if !prefix.starts_with('/') {
        return Err(RouteError::Prefix(prefix.to_string()));
    }
    if !(upstream.starts_with("http://") || upstream.starts_with("https://")) {
        return Err(RouteError::Upstream(upstream.to_string()));
    }

    let prefix = if prefix.len() > 1 {
        prefix.trim_end_matches('/')
    } else {
        prefix
    };

    Ok(Route {
        prefix: prefix.to_string(),
        upstream: upstream.trim_end_matches('/').to_string(),
        public,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = RouteTable::default();
        assert_eq!(table.routes().len(), 9);

        let auth = table.resolve("/auth/login").unwrap();
        assert!(auth.public);
        assert_eq!(auth.upstream, "http://member-service:8081");

        let member = table.resolve("/member").unwrap();
        assert!(!member.public);

        assert!(table.resolve("/unknown").is_none());
    }

    #[test]
    fn test_longest_prefix_wins() {
        let table = RouteTable::parse(
            "/api=http://general:80,/api/admin=http://admin:80,/api/admin/open=http://open:80;public",
        )
        .unwrap();

        assert_eq!(table.resolve("/api/users").unwrap().upstream, "http://general:80");
        assert_eq!(table.resolve("/api/admin/x").unwrap().upstream, "http://admin:80");
        let open = table.resolve("/api/admin/open/x").unwrap();
        assert_eq!(open.upstream, "http://open:80");
        assert!(open.public);
    }

    #[test]
    fn test_prefix_matches_segment_boundary() {
        let table = RouteTable::parse("/member=http://member:8081").unwrap();
        assert!(table.resolve("/member").is_some());
        assert!(table.resolve("/member/7").is_some());
        assert!(table.resolve("/members").is_none());
    }

    #[test]
    fn test_parse_normalizes_trailing_slashes() {
        let table = RouteTable::parse(" /diet/ = http://diet:8082/ ").unwrap();
        let route = table.resolve("/diet/today").unwrap();
        assert_eq!(route.prefix, "/diet");
        assert_eq!(route.upstream, "http://diet:8082");
    }

    #[test]
    fn test_canonical_paths() {
        assert!(is_canonical_path("/member"));
        assert!(is_canonical_path("/member/7"));
        assert!(is_canonical_path("/auth/login"));
        assert!(is_canonical_path("/feed/v1.2/file.json"));
        assert!(is_canonical_path("/diet/...")); // not a dot segment

        assert!(!is_canonical_path("/auth/../member"));
        assert!(!is_canonical_path("/auth/./login"));
        assert!(!is_canonical_path("/auth/.."));
        assert!(!is_canonical_path("/auth/%2e%2e/member"));
        assert!(!is_canonical_path("/auth/%2E./member"));
        assert!(!is_canonical_path("/auth/.%2E/member"));
        assert!(!is_canonical_path("/auth/%2e/login"));
        assert!(!is_canonical_path("/auth\\..\\member"));
        assert!(!is_canonical_path("/auth/.\t./member"));
        assert!(!is_canonical_path("member"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            RouteTable::parse("/diet"),
            Err(RouteError::Syntax("/diet".to_string()))
        );
        assert_eq!(
            RouteTable::parse("diet=http://diet"),
            Err(RouteError::Prefix("diet".to_string()))
        );
        assert_eq!(
            RouteTable::parse("/diet=diet:8082"),
            Err(RouteError::Upstream("diet:8082".to_string()))
        );
        assert_eq!(
            RouteTable::parse("/diet=http://diet;private"),
            Err(RouteError::Flag("private".to_string()))
        );
        assert_eq!(RouteTable::parse(" , "), Err(RouteError::Empty));
    }
}
