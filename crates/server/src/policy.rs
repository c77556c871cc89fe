//! Which routes need a bearer token.
//!
//! [`ROUTE_ACCESS`] is the only place protection is decided. The auth
//! middleware looks every request up here; anything not listed is treated
//! as [`Access::Bearer`]. Requests that match no route are looked up under
//! [`FALLBACK`].

use axum::http::Method;

/// Access requirement of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Served without an `Authorization` header.
    Public,
    /// Requires `Authorization: Bearer <token>` with a valid token.
    Bearer,
}

/// One row of the access table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteAccess {
    pub method: &'static str,
    pub path: &'static str,
    pub access: Access,
}

impl RouteAccess {
    const fn new(method: &'static str, path: &'static str, access: Access) -> Self {
        Self {
            method,
            path,
            access,
        }
    }
}

/// Path and method key for requests that match no route.
pub const FALLBACK: &str = "*";

/// Access table for every API route.
pub const ROUTE_ACCESS: &[RouteAccess] = &[
    RouteAccess::new("GET", "/token", Access::Public),
    RouteAccess::new("GET", "/data1", Access::Public),
    RouteAccess::new("POST", "/data", Access::Bearer),
    RouteAccess::new("DELETE", "/data", Access::Bearer),
    RouteAccess::new("PUT", "/data", Access::Bearer),
    // the docs redirect for unmatched paths
    RouteAccess::new(FALLBACK, FALLBACK, Access::Bearer),
];

/// Look up the access requirement for `method` on `path`.
pub fn access_for(method: &Method, path: &str) -> Access {
    ROUTE_ACCESS
        .iter()
        .find(|route| {
            (route.method == FALLBACK || route.method == method.as_str()) && route.path == path
        })
        .map(|route| route.access)
        .unwrap_or(Access::Bearer)
}
