//! Joining request paths onto a configured base URL

use url::Url;

use crate::error::{HttpError, HttpResult};

/// Resolve `path` against an optional base URL.
///
/// The join is plain concatenation, so exactly one side must carry the `/`
/// separator: a base ending in `/` takes a relative path (`users/1`), a base
/// without one takes an absolute path (`/users/1`). An empty path resolves
/// to the base URL itself.
pub fn resolve_url(base_url: Option<&str>, path: &str) -> HttpResult<String> {
    let Some(base) = base_url else {
        return Ok(path.to_string());
    };

    if path.is_empty() {
        return Ok(base.to_string());
    }

    let base_has_slash = base.ends_with('/');
    let path_has_slash = path.starts_with('/');
    if base_has_slash == path_has_slash {
        return Err(HttpError::UrlMismatch {
            base_url: base.to_string(),
            path: path.to_string(),
        });
    }

    Ok(format!("{}{}", base, path))
}

/// Whether two URLs share scheme, host and port
pub(crate) fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_base_url_passes_through() {
        assert_eq!(
            resolve_url(None, "https://api.example.com/users").unwrap(),
            "https://api.example.com/users"
        );
    }

    #[test]
    fn test_consistent_slashes_concatenate() {
        assert_eq!(
            resolve_url(Some("https://api.example.com"), "/users/1").unwrap(),
            "https://api.example.com/users/1"
        );
        assert_eq!(
            resolve_url(Some("https://api.example.com/v1/"), "users/1").unwrap(),
            "https://api.example.com/v1/users/1"
        );
        assert_eq!(
            resolve_url(Some("http://127.0.0.1:8080"), "/").unwrap(),
            "http://127.0.0.1:8080/"
        );
    }

    #[test]
    fn test_double_slash_is_rejected() {
        let err = resolve_url(Some("https://api.example.com/"), "/users").unwrap_err();
        assert!(matches!(err, HttpError::UrlMismatch { .. }));
    }

    #[test]
    fn test_missing_slash_is_rejected() {
        let err = resolve_url(Some("https://api.example.com"), "users").unwrap_err();
        match err {
            HttpError::UrlMismatch { base_url, path } => {
                assert_eq!(base_url, "https://api.example.com");
                assert_eq!(path, "users");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_path_resolves_to_base() {
        assert_eq!(
            resolve_url(Some("https://api.example.com/"), "").unwrap(),
            "https://api.example.com/"
        );
    }

    #[test]
    fn test_same_origin() {
        let base = Url::parse("http://localhost:3000/api/").unwrap();
        assert!(same_origin(&base, &Url::parse("http://localhost:3000/other").unwrap()));
        assert!(!same_origin(&base, &Url::parse("http://localhost:3001/api/").unwrap()));
        assert!(!same_origin(&base, &Url::parse("https://localhost:3000/api/").unwrap()));
    }
}
