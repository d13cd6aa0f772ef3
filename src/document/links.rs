//! URL policy for links and images.

use url::Url;

use crate::editor::EditError;

/// Where a URL is going to be used. Images accept fewer schemes than links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Link,
    Image,
}

impl UrlKind {
    const fn allowed_schemes(self) -> &'static [&'static str] {
        match self {
            Self::Link => &["http", "https", "mailto"],
            Self::Image => &["http", "https"],
        }
    }
}

/// Validate a user- or markup-supplied URL.
///
/// Returns the trimmed input (not the normalized form, so stored markup
/// survives a parse/serialize cycle unchanged).
///
/// # Errors
///
/// Returns [`EditError::EmptyUrl`] for blank input, [`EditError::InvalidUrl`]
/// when the text does not parse as an absolute URL, and
/// [`EditError::DisallowedScheme`] for schemes outside the allow-list.
pub fn validate_url(raw: &str, kind: UrlKind) -> Result<String, EditError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EditError::EmptyUrl);
    }
    let parsed = Url::parse(trimmed).map_err(|err| EditError::InvalidUrl {
        url: trimmed.to_string(),
        reason: err.to_string(),
    })?;
    let scheme = parsed.scheme();
    if !kind.allowed_schemes().contains(&scheme) {
        return Err(EditError::DisallowedScheme {
            scheme: scheme.to_string(),
        });
    }
    if matches!(scheme, "http" | "https") && parsed.host_str().is_none_or(str::is_empty) {
        return Err(EditError::InvalidUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https_link() {
        assert_eq!(
            validate_url("  https://example.com/a?b=1 ", UrlKind::Link).unwrap(),
            "https://example.com/a?b=1"
        );
    }

    #[test]
    fn test_accepts_mailto_link_but_not_image() {
        assert!(validate_url("mailto:me@example.com", UrlKind::Link).is_ok());
        assert!(matches!(
            validate_url("mailto:me@example.com", UrlKind::Image),
            Err(EditError::DisallowedScheme { .. })
        ));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_url("   ", UrlKind::Link), Err(EditError::EmptyUrl));
    }

    #[test]
    fn test_rejects_relative() {
        assert!(matches!(
            validate_url("example.com", UrlKind::Link),
            Err(EditError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_rejects_javascript_scheme() {
        assert_eq!(
            validate_url("javascript:alert(1)", UrlKind::Link),
            Err(EditError::DisallowedScheme {
                scheme: "javascript".to_string()
            })
        );
    }

    #[test]
    fn test_rejects_data_image() {
        assert!(matches!(
            validate_url("data:image/png;base64,AAAA", UrlKind::Image),
            Err(EditError::DisallowedScheme { .. })
        ));
    }
}
