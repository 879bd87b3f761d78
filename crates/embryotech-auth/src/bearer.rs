use crate::error::TokenError;

/// Extracts the token from an `Authorization` header value.
///
/// The value must be exactly two whitespace-separated parts: the scheme
/// `Bearer` (any case) and a non-empty token.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::MissingHeader)?;

    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(TokenError::MalformedHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_header() {
        assert_eq!(parse_bearer(Some("Bearer abc.def.ghi")), Ok("abc.def.ghi"));
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        assert_eq!(parse_bearer(Some("bearer tok")), Ok("tok"));
        assert_eq!(parse_bearer(Some("BEARER tok")), Ok("tok"));
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(parse_bearer(None), Err(TokenError::MissingHeader));
    }

    #[test]
    fn test_malformed_headers() {
        for value in [
            "",
            "   ",
            "Bearer",
            "Bearer ",
            "abc.def.ghi",
            "Basic dXNlcjpwYXNz",
            "Token abc",
            "Bearer abc extra",
        ] {
            assert_eq!(
                parse_bearer(Some(value)),
                Err(TokenError::MalformedHeader),
                "header {value:?} should be rejected"
            );
        }
    }
}
