use cookie::Cookie;
use secrecy::{ExposeSecret, Secret};

/// Anti-forgery token echoed back to the backend in the `X-CSRFToken` header.
pub struct CsrfToken(Secret<String>);

impl CsrfToken {
    /// Looks `name` up in a `Cookie` header style string (`a=1; b=2`).
    ///
    /// The first entry with a matching name wins and its value is percent-decoded.
    /// Entries that are not `key=value` pairs, or that do not decode to UTF-8, are
    /// skipped.
    pub fn from_cookie_header(header: &str, name: &str) -> Option<Self> {
        Cookie::split_parse_encoded(header)
            .filter_map(Result::ok)
            .find(|cookie| cookie.name() == name)
            .map(|cookie| Self(Secret::new(cookie.value().to_owned())))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CsrfToken([REDACTED])")
    }
}
