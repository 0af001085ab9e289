use percent_encoding::percent_decode_str;

/// Cookie the backend stores its CSRF token in.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header mutating requests echo the token back in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Extract the CSRF token from a `name=value; name=value` cookie string.
pub fn token_from_cookie_header(header: &str) -> Option<String> {
    cookie_value(header, CSRF_COOKIE)
}

/// Percent-decoded value of the first cookie called `name`.
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .map(|s| s.trim())
        .find_map(|cookie| {
            let value = cookie.strip_prefix(name)?.strip_prefix('=')?;
            Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
        })
}
