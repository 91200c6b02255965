//! Credential scrubbing for process log lines.
//!
//! Summary tools receive database passwords on their command line. Anything
//! echoed to the terminal log goes through [`scrub_credentials`] first. The
//! archive itself is never scrubbed.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex patterns for detecting credentials in command lines and messages
    static ref CREDENTIAL_PATTERNS: Vec<(Regex, &'static str)> = vec![
        // --password=..., password: ..., --token=...
        (Regex::new(r#"(?i)((?:--?)?(?:password|passwd|pwd|token))\s*[:=]\s*([^\s"']+)"#).unwrap(),
         "$1=<REDACTED>"),

        // Bearer tokens in headers
        (Regex::new(r"(?i)(authorization:\s*bearer\s+)([A-Za-z0-9\-._~+/]+=*)").unwrap(),
         "$1<REDACTED_TOKEN>"),

        // Database connection strings
        (Regex::new(r"(?i)(mysql|postgres|postgresql|mongodb(?:\+srv)?)://([^:/@\s]+):([^@\s]+)@").unwrap(),
         "$1://<REDACTED_USER>:<REDACTED_PASS>@"),
    ];
}

/// Replace credentials in `input` with placeholders.
///
/// # Example
///
/// ```
/// use k8s_debug_collector::security::scrub_credentials;
///
/// let line = "pt-mysql-summary --host=127.0.0.1 --user=root --password=s3cret";
/// assert_eq!(
///     scrub_credentials(line),
///     "pt-mysql-summary --host=127.0.0.1 --user=root --password=<REDACTED>"
/// );
/// ```
pub fn scrub_credentials(input: &str) -> String {
    let mut result = input.to_string();

    for (pattern, replacement) in CREDENTIAL_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).to_string();
    }

    result
}
