//! Child-process environment sanitizer.
//!
//! The legacy binary must use the proxy and CA settings this tool has
//! already negotiated, not whatever proxy configuration the parent
//! process happened to inherit. [`sanitize`] is a pure function from
//! the inherited `KEY=VALUE` list to the list the child is spawned
//! with; it never reads or mutates the real process environment.

use thiserror::Error;

/// Environment key carrying the integration name in the child process.
pub const INTEGRATION_NAME_KEY: &str = "SNYK_INTEGRATION_NAME";

/// Environment key carrying the integration version in the child process.
pub const INTEGRATION_VERSION_KEY: &str = "SNYK_INTEGRATION_VERSION";

/// Canonical proxy keys injected into every sanitized environment.
pub const HTTP_PROXY_KEY: &str = "HTTP_PROXY";
pub const HTTPS_PROXY_KEY: &str = "HTTPS_PROXY";
pub const EXTRA_CA_CERTS_KEY: &str = "NODE_EXTRA_CA_CERTS";

/// Proxy-control keys that are never inherited from the parent.
///
/// Comparison is case-insensitive, which covers the lower-case and
/// mixed-case spellings package managers use.
pub const RESERVED_PROXY_KEYS: &[&str] = &[
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "NO_PROXY",
    "ALL_PROXY",
    "NPM_CONFIG_PROXY",
    "NPM_CONFIG_HTTP_PROXY",
    "NPM_CONFIG_HTTPS_PROXY",
    "NPM_CONFIG_NO_PROXY",
    "NODE_EXTRA_CA_CERTS",
];

/// Non-fatal signal that the caller set only half of the integration
/// identity, so the sanitizer left the environment untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "only one of SNYK_INTEGRATION_NAME and SNYK_INTEGRATION_VERSION is set by the caller; \
     child environment left unchanged"
)]
pub struct EnvironmentWarning;

/// The key portion of a `KEY=VALUE` assignment (values may contain `=`).
fn key_of(entry: &str) -> &str {
    entry.split_once('=').map_or(entry, |(k, _)| k)
}

fn is_reserved_proxy_key(key: &str) -> bool {
    RESERVED_PROXY_KEYS
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(key))
}

/// Builds the child-process environment from the inherited one.
///
/// Drops every inherited proxy-control assignment and appends the
/// canonical `HTTP_PROXY`/`HTTPS_PROXY`/`NODE_EXTRA_CA_CERTS` keys.
/// The integration identity is appended only when the caller set
/// neither key; a complete caller-supplied identity is preserved
/// as-is. A partial identity (one key without its counterpart) is not
/// repaired: the inherited list is returned entirely unchanged
/// together with an [`EnvironmentWarning`], and the caller decides
/// whether that is worth reporting.
///
/// The order of originally-present keys is preserved and the output
/// never contains duplicate keys.
pub fn sanitize(
    inherited: &[String],
    integration_name: &str,
    integration_version: &str,
    proxy_addr: &str,
    ca_cert_path: &str,
) -> (Vec<String>, Option<EnvironmentWarning>) {
    let name_preset = inherited
        .iter()
        .any(|entry| key_of(entry).eq_ignore_ascii_case(INTEGRATION_NAME_KEY));
    let version_preset = inherited
        .iter()
        .any(|entry| key_of(entry).eq_ignore_ascii_case(INTEGRATION_VERSION_KEY));

    if name_preset != version_preset {
        return (inherited.to_vec(), Some(EnvironmentWarning));
    }

    let mut result: Vec<String> = inherited
        .iter()
        .filter(|entry| !is_reserved_proxy_key(key_of(entry)))
        .cloned()
        .collect();

    result.push(format!("{}={}", HTTP_PROXY_KEY, proxy_addr));
    result.push(format!("{}={}", HTTPS_PROXY_KEY, proxy_addr));
    result.push(format!("{}={}", EXTRA_CA_CERTS_KEY, ca_cert_path));
    if !name_preset {
        result.push(format!("{}={}", INTEGRATION_NAME_KEY, integration_name));
        result.push(format!("{}={}", INTEGRATION_VERSION_KEY, integration_version));
    }

    (result, None)
}
