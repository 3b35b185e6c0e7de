//! Heuristic classification of the configured base URL.
//!
//! The remote provider fetches images by URL, so a base URL that only
//! resolves on this machine (loopback, `localhost`, the Android
//! emulator host alias) can never work as a reference. This is a pure
//! string/host check; no network probe is ever made.

use std::net::IpAddr;

/// Android emulator alias for the development host machine.
const EMULATOR_HOST_ALIAS: &str = "10.0.2.2";

/// Whether `base_url` looks fetchable from the public internet.
///
/// Returns false for loopback addresses, the literal hostname
/// `localhost`, and `10.0.2.2`; everything else is assumed routable.
/// A URL that does not parse at all is also non-routable, since
/// nothing could fetch from it.
pub fn is_publicly_routable(base_url: &str) -> bool {
    let parsed = match reqwest::Url::parse(base_url.trim()) {
        Ok(url) => url,
        Err(_) => return false,
    };

    let host = match parsed.host_str() {
        Some(host) => host.to_ascii_lowercase(),
        None => return false,
    };

    if host == "localhost" || host == EMULATOR_HOST_ALIAS {
        return false;
    }

    // host_str keeps the brackets around IPv6 hosts; IpAddr wants them
    // gone
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(addr) = bare.parse::<IpAddr>() {
        if addr.is_loopback() {
            return false;
        }
    }

    true
}
