//! Registry connectivity probe

use crate::runtime::Toolchain;
use colored::Colorize;
use std::time::Duration;
use tokio::time::timeout;

/// Upper bound for a single name lookup
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Decide whether installs can reach the network
///
/// npm handles offline mode itself, so only yarn pays for the lookup. A failed or
/// timed-out lookup means offline; it is never an error. When the registry cannot be
/// resolved but an HTTPS proxy is configured, the proxy host is tried instead.
pub async fn check_online<T: Toolchain>(toolchain: &T, use_yarn: bool, registry_host: &str) -> bool {
    if !use_yarn {
        return true;
    }

    if resolves(toolchain, registry_host).await {
        return true;
    }

    match proxy_host() {
        Some(proxy) => resolves(toolchain, &proxy).await,
        None => false,
    }
}

async fn resolves<T: Toolchain>(toolchain: &T, host: &str) -> bool {
    match timeout(PROBE_TIMEOUT, toolchain.lookup_host(host)).await {
        Ok(found) => found,
        Err(_) => {
            eprintln!(
                "{} Looking up {} timed out after {} seconds.",
                "Warning:".yellow(),
                host,
                PROBE_TIMEOUT.as_secs()
            );
            false
        }
    }
}

/// Host of the configured HTTPS proxy, if any
fn proxy_host() -> Option<String> {
    ["https_proxy", "HTTPS_PROXY"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .and_then(|value| host_of(&value))
}

fn host_of(proxy: &str) -> Option<String> {
    let proxy = proxy.trim();
    if proxy.is_empty() {
        return None;
    }
    let with_scheme = if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    };
    url::Url::parse(&with_scheme)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ExternalCommand;
    use semver::Version;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DnsOnly {
        reachable: bool,
        hang: bool,
        lookups: AtomicUsize,
    }

    impl DnsOnly {
        fn new(reachable: bool) -> Self {
            Self {
                reachable,
                hang: false,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    impl Toolchain for DnsOnly {
        fn has_yarn(&self) -> bool {
            true
        }

        fn runtime_version(&self) -> Option<Version> {
            None
        }

        async fn lookup_host(&self, _host: &str) -> bool {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                std::future::pending::<()>().await;
            }
            self.reachable
        }

        async fn run(&self, _command: &ExternalCommand, _cwd: &Path) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_npm_skips_probe() {
        let toolchain = DnsOnly::new(false);
        assert!(check_online(&toolchain, false, "registry.yarnpkg.com").await);
        assert_eq!(toolchain.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_yarn_online() {
        let toolchain = DnsOnly::new(true);
        assert!(check_online(&toolchain, true, "registry.yarnpkg.com").await);
        assert_eq!(toolchain.lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_lookup_is_offline() {
        let toolchain = DnsOnly::new(false);
        assert!(!resolves(&toolchain, "registry.yarnpkg.com").await);
    }

    #[tokio::test]
    async fn test_hanging_lookup_is_offline() {
        let toolchain = DnsOnly {
            reachable: true,
            hang: true,
            lookups: AtomicUsize::new(0),
        };
        assert!(!resolves(&toolchain, "registry.yarnpkg.com").await);
    }

    #[test]
    fn test_proxy_host_parsing() {
        assert_eq!(
            host_of("http://proxy.corp:3128"),
            Some("proxy.corp".to_string())
        );
        assert_eq!(host_of("proxy.corp:8080"), Some("proxy.corp".to_string()));
        assert_eq!(host_of("   "), None);
    }
}
