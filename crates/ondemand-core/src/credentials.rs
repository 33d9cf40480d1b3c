//! Bearer token selection for hosting services.
//!
//! An explicit token always wins. Otherwise the URL host picks the
//! environment variable to consult. Tokens are never logged.

/// Hosting service recognised by URL host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingService {
    CivitAi,
    HuggingFace,
}

impl HostingService {
    pub const CIVITAI_HOST: &'static str = "civitai.com";
    pub const HUGGINGFACE_HOST: &'static str = "huggingface.co";

    /// Service serving `url`, matching the host exactly or as a subdomain.
    pub fn from_url(url: &str) -> Option<Self> {
        let parsed = url::Url::parse(url).ok()?;
        let host = parsed.host_str()?.to_ascii_lowercase();
        if host_matches(&host, Self::CIVITAI_HOST) {
            Some(HostingService::CivitAi)
        } else if host_matches(&host, Self::HUGGINGFACE_HOST) {
            Some(HostingService::HuggingFace)
        } else {
            None
        }
    }

    /// Environment variable holding the fallback token for this service.
    pub fn token_env_var(self) -> &'static str {
        match self {
            HostingService::CivitAi => "CIVITAI_TOKEN",
            HostingService::HuggingFace => "HUGGINGFACE_TOKEN",
        }
    }
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Picks the token for `url`: `explicit` if non-empty, else the service's env var
/// looked up through `env`. Returns `None` for public hosts without an explicit token.
pub fn select_token<F>(explicit: Option<&str>, url: &str, env: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }
    let service = HostingService::from_url(url)?;
    env(service.token_env_var())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// `Authorization` header value for a token.
pub fn bearer_header(token: &str) -> String {
    format!("Bearer {}", token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn explicit_beats_environment() {
        let env = env_with(&[("CIVITAI_TOKEN", "from-env")]);
        let t = select_token(
            Some("explicit"),
            "https://civitai.com/api/download/models/1",
            env,
        );
        assert_eq!(t.as_deref(), Some("explicit"));
    }

    #[test]
    fn civitai_env_fallback() {
        let env = env_with(&[("CIVITAI_TOKEN", "civ"), ("HUGGINGFACE_TOKEN", "hf")]);
        let t = select_token(None, "https://civitai.com/api/download/models/1", env);
        assert_eq!(t.as_deref(), Some("civ"));
    }

    #[test]
    fn huggingface_env_fallback() {
        let env = env_with(&[("CIVITAI_TOKEN", "civ"), ("HUGGINGFACE_TOKEN", "hf")]);
        let t = select_token(None, "https://huggingface.co/a/b/resolve/main/c.safetensors", env);
        assert_eq!(t.as_deref(), Some("hf"));
    }

    #[test]
    fn empty_explicit_falls_through() {
        let env = env_with(&[("HUGGINGFACE_TOKEN", "hf")]);
        let t = select_token(Some("  "), "https://huggingface.co/x", env);
        assert_eq!(t.as_deref(), Some("hf"));
    }

    #[test]
    fn public_host_gets_no_token() {
        let env = env_with(&[("CIVITAI_TOKEN", "civ"), ("HUGGINGFACE_TOKEN", "hf")]);
        assert_eq!(select_token(None, "https://example.com/model.bin", env), None);
    }

    #[test]
    fn lookalike_hosts_do_not_match() {
        assert_eq!(HostingService::from_url("https://notcivitai.com/x"), None);
        assert_eq!(HostingService::from_url("https://civitai.com.evil.net/x"), None);
        assert_eq!(
            HostingService::from_url("https://www.civitai.com/x"),
            Some(HostingService::CivitAi)
        );
        assert_eq!(HostingService::from_url("not_valid_url"), None);
    }

    #[test]
    fn bearer_format() {
        assert_eq!(bearer_header("abc"), "Bearer abc");
    }
}
