//! Endpoint URL rewriting once the tenant is known.

use std::collections::HashSet;
use url::Url;

use crate::error::{LoginError, LoginResult};

fn parse(value: &str) -> LoginResult<Url> {
    Url::parse(value).map_err(|source| LoginError::InvalidUrl {
        url: value.to_string(),
        source,
    })
}

fn search(url: &Url) -> Option<&str> {
    url.query().filter(|query| !query.is_empty())
}

/// Apply a configured endpoint override to a URL issued by the server.
///
/// When both carry a query, parameters of `original_url` that the override
/// lacks are appended to it. Otherwise the original query is appended to
/// the override verbatim.
pub fn resolve_idp_url_after_tenant_resolves(
    original_url: &str,
    overridden_url: &str,
) -> LoginResult<String> {
    let original = parse(original_url)?;
    let mut overridden = parse(overridden_url)?;

    if search(&original).is_some() && search(&overridden).is_some() {
        let mut present: HashSet<String> = overridden
            .query_pairs()
            .map(|(key, _)| key.into_owned())
            .collect();
        let missing: Vec<(String, String)> = original
            .query_pairs()
            .filter(|(key, _)| present.insert(key.to_string()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        if !missing.is_empty() {
            let mut pairs = overridden.query_pairs_mut();
            for (key, value) in &missing {
                pairs.append_pair(key, value);
            }
        }
        return Ok(overridden.to_string());
    }

    Ok(match search(&original) {
        Some(query) => format!("{}?{}", overridden_url, query),
        None => overridden_url.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_original_query_appended() {
        assert_eq!(
            resolve_idp_url_after_tenant_resolves(
                "https://localhost:9443/oauth2/authorize?tenant=wso2.com",
                "https://idp.test/authorize"
            )
            .unwrap(),
            "https://idp.test/authorize?tenant=wso2.com"
        );
    }

    #[test]
    fn test_no_queries_keeps_override() {
        assert_eq!(
            resolve_idp_url_after_tenant_resolves(
                "https://localhost:9443/oauth2/token",
                "https://idp.test/token"
            )
            .unwrap(),
            "https://idp.test/token"
        );
    }

    #[test]
    fn test_queries_merged_without_overwriting() {
        assert_eq!(
            resolve_idp_url_after_tenant_resolves(
                "https://localhost:9443/oidc/logout?id_token_hint=abc&tenant=a.com",
                "https://idp.test/logout?tenant=b.com"
            )
            .unwrap(),
            "https://idp.test/logout?tenant=b.com&id_token_hint=abc"
        );
    }

    #[test]
    fn test_repeated_original_key_added_once() {
        assert_eq!(
            resolve_idp_url_after_tenant_resolves(
                "https://localhost:9443/x?scope=a&scope=b",
                "https://idp.test/x?fixed=1"
            )
            .unwrap(),
            "https://idp.test/x?fixed=1&scope=a"
        );
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = resolve_idp_url_after_tenant_resolves("https://localhost:9443/x", "/relative")
            .unwrap_err();
        assert!(matches!(err, LoginError::InvalidUrl { ref url, .. } if url == "/relative"));
    }
}
