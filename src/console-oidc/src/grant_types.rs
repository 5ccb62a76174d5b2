//! Grant types offered by the form.

use console_common::OidcSettings;
use serde::Serialize;
use std::collections::HashMap;

use crate::metadata::GrantTypeMetadata;

pub const AUTHORIZATION_CODE_GRANT: &str = "authorization_code";
pub const IMPLICIT_GRANT: &str = "implicit";
pub const REFRESH_TOKEN_GRANT: &str = "refresh_token";

/// A grant type checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantTypeOption {
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

fn label_for(grant: &GrantTypeMetadata) -> String {
    if grant.name == IMPLICIT_GRANT {
        format!("{} (Not recommended)", grant.display_name)
    } else {
        grant.display_name.clone()
    }
}

fn hint_for(name: &str) -> Option<String> {
    match name {
        IMPLICIT_GRANT => Some(
            "The implicit grant exposes tokens in the browser. Prefer the code grant with PKCE."
                .to_string(),
        ),
        REFRESH_TOKEN_GRANT => Some(
            "Refresh token grant type should be selected along with the Code grant type."
                .to_string(),
        ),
        _ => None,
    }
}

/// Grant types to show for `template_id`.
///
/// Hidden grant types are dropped, then anything the template does not
/// allow. The template's display order is applied only when it names
/// exactly as many grants as remain.
pub fn allowed_grant_types(
    options: &[GrantTypeMetadata],
    settings: &OidcSettings,
    template_id: Option<&str>,
) -> Vec<GrantTypeOption> {
    let template_allowed = template_id.and_then(|id| settings.template_grant_types.get(id));

    let mut allowed: Vec<GrantTypeOption> = options
        .iter()
        .filter(|grant| !settings.hidden_grant_types.contains(&grant.name))
        .filter(|grant| template_allowed.is_none_or(|allowed| allowed.contains(&grant.name)))
        .map(|grant| GrantTypeOption {
            name: grant.name.clone(),
            label: label_for(grant),
            hint: hint_for(&grant.name),
        })
        .collect();

    let arrangement = template_id.and_then(|id| settings.template_grant_order.get(id));
    if let Some(order) = arrangement {
        if order.len() == allowed.len() {
            let index: HashMap<&str, usize> = order
                .iter()
                .enumerate()
                .map(|(position, name)| (name.as_str(), position))
                .collect();
            allowed.sort_by_key(|grant| index.get(grant.name.as_str()).copied().unwrap_or(usize::MAX));
        }
    }

    allowed
}

/// Callback URLs and origins only apply to redirect based grants.
pub fn shows_callback_url_field(grant_types: &[String]) -> bool {
    grant_types
        .iter()
        .any(|grant| grant == AUTHORIZATION_CODE_GRANT || grant == IMPLICIT_GRANT)
}

/// `refresh_token` is selected but nothing selected can issue refresh tokens.
pub fn refresh_token_without_allowed_grant(grant_types: &[String], settings: &OidcSettings) -> bool {
    grant_types.iter().any(|grant| grant == REFRESH_TOKEN_GRANT)
        && !grant_types
            .iter()
            .any(|grant| settings.refresh_token_grant_types.contains(grant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::OidcMetadata;
    use pretty_assertions::assert_eq;

    fn names(options: &[GrantTypeOption]) -> Vec<&str> {
        options.iter().map(|option| option.name.as_str()).collect()
    }

    fn grants(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_hidden_grant_types_removed() {
        let metadata = OidcMetadata::default();
        let options = allowed_grant_types(
            &metadata.allowed_grant_types.options,
            &OidcSettings::default(),
            None,
        );
        assert!(!names(&options).contains(&"account_switch"));
        assert!(names(&options).contains(&"password"));
    }

    #[test]
    fn test_template_restricts_and_orders() {
        let options = vec![
            GrantTypeMetadata::new("refresh_token", "Refresh Token"),
            GrantTypeMetadata::new("password", "Password"),
            GrantTypeMetadata::new("implicit", "Implicit"),
            GrantTypeMetadata::new("authorization_code", "Code"),
        ];
        let allowed = allowed_grant_types(
            &options,
            &OidcSettings::default(),
            Some("single-page-application"),
        );
        assert_eq!(
            names(&allowed),
            vec!["authorization_code", "implicit", "refresh_token"]
        );
        assert_eq!(allowed[1].label, "Implicit (Not recommended)");
        assert!(allowed[2].hint.is_some());
    }

    #[test]
    fn test_order_skipped_when_sizes_differ() {
        let options = vec![
            GrantTypeMetadata::new("refresh_token", "Refresh Token"),
            GrantTypeMetadata::new("authorization_code", "Code"),
        ];
        let allowed = allowed_grant_types(
            &options,
            &OidcSettings::default(),
            Some("single-page-application"),
        );
        assert_eq!(names(&allowed), vec!["refresh_token", "authorization_code"]);
    }

    #[test]
    fn test_unknown_template_not_filtered() {
        let metadata = OidcMetadata::default();
        let all = allowed_grant_types(
            &metadata.allowed_grant_types.options,
            &OidcSettings::default(),
            None,
        );
        let custom = allowed_grant_types(
            &metadata.allowed_grant_types.options,
            &OidcSettings::default(),
            Some("custom-application"),
        );
        assert_eq!(all, custom);
    }

    #[test]
    fn test_callback_field_visibility() {
        assert!(shows_callback_url_field(&grants(&["authorization_code"])));
        assert!(shows_callback_url_field(&grants(&["password", "implicit"])));
        assert!(!shows_callback_url_field(&grants(&["client_credentials"])));
        assert!(!shows_callback_url_field(&[]));
    }

    #[test]
    fn test_refresh_token_needs_partner_grant() {
        let settings = OidcSettings::default();
        assert!(refresh_token_without_allowed_grant(
            &grants(&["refresh_token", "client_credentials"]),
            &settings
        ));
        assert!(!refresh_token_without_allowed_grant(
            &grants(&["refresh_token", "authorization_code"]),
            &settings
        ));
        assert!(!refresh_token_without_allowed_grant(
            &grants(&["client_credentials"]),
            &settings
        ));
    }
}
