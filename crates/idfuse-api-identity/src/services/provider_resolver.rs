//! Provider resolution: deriving a credential from an account record.
//!
//! Pure functions over an [`Account`], no storage access. The auto-detect
//! priority order decides which credential a dual-signup account gets, so it
//! is a committed contract: email, phone, password, github, google, wechat,
//! qq, facebook, dingtalk, weibo, ldap, custom.

use idfuse_db::models::Account;

/// Auth type for password credentials; the value is the `owner/name`
/// composite rather than the hash.
pub const AUTH_TYPE_PASSWORD: &str = "password";

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

/// Look up a property value on the account, returning it only when present
/// and non-empty.
fn property(account: &Account, key: &str) -> Option<String> {
    account
        .properties
        .as_ref()
        .and_then(|p| p.get(key))
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Get the credential value an account holds for one provider type.
///
/// The lookup is keyed on the lowercased type, but property fallbacks for
/// unlisted providers keep the caller's original casing
/// (`oauth_<ProviderType>_id`).
pub fn provider_value(account: &Account, provider_type: &str) -> Option<String> {
    match provider_type.to_lowercase().as_str() {
        "email" => non_empty(&account.email).map(str::to_string),
        "phone" => non_empty(&account.phone).map(str::to_string),
        "password" => {
            if account.password_hash.is_some() {
                Some(account.owner_name())
            } else {
                None
            }
        }
        "github" => non_empty(&account.github)
            .map(str::to_string)
            .or_else(|| property(account, "oauth_GitHub_id"))
            .or_else(|| property(account, "oauth_GitHub_username")),
        "google" => non_empty(&account.google).map(str::to_string),
        "wechat" => non_empty(&account.wechat).map(str::to_string),
        "qq" => non_empty(&account.qq).map(str::to_string),
        "facebook" => non_empty(&account.facebook).map(str::to_string),
        "dingtalk" => non_empty(&account.dingtalk).map(str::to_string),
        "weibo" => non_empty(&account.weibo).map(str::to_string),
        "ldap" => non_empty(&account.ldap).map(str::to_string),
        "custom" => non_empty(&account.custom)
            .map(str::to_string)
            .or_else(|| property(account, "oauth_Custom_id")),
        _ => property(account, &format!("oauth_{provider_type}_id")),
    }
}

/// Auto-detect a `(auth_type, auth_value)` pair from whatever the account
/// has populated, in the fixed priority order.
pub fn auto_detect(account: &Account) -> Option<(String, String)> {
    if let Some(email) = non_empty(&account.email) {
        return Some(("email".to_string(), email.to_string()));
    }
    if let Some(phone) = non_empty(&account.phone) {
        return Some(("phone".to_string(), phone.to_string()));
    }
    if account.password_hash.is_some() {
        return Some((AUTH_TYPE_PASSWORD.to_string(), account.owner_name()));
    }
    if let Some(github) = non_empty(&account.github) {
        return Some(("github".to_string(), github.to_string()));
    }
    if let Some(google) = non_empty(&account.google) {
        return Some(("google".to_string(), google.to_string()));
    }
    if let Some(wechat) = non_empty(&account.wechat) {
        return Some(("wechat".to_string(), wechat.to_string()));
    }
    if let Some(qq) = non_empty(&account.qq) {
        return Some(("qq".to_string(), qq.to_string()));
    }
    if let Some(facebook) = non_empty(&account.facebook) {
        return Some(("facebook".to_string(), facebook.to_string()));
    }
    if let Some(dingtalk) = non_empty(&account.dingtalk) {
        return Some(("dingtalk".to_string(), dingtalk.to_string()));
    }
    if let Some(weibo) = non_empty(&account.weibo) {
        return Some(("weibo".to_string(), weibo.to_string()));
    }
    if let Some(ldap) = non_empty(&account.ldap) {
        return Some(("ldap".to_string(), ldap.to_string()));
    }
    if let Some(custom) = non_empty(&account.custom) {
        return Some(("custom".to_string(), custom.to_string()));
    }

    None
}

/// Resolve the credential to register for an account.
///
/// A hinted type is tried first; when its field is empty (or no hint is
/// given), auto-detection takes over and may pick a different type than the
/// hint. The returned auth type is always lowercase.
pub fn resolve(account: &Account, hint: Option<&str>) -> Option<(String, String)> {
    if let Some(hint) = hint {
        if let Some(value) = provider_value(account, hint) {
            return Some((hint.to_lowercase(), value));
        }
    }
    auto_detect(account)
}
