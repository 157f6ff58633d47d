//! HTTP handlers for the identity API.

mod bind;
mod info;
mod merge;
mod unbind;

pub use bind::bind_auth_method;
pub use info::get_identity_info;
pub use merge::merge_accounts;
pub use unbind::unbind_auth_method;
