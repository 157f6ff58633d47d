//! Identity engine services.

pub mod binding_service;
pub mod login_service;
pub mod merge_service;
pub mod provider_resolver;
pub mod purge;

pub use binding_service::BindingService;
pub use login_service::LoginService;
pub use merge_service::{MergeResult, MergeService};
pub use purge::{default_purges, AccountPurge, AccountRef};
