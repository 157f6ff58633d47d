//! Request and response models for the identity API.

pub mod requests;
pub mod responses;

pub use requests::{BindRequest, MergeRequest, UnbindRequest};
pub use responses::{AuthMethod, BindResponse, IdentityInfoResponse, MergeResponse};
