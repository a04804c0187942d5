//! Printix Client - OAuth-authenticated access to the Printix Cloud Print API
//!
//! - [`TokenManager`]: client-credentials token with lazy, buffered renewal
//! - [`PrintixClient::execute`]: authenticated requests with rate-limit capture
//! - Resource operations for printers, jobs, users, groups, and tenants
//! - Two-phase print submission (submit, upload, complete)
//!
//! All operations are `async`. Dropping a returned future cancels the
//! operation; a cancelled token refresh leaves the cached token as it was.

pub mod client;
pub mod error;
pub mod groups;
pub mod jobs;
pub mod print;
pub mod printers;
pub mod tenants;
pub mod token;
pub mod users;

pub use client::{
    ApiRequest, ApiStatus, NoContent, PrintixClient, PrintixClientBuilder, RateLimitInfo,
};
pub use error::{ClientError, ClientResult};
pub use groups::{Group, GroupQuery, GroupsPage};
pub use jobs::{job_status, Job, JobQuery};
pub use print::{
    pdl, pdl_for_path, Duplex, Link, PageOrientation, PrintJob, PrintOptions, Scaling,
    SubmitLinks, SubmitResponse, SubmittedJob, UploadLink, UserMapping,
};
pub use printers::{
    ColorOption, ContentType, CopiesCapability, MediaSizeOption, OptionList, PageInfo, Printer,
    PrinterCapabilities, PrinterDescription, PrinterQuery, PrintersPage,
};
pub use tenants::{Tenant, TenantsPage};
pub use token::{AccessToken, TokenManager, TokenStatus, TOKEN_RENEWAL_BUFFER_SECS};
pub use users::{User, UserQuery, UsersPage};
