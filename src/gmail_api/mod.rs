//! Gmail API module split into logical submodules
//!
//! - auth: credential cache, refresh and the interactive consent flow
//! - messages: listing and fetching messages over the REST API

pub mod auth;
pub mod messages;

pub use auth::{
    obtain_credential, Credential, CredentialStore, FileCredentialStore, OAuthFlow,
    RealOAuthFlow, GMAIL_READONLY_SCOPE,
};
pub use messages::{GmailClient, MailApi, INBOX_LABEL, MAX_RESULTS};

#[cfg(test)]
pub use auth::{MockCredentialStore, MockOAuthFlow};
#[cfg(test)]
pub use messages::MockMailApi;
