// ! OAuth 2.0 Authorization for the AdMob API
// !
// ! Module implements the installed-application authorization-code flow with
// ! a loopback redirect, plus the file-backed credential store the tool
// ! dispatcher reads on every call.

pub mod callback;
pub mod client_secret;
pub mod errors;
pub mod flow;
pub mod pkce;
pub mod store;
pub mod token;
pub mod types;

pub use callback::{CallbackListener, CallbackParams, DEFAULT_REDIRECT_URI};
pub use client_secret::{ClientSecret, DEFAULT_AUTH_URI, DEFAULT_TOKEN_URI};
pub use errors::AuthError;
pub use flow::{AuthorizationFlow, SystemBrowser, UrlOpener, authorize};
pub use pkce::PkceParams;
pub use store::{AuthorizedClient, CredentialStore, StoredCredential};
pub use token::{ADMOB_SCOPES, build_authorization_url};
pub use types::{OAuth2Error, TokenResponse};
