//! `solidgate-auth`: pure authorization boundary.
//!
//! This crate is decoupled from HTTP and from the storage cluster: it turns
//! claims into a principal and configuration into policy, and answers
//! allow/deny questions.

pub mod authorize;
pub mod claims;
pub mod policy;
pub mod principal;
pub mod roles;

pub use authorize::{AuthorizationExplanation, Authorizer, AuthzError, Decision};
pub use claims::{DirectoryTranslator, GroupTranslationError, GroupTranslator, PassthroughTranslator, RawClaims};
pub use policy::{Action, Namespace, PolicyResolver, PolicyTable};
pub use principal::{Principal, ResolvedPrincipal, resolve};
pub use roles::Role;
