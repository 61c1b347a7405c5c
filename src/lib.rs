//! # Tessera (Credential & Session Lifecycle)
//!
//! `tessera` issues, rotates, and revokes user credentials for a
//! multi-tenant backend, and keeps a read-through cache of user records
//! consistent with a relational source of truth.
//!
//! ## Tokens & Sessions
//!
//! Logins mint a short-lived access token and a longer-lived refresh
//! token (HS256 JWTs with a `purpose` claim so the kinds cannot be
//! swapped). Each login opens a server-side session keyed by the digest
//! of its refresh token; refreshes rotate that digest in place with a
//! compare-and-swap, so a refresh token is single-use and at most one of
//! two concurrent refreshes can win. Raw token values never touch the
//! durable store.
//!
//! ## Revocation
//!
//! Logout deletes the session and writes the presented token's digest to
//! a blacklist whose entries outlive the token's natural expiry window.
//! Validation consults the blacklist before the signature: a revoked
//! token is invalid even while it still verifies cryptographically.
//! Password resets delete every session the user holds.
//!
//! ## Cache-Aside User Records
//!
//! User reads go cache-first with a 24h TTL; writes hit the durable store
//! and then invalidate the cached entry rather than updating it in place.
//! The cache is advisory only — every cache failure is swallowed and the
//! durable store answers instead. Uniqueness checks always read committed
//! state.
//!
//! ## Wiring
//!
//! Stores are capability traits ([`store::UserStore`], [`store::AuthStore`],
//! [`cache::Cache`]) with Postgres/in-memory implementations; an embedding
//! binary picks the wiring and hands each component an explicit
//! [`AuthConfig`]. HTTP routing, email delivery, and schema migration
//! tooling live outside this crate.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod password;
pub mod repo;
pub mod service;
pub mod store;
pub mod token;

pub use config::AuthConfig;
pub use error::{Error, Result};
pub use repo::UserRepository;
pub use service::{AuthService, UserService};
