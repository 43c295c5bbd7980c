//! CleanTrack complaint workflow.
//!
//! Citizens file complaints about civic issues; administrators relabel,
//! prioritise, and summarise them. The crate is laid out hexagonally:
//!
//! - [`domain`]: complaint aggregate, audit trail, services, and ports
//! - [`outbound`]: record store and media upload adapters
//! - [`inbound`]: the command-line surface
//! - [`settings`]: layered configuration

pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod settings;
