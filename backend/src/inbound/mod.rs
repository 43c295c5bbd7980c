//! Inbound adapters translating user input into domain port calls.
//!
//! - **cli**: the `cleantrack` command-line surface

pub mod cli;
