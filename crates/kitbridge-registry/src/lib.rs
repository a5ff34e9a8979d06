//! kitbridge registry crate.
//!
//! Provides [`WrapperRegistry`], the identity index consulted by every
//! get-or-create call.

mod registry;

pub use registry::WrapperRegistry;
