//! Platform-independent player core.
//!
//! Everything here works against the [`media`] traits and an injected
//! [`random::RandomSource`], so the terminal front end and the tests drive
//! the same code.

pub mod ambient;
pub mod analyzer;
pub mod beat;
pub mod media;
pub mod radial;
pub mod random;
pub mod reactors;
pub mod scheduler;
pub mod session;
pub mod stage;

pub use session::{PlayerSession, SessionSettings};
