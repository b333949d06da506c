//! Value types for block-lattice proof-of-work.
//!
//! A search takes a 32-byte [`Root`] and a [`Difficulty`] threshold and
//! produces an 8-byte [`Work`] nonce. These types carry the byte-order
//! conventions shared by every other crate in the workspace.

pub mod difficulty;
pub mod error;
pub mod root;
pub mod work;

pub use difficulty::Difficulty;
pub use error::TypesError;
pub use root::Root;
pub use work::Work;
