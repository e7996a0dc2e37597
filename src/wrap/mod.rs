//! Tail-appended chunk container

mod container;
mod footer;

pub use container::Wrap;
pub use footer::{ends_with_signature, Footer, FOOTER_SIZE, SIGNATURE};
