//! Marketing contact list integrations.

mod loops;

pub use loops::{DisabledContactSync, LoopsContactClient};
