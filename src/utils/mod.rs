//! Small helpers shared across commands.

pub mod mime;
pub mod plural;
