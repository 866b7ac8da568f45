pub mod me;
pub mod notes;
