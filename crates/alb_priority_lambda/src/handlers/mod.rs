pub mod callback;
pub mod entry;
pub mod resource;
