pub mod builtin;
pub mod manager;
