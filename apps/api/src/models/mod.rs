pub mod idea;
pub mod profile;
