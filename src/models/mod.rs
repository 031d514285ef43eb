pub mod mood;
pub mod settings;
