pub mod ai;
pub mod entries;
pub mod health;
pub mod moods;
pub mod settings;
pub mod stats;
