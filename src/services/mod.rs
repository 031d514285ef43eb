pub mod actions;
pub mod claude;
pub mod entry_store;
pub mod gateway;
pub mod history;
pub mod settings_store;
