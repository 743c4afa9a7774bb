pub mod categories;
pub mod settings;
