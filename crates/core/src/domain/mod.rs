pub mod activation;
pub mod error;
pub mod item;
pub mod narration;
pub mod selection;
pub mod settings;
