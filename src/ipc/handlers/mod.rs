pub mod core;
pub mod history;
pub mod k12;
pub mod state;
pub mod term;
pub mod tertiary;
