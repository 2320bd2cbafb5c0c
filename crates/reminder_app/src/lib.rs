pub mod app;
pub mod terminal;
