pub mod api;
pub mod cards;
pub mod cli;
pub mod tui;
