pub mod accent;
pub mod config;
pub mod constants;
pub mod playlist;
pub mod visual;
