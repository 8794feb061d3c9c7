pub mod config;
pub mod play;
pub mod preloader;
pub mod scroll;
