pub mod config;
pub mod delete;
pub mod send;
pub mod utils;
pub mod watch;
pub mod whoami;
