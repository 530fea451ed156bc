pub mod config;
pub mod discord;
pub mod host_commands;
pub mod logging;
pub mod reqwest_hardware;
pub mod system_clock;
pub mod time;
