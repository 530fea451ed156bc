pub mod command;
pub mod cooldown;
pub mod detection;
pub mod event;
pub mod model;
