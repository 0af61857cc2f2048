pub mod config;
pub mod create;
pub mod doctor;
