pub mod domain;
pub mod ports;
pub mod application;
pub mod adapter;
pub mod config;

#[cfg(test)]
mod tests;
