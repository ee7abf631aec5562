pub mod cli;
pub mod config;
pub mod global;
pub mod phone;
pub mod session;
pub mod telephony;
pub mod twiml;
