//! MMS relay — webhook to carrier email-to-SMS gateway bridge.

pub mod carrier;
pub mod config;
pub mod error;
pub mod mailer;
pub mod relay;
pub mod routes;
pub mod tables;
