//! Domain entities shaped from backend documents.

pub mod appointment;
pub mod catalog;
pub mod document;
pub mod inventory;
pub mod patient;
pub mod payment;
pub mod treatment;
pub mod types;
