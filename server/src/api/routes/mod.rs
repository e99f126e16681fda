//! API route handlers

pub mod admin;
pub mod auth;
pub mod health;
pub mod locations;
pub mod ratings;
pub mod requests;
pub mod resolve;
pub mod tags;
pub mod universities;
