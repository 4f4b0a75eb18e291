//! Terramaas CLI
//!
//! Command line front end: loads the CSV sheets and credentials, renders
//! and validates the MAAS terraform script, then creates, updates or
//! destroys the deployment through terraform.

pub mod cli;
pub mod commands;
