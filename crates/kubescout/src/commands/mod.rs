//! Subcommand implementations.

pub mod aks;
pub mod aws;
pub mod digitalocean;
pub mod discover;
pub mod gke;
pub mod version;
