//! kubescout: find managed Kubernetes clusters and export them to a
//! kubeconfig.
//!
//! The binary is a thin wrapper around [`cli::Cli`]; the cluster
//! enumeration itself lives in `kubescout-cloud`.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

pub mod cli;
pub mod commands;
pub mod kubeconfig;
pub mod logging;
pub mod ui;
