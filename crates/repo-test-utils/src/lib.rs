//! Shared test utilities for the repository-sync workspace.
//!
//! This crate provides standardised test fixtures so that every crate
//! exercises the same repository shapes. It is a dev-dependency only.
//!
//! # Modules
//!
//! - [`fake`]: scripted in-memory [`repo_git::GitBackend`]
//! - [`git`]: real git remotes and checkouts driven through the `git` CLI

pub mod fake;
pub mod git;
