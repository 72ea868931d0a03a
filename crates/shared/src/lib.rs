//! Shared utilities and common types for the QurtubloX Store backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Password hashing with Argon2id (and reading the legacy encoding)
//! - Temporary password generation
//! - Common validation logic

pub mod password;
pub mod validation;
