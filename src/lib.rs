//! Foldercrypt - recursive directory-tree encryption with AES

#![forbid(unsafe_code)]

pub mod cipher;
pub mod cli;
pub mod error;
pub mod file_ops;
pub mod keysource;
pub mod mirror;
