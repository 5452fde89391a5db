//! Wire models for the cluster dashboard backend API

pub mod models;
