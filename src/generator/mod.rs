//! Auxiliary artifact generation.

pub mod sitemap;
