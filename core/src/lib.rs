//! Local-first data layer for the cocktails catalogue.
//!
//! - [`cocktaildb`]: wire types of `TheCocktailDB` and the wire → [`models::Recipe`] conversion
//! - [`db`]: SQLite store of per-user cached recipes, settings and local accounts
//! - [`repository`]: the [`repository::RecipeSource`] seam and the sync repository
//! - [`identity`]: the [`identity::IdentityProvider`] seam and credential checks
//! - [`service`]: the view-facing [`service::CocktailService`]

pub mod cocktaildb;
pub mod db;
pub mod identity;
pub mod models;
pub mod repository;
pub mod service;
