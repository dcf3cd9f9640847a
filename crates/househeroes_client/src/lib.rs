//! Headless client for the HouseHeroes GraphQL API, plus the view-models
//! the mobile screens bind to.

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod operations;
pub mod view_models;

pub use api::HouseHeroesApi;
pub use auth::{Authenticator, SignInResult, StaticTokenProvider, TokenProvider};
pub use client::GraphQlClient;
pub use error::ClientError;
