//! DPAV HTTP client.
//!
//! Typed access to the dog/breed admin API. Authentication is handled by a
//! pluggable [`TokenSource`]; the admin layer plugs in a [`SharedToken`] that
//! follows the session (set on login, cleared on logout or on a 401).
//!
//! # Usage
//!
//! ```ignore
//! use dpav_client::{ApiClient, Dog, SharedToken};
//!
//! let token = SharedToken::new();
//! let api = ApiClient::new("http://127.0.0.1:8000/api", Arc::new(token.clone()));
//! let session = api.login(&Credentials::new("ana@dpav.mx", "secreto123")).await?;
//! token.set(session.token);
//! let perros = api.resource::<Dog>().list().await?;
//! ```

pub mod api;
pub mod error;
pub mod model;
pub mod resource;
pub mod token;

pub use api::{ApiClient, ResourceClient};
pub use error::ApiError;
pub use model::{
    Breed, BreedInput, Credentials, Dog, DogInput, Esterilizado, Id, LoginResponse, Registration,
    Sexo, Tamano, UserProfile,
};
pub use resource::{Resource, Routes};
pub use token::{NoAuth, SharedToken, StaticToken, TokenSource};
