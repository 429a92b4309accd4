//! Resource descriptors — how each entity maps onto the REST endpoints.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::model::{Breed, BreedInput, Dog, DogInput, Id};

/// Endpoint layout of a resource, relative to the API base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routes {
    pub list: &'static str,
    /// Key wrapping the array in the list response (`{"perros": [...]}`),
    /// or `None` when the body is the array itself.
    pub envelope: Option<&'static str>,
    pub create: &'static str,
    /// Update prefix; the id is appended as `/{id}`.
    pub update: &'static str,
    /// Delete prefix, `None` when the API cannot delete this resource.
    pub delete: Option<&'static str>,
}

/// An entity managed through the admin API.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Create/update body.
    type Input: Serialize + Send + Sync;

    /// Short plural name, also the state-path prefix (`perros`, `razas`).
    const NAME: &'static str;

    const ROUTES: Routes;

    fn id(&self) -> &Id;
}

impl Resource for Dog {
    type Input = DogInput;
    const NAME: &'static str = "perros";
    const ROUTES: Routes = Routes {
        list: "/perros",
        envelope: Some("perros"),
        create: "/crearPerro",
        update: "/actualizarPerro",
        delete: Some("/eliminarPerro"),
    };

    fn id(&self) -> &Id {
        &self.id
    }
}

impl Resource for Breed {
    type Input = BreedInput;
    const NAME: &'static str = "razas";
    const ROUTES: Routes = Routes {
        list: "/razas",
        envelope: None,
        create: "/crearRaza",
        update: "/actualizarRaza",
        delete: None,
    };

    fn id(&self) -> &Id {
        &self.id
    }
}
