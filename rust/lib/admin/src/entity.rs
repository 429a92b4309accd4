//! What the CRUD orchestrator needs to know about each managed entity.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dpav_client::{
    ApiClient, ApiError, Breed, BreedInput, Dog, DogInput, Esterilizado, Id, Resource, Sexo,
    Tamano,
};

use crate::filter::{DogRow, Searchable};
use crate::form::FormState;
use crate::schema::{self, Schema};

/// User-facing texts for one entity.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub create_failed: &'static str,
    pub update_failed: &'static str,
    pub delete_failed: &'static str,
    pub load_failed: &'static str,
    /// Shown when the filtered list is empty.
    pub empty: &'static str,
}

/// Result of a list fetch.
pub struct Fetched<R> {
    pub rows: Vec<R>,
    /// Breed choices for the form's picker, when the entity has one.
    pub breeds: Option<Vec<Breed>>,
}

#[async_trait]
pub trait Entity: Resource {
    /// What the list shows per record.
    type Row: Searchable + Clone + Send + Sync + 'static;

    const SCHEMA: &'static Schema;
    const MESSAGES: Messages;

    async fn fetch(api: &ApiClient) -> Result<Fetched<Self::Row>, ApiError>;

    fn row_id(row: &Self::Row) -> &Id;

    /// Edit-form prefill.
    fn form_values(row: &Self::Row) -> BTreeMap<String, String>;

    /// Convert a validated form into a request body. `None` if a value does
    /// not convert, which revalidation rules out.
    fn input(form: &FormState) -> Option<Self::Input>;
}

fn values<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[async_trait]
impl Entity for Dog {
    type Row = DogRow;

    const SCHEMA: &'static Schema = &schema::DOG;
    const MESSAGES: Messages = Messages {
        created: "Perro creado correctamente",
        updated: "Perro actualizado correctamente",
        deleted: "Perro eliminado correctamente",
        create_failed: "Error al crear el perro",
        update_failed: "Error al actualizar el perro",
        delete_failed: "Error al eliminar el perro",
        load_failed: "Error al cargar los perros",
        empty: "No se encontraron perros.",
    };

    async fn fetch(api: &ApiClient) -> Result<Fetched<DogRow>, ApiError> {
        let dogs = api.resource::<Dog>().list().await?;
        let breeds = api.resource::<Breed>().list().await?;
        let rows = dogs.into_iter().map(|d| DogRow::new(d, &breeds)).collect();
        Ok(Fetched { rows, breeds: Some(breeds) })
    }

    fn row_id(row: &DogRow) -> &Id {
        row.id()
    }

    fn form_values(row: &DogRow) -> BTreeMap<String, String> {
        let d = &row.dog;
        values([
            ("nombre", d.nombre.clone()),
            ("color", d.color.clone()),
            ("edad", d.edad.to_string()),
            ("peso", d.peso.to_string()),
            ("tamaño", d.tamano.map(|t| t.as_str()).unwrap_or_default().to_string()),
            ("altura", d.altura.to_string()),
            ("sexo", d.sexo.map(|s| s.as_str()).unwrap_or_default().to_string()),
            (
                "esterilizado",
                d.esterilizado.map(|e| e.as_str()).unwrap_or_default().to_string(),
            ),
            ("fecha_nacimiento", d.fecha_nacimiento.clone()),
            ("id_raza", d.breed_id().map(Id::to_string).unwrap_or_default()),
        ])
    }

    fn input(form: &FormState) -> Option<DogInput> {
        let edad: f64 = form.value("edad").trim().parse().ok()?;
        Some(DogInput {
            nombre: form.value("nombre").trim().to_string(),
            color: form.value("color").trim().to_string(),
            edad: u32::try_from(edad as u64).ok()?,
            peso: form.value("peso").trim().parse().ok()?,
            tamano: Tamano::parse(form.value("tamaño"))?,
            altura: form.value("altura").trim().parse().ok()?,
            sexo: Sexo::parse(form.value("sexo"))?,
            esterilizado: Esterilizado::parse(form.value("esterilizado"))?,
            fecha_nacimiento: form.value("fecha_nacimiento").trim().to_string(),
            id_raza: Id::parse(form.value("id_raza")),
        })
    }
}

#[async_trait]
impl Entity for Breed {
    type Row = Breed;

    const SCHEMA: &'static Schema = &schema::BREED;
    const MESSAGES: Messages = Messages {
        created: "Raza creada correctamente",
        updated: "Raza actualizada correctamente",
        deleted: "Raza eliminada correctamente",
        create_failed: "Error al crear la raza",
        update_failed: "Error al actualizar la raza",
        delete_failed: "Las razas no se pueden eliminar",
        load_failed: "Error al cargar las razas",
        empty: "No se encontraron razas que coincidan con la búsqueda.",
    };

    async fn fetch(api: &ApiClient) -> Result<Fetched<Breed>, ApiError> {
        let rows = api.resource::<Breed>().list().await?;
        Ok(Fetched { rows, breeds: None })
    }

    fn row_id(row: &Breed) -> &Id {
        &row.id
    }

    fn form_values(row: &Breed) -> BTreeMap<String, String> {
        values([("nombre", row.nombre.clone())])
    }

    fn input(form: &FormState) -> Option<BreedInput> {
        Some(BreedInput { nombre: form.value("nombre").trim().to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filled_dog_form() -> FormState {
        let mut form = FormState::create(&schema::DOG);
        for (k, v) in [
            ("nombre", "Firulais"),
            ("color", "Café"),
            ("edad", "3"),
            ("peso", "12.5"),
            ("tamaño", "Mediano"),
            ("altura", "45"),
            ("sexo", "Macho"),
            ("esterilizado", "No"),
            ("fecha_nacimiento", "2021-04-02"),
            ("id_raza", "2"),
        ] {
            form.set_field(k, v);
        }
        form
    }

    #[test]
    fn dog_form_converts_to_typed_input() {
        let form = filled_dog_form();
        assert!(form.can_submit());
        let input = Dog::input(&form).unwrap();
        assert_eq!(input.edad, 3);
        assert_eq!(input.peso, 12.5);
        assert_eq!(input.tamano, Tamano::Mediano);
        assert_eq!(input.id_raza, Id::Num(2));
    }

    #[test]
    fn oversized_age_is_an_inline_error() {
        let mut form = filled_dog_form();
        form.set_field("edad", "4294967296");
        assert_eq!(form.error("edad"), Some("La edad debe ser un número entero positivo."));
        assert!(!form.revalidate());
        assert!(!form.can_submit());

        // Every form that passes validation converts.
        form.set_field("edad", "4294967295");
        assert!(form.revalidate());
        assert_eq!(Dog::input(&form).map(|i| i.edad), Some(u32::MAX));
    }

    #[test]
    fn dog_edit_prefill_uses_embedded_breed_id() {
        let dog: Dog = serde_json::from_value(json!({
            "id": 7, "nombre": "Firulais", "color": "Café", "edad": 3, "peso": 12.5,
            "tamaño": "Mediano", "altura": 45, "sexo": "Macho", "esterilizado": "No",
            "fecha_nacimiento": "2021-04-02", "raza": {"id": 2, "nombre": "Labrador"}
        }))
        .unwrap();
        let row = DogRow::new(dog, &[]);
        let values = Dog::form_values(&row);
        assert_eq!(values["id_raza"], "2");
        assert_eq!(values["peso"], "12.5");
        assert_eq!(values["altura"], "45");

        let mut form = FormState::edit(&schema::DOG, Id::Num(7), values);
        assert!(form.revalidate());
    }

    #[test]
    fn breed_input_is_trimmed() {
        let mut form = FormState::create(&schema::BREED);
        form.set_field("nombre", "  Beagle ");
        assert_eq!(Breed::input(&form).unwrap().nombre, "Beagle");
    }
}
