//! Dog and breed commands.
//!
//! Each command drives the same requests the admin UI sends: load, search,
//! open a form, type into its fields, submit.

use std::path::Path;

use anyhow::Result;
use clap::Args;
use dpav_admin::request::{
    DeleteReq, FieldReq, LoadReq, OpenCreateReq, OpenEditReq, SearchReq, SubmitReq,
    entity_request,
};
use dpav_admin::state::breeds_path;
use dpav_admin::{Admin, DogRow, Entity, FormState, ListState, Searchable};
use dpav_client::{Breed, Dog, Id, Resource};

use super::{finish, open_session};
use crate::render::Table;

#[derive(Args, Debug, Default)]
pub struct DogFields {
    #[arg(long)]
    pub nombre: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    /// Age in whole years.
    #[arg(long)]
    pub edad: Option<String>,
    /// Weight in kg.
    #[arg(long)]
    pub peso: Option<String>,
    /// Pequeño, Mediano or Grande.
    #[arg(long = "tamano")]
    pub tamano: Option<String>,
    /// Height in cm.
    #[arg(long)]
    pub altura: Option<String>,
    /// Macho or Hembra.
    #[arg(long)]
    pub sexo: Option<String>,
    /// Si or No.
    #[arg(long)]
    pub esterilizado: Option<String>,
    /// YYYY-MM-DD.
    #[arg(long = "fecha-nacimiento")]
    pub fecha_nacimiento: Option<String>,
    /// Breed id or breed name.
    #[arg(long)]
    pub raza: Option<String>,
}

impl DogFields {
    /// Given flags as form field names and values; `--raza` is left out.
    fn pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("nombre", &self.nombre),
            ("color", &self.color),
            ("edad", &self.edad),
            ("peso", &self.peso),
            ("tamaño", &self.tamano),
            ("altura", &self.altura),
            ("sexo", &self.sexo),
            ("esterilizado", &self.esterilizado),
            ("fecha_nacimiento", &self.fecha_nacimiento),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
        .collect()
    }
}

#[derive(Args, Debug, Default)]
pub struct BreedFields {
    #[arg(long)]
    pub nombre: Option<String>,
}

// ====================================================================
// Shared flow
// ====================================================================

/// Load an entity's list; fails when the session expired or the API
/// could not be reached.
async fn load<E: Entity>(admin: &Admin) -> Result<()> {
    admin
        .flux
        .emit(&entity_request(E::NAME, LoadReq::ACTION), LoadReq)
        .await;
    if !admin.auth.state().authenticated {
        finish(admin, None)?;
    }
    let list: ListState<E::Row> = admin
        .flux
        .get_as(&dpav_admin::state::list_path(E::NAME))
        .unwrap_or_default();
    if let Some(err) = list.error {
        anyhow::bail!("{}", err);
    }
    Ok(())
}

async fn search<E: Entity>(admin: &Admin, term: Option<&str>) -> ListState<E::Row> {
    if let Some(term) = term {
        admin
            .flux
            .emit(
                &entity_request(E::NAME, SearchReq::ACTION),
                SearchReq { term: term.to_string() },
            )
            .await;
    }
    admin
        .flux
        .get_as(&dpav_admin::state::list_path(E::NAME))
        .unwrap_or_default()
}

async fn fill_and_submit<E: Entity>(admin: &Admin, pairs: &[(&str, String)]) -> Result<()> {
    for (name, value) in pairs {
        admin
            .flux
            .emit(
                &entity_request(E::NAME, FieldReq::ACTION),
                FieldReq { name: name.to_string(), value: value.clone() },
            )
            .await;
    }
    admin
        .flux
        .emit(&entity_request(E::NAME, SubmitReq::ACTION), SubmitReq)
        .await;
    let form: Option<FormState> = admin.flux.get_as(&dpav_admin::state::form_path(E::NAME));
    finish(admin, form.as_ref())
}

async fn open_create<E: Entity>(admin: &Admin) {
    admin
        .flux
        .emit(&entity_request(E::NAME, OpenCreateReq::ACTION), OpenCreateReq)
        .await;
}

async fn open_edit<E: Entity>(admin: &Admin, id: &Id) -> Result<()> {
    admin
        .flux
        .emit(&entity_request(E::NAME, OpenEditReq::ACTION), OpenEditReq { id: id.clone() })
        .await;
    let form: Option<FormState> = admin.flux.get_as(&dpav_admin::state::form_path(E::NAME));
    match form {
        Some(f) if f.open && f.is_edit() => Ok(()),
        _ => anyhow::bail!("No existe {} con id {}.", E::SCHEMA.name, id),
    }
}

/// Print `empty` when the filtered list has no rows; returns whether it did.
fn print_if_empty<T: Searchable>(list: &ListState<T>, empty: &str) -> bool {
    if list.filtered.is_empty() {
        println!("{}", empty);
        return true;
    }
    false
}

// ====================================================================
// Dogs
// ====================================================================

/// Map `--raza` to a breed id: an id from the list, or a breed name
/// (case-insensitive).
fn resolve_breed(admin: &Admin, raw: &str) -> Result<String> {
    let breeds: Vec<Breed> = admin.flux.get_as(&breeds_path(Dog::NAME)).unwrap_or_default();
    let raw = raw.trim();
    if let Some(b) = breeds.iter().find(|b| b.id.to_string() == raw) {
        return Ok(b.id.to_string());
    }
    if let Some(b) = breeds.iter().find(|b| b.nombre.to_lowercase() == raw.to_lowercase()) {
        return Ok(b.id.to_string());
    }
    anyhow::bail!("La raza \"{}\" no existe. Ver `dpav breeds list`.", raw)
}

fn dog_pairs(admin: &Admin, fields: &DogFields) -> Result<Vec<(&'static str, String)>> {
    let mut pairs = fields.pairs();
    if let Some(raza) = &fields.raza {
        pairs.push(("id_raza", resolve_breed(admin, raza)?));
    }
    Ok(pairs)
}

pub async fn list_dogs(term: Option<&str>, json: bool, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open_session(client_config_path).await?;
    load::<Dog>(&admin).await?;
    let list = search::<Dog>(&admin, term).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&list.filtered)?);
        return Ok(());
    }
    if print_if_empty(&list, Dog::MESSAGES.empty) {
        return Ok(());
    }
    Table {
        headers: &[
            "ID", "NOMBRE", "RAZA", "DETALLE", "TAMAÑO", "SEXO", "PESO (KG)", "ALTURA (CM)",
            "ESTERILIZADO", "NACIMIENTO",
        ],
        rows: list.filtered.iter().map(dog_row).collect(),
        searchable: &[1, 2],
        term: &list.term,
    }
    .print();
    Ok(())
}

fn dog_row(row: &DogRow) -> Vec<String> {
    let d = &row.dog;
    let label = |s: Option<&'static str>| s.unwrap_or("-").to_string();
    vec![
        d.id.to_string(),
        d.nombre.clone(),
        if row.breed_name.is_empty() { "-".into() } else { row.breed_name.clone() },
        row.summary(),
        label(d.tamano.map(|t| t.as_str())),
        label(d.sexo.map(|s| s.as_str())),
        d.peso.to_string(),
        d.altura.to_string(),
        label(d.esterilizado.map(|e| e.as_str())),
        d.fecha_nacimiento.clone(),
    ]
}

pub async fn create_dog(fields: &DogFields, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open_session(client_config_path).await?;
    load::<Dog>(&admin).await?;
    let pairs = dog_pairs(&admin, fields)?;
    open_create::<Dog>(&admin).await;
    fill_and_submit::<Dog>(&admin, &pairs).await
}

pub async fn update_dog(id: &str, fields: &DogFields, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open_session(client_config_path).await?;
    load::<Dog>(&admin).await?;
    let pairs = dog_pairs(&admin, fields)?;
    open_edit::<Dog>(&admin, &Id::parse(id)).await?;
    fill_and_submit::<Dog>(&admin, &pairs).await
}

pub async fn delete_dog(id: &str, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open_session(client_config_path).await?;
    admin
        .flux
        .emit(&entity_request(Dog::NAME, DeleteReq::ACTION), DeleteReq { id: Id::parse(id) })
        .await;
    finish(&admin, None)
}

// ====================================================================
// Breeds
// ====================================================================

fn breed_pairs(fields: &BreedFields) -> Vec<(&'static str, String)> {
    fields.nombre.iter().map(|n| ("nombre", n.clone())).collect()
}

pub async fn list_breeds(term: Option<&str>, json: bool, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open_session(client_config_path).await?;
    load::<Breed>(&admin).await?;
    let list = search::<Breed>(&admin, term).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&list.filtered)?);
        return Ok(());
    }
    if print_if_empty(&list, Breed::MESSAGES.empty) {
        return Ok(());
    }
    Table {
        headers: &["ID", "NOMBRE"],
        rows: list
            .filtered
            .iter()
            .map(|b| vec![b.id.to_string(), b.nombre.clone()])
            .collect(),
        searchable: &[1],
        term: &list.term,
    }
    .print();
    Ok(())
}

pub async fn create_breed(fields: &BreedFields, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open_session(client_config_path).await?;
    open_create::<Breed>(&admin).await;
    fill_and_submit::<Breed>(&admin, &breed_pairs(fields)).await
}

pub async fn update_breed(id: &str, fields: &BreedFields, client_config_path: &Path) -> Result<()> {
    let (admin, _) = open_session(client_config_path).await?;
    load::<Breed>(&admin).await?;
    open_edit::<Breed>(&admin, &Id::parse(id)).await?;
    fill_and_submit::<Breed>(&admin, &breed_pairs(fields)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_given_flags_become_fields() {
        let fields = DogFields {
            nombre: Some("Luna".into()),
            tamano: Some("Grande".into()),
            fecha_nacimiento: Some("2022-03-10".into()),
            raza: Some("Labrador".into()),
            ..Default::default()
        };
        assert_eq!(
            fields.pairs(),
            vec![
                ("nombre", "Luna".to_string()),
                ("tamaño", "Grande".to_string()),
                ("fecha_nacimiento", "2022-03-10".to_string()),
            ]
        );
        assert!(breed_pairs(&BreedFields::default()).is_empty());
    }

    #[test]
    fn empty_message_only_for_empty_results() {
        let mut list = ListState::<Breed>::default();
        assert!(print_if_empty(&list, Breed::MESSAGES.empty));

        list.replace(vec![Breed { id: Id::Num(1), nombre: "Beagle".into() }]);
        assert!(!print_if_empty(&list, Breed::MESSAGES.empty));

        list.set_filter("xyz");
        assert!(print_if_empty(&list, Breed::MESSAGES.empty));
    }

    #[test]
    fn dog_row_fills_blanks() {
        let dog: Dog = serde_json::from_value(serde_json::json!({
            "id": 3, "nombre": "Beto", "color": "Café", "edad": 1, "peso": "4.5"
        }))
        .unwrap();
        let cells = dog_row(&DogRow::new(dog, &[]));
        assert_eq!(cells[2], "-");
        assert_eq!(cells[3], "Color: Café | Edad: 1 años");
        assert_eq!(cells[4], "-");
        assert_eq!(cells[6], "4.5");
    }
}
