//! Wire records exchanged with the API.
//!
//! Field names follow the server's JSON (Spanish, `tamaño` included).
//! Reads are lenient: ids may be integers or strings, and numeric columns
//! may arrive as numeric strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Id ──────────────────────────────────────────────────────────────

/// Server-assigned identifier.
///
/// Decoding is canonical: `"2"` and `2` both become `Id::Num(2)`, so a
/// foreign key sent as text still matches the record it points to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Id {
    Num(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Text(String),
        }
        Ok(match Raw::deserialize(d)? {
            Raw::Num(n) => Id::Num(n),
            Raw::Text(s) => Id::parse(&s),
        })
    }
}

impl Id {
    /// Parse user input: all-digit text becomes a numeric id.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<u64>() {
            Ok(n) => Id::Num(n),
            Err(_) => Id::Text(s.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Id::Text(s) if s.is_empty())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Num(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Num(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::parse(s)
    }
}

// ── Choice fields ───────────────────────────────────────────────────

macro_rules! choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        /// Lenient read of a stored label: surrounding blanks and letter case
        /// are ignored.
        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, ()> {
                let s = s.trim().to_lowercase();
                $(if s == $label.to_lowercase() {
                    return Ok($name::$variant);
                })+
                Err(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choice!(
    /// Dog size.
    Tamano { Pequeno => "Pequeño", Mediano => "Mediano", Grande => "Grande" }
);

choice!(Sexo { Macho => "Macho", Hembra => "Hembra" });

choice!(Esterilizado { Si => "Si", No => "No" });

// ── Breed ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breed {
    pub id: Id,
    #[serde(default)]
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedInput {
    pub nombre: String,
}

// ── Dog ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dog {
    pub id: Id,
    pub nombre: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, deserialize_with = "lenient::u32")]
    pub edad: u32,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub peso: f64,
    #[serde(rename = "tamaño", default, deserialize_with = "lenient::choice")]
    pub tamano: Option<Tamano>,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub altura: f64,
    #[serde(default, deserialize_with = "lenient::choice")]
    pub sexo: Option<Sexo>,
    #[serde(default, deserialize_with = "lenient::choice")]
    pub esterilizado: Option<Esterilizado>,
    #[serde(default)]
    pub fecha_nacimiento: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_raza: Option<Id>,
    /// Breed embedded by the list endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raza: Option<Breed>,
}

impl Dog {
    pub fn breed_id(&self) -> Option<&Id> {
        self.raza.as_ref().map(|r| &r.id).or(self.id_raza.as_ref())
    }

    /// Display name of the dog's breed: the embedded breed's name, else a
    /// lookup of `id_raza` in `breeds`, else empty.
    pub fn breed_name(&self, breeds: &[Breed]) -> String {
        if let Some(raza) = self.raza.as_ref().filter(|r| !r.nombre.is_empty()) {
            return raza.nombre.clone();
        }
        self.breed_id()
            .and_then(|id| breeds.iter().find(|b| &b.id == id))
            .map(|b| b.nombre.clone())
            .unwrap_or_default()
    }
}

/// Create/update body for a dog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogInput {
    pub nombre: String,
    pub color: String,
    pub edad: u32,
    pub peso: f64,
    #[serde(rename = "tamaño")]
    pub tamano: Tamano,
    pub altura: f64,
    pub sexo: Sexo,
    pub esterilizado: Esterilizado,
    pub fecha_nacimiento: String,
    pub id_raza: Id,
}

// ── Accounts ────────────────────────────────────────────────────────

/// Server user object. Known fields are typed; the rest is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido_paterno: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let full = [self.nombre.as_deref(), self.apellido_paterno.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !full.is_empty() {
            return full;
        }
        self.email.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub nombre: String,
    pub apellido_paterno: String,
    pub telefono: String,
    pub email: String,
    pub password: String,
}

// ── Lenient decoding ────────────────────────────────────────────────

/// Readers for columns the server does not keep clean. A value that cannot
/// be read becomes the field's empty value instead of failing the whole
/// list.
mod lenient {
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(u64),
        Float(f64),
        Text(String),
    }

    fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(v) => match serde_json::from_value::<Number>(v) {
                Ok(Number::Int(n)) => Some(n as f64),
                Ok(Number::Float(f)) => Some(f),
                Ok(Number::Text(s)) => s.trim().parse().ok(),
                Err(_) => None,
            },
            None => None,
        })
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(number(d)?.filter(|f| f.is_finite()).unwrap_or(0.0))
    }

    /// Whole, non-negative and in range; anything else reads as 0.
    pub fn u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(number(d)?
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u32)
            .unwrap_or(0))
    }

    /// A label from a fixed set; blanks and unknown labels read as `None`.
    pub fn choice<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        })
    }
}
