//! Form schemas: which fields a form has and how each one is checked.

use dpav_client::{Esterilizado, Sexo, Tamano};

use crate::validate::Rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Text,
    /// Everything but ASCII digits is dropped as it is typed.
    Digits,
    Secret,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rule: Rule,
    pub input: Input,
}

const fn field(name: &'static str, label: &'static str, rule: Rule) -> FieldSpec {
    FieldSpec { name, label, rule, input: Input::Text }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Apply the field's input filter to a raw keystroke value.
    pub fn sanitize(&self, name: &str, raw: &str) -> String {
        match self.field(name).map(|f| f.input) {
            Some(Input::Digits) => raw.chars().filter(|c| c.is_ascii_digit()).collect(),
            _ => raw.to_string(),
        }
    }
}

pub static DOG: Schema = Schema {
    name: "perro",
    fields: &[
        field("nombre", "Nombre", Rule::Text { missing: "El nombre es obligatorio." }),
        field("color", "Color", Rule::Text { missing: "El color es obligatorio." }),
        field(
            "edad",
            "Edad (años)",
            Rule::Positive { integer: true, message: "La edad debe ser un número entero positivo." },
        ),
        field(
            "peso",
            "Peso (kg)",
            Rule::Positive { integer: false, message: "El peso debe ser un número positivo." },
        ),
        field(
            "tamaño",
            "Tamaño",
            Rule::Choice { options: Tamano::LABELS, message: "El tamaño es obligatorio." },
        ),
        field(
            "altura",
            "Altura (cm)",
            Rule::Positive { integer: false, message: "La altura debe ser un número positivo." },
        ),
        field(
            "sexo",
            "Sexo",
            Rule::Choice { options: Sexo::LABELS, message: "El sexo es obligatorio." },
        ),
        field(
            "esterilizado",
            "Esterilizado",
            Rule::Choice {
                options: Esterilizado::LABELS,
                message: "El estado de esterilización es obligatorio.",
            },
        ),
        field(
            "fecha_nacimiento",
            "Fecha de Nacimiento",
            Rule::Date {
                missing: "La fecha de nacimiento es obligatoria.",
                invalid: "La fecha de nacimiento no es válida.",
            },
        ),
        field("id_raza", "Raza", Rule::Selection { missing: "La raza es obligatoria." }),
    ],
};

pub static BREED: Schema = Schema {
    name: "raza",
    fields: &[field("nombre", "Nombre", Rule::Text { missing: "El nombre es obligatorio." })],
};

pub static LOGIN: Schema = Schema {
    name: "login",
    fields: &[
        field("email", "Correo electrónico", Rule::Email),
        FieldSpec {
            name: "password",
            label: "Contraseña",
            rule: Rule::Password,
            input: Input::Secret,
        },
    ],
};

pub static REGISTER: Schema = Schema {
    name: "registro",
    fields: &[
        field("nombre", "Nombre", Rule::Text { missing: "El nombre es obligatorio." }),
        field(
            "apellido_paterno",
            "Apellido paterno",
            Rule::Text { missing: "El apellido paterno es obligatorio." },
        ),
        FieldSpec { name: "telefono", label: "Teléfono", rule: Rule::Phone, input: Input::Digits },
        field("email", "Correo electrónico", Rule::Email),
        FieldSpec {
            name: "password",
            label: "Contraseña",
            rule: Rule::Password,
            input: Input::Secret,
        },
    ],
};
