//! Fixed catalog of fields a form can be assembled from.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Number,
}

impl FieldType {
    /// Value of the HTML `type` attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Number => "number",
        }
    }
}

/// Template used to seed a configurable [`FormField`](crate::FormField).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredefinedField {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub default_label: &'static str,
    pub default_placeholder: &'static str,
    pub default_icon: &'static str,
}

const fn field(
    id: &'static str,
    name: &'static str,
    field_type: FieldType,
    default_label: &'static str,
    default_placeholder: &'static str,
    default_icon: &'static str,
) -> PredefinedField {
    PredefinedField {
        id,
        name,
        field_type,
        default_label,
        default_placeholder,
        default_icon,
    }
}

pub static PREDEFINED_FIELDS: [PredefinedField; 11] = [
    field("name", "Nome", FieldType::Text, "Nome Completo", "Digite seu nome completo", "user"),
    field("whatsapp", "WhatsApp", FieldType::Number, "WhatsApp", "Digite seu WhatsApp", "phone"),
    field("cpf", "CPF", FieldType::Number, "CPF", "Digite seu CPF", "hash"),
    field("cep", "CEP", FieldType::Number, "CEP", "Digite seu CEP", "map-pin"),
    field("email", "Email", FieldType::Email, "Email", "Digite seu email", "mail"),
    field("state", "Estado", FieldType::Text, "Estado", "Digite seu estado", "map"),
    field("city", "Cidade", FieldType::Text, "Cidade", "Digite sua cidade", "building"),
    field("neighborhood", "Bairro", FieldType::Text, "Bairro", "Digite seu bairro", "home"),
    field("street", "Rua", FieldType::Text, "Rua", "Digite sua rua", "map-pin"),
    field("number", "Número", FieldType::Number, "Número", "Digite o número", "hash"),
    field("complement", "Complemento", FieldType::Text, "Complemento", "Digite o complemento", "file-text"),
];

pub fn predefined_fields() -> &'static [PredefinedField] {
    &PREDEFINED_FIELDS
}

pub fn find(id: &str) -> Option<&'static PredefinedField> {
    PREDEFINED_FIELDS.iter().find(|f| f.id == id)
}
