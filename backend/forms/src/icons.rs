//! Icon keys a field can reference. Unknown keys render nothing.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    User,
    Phone,
    Mail,
    MapPin,
    Home,
    Building,
    Map,
    Hash,
    FileText,
    MessageSquare,
}

impl Icon {
    pub const ALL: [Icon; 10] = [
        Icon::User,
        Icon::Phone,
        Icon::Mail,
        Icon::MapPin,
        Icon::Home,
        Icon::Building,
        Icon::Map,
        Icon::Hash,
        Icon::FileText,
        Icon::MessageSquare,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Phone => "phone",
            Self::Mail => "mail",
            Self::MapPin => "map-pin",
            Self::Home => "home",
            Self::Building => "building",
            Self::Map => "map",
            Self::Hash => "hash",
            Self::FileText => "file-text",
            Self::MessageSquare => "message-square",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|icon| icon.key() == key)
    }

    /// Lucide placeholder element, sized 20px and tinted with `color`.
    pub fn render(&self, color: &str) -> String {
        format!(
            r#"<i data-lucide="{}" style="color: {}; width: 20px; height: 20px;"></i>"#,
            self.key(),
            color
        )
    }
}
