use serde::{Deserialize, Deserializer, Serialize};

/// A blog post as stored by the backend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord")]
pub struct BlogRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// HTML body
    pub content: String,
    pub image: Option<String>,
    /// Free-text category label
    #[serde(rename = "type")]
    pub kind: String,
}

impl BlogRecord {
    pub fn category(&self) -> Category {
        Category::from_label(&self.kind)
    }
}

/// Record as it arrives on the wire. Mongo backends send `_id`, others `id`,
/// and some send both.
#[derive(Deserialize)]
struct WireRecord {
    #[serde(rename = "_id", default)]
    mongo_id: Option<RawId>,
    #[serde(default)]
    id: Option<RawId>,
    title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    content: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    image: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    kind: String,
}

impl TryFrom<WireRecord> for BlogRecord {
    type Error = String;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let id = wire
            .mongo_id
            .or(wire.id)
            .ok_or_else(|| "missing field `_id`".to_string())?;
        Ok(BlogRecord {
            id: id.into_string(),
            title: wire.title,
            content: wire.content,
            image: wire.image,
            kind: wire.kind,
        })
    }
}

/// Identifiers are opaque to the client; some backends hand out numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Compose form field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Type,
    Image,
    Content,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Type,
        FormField::Image,
        FormField::Content,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Type => "Type",
            FormField::Image => "Image (URL or file path)",
            FormField::Content => "Content (HTML)",
        }
    }

    pub fn next(&self) -> FormField {
        match self {
            FormField::Title => FormField::Type,
            FormField::Type => FormField::Image,
            FormField::Image => FormField::Content,
            FormField::Content => FormField::Title,
        }
    }

    pub fn prev(&self) -> FormField {
        match self {
            FormField::Title => FormField::Content,
            FormField::Type => FormField::Title,
            FormField::Image => FormField::Type,
            FormField::Content => FormField::Image,
        }
    }
}

/// Client-only projection of a record while composing a create/edit request
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormState {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub kind: String,
}

impl FormState {
    pub fn blank() -> Self {
        FormState::default()
    }

    pub fn from_record(record: &BlogRecord) -> Self {
        FormState {
            title: record.title.clone(),
            content: record.content.clone(),
            image: record.image.clone(),
            kind: record.kind.clone(),
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Type => &self.kind,
            FormField::Image => self.image.as_deref().unwrap_or(""),
            FormField::Content => &self.content,
        }
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Title => &mut self.title,
            FormField::Type => &mut self.kind,
            FormField::Image => self.image.get_or_insert_with(String::new),
            FormField::Content => &mut self.content,
        }
    }
}

/// Request body for create and update
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlogPayload {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl From<FormState> for BlogPayload {
    fn from(form: FormState) -> Self {
        BlogPayload {
            title: form.title,
            content: form.content,
            image: form
                .image
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            kind: form.kind,
        }
    }
}

/// Known blog categories, used for display colouring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Tech,
    Lifestyle,
    Travel,
    Food,
    Fashion,
    Health,
    Other,
}

impl Category {
    /// Case-insensitive lookup; anything unrecognised is `Other`
    pub fn from_label(label: &str) -> Category {
        match label.to_lowercase().as_str() {
            "tech" => Category::Tech,
            "lifestyle" => Category::Lifestyle,
            "travel" => Category::Travel,
            "food" => Category::Food,
            "fashion" => Category::Fashion,
            "health" => Category::Health,
            _ => Category::Other,
        }
    }
}
