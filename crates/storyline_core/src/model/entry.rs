//! Raw entry model and property extraction.
//!
//! # Responsibility
//! - Define the wire shape of one record from the external database.
//! - Decode the loosely-typed property bag into a tagged union.
//! - Extract plain values with total, panic-free fallbacks.
//!
//! # Invariants
//! - Entries are read-only to every downstream layer.
//! - Extraction never fails: unknown discriminators and missing property
//!   names yield empty text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Property name holding the primary title of an entry.
pub const PROP_NAME: &str = "Name";
/// Fallback title property consulted when `Name` is empty.
pub const PROP_TITLE: &str = "Title";
/// Property name holding the entry's external link.
pub const PROP_URL: &str = "URL";
/// Select property grouping entries into chapters.
pub const PROP_CHAPTER: &str = "Chapter";
/// Flag marking an entry as its chapter's heading.
pub const PROP_CHAPTER_HEADING: &str = "Chapter Heading";
/// Flag marking an entry as an outlink into an aside chapter.
pub const PROP_ASIDE_HEADING: &str = "Aside Heading";
/// Relation property listing forward event links.
pub const PROP_NEXT_EVENT: &str = "Next Event";
/// Relation property listing backward event links.
pub const PROP_PRIOR_EVENT: &str = "Prior Event";

/// Placeholder title for entries with no resolvable Name/Title.
pub const FALLBACK_TITLE: &str = "Untitled";

/// Stable identifier of one external record.
///
/// Kept as a type alias: ids are minted by the external source and are
/// opaque strings on this side of the boundary.
pub type EntryId = String;

/// Named, typed properties of one entry.
pub type PropertyBag = BTreeMap<String, Property>;

/// One raw record from the external database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(default)]
    pub properties: PropertyBag,
}

impl Entry {
    /// Creates an entry with an empty property bag.
    pub fn new(id: impl Into<EntryId>) -> Self {
        Self {
            id: id.into(),
            properties: PropertyBag::new(),
        }
    }

    /// Extracts one property value by name, never failing on missing
    /// names or unknown types.
    pub fn property(&self, name: &str) -> PropertyValue {
        extract_property_value(&self.properties, name)
    }
}

/// One text run inside a title or rich-text property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    #[serde(default)]
    pub plain_text: String,
}

impl TextRun {
    pub fn new(plain_text: impl Into<String>) -> Self {
        Self {
            plain_text: plain_text.into(),
        }
    }
}

/// Selected option of a select property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    #[serde(default)]
    pub name: String,
}

impl SelectOption {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// One referenced record inside a relation property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRef {
    #[serde(default)]
    pub id: EntryId,
}

impl RelationRef {
    pub fn new(id: impl Into<EntryId>) -> Self {
        Self { id: id.into() }
    }
}

/// Typed property payload, discriminated by the wire `type` tag.
///
/// Discriminators this model does not understand decode to `Unknown`
/// instead of failing the whole entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Property {
    Title {
        #[serde(default)]
        title: Vec<TextRun>,
    },
    RichText {
        #[serde(default)]
        rich_text: Vec<TextRun>,
    },
    Url {
        #[serde(default)]
        url: Option<String>,
    },
    Checkbox {
        #[serde(default)]
        checkbox: bool,
    },
    Select {
        #[serde(default)]
        select: Option<SelectOption>,
    },
    Relation {
        #[serde(default)]
        relation: Vec<RelationRef>,
    },
    #[serde(other)]
    Unknown,
}

/// Plain value produced by property extraction.
///
/// The empty-text variant doubles as the universal fallback, so every
/// lookup result can be consumed without branching on errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Flag(bool),
    Ids(Vec<EntryId>),
}

impl PropertyValue {
    /// The fallback value for missing names and unknown discriminators.
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// Text payload; empty for flag and relation values.
    pub fn as_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Flag(_) | Self::Ids(_) => "",
        }
    }

    /// Consumes the value into its text payload.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Flag(_) | Self::Ids(_) => String::new(),
        }
    }

    /// Id payload; empty for text and flag values.
    pub fn into_ids(self) -> Vec<EntryId> {
        match self {
            Self::Ids(ids) => ids,
            Self::Text(_) | Self::Flag(_) => Vec::new(),
        }
    }

    /// Truthiness across all payload shapes: non-empty text, set flag,
    /// or non-empty id list.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Flag(flag) => *flag,
            Self::Ids(ids) => !ids.is_empty(),
        }
    }
}

/// Extracts the value stored under `name`, switching on the property's own
/// type discriminator.
///
/// # Contract
/// - `title` -> first text run's plain text, or empty.
/// - `rich_text` -> all runs' plain text, space-joined.
/// - `url` -> the url string, or empty.
/// - `checkbox` -> the flag, default false.
/// - `select` -> the selected option's name, or empty.
/// - `relation` -> referenced ids in source order.
/// - unknown discriminator or missing name -> empty text.
pub fn extract_property_value(properties: &PropertyBag, name: &str) -> PropertyValue {
    let Some(property) = properties.get(name) else {
        return PropertyValue::empty();
    };

    match property {
        Property::Title { title } => PropertyValue::Text(
            title
                .first()
                .map(|run| run.plain_text.clone())
                .unwrap_or_default(),
        ),
        Property::RichText { rich_text } => PropertyValue::Text(
            rich_text
                .iter()
                .map(|run| run.plain_text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Property::Url { url } => PropertyValue::Text(url.clone().unwrap_or_default()),
        Property::Checkbox { checkbox } => PropertyValue::Flag(*checkbox),
        Property::Select { select } => PropertyValue::Text(
            select
                .as_ref()
                .map(|option| option.name.clone())
                .unwrap_or_default(),
        ),
        Property::Relation { relation } => PropertyValue::Ids(
            relation
                .iter()
                .map(|reference| reference.id.clone())
                .collect(),
        ),
        Property::Unknown => PropertyValue::empty(),
    }
}

/// Resolves an entry's display title: `Name`, else `Title`, else the
/// fixed placeholder.
pub fn resolved_title(properties: &PropertyBag) -> String {
    let name = extract_property_value(properties, PROP_NAME).into_text();
    if !name.is_empty() {
        return name;
    }
    let title = extract_property_value(properties, PROP_TITLE).into_text();
    if !title.is_empty() {
        return title;
    }
    FALLBACK_TITLE.to_string()
}
