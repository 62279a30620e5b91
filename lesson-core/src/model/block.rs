use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

use super::lenient;
use super::question::Question;

/// Opaque block identifier, unique within a page.
///
/// Never empty. Once a block has an id it keeps it for its whole lifetime;
/// edits produce a new block value carrying the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    /// Fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing id. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Block variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[serde(alias = "paragraph")]
    Intro,
    Image,
    Table,
    Youtube,
    Exercise,
    /// A stored type this crate does not know; never offered for adding
    #[serde(skip)]
    Unknown,
}

impl BlockType {
    pub fn all() -> &'static [BlockType] {
        &[
            BlockType::Intro,
            BlockType::Image,
            BlockType::Table,
            BlockType::Youtube,
            BlockType::Exercise,
        ]
    }

    /// Name used in stored pages
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockType::Intro => "intro",
            BlockType::Image => "image",
            BlockType::Table => "table",
            BlockType::Youtube => "youtube",
            BlockType::Exercise => "exercise",
            BlockType::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BlockType::Intro => "Intro",
            BlockType::Image => "Image",
            BlockType::Table => "Table",
            BlockType::Youtube => "YouTube",
            BlockType::Exercise => "Exercise",
            BlockType::Unknown => "Unknown",
        }
    }

    /// Parse a stored type name. `paragraph` is the legacy name of `intro`.
    pub fn from_wire(name: &str) -> Option<BlockType> {
        match name {
            "intro" | "paragraph" => Some(BlockType::Intro),
            "image" => Some(BlockType::Image),
            "table" => Some(BlockType::Table),
            "youtube" => Some(BlockType::Youtube),
            "exercise" => Some(BlockType::Exercise),
            _ => None,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroData {
    #[serde(deserialize_with = "lenient::text")]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageData {
    #[serde(deserialize_with = "lenient::text")]
    pub url: String,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub alt: Option<String>,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub caption: Option<String>,
}

impl ImageData {
    /// An image can only be previewed once it has a url
    pub fn has_preview(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Rectangular table: every row has exactly one cell per header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableData {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::string_list")]
    pub headers: Vec<String>,
    #[serde(deserialize_with = "lenient::string_rows")]
    pub rows: Vec<Vec<String>>,
}

impl Default for TableData {
    fn default() -> Self {
        Self {
            title: String::new(),
            headers: vec![String::new()],
            rows: Vec::new(),
        }
    }
}

impl TableData {
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Restore the table invariants. Returns true if anything changed.
    pub fn canonicalize(&mut self) -> bool {
        let mut repaired = false;
        if self.headers.is_empty() {
            self.headers.push(String::new());
            repaired = true;
        }
        let width = self.headers.len();
        for row in &mut self.rows {
            if row.len() != width {
                row.resize(width, String::new());
                repaired = true;
            }
        }
        repaired
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct YoutubeData {
    #[serde(deserialize_with = "lenient::text")]
    pub video_id: String,
    #[serde(
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<String>,
}

impl YoutubeData {
    pub fn watch_url(&self) -> Option<String> {
        if self.video_id.is_empty() {
            None
        } else {
            Some(format!("https://www.youtube.com/watch?v={}", self.video_id))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExerciseData {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::questions")]
    pub questions: Vec<Question>,
    #[serde(deserialize_with = "lenient::flag_or_true")]
    pub show_results_immediately: bool,
    #[serde(deserialize_with = "lenient::flag_or_true")]
    pub allow_retry: bool,
}

impl Default for ExerciseData {
    fn default() -> Self {
        Self {
            title: String::new(),
            questions: Vec::new(),
            show_results_immediately: true,
            allow_retry: true,
        }
    }
}

impl ExerciseData {
    pub fn canonicalize(&mut self) -> bool {
        let mut repaired = false;
        for question in &mut self.questions {
            repaired |= question.canonicalize();
        }
        repaired
    }
}

/// A block of a type this crate does not know, kept exactly as stored so
/// saving a page never loses it. No edit applies to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownData {
    pub kind: String,
    pub data: Value,
}

/// Payload of a block, one variant per block type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockData {
    Intro(IntroData),
    Image(ImageData),
    Table(TableData),
    Youtube(YoutubeData),
    Exercise(ExerciseData),
    Unknown(UnknownData),
}

impl BlockData {
    /// Payload a freshly added block starts with
    pub fn default_for(kind: BlockType) -> Self {
        match kind {
            BlockType::Intro => BlockData::Intro(IntroData::default()),
            BlockType::Image => BlockData::Image(ImageData::default()),
            BlockType::Table => BlockData::Table(TableData::default()),
            BlockType::Youtube => BlockData::Youtube(YoutubeData::default()),
            BlockType::Exercise => BlockData::Exercise(ExerciseData::default()),
            BlockType::Unknown => BlockData::Unknown(UnknownData {
                kind: BlockType::Unknown.as_str().to_string(),
                data: Value::Null,
            }),
        }
    }

    pub fn block_type(&self) -> BlockType {
        match self {
            BlockData::Intro(_) => BlockType::Intro,
            BlockData::Image(_) => BlockType::Image,
            BlockData::Table(_) => BlockType::Table,
            BlockData::Youtube(_) => BlockType::Youtube,
            BlockData::Exercise(_) => BlockType::Exercise,
            BlockData::Unknown(_) => BlockType::Unknown,
        }
    }

    /// Read a stored payload field by field. Missing or malformed fields
    /// take their defaults; a payload that is not an object at all falls
    /// back to the type's default payload.
    pub fn from_value(kind: BlockType, data: Value) -> Self {
        if kind == BlockType::Unknown {
            return BlockData::Unknown(UnknownData {
                kind: kind.as_str().to_string(),
                data,
            });
        }
        if !data.is_object() {
            return Self::default_for(kind);
        }
        let parsed = match kind {
            BlockType::Intro => serde_json::from_value(data).map(BlockData::Intro),
            BlockType::Image => serde_json::from_value(data).map(BlockData::Image),
            BlockType::Table => serde_json::from_value(data).map(BlockData::Table),
            BlockType::Youtube => serde_json::from_value(data).map(BlockData::Youtube),
            BlockType::Exercise => serde_json::from_value(data).map(BlockData::Exercise),
            BlockType::Unknown => return Self::default_for(kind),
        };
        parsed.unwrap_or_else(|err| {
            log::warn!("unreadable {} payload, using defaults: {}", kind, err);
            Self::default_for(kind)
        })
    }

    /// Restore per-type invariants. Returns true if anything changed.
    pub fn canonicalize(&mut self) -> bool {
        match self {
            BlockData::Table(table) => table.canonicalize(),
            BlockData::Exercise(exercise) => exercise.canonicalize(),
            BlockData::Intro(_)
            | BlockData::Image(_)
            | BlockData::Youtube(_)
            | BlockData::Unknown(_) => false,
        }
    }

    /// One-line summary for list views
    pub fn summary(&self) -> String {
        match self {
            BlockData::Intro(d) => d.text.lines().next().unwrap_or_default().to_string(),
            BlockData::Image(d) => d.url.clone(),
            BlockData::Table(d) => format!(
                "{} ({} cols x {} rows)",
                d.title,
                d.column_count(),
                d.row_count()
            ),
            BlockData::Youtube(d) => d
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| d.video_id.clone()),
            BlockData::Exercise(d) => format!("{} ({} questions)", d.title, d.questions.len()),
            BlockData::Unknown(d) => format!("{} (not editable)", d.kind),
        }
    }
}

/// One typed unit of page content. Position is implied by list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentBlock {
    id: BlockId,
    pub data: BlockData,
}

impl ContentBlock {
    /// New block of `kind` with a fresh id and the default payload
    pub fn new(kind: BlockType) -> Self {
        Self::with_id(BlockId::generate(), BlockData::default_for(kind))
    }

    pub fn with_id(id: BlockId, data: BlockData) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> &BlockId {
        &self.id
    }

    pub fn block_type(&self) -> BlockType {
        self.data.block_type()
    }

    /// Same block, new payload
    pub fn with_data(&self, data: BlockData) -> Self {
        Self {
            id: self.id.clone(),
            data,
        }
    }

    pub(crate) fn reassign_id(&mut self, id: BlockId) {
        self.id = id;
    }
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ContentBlock", 3)?;
        state.serialize_field("id", &self.id)?;
        let kind = match &self.data {
            BlockData::Unknown(d) => d.kind.as_str(),
            data => data.block_type().as_str(),
        };
        state.serialize_field("type", kind)?;
        match &self.data {
            BlockData::Intro(d) => state.serialize_field("data", d)?,
            BlockData::Image(d) => state.serialize_field("data", d)?,
            BlockData::Table(d) => state.serialize_field("data", d)?,
            BlockData::Youtube(d) => state.serialize_field("data", d)?,
            BlockData::Exercise(d) => state.serialize_field("data", d)?,
            BlockData::Unknown(d) => state.serialize_field("data", &d.data)?,
        }
        state.end()
    }
}

/// A block as it arrives from storage, before normalization.
///
/// Any of the fields may be missing or malformed; [`crate::normalize`] turns
/// a list of these into well-formed [`ContentBlock`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    #[serde(
        default,
        deserialize_with = "lenient::id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient::text")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl RawBlock {
    pub fn new(kind: &str, data: Value) -> Self {
        Self {
            id: None,
            kind: kind.to_string(),
            data,
        }
    }

    pub fn with_id(id: &str, kind: &str, data: Value) -> Self {
        Self {
            id: Some(id.to_string()),
            kind: kind.to_string(),
            data,
        }
    }
}
