use serde::{Deserialize, Serialize};

pub const WELCOME_TITLE: &str = "Welcome";
pub const WELCOME_CONTENT: &str = "Start writing your lovely notes here...";
pub const NEW_PAGE_TITLE: &str = "New Page";
pub const NEW_STICKY_CONTENT: &str = "New Note";

/// Opaque record identifier, unique within its parent collection.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Display date for new pages, e.g. `3/14/2026`.
pub fn today_label() -> String {
    chrono::Local::now().format("%-m/%-d/%Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    College,
    Wide,
    Dotted,
    Blank,
}

impl LineStyle {
    pub const ALL: [LineStyle; 4] = [Self::College, Self::Wide, Self::Dotted, Self::Blank];

    pub fn label(self) -> &'static str {
        match self {
            Self::College => "College",
            Self::Wide => "Wide",
            Self::Dotted => "Dotted",
            Self::Blank => "Blank",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotebookColor {
    #[default]
    Pink,
    Mint,
    Lavender,
    Lemon,
    Sky,
}

impl NotebookColor {
    pub const ALL: [NotebookColor; 5] = [
        Self::Pink,
        Self::Mint,
        Self::Lavender,
        Self::Lemon,
        Self::Sky,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextureStyle {
    #[default]
    Plain,
    Grain,
    Grid,
}

impl TextureStyle {
    pub const ALL: [TextureStyle; 3] = [Self::Plain, Self::Grain, Self::Grid];

    pub fn label(self) -> &'static str {
        match self {
            Self::Plain => "Plain",
            Self::Grain => "Grain",
            Self::Grid => "Grid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookTheme {
    pub line_style: LineStyle,
    pub color: NotebookColor,
    pub texture: TextureStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Sticky,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub x: f32,
    pub y: f32,
    /// Data URI for images, note text for stickies.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

impl Attachment {
    pub fn new(kind: AttachmentKind, x: f32, y: f32, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            kind,
            x,
            y,
            content: content.into(),
            width: None,
            height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    pub id: String,
    pub title: String,
    pub date: String,
    pub content: String,
}

impl PageData {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            date: today_label(),
            content: content.into(),
        }
    }

    pub fn blank() -> Self {
        Self::new(NEW_PAGE_TITLE, "")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookSession {
    pub id: String,
    pub name: String,
    pub updated_at: i64,
    pub pages: Vec<PageData>,
    pub attachments: Vec<Attachment>,
    pub theme: NotebookTheme,
}

impl NotebookSession {
    /// A fresh notebook holding the seeded welcome page.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            updated_at: now_millis(),
            pages: vec![PageData::new(WELCOME_TITLE, WELCOME_CONTENT)],
            attachments: Vec::new(),
            theme: NotebookTheme::default(),
        }
    }

    /// Bump `updated_at`, never going backwards even if the clock does.
    pub fn touch(&mut self) {
        self.updated_at = now_millis().max(self.updated_at + 1);
    }
}

/// Partial update for the active notebook. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct NotebookPatch {
    pub name: Option<String>,
    pub pages: Option<Vec<PageData>>,
    pub attachments: Option<Vec<Attachment>>,
    pub theme: Option<NotebookTheme>,
}

impl NotebookPatch {
    pub fn apply(self, notebook: &mut NotebookSession) {
        if let Some(name) = self.name {
            notebook.name = name;
        }
        if let Some(pages) = self.pages {
            notebook.pages = pages;
        }
        if let Some(attachments) = self.attachments {
            notebook.attachments = attachments;
        }
        if let Some(theme) = self.theme {
            notebook.theme = theme;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PagePatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub content: Option<String>,
}

impl PagePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn apply(self, page: &mut PageData) {
        if let Some(title) = self.title {
            page.title = title;
        }
        if let Some(date) = self.date {
            page.date = date;
        }
        if let Some(content) = self.content {
            page.content = content;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttachmentPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub content: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl AttachmentPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn apply(self, attachment: &mut Attachment) {
        if let Some(x) = self.x {
            attachment.x = x;
        }
        if let Some(y) = self.y {
            attachment.y = y;
        }
        if let Some(content) = self.content {
            attachment.content = content;
        }
        if self.width.is_some() {
            attachment.width = self.width;
        }
        if self.height.is_some() {
            attachment.height = self.height;
        }
    }
}
