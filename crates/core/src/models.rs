use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InputFileKind {
    Text,
    Pdf,
    Unknown,
}

impl fmt::Display for InputFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Text => "text",
            Self::Pdf => "pdf",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A loaded source file: its kind, display name, origin, and ordered pages.
///
/// The kind is fixed at construction. Text files carry one page per chunk,
/// PDFs one page per physical page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    kind: InputFileKind,
    name: String,
    path: String,
    pages: Vec<String>,
}

impl InputFile {
    pub fn text(name: impl Into<String>, path: impl Into<String>, pages: Vec<String>) -> Self {
        Self::with_kind(InputFileKind::Text, name, path, pages)
    }

    pub fn pdf(name: impl Into<String>, path: impl Into<String>, pages: Vec<String>) -> Self {
        Self::with_kind(InputFileKind::Pdf, name, path, pages)
    }

    pub fn with_kind(
        kind: InputFileKind,
        name: impl Into<String>,
        path: impl Into<String>,
        pages: Vec<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            path: path.into(),
            pages,
        }
    }

    pub fn kind(&self) -> InputFileKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Turns every page into a retrievable unit, numbering pages from 1.
    pub fn content_units(&self) -> Vec<ContentUnit> {
        self.pages
            .iter()
            .enumerate()
            .map(|(index, page)| ContentUnit {
                text: page.clone(),
                metadata: UnitMetadata {
                    title: self.name.clone(),
                    page_number: index as u32 + 1,
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitMetadata {
    pub title: String,
    pub page_number: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentUnit {
    pub text: String,
    pub metadata: UnitMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedUnit {
    pub id: String,
    pub score: f32,
    pub unit: ContentUnit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<RetrievedUnit>,
}

macro_rules! option_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            #[default]
            Default,
            $(
                #[serde(rename = $label)]
                $variant
            ),+
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    Self::Default => f.write_str("default"),
                    $(Self::$variant => f.write_str($label)),+
                }
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    "default" => Ok(Self::Default),
                    $($label => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown {} option `{}`",
                        stringify!($name),
                        other
                    )),
                }
            }
        }
    };
}

option_enum!(EmbeddingsOptions {
    ChatGptCompatible => "chat-gpt-compatible",
    Offline => "offline",
});
option_enum!(VectorStoreOptions { LocalIndex => "local-index" });
option_enum!(LanguageModelOptions { Gpt35Turbo => "gpt-3.5-turbo" });
option_enum!(ChainOptions { RetrievalQa => "retrieval-qa" });
