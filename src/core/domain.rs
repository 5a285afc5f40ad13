use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Address of one loadable engine. Two locators name the same engine only
/// if their strings are identical.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator(String);

impl Locator {
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Locator {
    fn from(locator: &str) -> Self {
        Self::new(locator)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: &str, content: &str) -> Self {
        SourceFile {
            name: name.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_map: Option<String>,
}

impl CompileResult {
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            source_map: None,
        }
    }

    pub fn with_source_map(code: impl Into<String>, source_map: Option<String>) -> Self {
        Self {
            code: code.into(),
            source_map,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompileTask {
    pub id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub tag: String,
    pub file: SourceFile,
    pub state: CompileState,
}

impl CompileTask {
    pub fn new(tag: &str, file: SourceFile) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            tag: tag.to_string(),
            file,
            state: CompileState::default(),
        }
    }

    pub fn change_state(&self, new_state: CompileState) -> Self {
        Self {
            state: new_state,
            updated_at: chrono::Utc::now(),
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CompileState {
    #[default]
    Idle,
    Loading {
        locators: Vec<Locator>,
    },
    Compiling,
    Succeeded(CompileResult),
    Failed {
        msg: String,
    },
}

impl CompileState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CompileState::Succeeded(_) | CompileState::Failed { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded,
    Failed { msg: String },
}

#[derive(Clone, Debug)]
pub struct LoadEntryInfo {
    pub requested_at: chrono::DateTime<chrono::Utc>,
    pub status: LoadStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_result_omits_absent_source_map() {
        let json = serde_json::to_string(&CompileResult::code("a")).unwrap();
        assert_eq!(json, r#"{"code":"a"}"#);
    }

    #[test]
    fn test_compile_result_uses_camel_case_source_map() {
        let result = CompileResult::with_source_map("a", Some("m".to_string()));
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"code":"a","sourceMap":"m"}"#);
    }
}
