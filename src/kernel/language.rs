use rustc_hash::{FxHashMap, FxHashSet};

/// Language names understood by the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionLanguage {
    Java,
    Python,
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    CSharp,
    C,
    Cpp,
    Go,
    Kotlin,
    Php,
    Ruby,
    Rust,
    Scala,
    Shell,
    Sql,
    Plaintext,
}

impl CompletionLanguage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Jsx => "jsx",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::CSharp => "csharp",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Go => "go",
            Self::Kotlin => "kotlin",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Rust => "rust",
            Self::Scala => "scala",
            Self::Shell => "shell",
            Self::Sql => "sql",
            Self::Plaintext => "plaintext",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let lang = match name {
            "java" => Self::Java,
            "python" => Self::Python,
            "javascript" => Self::JavaScript,
            "jsx" => Self::Jsx,
            "typescript" => Self::TypeScript,
            "tsx" => Self::Tsx,
            "csharp" => Self::CSharp,
            "c" => Self::C,
            "cpp" => Self::Cpp,
            "go" => Self::Go,
            "kotlin" => Self::Kotlin,
            "php" => Self::Php,
            "ruby" => Self::Ruby,
            "rust" => Self::Rust,
            "scala" => Self::Scala,
            "shell" => Self::Shell,
            "sql" => Self::Sql,
            "plaintext" => Self::Plaintext,
            _ => return None,
        };
        Some(lang)
    }

    /// Folds JSX-flavoured dialects into their base language. The service only
    /// models the base languages at request time.
    pub fn collapse_dialect(self) -> Self {
        match self {
            Self::Tsx => Self::TypeScript,
            Self::Jsx => Self::JavaScript,
            other => other,
        }
    }
}

impl std::str::FromStr for CompletionLanguage {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown completion language: {0}")]
pub struct UnknownLanguage(pub String);

impl std::fmt::Display for CompletionLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const DEFAULT_MAPPINGS: &[(&str, CompletionLanguage)] = &[
    ("java", CompletionLanguage::Java),
    ("python", CompletionLanguage::Python),
    ("javascriptreact", CompletionLanguage::Jsx),
    ("javascript", CompletionLanguage::JavaScript),
    ("typescript", CompletionLanguage::TypeScript),
    ("typescriptreact", CompletionLanguage::Tsx),
    ("csharp", CompletionLanguage::CSharp),
    ("c", CompletionLanguage::C),
    ("cpp", CompletionLanguage::Cpp),
    ("go", CompletionLanguage::Go),
    ("kotlin", CompletionLanguage::Kotlin),
    ("php", CompletionLanguage::Php),
    ("ruby", CompletionLanguage::Ruby),
    ("rust", CompletionLanguage::Rust),
    ("scala", CompletionLanguage::Scala),
    ("shellscript", CompletionLanguage::Shell),
    ("sql", CompletionLanguage::Sql),
];

/// Editor language id -> completion language table.
///
/// Built once and only queried afterwards. `is_supported` accepts either
/// naming scheme, so callers holding a service language name (`tsx`) and
/// callers holding an editor id (`typescriptreact`) get the same answer.
#[derive(Debug, Clone)]
pub struct LanguageContext {
    by_editor_id: FxHashMap<String, CompletionLanguage>,
    supported: FxHashSet<String>,
}

impl LanguageContext {
    pub fn with_mappings<I, S>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (S, CompletionLanguage)>,
        S: Into<String>,
    {
        let mut by_editor_id = FxHashMap::default();
        let mut supported = FxHashSet::default();
        for (editor_id, language) in mappings {
            let editor_id = editor_id.into();
            supported.insert(editor_id.clone());
            supported.insert(language.as_str().to_string());
            by_editor_id.insert(editor_id, language);
        }
        Self {
            by_editor_id,
            supported,
        }
    }

    pub fn map(&self, editor_language_id: &str) -> Option<CompletionLanguage> {
        self.by_editor_id.get(editor_language_id).copied()
    }

    pub fn normalize(&self, editor_language_id: &str) -> CompletionLanguage {
        self.map(editor_language_id)
            .unwrap_or(CompletionLanguage::Plaintext)
    }

    pub fn is_supported(&self, id: &str) -> bool {
        self.supported.contains(id)
    }

    pub fn collapse_dialect(&self, language: CompletionLanguage) -> CompletionLanguage {
        language.collapse_dialect()
    }

    /// Language to put on the wire for a document with `editor_language_id`.
    pub fn request_language(&self, editor_language_id: &str) -> CompletionLanguage {
        self.collapse_dialect(self.normalize(editor_language_id))
    }

    pub fn len(&self) -> usize {
        self.by_editor_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_editor_id.is_empty()
    }
}

impl Default for LanguageContext {
    fn default() -> Self {
        Self::with_mappings(DEFAULT_MAPPINGS.iter().copied())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/language.rs"]
mod tests;
