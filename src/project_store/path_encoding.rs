use serde::{Deserialize, Serialize};

/// How a project path is turned into the name of its data directory.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EncodingMode {
    /// `/Users/foo/project` → `-Users-foo-project`. Lossy: `/a-b` and `/a/b`
    /// share a name. This is what the data directory actually contains.
    #[default]
    Dash,
    /// `/Users/foo/project` → `-5_Users-3_foo-7_project`. Injective, but it
    /// will not match directories created by anything else.
    LengthPrefixed,
}

impl EncodingMode {
    pub fn encode(self, path: &str) -> String {
        match self {
            EncodingMode::Dash => encode_project_path(path),
            EncodingMode::LengthPrefixed => encode_length_prefixed(path),
        }
    }
}

/// Encode an absolute project path into a directory-safe name.
///
/// `/Users/foo/project` → `-Users-foo-project`
///
/// Delimiters already present in the path are not escaped.
pub fn encode_project_path(path: &str) -> String {
    path.replace('/', "-")
}

fn encode_length_prefixed(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| format!("{}_{}", s.len(), s))
        .collect();
    let body = segments.join("-");
    if path.starts_with('/') {
        format!("-{body}")
    } else {
        body
    }
}
