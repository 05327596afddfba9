use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a request lands on disk. Built once by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocation {
    pub absolute_path: PathBuf,
    pub is_directory_shaped: bool,
}

/// Decoded request body text, passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContent {
    pub text: String,
}

/// Retrieve response. Request bodies are decoded in `content::decode_body`.
#[derive(Serialize, Debug)]
pub struct ContentBody {
    #[serde(rename = "Content")]
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorBody {
    #[serde(rename = "Error")]
    pub error: String,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct DirectoryStatistics {
    #[serde(rename = "NumFiles")]
    pub file_count: usize,
    #[serde(rename = "TotalBytes")]
    pub total_bytes: u64,
    #[serde(rename = "AvgNumAlphaCharsPerFile")]
    pub avg_alpha_chars_per_file: f64,
    #[serde(rename = "StdNumAlphaCharsPerFile")]
    pub std_alpha_chars_per_file: f64,
    #[serde(rename = "AvgWordLength")]
    pub avg_word_length: f64,
    #[serde(rename = "StdWordLength")]
    pub std_word_length: f64,
}
