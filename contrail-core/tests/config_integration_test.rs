//! Integration tests for loading configuration files.

use contrail_core::ContrailError;
use contrail_core::config::{ContrailConfig, IndexConfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const TOML_CONFIG: &str = r#"
[retrieval]
top_k = 4
max_docs_for_context = 8
synthesis_timeout_ms = 30000

[llm]
provider = "openai"
model = "gpt-4o-mini"
api_key = "test-key"
temperature = 0.7

[synthesis_llm]
provider = "openai"
model = "gpt-4o"
api_key = "test-key"
temperature = 0.1

[embedder]
provider = "openai"
model = "text-embedding-3-small"
api_key = "test-key"
dimension = 1536

[index]
type = "qdrant"
url = "http://localhost:6334"
collection_name = "airline-policies"
dimension = 1536
"#;

#[test]
fn test_load_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contrail.toml");
    std::fs::write(&path, TOML_CONFIG).unwrap();

    let config = ContrailConfig::from_file(&path).unwrap();

    assert_eq!(config.retrieval.top_k, 4);
    assert_eq!(config.retrieval.max_docs_for_context, 8);
    assert_eq!(config.retrieval.synthesis_timeout_ms, 30_000);
    assert_eq!(config.retrieval.max_expanded_queries, 4);
    assert_eq!(config.synthesis_llm().model, "gpt-4o");
    assert_eq!(
        config.index,
        IndexConfig::Qdrant {
            url: "http://localhost:6334".to_string(),
            collection_name: "airline-policies".to_string(),
            dimension: 1536,
            api_key: None,
            timeout_secs: 30,
        }
    );
}

#[test]
fn test_load_json_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contrail.json");
    let json = serde_json::json!({
        "llm": { "provider": "ollama", "model": "llama3.1" },
        "index": { "type": "memory", "dimension": 384 }
    });
    std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

    let config = ContrailConfig::from_file(&path).unwrap();

    assert_eq!(config.llm.provider, "ollama");
    assert_eq!(config.index.dimension(), 384);
    assert_eq!(config.retrieval.top_k, 3);
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contrail.yaml");
    std::fs::write(&path, "llm: {}").unwrap();

    let result = ContrailConfig::from_file(&path);
    assert!(matches!(result, Err(ContrailError::Configuration { .. })));
}

#[test]
fn test_missing_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = ContrailConfig::from_file(temp_dir.path().join("missing.toml"));
    assert!(matches!(result, Err(ContrailError::Io(_))));
}

#[test]
fn test_invalid_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("contrail.toml");
    std::fs::write(
        &path,
        r#"
[retrieval]
rrf_k = 0.0

[llm]
provider = "ollama"
model = "llama3.1"
"#,
    )
    .unwrap();

    let result = ContrailConfig::from_file(&path);
    assert!(matches!(result, Err(ContrailError::Configuration { .. })));
}
