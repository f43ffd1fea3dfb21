pub mod check;
pub mod evaluate;
pub mod provenance;
pub mod schedule;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use sw_engine::{Engine, EngineConfig};
use sw_model::{BaseFacts, DerivedState, SourcedEffect};

/// One corpus file and the bundles it holds.
pub struct CorpusFile {
    pub path: PathBuf,
    pub bundles: Vec<SourcedEffect>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

/// Expand corpus arguments: files are kept, directories contribute their
/// `.json` files in name order.
fn corpus_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, String> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(format!("corpus not found: {}", path.display()));
        }
    }
    Ok(files)
}

/// Load every corpus file. Each holds a JSON array of sourced effects.
pub fn load_corpus(paths: &[PathBuf]) -> Result<Vec<CorpusFile>, String> {
    corpus_paths(paths)?
        .into_iter()
        .map(|path| {
            let bundles = read_json(&path)?;
            Ok(CorpusFile { path, bundles })
        })
        .collect()
}

/// Load a corpus as one flat list of bundles.
pub fn load_effects(paths: &[PathBuf]) -> Result<Vec<SourcedEffect>, String> {
    Ok(load_corpus(paths)?
        .into_iter()
        .flat_map(|file| file.bundles)
        .collect())
}

/// Read inputs and run the engine.
pub fn evaluate_character(
    config: &EngineConfig,
    character: &Path,
    corpus: &[PathBuf],
    temporary: Option<&Path>,
) -> Result<DerivedState, String> {
    let facts: BaseFacts = read_json(character)?;
    let permanent = load_effects(corpus)?;
    let temporary: Vec<SourcedEffect> = match temporary {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    tracing::debug!(
        permanent = permanent.len(),
        temporary = temporary.len(),
        "loaded effects"
    );

    Engine::new(config.clone())
        .evaluate(&facts, &permanent, &temporary)
        .map_err(|e| e.to_string())
}

/// Format a modifier with an explicit sign.
pub fn signed(value: i32) -> String {
    if value >= 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}
