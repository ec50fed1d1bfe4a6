//! JSON / JSONL document feeds.

use crate::engine::SearchServer;
use crate::index::{DocId, DocumentStatus};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One input record: `{"id": 0, "text": "...", "status": "active", "ratings": [1, 2]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub text: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub ratings: Vec<i32>,
}

/// Read records from a `.jsonl` file (one object per line, blank lines skipped)
/// or a `.json` file holding one object or an array of them.
pub fn read_docs(path: &Path) -> Result<Vec<InputDoc>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        let mut docs = Vec::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: InputDoc = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", path.display(), lineno + 1))?;
            docs.push(doc);
        }
        return Ok(docs);
    }
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs: Vec<InputDoc> = match json {
        serde_json::Value::Array(_) => serde_json::from_value(json)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(docs)
}

/// Add every record of `path` to `server`. Stops at the first rejected document.
pub fn load_corpus(server: &mut SearchServer, path: &Path) -> Result<usize> {
    let docs = read_docs(path)?;
    for doc in &docs {
        server
            .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
            .with_context(|| format!("adding document {}", doc.id))?;
    }
    tracing::info!(path = %path.display(), documents = docs.len(), "corpus loaded");
    Ok(docs.len())
}
