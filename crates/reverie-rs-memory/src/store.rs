//! Durable vector store with cosine nearest-neighbor query.
//!
//! Layout on disk is a directory holding `meta.json` (store version,
//! embedding model identifier, dimension) and `records.jsonl`, an
//! append-only file of one record per line. The full record set is held in
//! memory, so reopening needs only a line scan and no index rebuild.

use crate::error::StoreError;
use crate::model::{MemoryRecord, ScoredRecord, TurnDraft};
use chrono::Utc;
use log::{debug, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const META_FILE: &str = "meta.json";
const RECORDS_FILE: &str = "records.jsonl";
const STORE_VERSION: u32 = 1;

/// Persisted store identity. Guards the embedding-space invariant.
#[derive(Debug, Serialize, Deserialize)]
struct StoreMeta {
    version: u32,
    embedding_model: String,
    dimension: usize,
}

#[derive(Debug)]
struct StoreState {
    records: Vec<MemoryRecord>,
    /// Append handle; `None` once the store has been closed.
    writer: Option<File>,
    next_seq: u64,
}

/// Append-only vector store persisted under a directory.
///
/// Insert is durable before it returns and atomic with respect to readers:
/// a concurrent query observes either the pre-insert or post-insert record
/// set, never a partial write. Records are never updated or deleted.
#[derive(Debug)]
pub struct VectorStore {
    path: PathBuf,
    embedding_model: String,
    dimension: usize,
    state: RwLock<StoreState>,
}

impl VectorStore {
    /// Open the store at `path`, creating an empty one if absent.
    ///
    /// Fails with [`StoreError::Corrupt`] when the on-disk form is
    /// unreadable and with [`StoreError::EmbeddingMismatch`] when the
    /// persisted embedding model identifier differs from `embedding_model`.
    pub fn open(
        path: impl AsRef<Path>,
        embedding_model: &str,
        dimension: usize,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let meta_path = path.join(META_FILE);
        let records_path = path.join(RECORDS_FILE);

        if meta_path.exists() {
            let contents = std::fs::read_to_string(&meta_path)?;
            let meta: StoreMeta =
                serde_json::from_str(&contents).map_err(|err| StoreError::Corrupt {
                    path: path.clone(),
                    reason: format!("unreadable meta: {err}"),
                })?;
            if meta.version != STORE_VERSION {
                return Err(StoreError::Corrupt {
                    path,
                    reason: format!("unsupported store version {}", meta.version),
                });
            }
            if meta.embedding_model != embedding_model {
                return Err(StoreError::EmbeddingMismatch {
                    expected: embedding_model.to_string(),
                    found: meta.embedding_model,
                });
            }
            if meta.dimension != dimension {
                return Err(StoreError::Dimension {
                    expected: dimension,
                    found: meta.dimension,
                });
            }
        } else {
            if records_path.exists() {
                return Err(StoreError::Corrupt {
                    path,
                    reason: "records present without meta".to_string(),
                });
            }
            std::fs::create_dir_all(&path)?;
            write_meta(
                &path,
                &StoreMeta {
                    version: STORE_VERSION,
                    embedding_model: embedding_model.to_string(),
                    dimension,
                },
            )?;
            info!(
                "created empty store (path={}, model={embedding_model}, dim={dimension})",
                path.display()
            );
        }

        let records = load_records(&path, &records_path, dimension)?;
        let next_seq = records.last().map_or(0, |record| record.seq + 1);
        let writer = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&records_path)?;
        info!(
            "opened store (path={}, records={}, model={embedding_model})",
            path.display(),
            records.len()
        );
        Ok(Self {
            path,
            embedding_model: embedding_model.to_string(),
            dimension,
            state: RwLock::new(StoreState {
                records,
                writer: Some(writer),
                next_seq,
            }),
        })
    }

    /// Append a new record, assigning its id and write order.
    ///
    /// The line is flushed and fsynced before the record becomes visible to
    /// queries and the id is returned, so a successful insert survives a
    /// crash immediately after.
    pub fn insert(&self, draft: TurnDraft) -> Result<Uuid, StoreError> {
        if draft.embedding.len() != self.dimension {
            return Err(StoreError::Dimension {
                expected: self.dimension,
                found: draft.embedding.len(),
            });
        }

        let mut state = self.state.write();
        let record = MemoryRecord {
            id: Uuid::new_v4(),
            input_text: draft.input_text,
            output_text: draft.output_text,
            embedding: draft.embedding,
            seq: state.next_seq,
            created_at: Utc::now(),
        };
        let line = serde_json::to_string(&record)?;

        let Some(writer) = state.writer.as_mut() else {
            return Err(StoreError::Closed);
        };
        writeln!(writer, "{line}")?;
        writer.sync_all()?;

        let id = record.id;
        debug!("inserted record (id={id}, seq={})", record.seq);
        state.next_seq += 1;
        state.records.push(record);
        Ok(id)
    }

    /// Return up to `k` nearest records by cosine similarity.
    ///
    /// Ties break toward the earliest write order. An empty store yields an
    /// empty result, never an error.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredRecord>, StoreError> {
        if vector.len() != self.dimension {
            return Err(StoreError::Dimension {
                expected: self.dimension,
                found: vector.len(),
            });
        }

        let state = self.state.read();
        if k == 0 || state.records.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(usize, f32)> = state
            .records
            .iter()
            .enumerate()
            .map(|(idx, record)| (idx, cosine_similarity(vector, &record.embedding)))
            .collect();
        scored.sort_by(|(a_idx, a_score), (b_idx, b_score)| {
            match b_score.partial_cmp(a_score).unwrap_or(Ordering::Equal) {
                Ordering::Equal => {
                    let a_seq = state.records[*a_idx].seq;
                    let b_seq = state.records[*b_idx].seq;
                    a_seq.cmp(&b_seq)
                }
                other => other,
            }
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(idx, score)| ScoredRecord {
                record: state.records[idx].clone(),
                score,
            })
            .collect())
    }

    /// Release the append handle. Idempotent; queries stay available, new
    /// inserts fail with [`StoreError::Closed`].
    pub fn close(&self) {
        let mut state = self.state.write();
        if state.writer.take().is_some() {
            debug!("closed store (path={})", self.path.display());
        }
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.state.read().records.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.state.read().records.is_empty()
    }

    /// Embedding model identifier this store was opened under.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Vector dimension this store was opened under.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two equal-length vectors. Zero-norm inputs
/// score 0.0 rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Write meta atomically: temp file then rename.
fn write_meta(path: &Path, meta: &StoreMeta) -> Result<(), StoreError> {
    let meta_path = path.join(META_FILE);
    let temp_path = path.join(format!("{META_FILE}.tmp"));
    let contents = serde_json::to_string_pretty(meta)?;
    std::fs::write(&temp_path, contents)?;
    std::fs::rename(temp_path, meta_path)?;
    Ok(())
}

/// Scan the records file into memory, validating every line.
fn load_records(
    path: &Path,
    records_path: &Path,
    dimension: usize,
) -> Result<Vec<MemoryRecord>, StoreError> {
    if !records_path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(records_path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: MemoryRecord =
            serde_json::from_str(&line).map_err(|err| StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!("record line {}: {err}", index + 1),
            })?;
        if record.embedding.len() != dimension {
            return Err(StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "record line {}: embedding has {} dims, store has {dimension}",
                    index + 1,
                    record.embedding.len()
                ),
            });
        }
        records.push(record);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{VectorStore, cosine_similarity};
    use crate::error::StoreError;
    use crate::model::TurnDraft;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::tempdir;

    const MODEL: &str = "test-embedder";

    fn draft(input: &str, output: &str, embedding: Vec<f32>) -> TurnDraft {
        TurnDraft {
            input_text: input.to_string(),
            output_text: output.to_string(),
            embedding,
        }
    }

    #[test]
    fn open_creates_empty_store() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        let store = VectorStore::open(&path, MODEL, 3).expect("open");
        assert!(store.is_empty());
        assert!(path.join("meta.json").exists());
    }

    #[test]
    fn query_on_empty_store_returns_empty() {
        let temp = tempdir().expect("tempdir");
        let store = VectorStore::open(temp.path().join("db"), MODEL, 3).expect("open");
        let results = store.query(&[1.0, 0.0, 0.0], 5).expect("query");
        assert!(results.is_empty());
    }

    #[test]
    fn inserted_record_is_its_own_nearest_neighbor() {
        let temp = tempdir().expect("tempdir");
        let store = VectorStore::open(temp.path().join("db"), MODEL, 3).expect("open");
        store
            .insert(draft("hello", "hi", vec![0.0, 1.0, 0.0]))
            .expect("insert");
        let id = store
            .insert(draft("bye", "see you", vec![1.0, 0.0, 1.0]))
            .expect("insert");

        let results = store.query(&[1.0, 0.0, 1.0], 1).expect("query");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.id, id);
        assert!((results[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn query_is_bounded_by_k_and_store_size() {
        let temp = tempdir().expect("tempdir");
        let store = VectorStore::open(temp.path().join("db"), MODEL, 2).expect("open");
        for n in 0..4 {
            store
                .insert(draft("q", "a", vec![1.0, n as f32]))
                .expect("insert");
        }
        assert_eq!(store.query(&[1.0, 0.0], 2).expect("query").len(), 2);
        assert_eq!(store.query(&[1.0, 0.0], 10).expect("query").len(), 4);
        assert!(store.query(&[1.0, 0.0], 0).expect("query").is_empty());
    }

    #[test]
    fn equal_scores_tie_break_by_write_order() {
        let temp = tempdir().expect("tempdir");
        let store = VectorStore::open(temp.path().join("db"), MODEL, 2).expect("open");
        // Identical embeddings, identical score against any query.
        let first = store.insert(draft("a", "1", vec![1.0, 1.0])).expect("insert");
        let second = store.insert(draft("b", "2", vec![1.0, 1.0])).expect("insert");

        let results = store.query(&[1.0, 1.0], 2).expect("query");
        assert_eq!(results[0].record.id, first);
        assert_eq!(results[1].record.id, second);
    }

    #[test]
    fn reopen_reproduces_identical_query_results() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        let query = [0.3, 0.9, 0.1];

        let store = VectorStore::open(&path, MODEL, 3).expect("open");
        for (input, embedding) in [
            ("one", vec![1.0, 0.0, 0.0]),
            ("two", vec![0.0, 1.0, 0.0]),
            ("three", vec![0.0, 0.0, 1.0]),
        ] {
            store.insert(draft(input, "reply", embedding)).expect("insert");
        }
        let before: Vec<_> = store
            .query(&query, 3)
            .expect("query")
            .into_iter()
            .map(|scored| (scored.record.id, scored.record.seq))
            .collect();
        store.close();

        let reopened = VectorStore::open(&path, MODEL, 3).expect("reopen");
        let after: Vec<_> = reopened
            .query(&query, 3)
            .expect("query")
            .into_iter()
            .map(|scored| (scored.record.id, scored.record.seq))
            .collect();
        assert_eq!(after, before);
    }

    #[test]
    fn seq_keeps_growing_across_reopen() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        let store = VectorStore::open(&path, MODEL, 1).expect("open");
        store.insert(draft("a", "1", vec![1.0])).expect("insert");
        store.insert(draft("b", "2", vec![1.0])).expect("insert");
        drop(store);

        let reopened = VectorStore::open(&path, MODEL, 1).expect("reopen");
        reopened.insert(draft("c", "3", vec![1.0])).expect("insert");
        let results = reopened.query(&[1.0], 3).expect("query");
        let seqs: Vec<u64> = results.iter().map(|scored| scored.record.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
    }

    #[test]
    fn mismatched_embedding_model_fails_to_open() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        let store = VectorStore::open(&path, "model-A", 2).expect("open");
        store.insert(draft("q", "a", vec![1.0, 0.0])).expect("insert");
        drop(store);

        let err = VectorStore::open(&path, "model-B", 2).expect_err("mismatch");
        match err {
            StoreError::EmbeddingMismatch { expected, found } => {
                assert_eq!(expected, "model-B");
                assert_eq!(found, "model-A");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mismatched_dimension_fails_to_open() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        VectorStore::open(&path, MODEL, 2).expect("open");

        let err = VectorStore::open(&path, MODEL, 3).expect_err("mismatch");
        assert!(matches!(
            err,
            StoreError::Dimension {
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn unreadable_meta_is_corrupt_not_empty() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        std::fs::create_dir_all(&path).expect("mkdir");
        std::fs::write(path.join("meta.json"), "{not json").expect("write");

        let err = VectorStore::open(&path, MODEL, 2).expect_err("corrupt");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn records_without_meta_are_corrupt() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        std::fs::create_dir_all(&path).expect("mkdir");
        std::fs::write(path.join("records.jsonl"), "{\"id\":1}\n").expect("write");

        let err = VectorStore::open(&path, MODEL, 2).expect_err("corrupt");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn garbled_record_line_is_corrupt() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("db");
        let store = VectorStore::open(&path, MODEL, 1).expect("open");
        store.insert(draft("q", "a", vec![1.0])).expect("insert");
        drop(store);

        use std::io::Write as _;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(path.join("records.jsonl"))
            .expect("open records");
        writeln!(file, "garbage").expect("append");

        let err = VectorStore::open(&path, MODEL, 1).expect_err("corrupt");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn wrong_length_vectors_are_rejected() {
        let temp = tempdir().expect("tempdir");
        let store = VectorStore::open(temp.path().join("db"), MODEL, 3).expect("open");
        let insert_err = store
            .insert(draft("q", "a", vec![1.0, 2.0]))
            .expect_err("dimension");
        assert!(matches!(insert_err, StoreError::Dimension { .. }));
        let query_err = store.query(&[1.0], 1).expect_err("dimension");
        assert!(matches!(query_err, StoreError::Dimension { .. }));
    }

    #[test]
    fn close_is_idempotent_and_blocks_inserts() {
        let temp = tempdir().expect("tempdir");
        let store = VectorStore::open(temp.path().join("db"), MODEL, 1).expect("open");
        store.insert(draft("q", "a", vec![1.0])).expect("insert");
        store.close();
        store.close();

        let err = store.insert(draft("q", "a", vec![1.0])).expect_err("closed");
        assert!(matches!(err, StoreError::Closed));
        // Reads remain available after close.
        assert_eq!(store.query(&[1.0], 1).expect("query").len(), 1);
    }

    #[test]
    fn concurrent_inserts_keep_unique_ids_and_all_records() {
        let temp = tempdir().expect("tempdir");
        let store = Arc::new(VectorStore::open(temp.path().join("db"), MODEL, 1).expect("open"));

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..5)
                        .map(|i| {
                            store
                                .insert(draft(
                                    &format!("q{n}-{i}"),
                                    "a",
                                    vec![1.0],
                                ))
                                .expect("insert")
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        let mut ids: Vec<_> = handles
            .into_iter()
            .flat_map(|handle| handle.join().expect("join"))
            .collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 40);
        assert_eq!(store.len(), 40);

        // Every write is durable: reopening sees all of them with distinct seqs.
        store.close();
        let reopened = VectorStore::open(temp.path().join("db"), MODEL, 1).expect("reopen");
        assert_eq!(reopened.len(), 40);
    }

    #[test]
    fn cosine_similarity_handles_zero_norm() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        let same = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]);
        assert!((same - 1.0).abs() < 1e-6);
        let opposite = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((opposite + 1.0).abs() < 1e-6);
    }
}
