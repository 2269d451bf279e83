use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::appearance::domain::appearance_record::AppearanceRecord;
use crate::identity::domain::identity::{FaceId, Identity};
use crate::pipeline::detection_job::DetectionJob;
use crate::storage::domain::record_store::{
    AppearanceStore, CollectionRegistry, IdentityStore, JobStore,
};
use crate::storage::domain::store_error::StoreError;

const COLLECTIONS_FILE: &str = "collections.json";
const FACES_FILE: &str = "faces.json";
const JOBS_FILE: &str = "jobs.json";
const RESULTS_DIR: &str = "results";

/// video_timestamp → record, for one job
type JobRecords = BTreeMap<String, AppearanceRecord>;

/// Record tables kept as JSON documents under a data directory.
///
/// Each table is loaded once and rewritten in full on every mutation
/// (temp file + rename). Appearance records get one document per job under
/// `results/`, so a frame's batch only rewrites its own job. Suited to a
/// single indexing process; concurrent processes sharing a directory will
/// overwrite each other.
pub struct JsonRecordStore {
    collections: Table<BTreeSet<String>>,
    faces: Table<BTreeMap<String, Identity>>,
    jobs: Table<BTreeMap<String, DetectionJob>>,
    results: JobResults,
}

impl JsonRecordStore {
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir).map_err(|source| StoreError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            collections: Table::open(data_dir.join(COLLECTIONS_FILE))?,
            faces: Table::open(data_dir.join(FACES_FILE))?,
            jobs: Table::open(data_dir.join(JOBS_FILE))?,
            results: JobResults::open(data_dir.join(RESULTS_DIR))?,
        })
    }
}

impl IdentityStore for JsonRecordStore {
    fn put(&self, identity: &Identity) -> Result<(), StoreError> {
        self.faces.write(|faces| {
            faces.insert(identity.face_id.to_string(), identity.clone());
        })
    }

    fn find_by_filepath(&self, filepath: &str) -> Result<Vec<Identity>, StoreError> {
        self.faces.read(|faces| {
            faces
                .values()
                .filter(|i| i.filepath == filepath)
                .cloned()
                .collect()
        })
    }

    fn delete(&self, face_id: &FaceId) -> Result<(), StoreError> {
        self.faces.write(|faces| {
            faces.remove(face_id.as_str());
        })
    }
}

impl CollectionRegistry for JsonRecordStore {
    fn contains(&self, collection_id: &str) -> Result<bool, StoreError> {
        self.collections.read(|c| c.contains(collection_id))
    }

    fn insert(&self, collection_id: &str) -> Result<(), StoreError> {
        self.collections.write(|c| {
            c.insert(collection_id.to_string());
        })
    }
}

impl JobStore for JsonRecordStore {
    fn put(&self, job: &DetectionJob) -> Result<(), StoreError> {
        self.jobs.write(|jobs| {
            jobs.insert(job.job_id.clone(), job.clone());
        })
    }

    fn get(&self, job_id: &str) -> Result<Option<DetectionJob>, StoreError> {
        self.jobs.read(|jobs| jobs.get(job_id).cloned())
    }
}

impl AppearanceStore for JsonRecordStore {
    fn put_batch(&self, records: &[AppearanceRecord]) -> Result<(), StoreError> {
        let mut by_job: BTreeMap<&str, Vec<&AppearanceRecord>> = BTreeMap::new();
        for record in records {
            by_job.entry(record.job_id.as_str()).or_default().push(record);
        }
        for (job_id, batch) in by_job {
            self.results.table(job_id)?.write(|rows| {
                for record in batch {
                    rows.insert(record.video_timestamp.clone(), record.clone());
                }
            })?;
        }
        Ok(())
    }

    fn list_for_job(&self, job_id: &str) -> Result<Vec<AppearanceRecord>, StoreError> {
        let mut records: Vec<AppearanceRecord> = self
            .results
            .table(job_id)?
            .read(|rows| rows.values().cloned().collect())?;
        records.sort_by_key(|r| timestamp_sort_key(&r.video_timestamp));
        Ok(records)
    }
}

/// Orders `{ms}_{index}` numerically on both parts; anything unparsable
/// sorts last, by string.
fn timestamp_sort_key(video_timestamp: &str) -> (i64, i64, String) {
    let parsed: Option<(i64, i64)> = video_timestamp
        .split_once('_')
        .and_then(|(ms, idx)| Some((ms.parse().ok()?, idx.parse().ok()?)));
    match parsed {
        Some((ms, idx)) => (ms, idx, String::new()),
        None => (i64::MAX, i64::MAX, video_timestamp.to_string()),
    }
}

/// Per-job appearance documents, opened on first use and locked per job.
struct JobResults {
    dir: PathBuf,
    tables: Mutex<HashMap<String, Arc<Table<JobRecords>>>>,
}

impl JobResults {
    fn open(dir: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            tables: Mutex::new(HashMap::new()),
        })
    }

    fn table(&self, job_id: &str) -> Result<Arc<Table<JobRecords>>, StoreError> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        if let Some(table) = tables.get(job_id) {
            return Ok(table.clone());
        }
        let table = Arc::new(Table::open(self.dir.join(job_file_name(job_id)))?);
        tables.insert(job_id.to_string(), table.clone());
        Ok(table)
    }
}

/// Percent-encodes the job id so it always names a single file.
fn job_file_name(job_id: &str) -> String {
    format!("{}.json", urlencoding::encode(job_id))
}

/// One JSON document guarded by a mutex.
struct Table<T> {
    path: PathBuf,
    rows: Mutex<T>,
}

impl<T> Table<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    fn open(path: PathBuf) -> Result<Self, StoreError> {
        let rows = if path.exists() {
            let json = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&json).map_err(|source| StoreError::Serde {
                path: path.clone(),
                source,
            })?
        } else {
            T::default()
        };
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, StoreError> {
        let rows = self.rows.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(f(&rows))
    }

    /// Applies `f` to a copy, persists it, then swaps it in, so a failed
    /// write leaves the in-memory table unchanged.
    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, StoreError> {
        let mut rows = self.rows.lock().map_err(|_| StoreError::Poisoned)?;
        let mut next = rows.clone();
        let result = f(&mut next);
        persist(&self.path, &next)?;
        *rows = next;
        Ok(result)
    }
}

fn persist<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serde {
        path: path.to_path_buf(),
        source,
    })?;
    let temp_path = path.with_extension("json.part");
    fs::write(&temp_path, json).map_err(|source| StoreError::Io {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
