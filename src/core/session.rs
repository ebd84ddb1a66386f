//! Session control
//!
//! A [`Session`] is one de-identification run: a secret, a manifest, a search
//! root and a fresh output directory. [`SessionController`] drives the phases
//! in order and owns the collaborators that outlive a session (the pseudonym
//! store and the binary transform).
//!
//! ```text
//! secret -> manifest -> search root -> [manifest phase] -> [executor phase] -> report
//! ```
//!
//! The manifest phase runs to completion before any recording is dispatched.
//! Its failures abort the session; executor failures are per file.

use crate::adapters::mfer::BinaryTransform;
use crate::adapters::store::PseudonymStore;
use crate::config::{DeidConfig, SecretString};
use crate::core::executor::{AnonymizationExecutor, RunSummary};
use crate::core::manifest::{ManifestIngest, ManifestProcessor};
use crate::core::pseudonym::Pseudonymizer;
use crate::domain::{DeidError, Result};
use crate::{log_run_complete, log_run_start};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Format of run directory names
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d-%H%M%S";

/// Pick a run directory under `output_root` named after `started_at`
///
/// When a directory with that name already exists (two runs in the same
/// second) a `-1`, `-2`, ... suffix is appended until the name is free. The
/// directory is not created here.
pub fn run_directory<Tz>(output_root: &Path, started_at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let base = started_at.format(RUN_DIR_FORMAT).to_string();
    let candidate = output_root.join(&base);
    if !candidate.exists() {
        return candidate;
    }

    let mut suffix = 1u32;
    loop {
        let candidate = output_root.join(format!("{base}-{suffix}"));
        if !candidate.exists() {
            return candidate;
        }
        suffix += 1;
    }
}

/// Inputs and state of one de-identification run
#[derive(Debug)]
pub struct Session {
    secret: SecretString,

    /// Manifest CSV being processed
    pub manifest_path: PathBuf,

    /// Root of the recording tree
    pub search_root: PathBuf,

    /// Where the redacted manifest and anonymized recordings go
    pub output_dir: PathBuf,

    /// Filenames collected from the manifest, filled by the manifest phase
    pub target_filenames: Vec<String>,
}

impl Session {
    /// Create a session with an explicit output directory
    pub fn new(
        secret: SecretString,
        manifest_path: impl Into<PathBuf>,
        search_root: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            secret,
            manifest_path: manifest_path.into(),
            search_root: search_root.into(),
            output_dir: output_dir.into(),
            target_filenames: Vec::new(),
        }
    }

    /// The session secret
    pub fn secret(&self) -> &SecretString {
        &self.secret
    }
}

/// What a completed session produced
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// Run directory
    pub output_dir: PathBuf,

    /// Redacted manifest written into the run directory
    pub redacted_manifest: PathBuf,

    /// Manifest phase counts
    pub manifest: ManifestIngest,

    /// Executor phase outcome
    pub summary: RunSummary,
}

/// Drives sessions through the manifest and executor phases
pub struct SessionController {
    output_root: PathBuf,
    manifest: ManifestProcessor,
    executor: AnonymizationExecutor,
    store: Arc<dyn PseudonymStore>,
}

impl SessionController {
    /// Create a controller
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest settings are invalid.
    pub fn new(
        config: &DeidConfig,
        store: Arc<dyn PseudonymStore>,
        transform: Arc<dyn BinaryTransform>,
    ) -> Result<Self> {
        Ok(Self {
            output_root: config.paths.output_root.clone(),
            manifest: ManifestProcessor::new(&config.manifest)?,
            executor: AnonymizationExecutor::new(transform, &config.executor),
            store,
        })
    }

    /// Root under which run directories are created
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Check the inputs and open a session with a fresh run directory
    ///
    /// # Errors
    ///
    /// Returns [`DeidError::Session`] if the manifest is not a file or the
    /// search root is not a directory.
    pub fn begin(
        &self,
        secret: SecretString,
        manifest_path: impl Into<PathBuf>,
        search_root: impl Into<PathBuf>,
    ) -> Result<Session> {
        let manifest_path = manifest_path.into();
        let search_root = search_root.into();

        if !manifest_path.is_file() {
            return Err(DeidError::Session(format!(
                "Manifest not found: {}",
                manifest_path.display()
            )));
        }
        if !search_root.is_dir() {
            return Err(DeidError::Session(format!(
                "Search root is not a directory: {}",
                search_root.display()
            )));
        }

        let output_dir = run_directory(&self.output_root, &chrono::Local::now());
        Ok(Session::new(secret, manifest_path, search_root, output_dir))
    }

    /// Run the manifest phase then the executor phase
    ///
    /// Returns once every dispatched recording has been handled.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest phase fails. Per-file problems in
    /// the executor phase are reported in the [`RunSummary`] instead.
    pub async fn run(&self, session: &mut Session) -> Result<SessionReport> {
        let started = Instant::now();
        log_run_start!(session.manifest_path, session.search_root, session.output_dir);

        let pseudonymizer = Pseudonymizer::new(session.secret.clone());
        let outcome = self
            .manifest
            .process(
                &session.manifest_path,
                &session.output_dir,
                &pseudonymizer,
                self.store.as_ref(),
            )
            .await?;

        session.target_filenames = outcome.ingest.target_filenames.clone();

        let summary = self
            .executor
            .run(
                &session.target_filenames,
                &session.search_root,
                &session.output_dir,
            )
            .await;

        log_run_complete!(summary, started.elapsed());

        Ok(SessionReport {
            output_dir: session.output_dir.clone(),
            redacted_manifest: outcome.redacted_path,
            manifest: outcome.ingest,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mfer::MferAnonymizer;
    use crate::adapters::store::InMemoryStore;
    use crate::config::secret_string;
    use crate::core::pseudonym::pseudonymize;
    use chrono::Utc;
    use std::fs;
    use tempfile::tempdir;

    fn started_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 5, 7).unwrap()
    }

    fn config(output_root: &Path) -> DeidConfig {
        let mut config = DeidConfig::default();
        config.paths.output_root = output_root.to_path_buf();
        config.manifest.encoding = "utf-8".to_string();
        config
    }

    #[test]
    fn test_run_directory_name() {
        let dir = tempdir().unwrap();
        assert_eq!(
            run_directory(dir.path(), &started_at()),
            dir.path().join("2025-03-14-090507")
        );
    }

    #[test]
    fn test_run_directory_collision_gets_suffix() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("2025-03-14-090507")).unwrap();
        fs::create_dir(dir.path().join("2025-03-14-090507-1")).unwrap();

        assert_eq!(
            run_directory(dir.path(), &started_at()),
            dir.path().join("2025-03-14-090507-2")
        );
    }

    #[test]
    fn test_begin_rejects_missing_manifest() {
        let dir = tempdir().unwrap();
        let controller = SessionController::new(
            &config(dir.path()),
            Arc::new(InMemoryStore::new()),
            Arc::new(MferAnonymizer::default()),
        )
        .unwrap();

        let err = controller
            .begin(secret_string("s".into()), dir.path().join("none.csv"), dir.path())
            .unwrap_err();
        assert!(matches!(err, DeidError::Session(_)));
    }

    #[test]
    fn test_begin_rejects_file_as_search_root() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        fs::write(&manifest, "a.mwf,x,PID\n").unwrap();
        let controller = SessionController::new(
            &config(dir.path()),
            Arc::new(InMemoryStore::new()),
            Arc::new(MferAnonymizer::default()),
        )
        .unwrap();

        let err = controller
            .begin(secret_string("s".into()), &manifest, &manifest)
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data");
        fs::create_dir_all(data.join("ward")).unwrap();
        // Minimal MFER stream: patient id tag, then end marker
        fs::write(data.join("ward").join("rec1.mwf"), [0x82, 0x03, b'P', b'I', b'D', 0x80]).unwrap();
        let manifest = dir.path().join("list.csv");
        fs::write(&manifest, "rec1.mwf,X,PID123,extra\nrec2.mwf,Y,PID999,extra\n").unwrap();

        let store = Arc::new(InMemoryStore::new());
        let controller = SessionController::new(
            &config(&dir.path().join("out")),
            store.clone(),
            Arc::new(MferAnonymizer::default()),
        )
        .unwrap();

        let mut session = controller
            .begin(secret_string("s".into()), &manifest, &data)
            .unwrap();
        let report = controller.run(&mut session).await.unwrap();

        assert_eq!(session.target_filenames, vec!["rec1.mwf", "rec2.mwf"]);
        assert_eq!(report.summary.written, 1);
        assert_eq!(report.summary.not_found, 1);
        assert_eq!(
            fs::read(report.output_dir.join("rec1.mwf")).unwrap(),
            vec![0x82, 0x03, 0, 0, 0, 0x80]
        );

        let redacted = fs::read_to_string(&report.redacted_manifest).unwrap();
        let first_line = redacted.lines().next().unwrap();
        assert_eq!(
            first_line,
            format!("rec1.mwf,X,{}", pseudonymize("PID123", "s"))
        );
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_run_aborts_on_undecodable_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.csv");
        fs::write(&manifest, b"rec.mwf,\xC3\x28,PID\n").unwrap();
        let store = Arc::new(InMemoryStore::new());
        let controller = SessionController::new(
            &config(&dir.path().join("out")),
            store.clone(),
            Arc::new(MferAnonymizer::default()),
        )
        .unwrap();

        let mut session = controller
            .begin(secret_string("s".into()), &manifest, dir.path())
            .unwrap();

        assert!(controller.run(&mut session).await.is_err());
        assert!(session.target_filenames.is_empty());
        assert!(store.is_empty().await);
    }
}
