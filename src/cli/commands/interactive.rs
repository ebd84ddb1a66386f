//! Interactive command implementation
//!
//! The operator loop: secret, manifest, recordings folder, run, then offer
//! another session. A failed session is reported and the loop continues.
//!
//! Both the manifest and the folder are picked with the same browser. The
//! folder browser opens where the manifest was found.

use super::{build_controller, exit_code, print_report, DEFAULT_SECRET_ENV};
use crate::cli::prompt::{confirm, list_manifest_candidates, prompt_line, read_secret};
use crate::config::{DeidConfig, SecretString};
use crate::core::session::SessionController;
use clap::Args;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

/// Arguments for the interactive command
#[derive(Args, Debug)]
pub struct InteractiveArgs {
    /// Directory the manifest browser opens in (default: paths.browse_root)
    #[arg(long)]
    pub browse_root: Option<PathBuf>,
}

impl InteractiveArgs {
    /// Execute the interactive command
    pub async fn execute(&self, config: &DeidConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting interactive session loop");

        let controller = match build_controller(config) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize session controller");
                eprintln!("Failed to initialize: {e}");
                return Ok(2);
            }
        };

        let browse_root = self
            .browse_root
            .clone()
            .unwrap_or_else(|| config.paths.browse_root.clone());

        println!("🩺 MFER de-identification");
        println!("   Output root: {}", controller.output_root().display());

        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut output = std::io::stdout();
        let mut last_code = 0;

        loop {
            println!();
            let secret = match read_secret("Secret key: ", DEFAULT_SECRET_ENV) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("❌ {e}");
                    if std::io::stdin().is_terminal() {
                        continue;
                    }
                    return Ok(5);
                }
            };

            let Some(code) = run_once(
                &controller,
                secret,
                &browse_root,
                &mut input,
                &mut output,
            )
            .await?
            else {
                break;
            };
            last_code = code;

            if !confirm(&mut input, &mut output, "Process another manifest? [y/N]: ")? {
                break;
            }
        }

        println!("👋 Bye");
        Ok(last_code)
    }
}

/// One pass through the loop; `None` when the operator closed input
async fn run_once<R: BufRead, W: Write>(
    controller: &SessionController,
    secret: SecretString,
    browse_root: &Path,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Option<i32>> {
    let Some(manifest) = choose_manifest(input, output, browse_root)? else {
        return Ok(None);
    };
    let browse_from = manifest.parent().unwrap_or(browse_root).to_path_buf();
    let Some(search_root) = choose_directory(input, output, &browse_from)? else {
        return Ok(None);
    };

    let mut session = match controller.begin(secret, manifest, search_root) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open session");
            writeln!(output, "❌ {e}")?;
            return Ok(Some(5));
        }
    };

    writeln!(output, "🚀 Processing {}", session.manifest_path.display())?;

    match controller.run(&mut session).await {
        Ok(report) => {
            print_report(&report);
            Ok(Some(exit_code(&report.summary)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            writeln!(output, "❌ Run aborted: {e}")?;
            Ok(Some(5))
        }
    }
}

/// Answer that selects the directory the folder browser is showing
pub const SELECT_CURRENT: &str = ".";

/// What a browser session ends with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pick {
    Manifest,
    Directory,
}

/// Browse from `start` until the operator names a manifest file
///
/// Entering a directory opens it; relative answers are resolved against the
/// directory currently shown. Returns `None` at end of input.
pub fn choose_manifest<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    start: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    browse(input, output, start, Pick::Manifest)
}

/// Browse from `start` until the operator selects the folder holding the
/// recordings
///
/// Works like [`choose_manifest`] but lists directories only; answering
/// [`SELECT_CURRENT`] picks the directory being shown.
pub fn choose_directory<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    start: &Path,
) -> anyhow::Result<Option<PathBuf>> {
    browse(input, output, start, Pick::Directory)
}

fn browse<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    start: &Path,
    pick: Pick,
) -> anyhow::Result<Option<PathBuf>> {
    let prompt = match pick {
        Pick::Manifest => "Manifest (file or directory): ",
        Pick::Directory => "Recordings folder (directory, or . to select this one): ",
    };
    let mut current = start.to_path_buf();

    loop {
        writeln!(output)?;
        writeln!(output, "📂 {}", current.display())?;
        match list_manifest_candidates(&current) {
            Ok(listing) => {
                for dir in &listing.directories {
                    writeln!(output, "  {}/", display_name(dir))?;
                }
                if pick == Pick::Manifest {
                    for manifest in &listing.manifests {
                        writeln!(output, "  {}", display_name(manifest))?;
                    }
                }
            }
            Err(e) => writeln!(output, "  ⚠️  {e:#}")?,
        }

        let Some(answer) = prompt_line(input, output, prompt)? else {
            return Ok(None);
        };
        if answer.is_empty() {
            continue;
        }
        if pick == Pick::Directory && answer == SELECT_CURRENT {
            return Ok(Some(current));
        }

        let candidate = {
            let path = PathBuf::from(&answer);
            if path.is_absolute() {
                path
            } else {
                current.join(path)
            }
        };

        if candidate.is_dir() {
            current = candidate;
        } else if candidate.is_file() && pick == Pick::Manifest {
            return Ok(Some(candidate));
        } else if candidate.is_file() {
            writeln!(output, "❌ Not a directory: {}", candidate.display())?;
        } else {
            writeln!(output, "❌ Not found: {}", candidate.display())?;
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mfer::MferAnonymizer;
    use crate::adapters::store::InMemoryStore;
    use crate::config::secret_string;
    use std::io::Cursor;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_choose_manifest_walks_into_directory() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("2024")).unwrap();
        std::fs::write(dir.path().join("2024").join("list.csv"), "").unwrap();

        let mut input = Cursor::new("missing.csv\n2024\nlist.csv\n");
        let mut output = Vec::new();

        let chosen = choose_manifest(&mut input, &mut output, dir.path()).unwrap();

        assert_eq!(chosen, Some(dir.path().join("2024").join("list.csv")));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("2024/"));
        assert!(shown.contains("Not found"));
        assert!(shown.contains("list.csv"));
    }

    #[test]
    fn test_choose_manifest_end_of_input() {
        let dir = tempdir().unwrap();
        let mut output = Vec::new();
        let chosen = choose_manifest(&mut Cursor::new(""), &mut output, dir.path()).unwrap();
        assert_eq!(chosen, None);
    }

    #[test]
    fn test_choose_directory_selects_current() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("2024").join("ward")).unwrap();
        std::fs::create_dir(dir.path().join(".cache")).unwrap();
        std::fs::write(dir.path().join("list.csv"), "").unwrap();

        let mut input = Cursor::new("list.csv\nnowhere\n\n2024\n.\n");
        let mut output = Vec::new();

        let chosen = choose_directory(&mut input, &mut output, dir.path()).unwrap();

        assert_eq!(chosen, Some(dir.path().join("2024")));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Not a directory"));
        assert!(shown.contains("Not found"));
        assert!(shown.contains("ward/"));
        assert!(!shown.contains("  list.csv"));
        assert!(!shown.contains(".cache"));
    }

    #[test]
    fn test_choose_directory_can_go_up() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let mut input = Cursor::new("..\n.\n");
        let mut output = Vec::new();

        let chosen = choose_directory(&mut input, &mut output, &nested)
            .unwrap()
            .unwrap();

        assert_eq!(chosen.canonicalize().unwrap(), dir.path().join("a").canonicalize().unwrap());
    }

    #[test]
    fn test_choose_directory_end_of_input() {
        let dir = tempdir().unwrap();
        let mut output = Vec::new();
        let chosen = choose_directory(&mut Cursor::new("2024\n"), &mut output, dir.path()).unwrap();
        assert_eq!(chosen, None);
    }

    fn controller(output_root: &Path) -> SessionController {
        let mut config = DeidConfig::default();
        config.paths.output_root = output_root.to_path_buf();
        SessionController::new(
            &config,
            Arc::new(InMemoryStore::new()),
            Arc::new(MferAnonymizer::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_once_browses_to_recordings_folder() {
        let dir = tempdir().unwrap();
        let ecg = dir.path().join("ecg");
        std::fs::create_dir(&ecg).unwrap();
        std::fs::write(ecg.join("a.mwf"), [0x82, 0x03, b'P', b'I', b'D', 0x80]).unwrap();
        std::fs::write(dir.path().join("list.csv"), "a.mwf,x,PID\n").unwrap();
        let out = dir.path().join("out");
        let controller = controller(&out);

        let mut input = Cursor::new("list.csv\necg\n.\n");
        let mut output = Vec::new();

        let code = run_once(
            &controller,
            secret_string("s".to_string()),
            dir.path(),
            &mut input,
            &mut output,
        )
        .await
        .unwrap();

        assert_eq!(code, Some(0));
        let run_dirs: Vec<PathBuf> = std::fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(run_dirs.len(), 1);
        assert_eq!(
            std::fs::read(run_dirs[0].join("a.mwf")).unwrap(),
            vec![0x82, 0x03, 0, 0, 0, 0x80]
        );
    }

    #[tokio::test]
    async fn test_run_once_reports_aborted_run() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("list.csv"), [0x81, 0x20, 0xFF]).unwrap();
        let controller = controller(&dir.path().join("out"));

        let mut input = Cursor::new("list.csv\n.\n");
        let mut output = Vec::new();

        let code = run_once(
            &controller,
            secret_string("s".to_string()),
            dir.path(),
            &mut input,
            &mut output,
        )
        .await
        .unwrap();

        assert_eq!(code, Some(5));
        assert!(String::from_utf8(output).unwrap().contains("Run aborted"));
    }

    #[tokio::test]
    async fn test_run_once_end_of_input_at_folder_step() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("list.csv"), "a.mwf,x,PID\n").unwrap();
        let controller = controller(&dir.path().join("out"));

        let mut input = Cursor::new("list.csv\n");
        let mut output = Vec::new();

        let code = run_once(
            &controller,
            secret_string("s".to_string()),
            dir.path(),
            &mut input,
            &mut output,
        )
        .await
        .unwrap();

        assert_eq!(code, None);
    }
}
