//! Saving generated suites and running Robot Framework over them.

use super::GenerateError;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

const ROBOT_SUFFIX: &str = ".robot";

/// Captured result of one Robot Framework run.
#[derive(Debug, Clone)]
pub struct RobotRun {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
}

/// Write each file under `dir`, appending `.robot` when missing.
///
/// Names that are absolute or climb out of `dir` are skipped.
pub fn save_tests(dir: &Path, files: &BTreeMap<String, String>) -> Result<Vec<PathBuf>, GenerateError> {
    std::fs::create_dir_all(dir)
        .map_err(|source| GenerateError::Write { path: dir.to_path_buf(), source })?;

    let mut saved = Vec::with_capacity(files.len());
    for (name, content) in files {
        let mut file_name = name.clone();
        if !file_name.ends_with(ROBOT_SUFFIX) {
            file_name.push_str(ROBOT_SUFFIX);
        }
        if !is_contained(Path::new(&file_name)) {
            tracing::warn!("Refusing to write generated file outside {}: {}", dir.display(), name);
            continue;
        }

        let path = dir.join(&file_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| GenerateError::Write { path: parent.to_path_buf(), source })?;
        }
        std::fs::write(&path, content)
            .map_err(|source| GenerateError::Write { path: path.clone(), source })?;
        saved.push(path);
    }
    Ok(saved)
}

fn is_contained(relative: &Path) -> bool {
    relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Run `command` (program + args) with `dir` as working directory.
pub fn run_robot(dir: &Path, command: &[String]) -> Result<RobotRun, GenerateError> {
    let (program, args) = command.split_first().ok_or(GenerateError::EmptyCommand)?;
    tracing::info!("Running `{}` in {}", command.join(" "), dir.display());

    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| GenerateError::Robot { command: command.join(" "), source })?;

    Ok(RobotRun {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}
