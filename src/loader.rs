use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;

use crate::dataset::{DataSources, Dataset};
use crate::export::{self, ExportSnapshot};
use crate::state::Delta;

/// Loads both tables off the UI thread and reports exactly one delta.
pub fn spawn_dataset_loader(sources: DataSources, tx: Sender<Delta>) {
    thread::spawn(move || {
        let _ = tx.send(Delta::Log(format!(
            "[INFO] Loading {} and {}",
            sources.teams.name(),
            sources.players.name()
        )));
        let delta = match Dataset::load(&sources) {
            Ok(dataset) => Delta::DatasetLoaded(dataset),
            Err(err) => Delta::DatasetFailed(err.to_string()),
        };
        let _ = tx.send(delta);
    });
}

pub fn spawn_export(path: PathBuf, snapshot: ExportSnapshot, tx: Sender<Delta>) {
    thread::spawn(move || {
        let delta = match export::write_workbook(&path, &snapshot) {
            Ok(report) => Delta::ExportFinished {
                path: report.path.display().to_string(),
                teams: report.teams,
                players: report.players,
            },
            Err(err) => Delta::ExportFailed(format!("{err:#}")),
        };
        let _ = tx.send(delta);
    });
}
