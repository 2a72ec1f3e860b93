//! Watch mode
//!
//! Re-composes the GUI whenever a client document or the manifest
//! describing the clients changes on disk.

use colored::Colorize;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Watch mode errors
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to create file watcher: {0}")]
    WatcherError(#[from] notify::Error),
    #[error("Failed to receive events: {0}")]
    RecvError(#[from] std::sync::mpsc::RecvError),
}

/// Debounced watcher over GUI documents and configuration files
pub struct FileWatcher {
    /// Debounce duration in milliseconds
    debounce_ms: u64,
    /// File extensions to watch
    extensions: Vec<String>,
}

impl FileWatcher {
    pub fn new() -> Self {
        Self {
            debounce_ms: 300,
            extensions: ["rc", "xml", "toml", "yml", "yaml"]
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Check if a path should trigger a rebuild
    fn should_trigger(&self, path: &Path) -> bool {
        let Some(ext) = path.extension() else {
            return false;
        };
        let ext = ext.to_string_lossy().to_lowercase();
        if !self.extensions.iter().any(|e| *e == ext) {
            return false;
        }

        let path_str = path.to_string_lossy();
        !(path_str.contains("/target/") || path_str.contains("/.git/"))
    }

    /// Watch `paths` and call `on_change` once up front and after every
    /// batch of relevant changes. The callback returns false to stop.
    pub fn watch<F>(&self, paths: &[PathBuf], mut on_change: F) -> Result<(), WatchError>
    where
        F: FnMut() -> bool,
    {
        let (tx, rx) = channel();
        let mut debouncer = new_debouncer(Duration::from_millis(self.debounce_ms), tx)?;

        for path in paths {
            let mode = if path.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            debouncer.watcher().watch(path, mode)?;
            debug!("Watching {}", path.display());
        }

        println!();
        println!("{}", "Watch mode active. Press Ctrl+C to stop.".cyan().bold());
        for path in paths {
            println!("{}", format!("   Watching: {}", path.display()).dimmed());
        }
        println!();

        if !on_change() {
            return Ok(());
        }

        loop {
            match rx.recv()? {
                Ok(events) => {
                    let relevant: Vec<_> = events
                        .iter()
                        .filter(|e| {
                            matches!(
                                e.kind,
                                DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                            ) && self.should_trigger(&e.path)
                        })
                        .collect();
                    if relevant.is_empty() {
                        continue;
                    }

                    println!();
                    println!(
                        "{}",
                        format!("Changes in {} file(s), recomposing...", relevant.len()).yellow()
                    );
                    for event in relevant.iter().take(5) {
                        if let Some(name) = event.path.file_name() {
                            println!("   • {}", name.to_string_lossy().dimmed());
                        }
                    }
                    if relevant.len() > 5 {
                        println!("   • ... and {} more", relevant.len() - 5);
                    }
                    println!();

                    if !on_change() {
                        break;
                    }
                }
                Err(e) => {
                    eprintln!("{}: {:?}", "Watch error".red(), e);
                }
            }
        }

        Ok(())
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}
