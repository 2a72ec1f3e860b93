use super::Composition;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    #[serde(flatten)]
    composition: &'a Composition,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, composition: &Composition) -> Result<()> {
        let json = self.render(composition)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }

    pub fn render(&self, composition: &Composition) -> Result<String> {
        let report = JsonReport {
            version: env!("CARGO_PKG_VERSION"),
            composition,
        };
        serde_json::to_string_pretty(&report).into_diagnostic()
    }
}
