use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use lexicard_lib::import::{self, cutoff_date};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, path: Option<&Path>, format: &OutputFormat) -> Result<()> {
    let settings = app.load_settings();
    let source = app.source_path(path)?;
    let filter = settings.filter_config(cutoff_date(Local::now().date_naive(), settings.last_days));

    let preview = import::preview(&source, &filter)
        .with_context(|| format!("Failed to read {}", source.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        OutputFormat::Plain => {
            if preview.languages.is_empty() {
                println!("No terms match the current filters.");
                return Ok(());
            }

            let max_name_len = preview
                .languages
                .iter()
                .map(|l| l.name.len())
                .max()
                .unwrap_or(8)
                .max(8);

            println!("{:>4}  {:<width$} Terms", "Id", "Language", width = max_name_len);
            for language in &preview.languages {
                let selected = if settings.selected_lang == Some(language.id) { " *" } else { "" };
                println!(
                    "{:>4}  {:<width$} {}{}",
                    language.id,
                    language.name,
                    language.term_count,
                    selected,
                    width = max_name_len
                );
            }

            println!("\n{} terms total (since {})", preview.term_count, filter.cutoff_date);
            if !preview.sample_terms.is_empty() {
                println!("e.g. {}", preview.sample_terms.join(", "));
            }
        }
    }

    Ok(())
}
