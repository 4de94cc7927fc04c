use anyhow::{bail, Context, Result};
use chrono::Local;

use lexicard_lib::flashcards::HostCollection;
use lexicard_lib::import::{ImportOrchestrator, ImportRequest, ImportRun, LanguageChoice, RunState};
use lexicard_lib::lexicon::LanguageId;
use lexicard_lib::settings::ImportSettings;

use super::print_run;
use crate::app::{App, Backend};
use crate::{ImportArgs, OutputFormat};

pub fn run(app: &App, args: &ImportArgs, format: &OutputFormat) -> Result<()> {
    let mut settings = app.load_settings();
    let language = args.language.as_deref().map(parse_language);
    apply_overrides(&mut settings, args, language.as_ref());

    if args.save {
        app.settings
            .save(&settings)
            .context("Failed to save settings")?;
    }

    let mut request = ImportRequest::from_settings(&settings, Local::now().date_naive())
        .context("Cannot start import")?;
    if language.is_some() {
        request.language = language;
    }

    let run = match &app.backend {
        Backend::Local(storage) => import_into(storage, &request)?,
        Backend::Anki(anki) => import_into(anki, &request)?,
    };

    print_run(&run, format)?;
    if matches!(run.state(), RunState::Failed(_)) {
        std::process::exit(1);
    }

    Ok(())
}

fn import_into<C: HostCollection>(collection: &C, request: &ImportRequest) -> Result<ImportRun> {
    if !collection.is_loaded() {
        bail!("Card collection is not available");
    }
    Ok(ImportOrchestrator::new(collection).run_interactive(request))
}

/// A number is a language id, anything else a language name
fn parse_language(value: &str) -> LanguageChoice {
    match value.trim().parse::<LanguageId>() {
        Ok(id) => LanguageChoice::Id(id),
        Err(_) => LanguageChoice::Name(value.trim().to_string()),
    }
}

/// Command-line options win over stored settings; flags only switch options on
fn apply_overrides(settings: &mut ImportSettings, args: &ImportArgs, language: Option<&LanguageChoice>) {
    if let Some(path) = &args.path {
        settings.source_path = path.display().to_string();
    }
    if let Some(LanguageChoice::Id(id)) = language {
        settings.selected_lang = Some(*id);
    }
    if let Some(deck) = &args.deck {
        settings.selected_deck = deck.clone();
    }
    if let Some(model) = &args.model {
        settings.selected_model = model.clone();
    }
    if args.days.is_some() {
        settings.last_days = args.days;
    }
    if !args.tags.is_empty() {
        settings.tags = args.tags.clone();
    }

    settings.parents_only |= args.parents_only;
    settings.allow_empty_translation |= args.allow_empty_translation;
    settings.include_well_known_or_ignored |= args.include_wki;
    settings.include_unknown |= args.include_unknown;
    settings.allow_duplicates |= args.allow_duplicates;
    settings.import_source_tags |= args.import_tags;
    settings.adjust_ease |= args.adjust_ease;
}
