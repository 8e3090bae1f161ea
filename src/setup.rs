//! Interactive credentials wizard.

use assistant_provider::CancelSignal;
use config_store::{mask_secret, ConfigStore, SecretaryConfig, DEFAULT_GEMINI_MODEL};

use crate::console::Console;
use crate::display::Palette;
use crate::error::AppError;

struct Field {
    label: &'static str,
    secret: bool,
    required: bool,
}

const JIRA_URL: Field = Field {
    label: "Jira URL (https://jira.example.com)",
    secret: false,
    required: true,
};
const JIRA_EMAIL: Field = Field {
    label: "Jira email",
    secret: false,
    required: true,
};
const JIRA_TOKEN: Field = Field {
    label: "Jira API token",
    secret: true,
    required: true,
};
const GEMINI_KEY: Field = Field {
    label: "Gemini API key",
    secret: true,
    required: true,
};
const GEMINI_MODEL: Field = Field {
    label: "Gemini model",
    secret: false,
    required: false,
};

/// Prompts for every credential starting from `current`, validates and saves.
///
/// Empty input keeps the shown value. End of input aborts without saving.
pub fn run_setup(
    console: &mut dyn Console,
    store: &ConfigStore,
    current: SecretaryConfig,
    palette: &Palette,
    cancel: &CancelSignal,
) -> Result<SecretaryConfig, AppError> {
    console.print(&palette.bold("Secretary setup"));
    console.print(&palette.dim("Press Enter to keep the value in brackets."));

    let model_default = current
        .gemini_model
        .clone()
        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

    let config = SecretaryConfig {
        jira_url: ask(console, &JIRA_URL, &current.jira_url, cancel)?,
        jira_email: ask(console, &JIRA_EMAIL, &current.jira_email, cancel)?,
        jira_api_token: ask(console, &JIRA_TOKEN, &current.jira_api_token, cancel)?,
        gemini_api_key: ask(console, &GEMINI_KEY, &current.gemini_api_key, cancel)?,
        gemini_model: Some(ask(console, &GEMINI_MODEL, &model_default, cancel)?)
            .filter(|model| !model.is_empty() && model != DEFAULT_GEMINI_MODEL),
    }
    .normalized();

    config.validate()?;
    store.save(&config)?;
    tracing::info!(path = %store.path().display(), "config saved");
    console.print(&palette.green(&format!(
        "Saved to {}",
        store.path().display()
    )));
    Ok(config)
}

fn ask(
    console: &mut dyn Console,
    field: &Field,
    current: &str,
    cancel: &CancelSignal,
) -> Result<String, AppError> {
    let shown = if field.secret {
        mask_secret(current)
    } else {
        current.to_string()
    };
    let prompt = if current.is_empty() {
        format!("{}: ", field.label)
    } else {
        format!("{} [{shown}]: ", field.label)
    };

    loop {
        let Some(line) = console.read_line(&prompt, cancel)? else {
            return Err(AppError::SetupAborted);
        };
        let value = line.trim();
        if !value.is_empty() {
            return Ok(value.to_string());
        }
        if !current.is_empty() || !field.required {
            return Ok(current.to_string());
        }
        console.print(&format!("{} is required.", field.label));
    }
}
