use std::{collections::HashMap, fs};

use serde::Deserialize;

/// Runtime settings: where to listen, where the database lives, and the
/// branding constants injected into every page.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    pub site_name: String,
    pub city_name: String,
    pub city_name_short: String,
    pub city_council_name: String,
    pub council_ocd_id: String,
    pub council_meeting_name: String,
    pub search_placeholder: String,
    pub legistar_url: Option<String>,
    pub committee_descriptions: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/site.db".into(),
            site_name: "Open Council".into(),
            city_name: "Example City".into(),
            city_name_short: "Example".into(),
            city_council_name: "City Council".into(),
            council_ocd_id: "ocd-organization/city-council".into(),
            council_meeting_name: "City Council Stated Meeting".into(),
            search_placeholder: "Search legislation".into(),
            legistar_url: None,
            committee_descriptions: HashMap::new(),
        }
    }
}

/// Shape of the optional `site.toml` file; every key can be omitted.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    database_url: Option<String>,
    site_name: Option<String>,
    city_name: Option<String>,
    city_name_short: Option<String>,
    city_council_name: Option<String>,
    council_ocd_id: Option<String>,
    council_meeting_name: Option<String>,
    search_placeholder: Option<String>,
    legistar_url: Option<String>,
    committee_descriptions: Option<HashMap<String, String>>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("site.toml") {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(error) => {
                tracing::warn!(%error, "ignoring unreadable site.toml");
            }
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("SITE__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("SITE__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Ok(v) = std::env::var("SITE__SITE_NAME") {
        settings.site_name = v;
    }
    if let Ok(v) = std::env::var("SITE__CITY_NAME") {
        settings.city_name = v;
    }
    if let Ok(v) = std::env::var("SITE__COUNCIL_OCD_ID") {
        settings.council_ocd_id = v;
    }
    if let Ok(v) = std::env::var("SITE__COUNCIL_MEETING_NAME") {
        settings.council_meeting_name = v;
    }
    if let Ok(v) = std::env::var("SITE__LEGISTAR_URL") {
        settings.legistar_url = Some(v);
    }

    settings
}

fn apply_file_settings(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file_cfg.site_name {
        settings.site_name = v;
    }
    if let Some(v) = file_cfg.city_name {
        settings.city_name = v;
    }
    if let Some(v) = file_cfg.city_name_short {
        settings.city_name_short = v;
    }
    if let Some(v) = file_cfg.city_council_name {
        settings.city_council_name = v;
    }
    if let Some(v) = file_cfg.council_ocd_id {
        settings.council_ocd_id = v;
    }
    if let Some(v) = file_cfg.council_meeting_name {
        settings.council_meeting_name = v;
    }
    if let Some(v) = file_cfg.search_placeholder {
        settings.search_placeholder = v;
    }
    if let Some(v) = file_cfg.legistar_url {
        settings.legistar_url = Some(v);
    }
    if let Some(v) = file_cfg.committee_descriptions {
        settings.committee_descriptions = v;
    }
}

/// Accepts a bare file path, a `sqlite:` prefix, or a full URL and hands
/// back something the pool can open. Parent directory creation happens in
/// the storage crate.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}
