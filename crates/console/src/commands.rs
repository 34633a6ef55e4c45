//! Command dispatch: one handler per console screen or action.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use clubdesk_client::form::delete_record;
use clubdesk_client::resources::{activity_filters, Exportable};
use clubdesk_client::{
    ApiClient, ExportFormat, FormController, ListController, ListView, SessionStore,
    SubmitOutcome,
};
use clubdesk_core::activity::ActivityLog;
use clubdesk_core::age_category::age_category;
use clubdesk_core::entities::{
    Club, Competition, Editable, Group, Player, Referee, Region, Resource, Taluka,
};
use clubdesk_core::navigation::{Screen, Sidebar};
use clubdesk_core::session::{authorize, current_role, LoginRequest, Session};
use clubdesk_core::types::DbId;
use clubdesk_events::{drain, Notification, NotificationBus, NotificationLevel};
use serde::Serialize;
use serde_json::Value;

use crate::cli::{Command, ExportArg, Module, QueryArgs};
use crate::config::ConsoleConfig;
use crate::render::{self, Row};

/// Run `$body` with `$E` bound to the record type of `$module`.
macro_rules! for_module {
    ($module:expr, $E:ident => $body:expr) => {
        match $module {
            Module::Clubs => {
                type $E = Club;
                $body
            }
            Module::Regions => {
                type $E = Region;
                $body
            }
            Module::Talukas => {
                type $E = Taluka;
                $body
            }
            Module::Groups => {
                type $E = Group;
                $body
            }
            Module::Players => {
                type $E = Player;
                $body
            }
            Module::Referees => {
                type $E = Referee;
                $body
            }
            Module::Competitions => {
                type $E = Competition;
                $body
            }
            Module::ActivityLogs => {
                type $E = ActivityLog;
                $body
            }
        }
    };
}

/// Like [`for_module!`] for modules with create/update forms.
macro_rules! for_editable {
    ($module:expr, $E:ident => $body:expr) => {
        match $module {
            Module::Clubs => {
                type $E = Club;
                $body
            }
            Module::Regions => {
                type $E = Region;
                $body
            }
            Module::Talukas => {
                type $E = Taluka;
                $body
            }
            Module::Groups => {
                type $E = Group;
                $body
            }
            Module::Players => {
                type $E = Player;
                $body
            }
            Module::Referees => {
                type $E = Referee;
                $body
            }
            Module::Competitions => {
                type $E = Competition;
                $body
            }
            Module::ActivityLogs => Err(anyhow!("Activity logs are read-only")),
        }
    };
}

pub struct Console {
    config: ConsoleConfig,
    store: SessionStore,
    session: Option<Session>,
    api: ApiClient,
    bus: NotificationBus,
    json: bool,
}

impl Console {
    /// Load the persisted session and build a client carrying its token.
    pub fn new(config: ConsoleConfig, json: bool) -> anyhow::Result<Self> {
        let store = SessionStore::new(&config.session_file);
        let session = store.load().unwrap_or_else(|e| {
            tracing::warn!(path = %store.path().display(), error = %e, "Ignoring unreadable session");
            None
        });
        let token = session.as_ref().and_then(|s| s.token.clone());
        let api = ApiClient::new(&config.client)
            .context("Failed to build HTTP client")?
            .with_token(token);
        tracing::debug!(
            base_url = api.base_url(),
            signed_in = session.is_some(),
            "Console ready"
        );

        Ok(Self {
            config,
            store,
            session,
            api,
            bus: NotificationBus::default(),
            json,
        })
    }

    /// Run one command, then print the notifications it raised.
    pub async fn run(&mut self, command: Command) -> anyhow::Result<()> {
        let mut notifications = self.bus.subscribe();
        let result = self.dispatch(command).await;
        for note in drain(&mut notifications) {
            match note.level {
                NotificationLevel::Error => eprintln!("{}", render::notification(&note)),
                _ => println!("{}", render::notification(&note)),
            }
        }
        result
    }

    async fn dispatch(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Login { email, password } => self.login(email, password).await,
            Command::Logout => self.logout().await,
            Command::Whoami => self.whoami(),
            Command::Nav { active, collapsed } => {
                self.nav(active.map(Module::screen), collapsed);
                Ok(())
            }
            Command::Status => self.status().await,
            Command::Dashboard => self.dashboard().await,
            Command::List { module, query } => {
                self.require(module.screen())?;
                for_module!(module, E => self.list::<E>(&query).await)
            }
            Command::Get { module, id } => {
                self.require(module.screen())?;
                for_module!(module, E => self.get::<E>(id).await)
            }
            Command::Create { module, data } => {
                self.require(module.screen())?;
                let changes = read_json(&data)?;
                for_editable!(module, E => self.save::<E>(None, changes).await)
            }
            Command::Update { module, id, data } => {
                self.require(module.screen())?;
                let changes = read_json(&data)?;
                for_editable!(module, E => self.save::<E>(Some(id), changes).await)
            }
            Command::Delete { module, id } => {
                self.require(module.screen())?;
                for_editable!(module, E => {
                    delete_record::<E>(&self.api, &self.bus, id).await?;
                    Ok(())
                })
            }
            Command::Suspend { id, lift } => self.suspend(id, !lift).await,
            Command::VerifyAadhar { id, image } => self.verify_aadhar(id, &image).await,
            Command::Export {
                module,
                format,
                output,
                query,
            } => self.export(module, format, output, &query).await,
            Command::Entries { competition_id } => self.entries(competition_id).await,
            Command::Logs {
                entity_type,
                action,
                from,
                to,
                page,
                limit,
            } => {
                let mut query = QueryArgs {
                    page,
                    limit,
                    ..QueryArgs::default()
                };
                let filters = [
                    (activity_filters::ENTITY_TYPE, entity_type),
                    (activity_filters::ACTION, action),
                    (activity_filters::FROM, from.map(|d| d.to_string())),
                    (activity_filters::TO, to.map(|d| d.to_string())),
                ];
                for (key, value) in filters {
                    if let Some(value) = value {
                        query.filters.push((key.to_string(), value));
                    }
                }
                self.require(Screen::ActivityLogs)?;
                self.list::<ActivityLog>(&query).await
            }
            Command::AgeCategory { date, today } => {
                let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());
                println!("{}", age_category(date, today));
                Ok(())
            }
        }
    }

    // ---- session ----

    /// Fail unless the signed-in role may open `screen`.
    fn require(&self, screen: Screen) -> anyhow::Result<()> {
        authorize(self.session.as_ref(), screen).map_err(|e| match self.session {
            None => anyhow!("{e}. Run `clubdesk login` first."),
            Some(_) => e.into(),
        })
    }

    async fn login(&mut self, email: String, password: String) -> anyhow::Result<()> {
        let request = LoginRequest { email, password };
        let session = Session::from(self.api.login(&request).await?);
        self.store.save(&session)?;
        self.api.set_token(session.token.clone());
        println!(
            "Signed in as {} <{}> ({})",
            session.user.name, session.user.email, session.user.role
        );
        self.session = Some(session);
        Ok(())
    }

    async fn logout(&mut self) -> anyhow::Result<()> {
        if self.api.token().is_some() {
            if let Err(e) = self.api.logout().await {
                tracing::warn!(error = %e, "Server logout failed; clearing local session anyway");
            }
        }
        self.store.clear()?;
        self.api.set_token(None);
        self.session = None;
        println!("Signed out.");
        Ok(())
    }

    fn whoami(&self) -> anyhow::Result<()> {
        match &self.session {
            Some(session) => println!(
                "{} <{}>\nrole: {}\nsession: {}",
                session.user.name,
                session.user.email,
                session.user.role,
                self.store.path().display()
            ),
            None => println!("Not signed in."),
        }
        Ok(())
    }

    fn nav(&self, active: Option<Screen>, collapsed: bool) {
        let mut sidebar = Sidebar::for_role(current_role(self.session.as_ref()));
        if collapsed {
            sidebar.toggle();
        }
        let lines = sidebar.render(active);
        if lines.is_empty() {
            println!("No screens available. Sign in first.");
        }
        for line in lines {
            println!("{line}");
        }
    }

    async fn status(&self) -> anyhow::Result<()> {
        let health = self.api.health().await?;
        println!(
            "API {}: {}{}",
            self.api.base_url(),
            health.status,
            health
                .version
                .map(|v| format!(" (version {v})"))
                .unwrap_or_default()
        );
        Ok(())
    }

    async fn dashboard(&self) -> anyhow::Result<()> {
        self.require(Screen::Dashboard)?;
        let stats = self.api.dashboard_stats().await?;
        if self.json {
            return print_json(&stats);
        }
        let rows: Vec<Vec<String>> = stats
            .rows()
            .into_iter()
            .map(|(label, count)| vec![label.to_string(), count.to_string()])
            .collect();
        println!("{}", render::table(&["Module", "Records"], &rows));
        Ok(())
    }

    // ---- collections ----

    async fn list<E: Row>(&self, args: &QueryArgs) -> anyhow::Result<()> {
        let mut list = ListController::<E>::new(args.limit.unwrap_or(self.config.page_size));
        apply_query_args(&mut list, args);
        let limit = list.query().limit();

        match list.refresh(&self.api).await {
            ListView::Loaded(page) if self.json => print_json(page),
            ListView::Loaded(page) => {
                println!("{}", render::page(page, limit));
                Ok(())
            }
            ListView::Failed(message) => bail!("Could not load {}: {message}", E::COLLECTION),
            ListView::Idle | ListView::Loading => Ok(()),
        }
    }

    async fn get<E: Row>(&self, id: DbId) -> anyhow::Result<()> {
        let record = self.api.resource::<E>().get(id).await?;
        self.print_record(&record)
    }

    fn print_record<E: Row>(&self, record: &E) -> anyhow::Result<()> {
        if self.json {
            return print_json(record);
        }
        println!("{}", render::table(E::COLUMNS, &[record.cells()]));
        Ok(())
    }

    /// Create (`id == None`) or update a record through its form.
    async fn save<E: Editable + Row>(
        &self,
        id: Option<DbId>,
        changes: Value,
    ) -> anyhow::Result<()> {
        let mut form = match id {
            Some(id) => FormController::<E>::load(&self.api, id).await?,
            None => FormController::<E>::create(),
        };
        let mut draft = serde_json::to_value(form.draft())?;
        merge_object(&mut draft, changes)?;
        *form.draft_mut() = serde_json::from_value(draft)
            .with_context(|| format!("Data does not describe a {}", E::LABEL.to_lowercase()))?;

        let mut saved_id = None;
        let outcome = form
            .submit(&self.api, &self.bus, |record| saved_id = Some(record.id()))
            .await;
        match outcome {
            SubmitOutcome::Saved(record) => {
                tracing::debug!(id = ?saved_id, "Form saved");
                self.print_record(&record)
            }
            SubmitOutcome::Invalid(errors) => {
                eprintln!("{}", render::field_errors(&errors));
                bail!("{} has invalid fields", E::LABEL)
            }
            SubmitOutcome::Rejected => {
                if !form.errors().is_empty() {
                    eprintln!("{}", render::field_errors(form.errors()));
                }
                bail!("The server rejected the {}", E::LABEL.to_lowercase())
            }
            SubmitOutcome::Busy => bail!("A submission is already in progress"),
        }
    }

    // ---- module actions ----

    async fn suspend(&self, id: DbId, suspended: bool) -> anyhow::Result<()> {
        self.require(Screen::Players)?;
        let player = self.api.resource::<Player>().set_suspended(id, suspended).await?;
        let message = if player.is_suspended {
            format!("{} suspended", player.full_name())
        } else {
            format!("Suspension lifted for {}", player.full_name())
        };
        self.bus
            .publish(Notification::success(message).with_resource(Player::COLLECTION));
        self.print_record(&player)
    }

    async fn verify_aadhar(&self, id: DbId, image: &Path) -> anyhow::Result<()> {
        self.require(Screen::Players)?;
        let bytes = tokio::fs::read(image)
            .await
            .with_context(|| format!("Failed to read {}", image.display()))?;
        let file_name = image
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("aadhar")
            .to_string();
        let player = self
            .api
            .resource::<Player>()
            .upload_aadhar(id, &file_name, bytes, mime_for(image))
            .await?;
        let note = if player.aadhar_verified {
            Notification::success(format!("Aadhaar verified for {}", player.full_name()))
        } else {
            Notification::info(format!("Aadhaar submitted for {}", player.full_name()))
        };
        self.bus.publish(note.with_resource(Player::COLLECTION));
        self.print_record(&player)
    }

    async fn export(
        &self,
        module: Module,
        format: ExportArg,
        output: Option<PathBuf>,
        args: &QueryArgs,
    ) -> anyhow::Result<()> {
        self.require(module.screen())?;
        let format = ExportFormat::from(format);
        match module {
            Module::Clubs => self.export_as::<Club>(format, output, args).await,
            Module::Players => self.export_as::<Player>(format, output, args).await,
            Module::Referees => self.export_as::<Referee>(format, output, args).await,
            other => bail!("{} cannot be exported", other.screen().label()),
        }
    }

    async fn export_as<E: Exportable>(
        &self,
        format: ExportFormat,
        output: Option<PathBuf>,
        args: &QueryArgs,
    ) -> anyhow::Result<()> {
        let mut list = ListController::<E>::new(args.limit.unwrap_or(self.config.page_size));
        apply_query_args(&mut list, args);
        let bytes = self
            .api
            .resource::<E>()
            .export(format, list.query())
            .await?;
        let path = output.unwrap_or_else(|| PathBuf::from(format.file_name(E::COLLECTION)));
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    async fn entries(&self, competition_id: DbId) -> anyhow::Result<()> {
        self.require(Screen::Competitions)?;
        let players = self
            .api
            .resource::<Competition>()
            .players(competition_id)
            .await?;
        if self.json {
            return print_json(&players);
        }
        if players.is_empty() {
            println!("No players registered.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = players.iter().map(Row::cells).collect();
        println!("{}", render::table(Player::COLUMNS, &rows));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Feed command-line query options through the list reducer.
fn apply_query_args<E: Resource>(list: &mut ListController<E>, args: &QueryArgs) {
    if let Some(search) = &args.search {
        list.set_search(search);
    }
    if let Some(column) = &args.sort {
        list.toggle_sort(column);
        if args.desc {
            list.toggle_sort(column);
        }
    }
    for (key, value) in &args.filters {
        list.set_filter(key, value);
    }
    list.set_page(args.page);
}

/// Parse inline JSON, or the contents of a file given as `@path`.
fn read_json(raw: &str) -> anyhow::Result<Value> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {path}"))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).context("Data is not valid JSON")
}

/// Overlay the keys of `changes` onto `target`. Both must be objects.
fn merge_object(target: &mut Value, changes: Value) -> anyhow::Result<()> {
    let (Value::Object(target), Value::Object(changes)) = (target, changes) else {
        bail!("Data must be a JSON object");
    };
    for (key, value) in changes {
        target.insert(key, value);
    }
    Ok(())
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overlays_changed_keys() {
        let mut draft = json!({"name": "Konkan", "code": "KN"});
        merge_object(&mut draft, json!({"name": "Konkan Coast"})).unwrap();
        assert_eq!(draft, json!({"name": "Konkan Coast", "code": "KN"}));
    }

    #[test]
    fn merge_rejects_non_objects() {
        let mut draft = json!({"name": "Konkan"});
        assert!(merge_object(&mut draft, json!(["name"])).is_err());
    }

    #[test]
    fn inline_json_is_parsed() {
        assert_eq!(read_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
        assert!(read_json("{oops").is_err());
    }

    #[test]
    fn json_can_come_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(&path, r#"{"groupName": "U14 Boys"}"#).unwrap();
        let value = read_json(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["groupName"], "U14 Boys");
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("card.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("card.png")), "image/png");
        assert_eq!(mime_for(Path::new("card")), "application/octet-stream");
    }

    #[test]
    fn query_args_drive_the_reducer() {
        let mut list = ListController::<Club>::new(10);
        let args = QueryArgs {
            search: Some("tigers".into()),
            sort: Some("clubName".into()),
            desc: true,
            page: 3,
            limit: None,
            filters: vec![("regionId".into(), "2".into())],
        };
        apply_query_args(&mut list, &args);

        let params = list.query().to_params();
        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("search"), Some("tigers"));
        assert_eq!(get("sortBy"), Some("clubName"));
        assert_eq!(get("sortOrder"), Some("desc"));
        assert_eq!(get("regionId"), Some("2"));
        assert_eq!(get("page"), Some("3"));
    }
}
