#[cfg(test)]
#[path = "app_test.rs"]
mod tests;

use std::path::PathBuf;

use anyhow::bail;
use anyhow::Result;
use serde_json::Map;
use serde_json::Value;
use tokio::sync::mpsc;

use super::render;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CallOutcome;
use crate::domain::models::Event;
use crate::domain::models::StorageName;
use crate::domain::services::MenuStore;
use crate::domain::services::Session;
use crate::domain::services::SessionVault;
use crate::infrastructure::storage::StorageManager;
use crate::infrastructure::storage::StoreBox;
use crate::infrastructure::transport::Connection;
use crate::infrastructure::transport::RpcClient;

const SESSION_EXPIRED_TEXT: &str = "Session expired. Run `erpdesk login` to sign in again.";

pub type StoreOpener = Box<dyn Fn() -> Result<StoreBox> + Send + Sync>;

pub enum Task {
    Login { login: String, password: String },
    Logout,
    Status,
    Menus,
    Open { app: String },
    Call {
        model: String,
        method: String,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    },
}

/// Owns every piece of client state for one run. Session and navigation are
/// rebuilt from storage whenever a `ReloadRequested` event comes through.
pub struct App {
    connection: Connection,
    open_store: StoreOpener,
    session: Session,
    rpc: RpcClient,
    menus: MenuStore,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
    pub verbose: bool,
}

impl App {
    pub fn new(url: &str, open_store: StoreOpener) -> Result<App> {
        let connection = Connection::new(url)?;
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let session = Session::new(
            connection.clone(),
            SessionVault::new(open_store()?),
            tx.clone(),
        );

        return Ok(App {
            rpc: RpcClient::new(connection.clone()),
            connection,
            open_store,
            session,
            menus: MenuStore::default(),
            tx,
            rx,
            verbose: false,
        });
    }

    pub fn from_config() -> Result<App> {
        let storage_name = Config::get(ConfigKey::Storage);
        let storage = match StorageName::parse(storage_name.to_string()) {
            Some(storage) => storage,
            None => bail!(format!("Unknown storage {storage_name}")),
        };
        let storage_file = PathBuf::from(Config::get(ConfigKey::StorageFile));

        let open_store: StoreOpener = Box::new(move || {
            return StorageManager::get(storage.clone(), storage_file.clone());
        });

        return App::new(&Config::get(ConfigKey::Url), open_store);
    }

    pub fn session(&self) -> &Session {
        return &self.session;
    }

    pub fn menus(&self) -> &MenuStore {
        return &self.menus;
    }

    /// Drops all in-memory state and hydrates a fresh session from storage.
    pub fn reinitialize(&mut self) -> Result<()> {
        tracing::debug!("Reinitializing client state");
        self.session = Session::new(
            self.connection.clone(),
            SessionVault::new((self.open_store)()?),
            self.tx.clone(),
        );
        self.menus = MenuStore::default();

        return Ok(());
    }

    /// Returns whether a reload happened.
    pub fn handle_events(&mut self) -> Result<bool> {
        let mut reload = false;
        while let Ok(event) = self.rx.try_recv() {
            match event {
                Event::ReloadRequested(reason) => {
                    tracing::info!(%reason, "Reload requested");
                    reload = true;
                }
            }
        }

        if reload {
            self.reinitialize()?;
        }

        return Ok(reload);
    }

    fn require_login(&self) -> Result<()> {
        if !self.session.is_logged_in() {
            bail!("Not logged in. Run `erpdesk login` first.");
        }

        return Ok(());
    }

    fn describe_session(&self) -> String {
        return format!(
            "Logged in as {} (uid {}) on {}",
            self.session.login_name().unwrap_or("unknown"),
            self.session
                .uid()
                .map(|uid| return uid.to_string())
                .unwrap_or_default(),
            self.connection.url()
        );
    }

    async fn load_menus(&mut self) -> Result<()> {
        self.require_login()?;
        self.menus.fetch_menus(&self.rpc, &mut self.session).await;

        if let Some(err) = &self.menus.error {
            bail!(format!("Failed to load menus: {err}"));
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn execute(&mut self, task: Task) -> Result<String> {
        match task {
            Task::Login { login, password } => {
                self.session.login(&login, &password).await?;
                return Ok(self.describe_session());
            }
            Task::Logout => {
                self.session.logout().await;
                return Ok("Logged out.".to_string());
            }
            Task::Status => {
                if self.session.restore_session().await {
                    return Ok(self.describe_session());
                }
                return Ok("Not logged in.".to_string());
            }
            Task::Menus => {
                self.load_menus().await?;
                return Ok(render::menu_tree(self.menus.apps()));
            }
            Task::Open { app } => {
                self.load_menus().await?;
                let selected = match self.menus.find_app(&app) {
                    Some(selected) => selected.clone(),
                    None => bail!(format!("No app named {app}")),
                };

                self.menus
                    .select_app(&self.rpc, &mut self.session, selected.clone())
                    .await;

                let mut text = render::app_view(
                    &selected,
                    self.menus.sidebar(),
                    &self.menus.current_action,
                );
                if let Some(err) = &self.menus.error {
                    text = format!("{text}\nWarning: {err}");
                }

                return Ok(text);
            }
            Task::Call {
                model,
                method,
                args,
                kwargs,
            } => {
                let outcome = self
                    .rpc
                    .call(&mut self.session, &model, &method, args, kwargs)
                    .await?;

                return match outcome {
                    CallOutcome::Completed(value) => Ok(serde_json::to_string_pretty(&value)?),
                    CallOutcome::SessionExpired => Ok(SESSION_EXPIRED_TEXT.to_string()),
                };
            }
        }
    }

    pub async fn run(&mut self, task: Task) -> Result<String> {
        let res = self.execute(task).await;

        let mut text = match res {
            Ok(text) => text,
            Err(err) => {
                if let Err(reload_err) = self.handle_events() {
                    tracing::error!(error = ?reload_err, "Failed to reinitialize after a failed task");
                }
                return Err(err);
            }
        };

        if self.verbose && !self.session.debug_log().is_empty() {
            let log = self
                .session
                .debug_log()
                .entries()
                .map(|entry| return entry.to_string())
                .collect::<Vec<String>>()
                .join("\n");
            text = format!("{text}\n\n{log}");
        }

        self.handle_events()?;

        return Ok(text);
    }
}
