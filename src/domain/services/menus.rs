#[cfg(test)]
#[path = "menus_test.rs"]
mod tests;

use serde_json::json;
use serde_json::Map;

use super::Session;
use crate::domain::models::ActionDescriptor;
use crate::domain::models::MenuNode;
use crate::infrastructure::transport::RpcClient;

const SESSION_EXPIRED: &str = "Session expired";

/// Navigation state: the menu tree, the selected app and the window action it
/// resolved to. Failures never propagate, they end up in `error`.
#[derive(Default, Debug, Clone)]
pub struct MenuStore {
    pub menus: Vec<MenuNode>,
    pub current_app: Option<MenuNode>,
    pub current_action: Option<ActionDescriptor>,
    pub loading: bool,
    pub error: Option<String>,
}

impl MenuStore {
    /// Top-level menus are apps.
    pub fn apps(&self) -> &[MenuNode] {
        return &self.menus;
    }

    pub fn sidebar(&self) -> &[MenuNode] {
        if let Some(app) = &self.current_app {
            return &app.children;
        }

        return &[];
    }

    /// Finds an app by id, or by name ignoring case.
    pub fn find_app(&self, needle: &str) -> Option<&MenuNode> {
        if let Ok(id) = needle.parse::<i64>() {
            if let Some(app) = self.menus.iter().find(|app| return app.id == id) {
                return Some(app);
            }
        }

        let needle = needle.to_lowercase();
        return self
            .menus
            .iter()
            .find(|app| return app.name.to_lowercase() == needle);
    }

    pub async fn fetch_menus(&mut self, rpc: &RpcClient, session: &mut Session) {
        self.loading = true;
        self.error = None;

        let res = rpc
            .call_as::<Vec<MenuNode>>(session, "ir.ui.menu", "load_menus", vec![], Map::new())
            .await;

        match res {
            Ok(Some(menus)) => {
                tracing::debug!(count = menus.len(), "Loaded menus");
                self.menus = menus;
            }
            Ok(None) => {
                self.error = Some(SESSION_EXPIRED.to_string());
            }
            Err(err) => {
                tracing::error!(error = ?err, "Error loading menus");
                self.error = Some(err.to_string());
            }
        }

        self.loading = false;
    }

    pub async fn select_app(&mut self, rpc: &RpcClient, session: &mut Session, menu: MenuNode) {
        let action = menu.action;
        self.current_app = Some(menu);

        if action.is_some() {
            self.execute_action(rpc, session, action).await;
        }
    }

    pub async fn execute_action(
        &mut self,
        rpc: &RpcClient,
        session: &mut Session,
        action_id: Option<i64>,
    ) {
        let action_id = match action_id.filter(|id| return *id != 0) {
            Some(id) => id,
            None => return,
        };

        let args = vec![
            json!([["id", "=", action_id]]),
            json!(["name", "res_model", "view_mode"]),
        ];

        let res = rpc
            .call_as::<Vec<ActionDescriptor>>(
                session,
                "ir.actions.act_window",
                "search_read",
                args,
                Map::new(),
            )
            .await;

        match res {
            Ok(Some(actions)) => {
                if let Some(action) = actions.into_iter().next() {
                    self.current_action = Some(action);
                } else {
                    tracing::warn!(action_id, "No window action found");
                }
            }
            Ok(None) => {
                self.error = Some(SESSION_EXPIRED.to_string());
            }
            Err(err) => {
                tracing::error!(error = ?err, action_id, "Error executing action");
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn go_home(&mut self) {
        self.current_app = None;
        self.current_action = None;
    }
}
