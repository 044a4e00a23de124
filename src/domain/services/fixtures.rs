use anyhow::Result;
use tokio::sync::mpsc;

use super::Session;
use super::SessionVault;
use crate::domain::models::Event;
use crate::domain::models::KeyValueStore;
use crate::infrastructure::storage::memory::MemoryStore;
use crate::infrastructure::transport::Connection;
use crate::infrastructure::transport::RpcClient;

pub struct Fixture {
    pub store: MemoryStore,
    pub session: Session,
    pub rpc: RpcClient,
    pub rx: mpsc::UnboundedReceiver<Event>,
}

pub fn fixture(url: &str, store: MemoryStore) -> Result<Fixture> {
    let connection = Connection::new(url)?;
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let session = Session::new(
        connection.clone(),
        SessionVault::new(Box::new(store.clone())),
        tx,
    );

    return Ok(Fixture {
        store,
        session,
        rpc: RpcClient::new(connection),
        rx,
    });
}

pub fn logged_in_store(csrf_token: Option<&str>) -> Result<MemoryStore> {
    let mut store = MemoryStore::default();
    store.set("session_uid", "7")?;
    store.set("session_sid", "abc")?;
    store.set("session_login", "bob")?;
    if let Some(token) = csrf_token {
        store.set("csrf_token", token)?;
    }

    return Ok(store);
}
