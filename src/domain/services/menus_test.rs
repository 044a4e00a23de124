use anyhow::Result;
use mockito::Matcher;
use serde_json::json;

use super::MenuStore;
use crate::domain::models::ActionDescriptor;
use crate::domain::models::MenuNode;
use crate::domain::services::fixtures::fixture;
use crate::domain::services::fixtures::logged_in_store;

const MENUS_BODY: &str = r#"{"jsonrpc":"2.0","id":1,"result":[
    {"id": 1, "name": "Sales", "action": 42, "children": [
        {"id": 2, "name": "Orders", "action": 43, "children": []},
        {"id": 3, "name": "Customers", "action": 44, "children": []}
    ]},
    {"id": 5, "name": "Settings", "action": false, "children": [
        {"id": 6, "name": "Users", "action": 50, "children": []}
    ]}
]}"#;

fn sales_app() -> MenuNode {
    return MenuNode {
        id: 1,
        name: "Sales".to_string(),
        action: Some(42),
        children: vec![MenuNode {
            id: 2,
            name: "Orders".to_string(),
            action: Some(43),
            children: vec![],
        }],
    };
}

fn quotations() -> ActionDescriptor {
    return ActionDescriptor {
        id: 42,
        name: "Quotations".to_string(),
        res_model: "sale.order".to_string(),
        view_mode: "tree,form".to_string(),
    };
}

fn search_read_mock(server: &mut mockito::ServerGuard, action_id: i64) -> mockito::Mock {
    return server
        .mock("POST", "/web/dataset/call_kw")
        .match_body(Matcher::PartialJson(json!({
            "params": {
                "model": "ir.actions.act_window",
                "method": "search_read",
                "args": [[["id", "=", action_id]], ["name", "res_model", "view_mode"]],
            },
        })))
        .with_status(200)
        .with_body(
            r#"{"result":[{"id":42,"name":"Quotations","res_model":"sale.order","view_mode":"tree,form"}]}"#,
        )
        .create();
}

mod fetch_menus {
    use super::*;

    #[tokio::test]
    async fn it_loads_the_menu_tree() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/web/dataset/call_kw")
            .match_body(Matcher::PartialJson(json!({
                "params": {"model": "ir.ui.menu", "method": "load_menus", "args": []},
            })))
            .with_status(200)
            .with_body(MENUS_BODY)
            .create();

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore::default();
        store.fetch_menus(&fx.rpc, &mut fx.session).await;

        mock.assert();
        assert!(!store.loading);
        assert_eq!(store.error, None);
        assert_eq!(store.apps().len(), 2);
        assert_eq!(store.apps()[0].children.len(), 2);
        assert_eq!(store.apps()[1].action, None);

        return Ok(());
    }

    #[tokio::test]
    async fn it_records_errors_instead_of_raising() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/web/dataset/call_kw")
            .with_status(200)
            .with_body(r#"{"error":{"message":"Server Error","data":{"message":"Access Denied"}}}"#)
            .create();

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore::default();
        store.fetch_menus(&fx.rpc, &mut fx.session).await;

        mock.assert();
        assert!(!store.loading);
        assert_eq!(store.error, Some("Access Denied".to_string()));
        assert!(store.apps().is_empty());

        return Ok(());
    }

    #[tokio::test]
    async fn it_clears_loading_on_network_errors() -> Result<()> {
        let mut fx = fixture("http://127.0.0.1:1", logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore::default();
        store.fetch_menus(&fx.rpc, &mut fx.session).await;

        assert!(!store.loading);
        assert!(store.error.is_some());

        return Ok(());
    }

    #[tokio::test]
    async fn it_reports_expired_sessions() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/web/dataset/call_kw")
            .with_status(403)
            .create();

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore::default();
        store.fetch_menus(&fx.rpc, &mut fx.session).await;

        mock.assert();
        assert!(!store.loading);
        assert_eq!(store.error, Some("Session expired".to_string()));
        assert!(!fx.session.is_logged_in());

        return Ok(());
    }
}

mod navigation {
    use super::*;

    #[tokio::test]
    async fn it_resolves_the_app_action() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = search_read_mock(&mut server, 42);

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore::default();
        store
            .select_app(&fx.rpc, &mut fx.session, sales_app())
            .await;

        mock.assert();
        assert_eq!(store.current_app, Some(sales_app()));
        assert_eq!(store.current_action, Some(quotations()));
        assert_eq!(store.sidebar().len(), 1);
        assert_eq!(store.sidebar()[0].name, "Orders");

        return Ok(());
    }

    #[tokio::test]
    async fn it_leaves_the_action_alone_for_apps_without_one() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/web/dataset/call_kw")
            .expect(0)
            .create();

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore {
            current_action: Some(quotations()),
            ..MenuStore::default()
        };
        let settings = MenuNode {
            id: 5,
            name: "Settings".to_string(),
            action: None,
            children: vec![],
        };
        store
            .select_app(&fx.rpc, &mut fx.session, settings.clone())
            .await;

        mock.assert();
        assert_eq!(store.current_app, Some(settings));
        assert_eq!(store.current_action, Some(quotations()));
        assert!(store.sidebar().is_empty());

        return Ok(());
    }

    #[tokio::test]
    async fn it_ignores_empty_action_ids() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/web/dataset/call_kw")
            .expect(0)
            .create();

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore::default();
        store.execute_action(&fx.rpc, &mut fx.session, None).await;
        store.execute_action(&fx.rpc, &mut fx.session, Some(0)).await;

        mock.assert();
        assert_eq!(store.current_action, None);

        return Ok(());
    }

    #[tokio::test]
    async fn it_keeps_the_current_action_when_nothing_matches() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/web/dataset/call_kw")
            .with_status(200)
            .with_body(r#"{"result":[]}"#)
            .create();

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore {
            current_action: Some(quotations()),
            ..MenuStore::default()
        };
        store.execute_action(&fx.rpc, &mut fx.session, Some(99)).await;

        mock.assert();
        assert_eq!(store.current_action, Some(quotations()));
        assert_eq!(store.error, None);

        return Ok(());
    }

    #[tokio::test]
    async fn it_keeps_the_current_action_on_failure() -> Result<()> {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/web/dataset/call_kw")
            .with_status(500)
            .create();

        let mut fx = fixture(&server.url(), logged_in_store(Some("tok"))?)?;
        let mut store = MenuStore {
            current_action: Some(quotations()),
            ..MenuStore::default()
        };
        store.execute_action(&fx.rpc, &mut fx.session, Some(42)).await;

        mock.assert();
        assert_eq!(store.current_action, Some(quotations()));
        assert_eq!(store.error, Some("HTTP Error: 500".to_string()));

        return Ok(());
    }

    #[test]
    fn it_goes_home() {
        let mut store = MenuStore {
            menus: vec![sales_app()],
            current_app: Some(sales_app()),
            current_action: Some(quotations()),
            ..MenuStore::default()
        };
        store.go_home();

        assert_eq!(store.current_app, None);
        assert_eq!(store.current_action, None);
        assert!(store.sidebar().is_empty());
        assert_eq!(store.apps().len(), 1);
    }

    #[test]
    fn it_finds_apps_by_id_or_name() {
        let store = MenuStore {
            menus: vec![sales_app()],
            ..MenuStore::default()
        };

        assert_eq!(store.find_app("1").map(|app| return app.id), Some(1));
        assert_eq!(store.find_app("sales").map(|app| return app.id), Some(1));
        assert_eq!(store.find_app("SALES").map(|app| return app.id), Some(1));
        assert!(store.find_app("Inventory").is_none());
        assert!(store.find_app("2").is_none());
    }
}
