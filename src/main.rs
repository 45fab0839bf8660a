//! switchyard demo server.
//!
//! # Routes
//! ```text
//! GET    /health
//! GET    /whoami                      (client IP, request ID)
//! POST   /signup                      (form binding + validation)
//! /api   [stamp]
//!   GET    /api/items                 (list)
//!   POST   /api/items                 (create, form)
//!   GET    /api/items/{id}            (read)
//!   POST   /api/items/{id}            (update, form)
//!   DELETE /api/items/{id}            (delete)
//!   /api/admin [stamp, require_token]
//!     GET  /api/admin/routes          (route listing via walk)
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Instant;

use axum::http::StatusCode;
use clap::Parser;
use serde::{Deserialize, Serialize};
use validator::Validate;

use switchyard::config::{load_config, AppConfig};
use switchyard::observability::{logging, metrics};
use switchyard::{HandlerError, HandlerFunc, HttpError, LifecycleManager, RouterGroup};

#[derive(Parser)]
#[command(name = "switchyard")]
#[command(about = "Demo server for the switchyard dispatch layer", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides the config file).
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve without interrupt-driven graceful shutdown.
    #[arg(long)]
    no_graceful: bool,

    /// Print the registered routes and exit.
    #[arg(long)]
    print_routes: bool,

    /// Token expected in `Authorization: Bearer` for admin routes.
    #[arg(long, default_value = "change-me")]
    admin_token: String,
}

#[derive(Debug, Clone, Serialize)]
struct Item {
    id: u64,
    name: String,
    quantity: u32,
}

#[derive(Debug, Deserialize, Validate)]
struct ItemForm {
    #[validate(length(min = 1, max = 64))]
    name: String,
    #[validate(range(max = 10_000))]
    quantity: u32,
}

#[derive(Debug, Deserialize, Validate)]
struct SignupForm {
    #[validate(email)]
    email: String,
    #[validate(length(min = 8))]
    password: String,
}

#[derive(Default)]
struct Store {
    next_id: u64,
    items: BTreeMap<u64, Item>,
}

type SharedStore = Arc<Mutex<Store>>;
type RouteListing = Arc<OnceLock<Vec<serde_json::Value>>>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    logging::init_logging(&config.observability);

    let router = build_router(Arc::new(cli.admin_token.clone()));

    if cli.print_routes {
        router.walk(|methods, path, handlers| {
            println!("{:<8} {:<28} {} handler(s)", methods.join(","), path, handlers.len());
            Ok::<_, std::io::Error>(())
        })?;
        return Ok(());
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let port = cli.port.unwrap_or(config.server.port);
    let graceful = config.server.graceful && !cli.no_graceful;

    tracing::info!(port, graceful, "switchyard v{} starting", env!("CARGO_PKG_VERSION"));
    LifecycleManager::new(router, config).run(port, graceful).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_router(admin_token: Arc<String>) -> RouterGroup {
    let store = SharedStore::default();
    let listing = RouteListing::default();
    let mut router = RouterGroup::new();

    router.get("/health", vec![health()]);
    router.get("/whoami", vec![whoami()]);
    router.post("/signup", vec![signup()]);

    router.group("/api", vec![stamp()], |api| {
        api.crud(
            "/items",
            vec![list_items(store.clone())],
            vec![create_item(store.clone())],
            vec![read_item(store.clone())],
            vec![update_item(store.clone())],
            vec![delete_item(store.clone())],
        );
        api.group("/admin", vec![require_token(admin_token)], |admin| {
            admin.get("/routes", vec![route_listing(listing.clone())]);
        });
    });

    // Filled once the tree is complete; read-only afterwards.
    let mut routes = Vec::new();
    let walked = router.walk(|methods, path, _| {
        routes.push(serde_json::json!({ "methods": methods, "path": path }));
        Ok::<_, serde_json::Error>(())
    });
    if let Err(e) = walked {
        tracing::error!(error = %e, "Failed to collect route listing");
    }
    if listing.set(routes).is_err() {
        tracing::warn!("Route listing already populated");
    }

    router
}

fn health() -> HandlerFunc {
    HandlerFunc::named("health", |ctx| {
        Box::pin(async move {
            ctx.text(StatusCode::OK, "ok");
            Ok(())
        })
    })
}

fn whoami() -> HandlerFunc {
    HandlerFunc::named("whoami", |ctx| {
        Box::pin(async move {
            let body = serde_json::json!({
                "client_ip": ctx.client_ip(),
                "request_id": ctx.request_id(),
            });
            ctx.json(StatusCode::OK, &body)?;
            Ok(())
        })
    })
}

fn signup() -> HandlerFunc {
    HandlerFunc::named("signup", |ctx| {
        Box::pin(async move {
            let form: SignupForm = ctx.bind().await?;
            tracing::info!(email = %form.email, "Signup accepted");
            ctx.json(StatusCode::CREATED, &serde_json::json!({ "email": form.email }))?;
            Ok(())
        })
    })
}

/// Records when the request entered the `/api` group.
fn stamp() -> HandlerFunc {
    HandlerFunc::named("stamp", |ctx| {
        Box::pin(async move {
            ctx.set("started", Instant::now());
            Ok(())
        })
    })
}

fn require_token(token: Arc<String>) -> HandlerFunc {
    HandlerFunc::named("require_token", move |ctx| {
        let token = Arc::clone(&token);
        Box::pin(async move {
            let expected = format!("Bearer {}", token);
            if ctx.header("authorization") != expected {
                return Err(HttpError::unauthorized("invalid or missing token").into());
            }
            Ok(())
        })
    })
}

fn route_listing(listing: RouteListing) -> HandlerFunc {
    HandlerFunc::named("route_listing", move |ctx| {
        let listing = Arc::clone(&listing);
        Box::pin(async move {
            let routes = listing.get().map(Vec::as_slice).unwrap_or_default();
            ctx.json(StatusCode::OK, routes)?;
            Ok(())
        })
    })
}

fn item_id(ctx: &switchyard::Context) -> Result<u64, HandlerError> {
    ctx.param("id")
        .parse()
        .map_err(|_| HttpError::bad_request("item id must be a number").into())
}

fn lock(store: &SharedStore) -> Result<std::sync::MutexGuard<'_, Store>, HandlerError> {
    store.lock().map_err(|_| HandlerError::msg("item store poisoned"))
}

fn list_items(store: SharedStore) -> HandlerFunc {
    HandlerFunc::named("list_items", move |ctx| {
        let store = store.clone();
        Box::pin(async move {
            if let Some(started) = ctx.get::<Instant>("started") {
                tracing::debug!(elapsed = ?started.elapsed(), "Listing items");
            }
            let items: Vec<Item> = lock(&store)?.items.values().cloned().collect();
            ctx.json(StatusCode::OK, &items)?;
            Ok(())
        })
    })
}

fn create_item(store: SharedStore) -> HandlerFunc {
    HandlerFunc::named("create_item", move |ctx| {
        let store = store.clone();
        Box::pin(async move {
            let form: ItemForm = ctx.bind().await?;
            let item = {
                let mut store = lock(&store)?;
                store.next_id += 1;
                let item = Item {
                    id: store.next_id,
                    name: form.name,
                    quantity: form.quantity,
                };
                store.items.insert(item.id, item.clone());
                item
            };
            ctx.json(StatusCode::CREATED, &item)?;
            Ok(())
        })
    })
}

fn read_item(store: SharedStore) -> HandlerFunc {
    HandlerFunc::named("read_item", move |ctx| {
        let store = store.clone();
        Box::pin(async move {
            let id = item_id(ctx)?;
            let item = lock(&store)?.items.get(&id).cloned();
            match item {
                Some(item) => ctx.json(StatusCode::OK, &item)?,
                None => return Err(HttpError::not_found(format!("item {} not found", id)).into()),
            }
            Ok(())
        })
    })
}

fn update_item(store: SharedStore) -> HandlerFunc {
    HandlerFunc::named("update_item", move |ctx| {
        let store = store.clone();
        Box::pin(async move {
            let id = item_id(ctx)?;
            let form: ItemForm = ctx.bind().await?;
            let updated = {
                let mut store = lock(&store)?;
                store.items.get_mut(&id).map(|item| {
                    item.name = form.name;
                    item.quantity = form.quantity;
                    item.clone()
                })
            };
            match updated {
                Some(item) => ctx.json(StatusCode::OK, &item)?,
                None => return Err(HttpError::not_found(format!("item {} not found", id)).into()),
            }
            Ok(())
        })
    })
}

fn delete_item(store: SharedStore) -> HandlerFunc {
    HandlerFunc::named("delete_item", move |ctx| {
        let store = store.clone();
        Box::pin(async move {
            let id = item_id(ctx)?;
            if lock(&store)?.items.remove(&id).is_none() {
                return Err(HttpError::not_found(format!("item {} not found", id)).into());
            }
            ctx.writer_mut().set_status(StatusCode::NO_CONTENT);
            Ok(())
        })
    })
}
