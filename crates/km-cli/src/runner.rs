use crate::{CliResult, Commands, TenantCommands};

use km_client::{ApiClient, NewTenant};
use km_config::Config;
use km_session::{AppContext, MemoryNavigator, SessionError, StorageKey};
use log::{info, warn};
use serde::Serialize;
use serde_json::{Value, json};

/// Execute one command against `app` and return its JSON result.
///
/// `navigator` is the one `app` was built with; redirects it recorded are
/// reported back to the user.
pub async fn run(
    app: &AppContext,
    navigator: &MemoryNavigator,
    config: &Config,
    command: Commands,
) -> CliResult<Value> {
    match command {
        Commands::Login | Commands::Callback { .. } => {
            let report = app.bootstrap().await;
            Ok(serde_json::to_value(report)?)
        }

        Commands::PasswordLogin { email, password } => {
            let identity = app.session().login_with_password(&email, &password).await?;
            Ok(serde_json::to_value(identity)?)
        }

        Commands::Status => {
            let state = app.session().initialize().await;
            let identity = app.identity();
            let tenant = app.resolver().cached(identity.epoch);

            Ok(json!({
                "state": state,
                "identity": identity,
                "detected_tenant": app.session().detected_tenant(),
                "tenant": tenant,
                "refresh_scheduled": app.session().is_refresh_scheduled(),
            }))
        }

        Commands::Resolve { candidates } => {
            require_session(app).await?;
            let resolved = app.resolve(&candidates).await?;
            Ok(serde_json::to_value(resolved)?)
        }

        Commands::SwitchTenant { value } => {
            app.switch_tenant(&value)?;
            Ok(json!({ "tenant_override": value.trim() }))
        }

        Commands::HasRole { role } => {
            require_session(app).await?;
            Ok(json!({
                "role": role,
                "client_id": app.session().client_id(),
                "granted": app.session().has_role(&role),
            }))
        }

        Commands::Logout => {
            app.logout().await;
            Ok(json!({
                "state": app.session().state(),
                "redirect": navigator.last_redirect(),
            }))
        }

        Commands::Watch => watch(app).await,

        Commands::Tenant { action } => match action {
            TenantCommands::Create {
                name,
                slug,
                tier,
                max_users,
                max_storage_gb,
                admin_email,
                admin_password,
                admin_first_name,
                admin_last_name,
            } => {
                let tenant = NewTenant {
                    name,
                    slug,
                    subscription_tier: tier,
                    max_users,
                    max_storage_gb,
                    admin_email,
                    admin_password,
                    admin_first_name,
                    admin_last_name,
                };

                let client = tenant_admin_client(app).await;
                let created = client
                    .create_tenant_with_retry(&tenant, &config.retry)
                    .await?;
                info!("Created tenant '{}' ({})", created.slug, created.tenant_id);
                Ok(serde_json::to_value(created)?)
            }
        },
    }
}

/// Serialize command output
pub fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> CliResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

async fn require_session(app: &AppContext) -> CliResult<()> {
    let state = app.session().initialize().await;
    if state.is_authenticated() {
        Ok(())
    } else {
        Err(SessionError::not_authenticated().into())
    }
}

/// Tenant creation works signed out (sign-up). An existing session is used
/// when one is stored, without starting a new login.
async fn tenant_admin_client(app: &AppContext) -> ApiClient {
    let has_session = matches!(app.store().get(StorageKey::Token), Ok(Some(_)))
        || matches!(app.store().get(StorageKey::RefreshToken), Ok(Some(_)));
    if !has_session {
        return app.api().clone();
    }

    app.session().initialize().await;
    match app.authenticated_client(&app.identity()) {
        Ok(client) => client,
        Err(e) => {
            warn!("Creating tenant without a session: {}", e);
            app.api().clone()
        }
    }
}

/// Print each identity change as one JSON line until interrupted or signed out
async fn watch(app: &AppContext) -> CliResult<Value> {
    let state = app.session().initialize().await;
    if !state.is_authenticated() {
        return Ok(json!({ "state": state }));
    }

    let mut updates = app.session().subscribe();
    println!("{}", render(&*updates.borrow_and_update(), false)?);

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let identity = updates.borrow_and_update().clone();
                println!("{}", render(&identity, false)?);
                if !identity.authenticated {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    app.session().shutdown();
    Ok(json!({ "state": app.session().state() }))
}
