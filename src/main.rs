use anyhow::Context;
use bookstore_http::ApiClient;
use bookstore_kernel::{settings::Settings, Services};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        api = %settings.api.base_url,
        "bookstore-app bootstrap starting"
    );

    let session = settings.session.store().load()?;
    let api = ApiClient::new(&settings.api.client_config())?;
    let registry = bookstore_app::registry();

    let path = std::env::args().nth(1).unwrap_or_else(|| "/".to_string());
    let services = Services {
        settings: &settings,
        api: &api,
        session: &session,
    };
    let visit = registry.open(&path, services, None).await?;

    if let Some(from) = &visit.redirected_from {
        eprintln!("{from} redirected to {}", visit.path);
    }
    if let Some(alert) = &visit.alert {
        eprintln!("{alert}");
    }
    println!("{}", visit.body);
    Ok(())
}
