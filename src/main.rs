use docqa_webapp::{api, config, storage, AppState, Capabilities};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // 1. Cargar .env e inicializar logging
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        error!("Error fatal: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // 2. Cargar configuración
    let cfg = config::AppConfig::from_env()?;
    info!(
        "Configuración cargada: subidas en {}, límite {} bytes",
        cfg.upload_dir.display(),
        cfg.max_upload_bytes
    );

    // 3. Preparar el directorio temporal de subidas
    storage::ensure_upload_dir(&cfg.upload_dir)?;

    // 4. Resolver las capacidades (una sola vez para toda la vida del proceso)
    let capabilities = Capabilities::from_config(&cfg);
    let app_state = AppState::new(cfg, capabilities);

    // 5. Configurar el router de la API y el servicio de ficheros estáticos
    let server_addr = app_state.config.server_addr.clone();
    let open_browser = app_state.config.open_browser;

    let app = api::create_app(app_state);

    // 6. Iniciar el servidor
    let listener = tokio::net::TcpListener::bind(&server_addr).await?;
    let server_url = format!("http://{}", server_addr);
    info!("🚀 Servidor escuchando en {}", &server_url);

    if open_browser && webbrowser::open(&server_url).is_err() {
        info!("No se pudo abrir el navegador. Por favor, accede a {} manualmente.", server_url);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Señal de apagado recibida, iniciando cierre del servidor.");
        })
        .await?;

    info!("✅ Servidor cerrado correctamente.");
    Ok(())
}
