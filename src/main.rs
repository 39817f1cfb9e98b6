use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nfcure_ai::AiClient;
use nfcure_api::AppState;
use nfcure_core::{Forwarder, ForwardingStore, NfcStore};
use nfcure_patients::PatientDirectory;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
struct Config {
    port: u16,
    cert_dir: PathBuf,
    force_ip: Option<String>,
    groq_api_key: String,
    groq_base_url: String,
    groq_model: String,
    supabase_url: String,
    supabase_anon_key: String,
}

impl Config {
    fn from_env() -> anyhow::Result<Self> {
        let port = std::env::var("NFCURE_PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()?;
        Ok(Self {
            port,
            cert_dir: std::env::var("NFCURE_CERT_DIR")
                .unwrap_or_else(|_| "./certs".into())
                .into(),
            force_ip: std::env::var("FORCE_IP").ok(),
            groq_api_key: std::env::var("GROQ_API_KEY").unwrap_or_default(),
            groq_base_url: std::env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| "https://api.groq.com/openai/v1".into()),
            groq_model: std::env::var("GROQ_MODEL")
                .unwrap_or_else(|_| "openai/gpt-oss-20b".into()),
            supabase_url: std::env::var("SUPABASE_URL").unwrap_or_default(),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").unwrap_or_default(),
        })
    }
}

/// Main entry point for the NFCure server.
///
/// Serves the NFC ingestion, forwarding-configuration and report endpoints
/// over HTTPS on a single port. TLS material must already exist (see
/// `nfcure generate-certs`); the process exits with a diagnostic when it is
/// missing since the listener cannot bind without it.
///
/// # Environment Variables
/// - `NFCURE_PORT`: HTTPS listener port (default: 3000)
/// - `NFCURE_CERT_DIR`: directory holding server-key.pem / server-cert.pem (default: ./certs)
/// - `FORCE_IP`: manual LAN IP override for the startup banner
/// - `GROQ_API_KEY` / `GROQ_BASE_URL` / `GROQ_MODEL`: completion API settings
/// - `SUPABASE_URL` / `SUPABASE_ANON_KEY`: patient store settings
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if config.groq_api_key.is_empty() {
        tracing::warn!("GROQ_API_KEY is not set; AI summaries will fail and degrade");
    }
    if config.supabase_url.is_empty() {
        tracing::warn!("SUPABASE_URL is not set; patient lookups will fail");
    }

    let key_path = config.cert_dir.join("server-key.pem");
    let cert_path = config.cert_dir.join("server-cert.pem");
    if !key_path.is_file() || !cert_path.is_file() {
        tracing::error!(
            "SSL certificates not found in {}",
            config.cert_dir.display()
        );
        tracing::error!("Run 'nfcure generate-certs' to create them.");
        std::process::exit(1);
    }

    let state = AppState {
        nfc: NfcStore::new(),
        forwarding: ForwardingStore::new(),
        forwarder: Forwarder::new(),
        patients: PatientDirectory::new(&config.supabase_url, &config.supabase_anon_key),
        ai: AiClient::new(
            &config.groq_api_key,
            &config.groq_base_url,
            &config.groq_model,
        ),
    };
    let app = nfcure_api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let tls = RustlsConfig::from_pem_file(&cert_path, &key_path).await?;

    let handle = Handle::new();
    tokio::spawn(shutdown_signal(handle.clone()));

    print_banner(&config);
    tracing::info!("++ Starting NFCure HTTPS on {}", addr);

    axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    tracing::info!("Server closed");
    Ok(())
}

/// Drains in-flight requests on ctrl-c before the listener stops.
async fn shutdown_signal(handle: Handle) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::info!("Shutting down server...");
    handle.graceful_shutdown(Some(Duration::from_secs(5)));
}

/// Prints the reachable URL for operator convenience.
///
/// Best-effort only: interface discovery can pick the wrong NIC on multi-homed
/// hosts, which is what the `FORCE_IP` override is for.
fn print_banner(config: &Config) {
    if let Some(ip) = &config.force_ip {
        tracing::info!("HTTPS Server running on https://{}:{}", ip, config.port);
        tracing::info!("Open this URL in Chrome on your laptop to receive NFC data");
        tracing::info!("Make sure to accept the self-signed certificate warning");
        return;
    }

    let ip = local_ip_address::local_ip()
        .map(|ip| ip.to_string())
        .unwrap_or_else(|_| "localhost".to_owned());
    tracing::info!("HTTPS Server running on https://{}:{}", ip, config.port);
    tracing::info!("Open this URL in Chrome on your laptop to receive NFC data");
    tracing::info!("Make sure to accept the self-signed certificate warning");

    if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
        tracing::info!("Available network interfaces:");
        for (name, addr) in interfaces {
            if addr.is_ipv4() && !addr.is_loopback() {
                tracing::info!("  {}: {}", name, addr);
            }
        }
    }
}
