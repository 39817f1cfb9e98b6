use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nfcure_certificates::ServerCertificate;

#[derive(Parser)]
#[command(name = "nfcure")]
#[command(about = "NFCure server utilities")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate self-signed TLS certificates for the HTTPS listener
    GenerateCerts {
        /// Output directory for the PEM files
        #[arg(long, default_value = "certs")]
        certs_dir: PathBuf,
        /// Extra IP addresses to include as subject alternative names
        #[arg(long = "ip")]
        ips: Vec<IpAddr>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::GenerateCerts { certs_dir, ips }) => {
            fs::create_dir_all(&certs_dir)?;
            let key_path = certs_dir.join("server-key.pem");
            let cert_path = certs_dir.join("server-cert.pem");

            if key_path.exists() && cert_path.exists() {
                println!("Certificates already exist. Skipping generation.");
                return Ok(());
            }

            let (cert_pem, key_pem) = ServerCertificate::create(&ips)?;
            fs::write(&cert_path, cert_pem)?;
            fs::write(&key_path, key_pem)?;
            println!("SSL certificates generated at {}", certs_dir.display());
        }
        None => {
            println!("Use 'nfcure --help' for commands");
        }
    }

    Ok(())
}
