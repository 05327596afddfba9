use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{middleware, web, App, HttpServer};
use log::{info, warn};
use rustls::ServerConfig;
use rustls_pemfile::{certs, pkcs8_private_keys};
use std::env;
use std::fs::File as FsFile;
use std::io::{self, BufReader};
use textstore::config::{Config, TlsPaths};

fn load_tls(paths: &TlsPaths) -> io::Result<ServerConfig> {
    let cert_file = &mut BufReader::new(FsFile::open(&paths.cert_path)?);
    let key_file = &mut BufReader::new(FsFile::open(&paths.key_path)?);
    let cert_chain = certs(cert_file).collect::<Result<Vec<_>, _>>()?;
    let mut keys = pkcs8_private_keys(key_file).collect::<Result<Vec<_>, _>>()?;

    if keys.is_empty() {
        return Err(io::Error::new(io::ErrorKind::Other, "No private keys found in key file"));
    }

    ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(cert_chain, keys.remove(0).into())
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    // Override the log level with RUST_LOG, e.g. `RUST_LOG=debug`.
    env::set_var("RUST_LOG", env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()));
    env_logger::init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let addr = config.bind_addr();
    let store = web::Data::new(config.store.clone());

    let mut http_server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(store.clone())
            .configure(textstore::configure)
    });

    match &config.tls {
        Some(tls) if tls.cert_path.exists() && tls.key_path.exists() => {
            info!("Attempting to start HTTPS server...");
            let server_config = load_tls(tls)?;
            info!("Successfully configured TLS. Binding to https://{}", addr);
            http_server = http_server.bind_rustls_0_23(addr, server_config)?;
        }
        Some(_) => {
            warn!("CERT_PATH or KEY_PATH points to a non-existent file. Starting without HTTPS.");
            info!("Listening on http://{}", addr);
            http_server = http_server.bind(addr)?;
        }
        None => {
            info!("No CERT_PATH or KEY_PATH found in env. Listening on http://{}", addr);
            http_server = http_server.bind(addr)?;
        }
    }

    http_server.run().await
}
