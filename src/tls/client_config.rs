use crate::tls::cert_verifier::AcceptAnyCertificate;
use anyhow::Context;
use rustls::crypto::ring::{default_provider, DEFAULT_CIPHER_SUITES};
use rustls::{ClientConfig, RootCertStore};
use std::path::Path;
use std::sync::Arc;

/// Builds the rustls client configuration used for `https` origins.
///
/// Roots come from the PEM bundle at `certificate_path` when given, from
/// webpki-roots otherwise. With `skip_validate` any chain is accepted. Only
/// HTTP/1.1 is offered over ALPN.
pub fn build_client_config(
    skip_validate: bool,
    certificate_path: Option<&Path>,
) -> Result<Arc<ClientConfig>, anyhow::Error> {
    let mut root_store = RootCertStore::empty();
    if let Some(file_path) = certificate_path {
        let f = std::fs::File::open(file_path)
            .with_context(|| format!("Failed to open certificate file {}", file_path.display()))?;
        let mut rd = std::io::BufReader::new(f);
        for cert in rustls_pemfile::certs(&mut rd) {
            root_store.add(cert?)?;
        }
        ensure!(
            !root_store.is_empty(),
            "No certificates found in {}",
            file_path.display()
        );
    } else {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    };

    let provider = Arc::new(rustls::crypto::CryptoProvider {
        cipher_suites: DEFAULT_CIPHER_SUITES.to_vec(),
        ..default_provider()
    });

    let mut tls_config = ClientConfig::builder_with_provider(provider.clone())
        .with_protocol_versions(rustls::DEFAULT_VERSIONS)?
        .with_root_certificates(root_store)
        .with_no_client_auth();

    if skip_validate {
        tls_config
            .dangerous()
            .set_certificate_verifier(Arc::new(AcceptAnyCertificate::new(provider)));
    }
    tls_config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(Arc::new(tls_config))
}
