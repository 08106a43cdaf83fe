//! Credentials accepted by the transport builder.
//!
//! `Credential` is a closed set: a transport is built from exactly one
//! shared key or exactly one client certificate, never both and never
//! neither.

use rustls::pki_types::pem::PemObject;
use rustls::pki_types::{CertificateDer, CertificateRevocationListDer, PrivateKeyDer};
use secrecy::SecretString;
use std::fmt;
use std::path::Path;

use crate::ports::CredentialMode;

use super::TransportConstructionError;

/// The one credential a transport authenticates with.
#[derive(Debug, Clone)]
pub enum Credential {
    /// Access key sent in the `aeg-sas-key` header.
    SharedKey(SecretString),
    /// X.509 client certificate presented during the TLS handshake.
    ClientCertificate(ClientCertificate),
}

impl Credential {
    /// Creates a shared-key credential.
    pub fn shared_key(key: impl Into<String>) -> Self {
        Credential::SharedKey(SecretString::new(key.into()))
    }

    /// Returns which transport mode this credential selects.
    pub fn mode(&self) -> CredentialMode {
        match self {
            Credential::SharedKey(_) => CredentialMode::SharedKey,
            Credential::ClientCertificate(_) => CredentialMode::ClientCertificate,
        }
    }
}

impl From<ClientCertificate> for Credential {
    fn from(certificate: ClientCertificate) -> Self {
        Credential::ClientCertificate(certificate)
    }
}

/// Client certificate chain and key, plus the material used to verify the server.
///
/// Revocation lists are checked for the server chain on every connection.
/// Trust roots default to the Mozilla root set when none are given.
pub struct ClientCertificate {
    chain: Vec<CertificateDer<'static>>,
    private_key: PrivateKeyDer<'static>,
    revocation_lists: Vec<CertificateRevocationListDer<'static>>,
    trust_roots: Vec<CertificateDer<'static>>,
    sentinel_key: Option<SecretString>,
}

impl ClientCertificate {
    /// Creates a certificate credential from DER material.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCertificate` if the chain is empty.
    pub fn new(
        chain: Vec<CertificateDer<'static>>,
        private_key: PrivateKeyDer<'static>,
    ) -> Result<Self, TransportConstructionError> {
        if chain.is_empty() {
            return Err(TransportConstructionError::InvalidCertificate(
                "certificate chain is empty".to_string(),
            ));
        }

        Ok(Self {
            chain,
            private_key,
            revocation_lists: Vec::new(),
            trust_roots: Vec::new(),
            sentinel_key: None,
        })
    }

    /// Parses a PEM certificate chain (leaf first) and a PEM private key.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self, TransportConstructionError> {
        let chain = parse_certificates(cert_pem, "certificate chain")?;
        let private_key = PrivateKeyDer::from_pem_slice(key_pem).map_err(|e| {
            TransportConstructionError::InvalidCertificate(format!("private key: {}", e))
        })?;

        Self::new(chain, private_key)
    }

    /// Reads and parses PEM certificate chain and key files.
    pub fn from_pem_files(
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
    ) -> Result<Self, TransportConstructionError> {
        let cert_pem = read_pem(cert_path.as_ref())?;
        let key_pem = read_pem(key_path.as_ref())?;
        Self::from_pem(&cert_pem, &key_pem)
    }

    /// Adds revocation lists from PEM (`X509 CRL` sections).
    pub fn with_revocation_lists_pem(
        mut self,
        pem: &[u8],
    ) -> Result<Self, TransportConstructionError> {
        let crls = CertificateRevocationListDer::pem_slice_iter(pem)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                TransportConstructionError::InvalidCertificate(format!("revocation list: {}", e))
            })?;
        if crls.is_empty() {
            return Err(TransportConstructionError::InvalidCertificate(
                "revocation list: no X509 CRL sections found".to_string(),
            ));
        }

        self.revocation_lists.extend(crls);
        Ok(self)
    }

    /// Adds revocation lists from PEM files.
    pub fn with_revocation_list_files<P: AsRef<Path>>(
        self,
        paths: &[P],
    ) -> Result<Self, TransportConstructionError> {
        paths.iter().try_fold(self, |certificate, path| {
            let pem = read_pem(path.as_ref())?;
            certificate.with_revocation_lists_pem(&pem)
        })
    }

    /// Replaces the default trust roots with the CAs in a PEM bundle.
    pub fn with_trust_roots_pem(mut self, pem: &[u8]) -> Result<Self, TransportConstructionError> {
        self.trust_roots = parse_certificates(pem, "trust roots")?;
        Ok(self)
    }

    /// Value sent in the key header slot alongside the certificate.
    ///
    /// The endpoint authenticates the TLS client certificate; some
    /// deployments still expect a placeholder in the key header.
    pub fn with_sentinel_key(mut self, value: impl Into<String>) -> Self {
        self.sentinel_key = Some(SecretString::new(value.into()));
        self
    }

    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }

    pub fn private_key(&self) -> &PrivateKeyDer<'static> {
        &self.private_key
    }

    pub fn revocation_lists(&self) -> &[CertificateRevocationListDer<'static>] {
        &self.revocation_lists
    }

    pub fn trust_roots(&self) -> &[CertificateDer<'static>] {
        &self.trust_roots
    }

    pub fn sentinel_key(&self) -> Option<&SecretString> {
        self.sentinel_key.as_ref()
    }
}

impl Clone for ClientCertificate {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            private_key: self.private_key.clone_key(),
            revocation_lists: self.revocation_lists.clone(),
            trust_roots: self.trust_roots.clone(),
            sentinel_key: self.sentinel_key.clone(),
        }
    }
}

impl fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("chain_len", &self.chain.len())
            .field("private_key", &"[REDACTED]")
            .field("revocation_lists", &self.revocation_lists.len())
            .field("trust_roots", &self.trust_roots.len())
            .field("sentinel_key", &self.sentinel_key.is_some())
            .finish()
    }
}

fn parse_certificates(
    pem: &[u8],
    what: &str,
) -> Result<Vec<CertificateDer<'static>>, TransportConstructionError> {
    let certs = CertificateDer::pem_slice_iter(pem)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TransportConstructionError::InvalidCertificate(format!("{}: {}", what, e)))?;
    if certs.is_empty() {
        return Err(TransportConstructionError::InvalidCertificate(format!(
            "{}: no CERTIFICATE sections found",
            what
        )));
    }
    Ok(certs)
}

fn read_pem(path: &Path) -> Result<Vec<u8>, TransportConstructionError> {
    std::fs::read(path).map_err(|e| {
        TransportConstructionError::InvalidCertificate(format!("{}: {}", path.display(), e))
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use std::io::Write;

    #[test]
    fn shared_key_credential_selects_shared_key_mode() {
        assert_eq!(Credential::shared_key("k1").mode(), CredentialMode::SharedKey);
    }

    #[test]
    fn certificate_credential_selects_certificate_mode() {
        let credential = Credential::from(certificate());
        assert_eq!(credential.mode(), CredentialMode::ClientCertificate);
    }

    #[test]
    fn from_pem_parses_chain_and_key() {
        let cert = ClientCertificate::from_pem(CERT_PEM.as_bytes(), KEY_PEM.as_bytes()).unwrap();
        assert_eq!(cert.chain().len(), 1);
        assert!(cert.revocation_lists().is_empty());
        assert!(cert.sentinel_key().is_none());
    }

    #[test]
    fn from_pem_rejects_missing_certificate() {
        let err = ClientCertificate::from_pem(b"not a pem", KEY_PEM.as_bytes()).unwrap_err();
        assert!(matches!(err, TransportConstructionError::InvalidCertificate(_)));
    }

    #[test]
    fn from_pem_rejects_missing_key() {
        let err = ClientCertificate::from_pem(CERT_PEM.as_bytes(), b"").unwrap_err();
        match err {
            TransportConstructionError::InvalidCertificate(msg) => {
                assert!(msg.contains("private key"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn revocation_lists_are_collected() {
        let cert = certificate();
        assert_eq!(cert.revocation_lists().len(), 1);
    }

    #[test]
    fn revocation_pem_without_crl_is_rejected() {
        let cert = ClientCertificate::from_pem(CERT_PEM.as_bytes(), KEY_PEM.as_bytes()).unwrap();
        assert!(cert.with_revocation_lists_pem(CERT_PEM.as_bytes()).is_err());
    }

    #[test]
    fn from_pem_files_reads_disk() {
        let mut cert_file = tempfile::NamedTempFile::new().unwrap();
        cert_file.write_all(CERT_PEM.as_bytes()).unwrap();
        let mut key_file = tempfile::NamedTempFile::new().unwrap();
        key_file.write_all(KEY_PEM.as_bytes()).unwrap();
        let mut crl_file = tempfile::NamedTempFile::new().unwrap();
        crl_file.write_all(CRL_PEM.as_bytes()).unwrap();

        let cert = ClientCertificate::from_pem_files(cert_file.path(), key_file.path())
            .unwrap()
            .with_revocation_list_files(&[crl_file.path()])
            .unwrap();

        assert_eq!(cert.chain().len(), 1);
        assert_eq!(cert.revocation_lists().len(), 1);
    }

    #[test]
    fn from_pem_files_reports_missing_file() {
        let err = ClientCertificate::from_pem_files("/nonexistent/cert.pem", "/nonexistent/key.pem")
            .unwrap_err();
        match err {
            TransportConstructionError::InvalidCertificate(msg) => {
                assert!(msg.contains("/nonexistent/cert.pem"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let debug = format!("{:?}", certificate().with_sentinel_key("placeholder"));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("placeholder"));
    }
}
