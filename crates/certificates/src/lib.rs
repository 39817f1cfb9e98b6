use std::net::IpAddr;

use rcgen::{
    CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, Ia5String, IsCa,
    KeyPair, KeyUsagePurpose, SanType, SerialNumber,
};
use thiserror::Error;

/// Errors that can occur during certificate creation.
#[derive(Error, Debug)]
pub enum CertificateError {
    #[error("Failed to generate certificate: {0}")]
    GenerationError(String),
}

/// Self-signed TLS server certificates for the HTTPS listener.
///
/// These are local-development certificates: browsers will show the usual
/// self-signed warning, which operators accept once per device.
pub struct ServerCertificate;

impl ServerCertificate {
    /// Creates a self-signed X.509 server certificate.
    ///
    /// # Arguments
    ///
    /// * `extra_ips` - LAN addresses to include as IP subject alternative
    ///   names, so clients reaching the server over the local network do not
    ///   get a hostname mismatch on top of the self-signed warning.
    ///
    /// # Returns
    ///
    /// A tuple of (X.509 certificate PEM, private key PEM), valid for one
    /// year, with `localhost` always present as a DNS SAN.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError::GenerationError` if key or certificate
    /// generation fails.
    pub fn create(extra_ips: &[IpAddr]) -> Result<(String, String), CertificateError> {
        let mut params = CertificateParams::default();

        let mut subject = DistinguishedName::new();
        subject.push(DnType::CommonName, "localhost");
        subject.push(DnType::OrganizationName, "NFCure Local Dev");
        params.distinguished_name = subject;

        params.is_ca = IsCa::NoCa;

        let localhost = Ia5String::try_from("localhost".to_owned())
            .map_err(|e| CertificateError::GenerationError(e.to_string()))?;
        params.subject_alt_names.push(SanType::DnsName(localhost));
        for ip in extra_ips {
            params.subject_alt_names.push(SanType::IpAddress(*ip));
        }

        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];

        // Validity period (1 year from now)
        let now = time::OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = now + time::Duration::days(365);

        params.serial_number = Some(SerialNumber::from(
            now.unix_timestamp().to_be_bytes().to_vec(),
        ));

        let key_pair =
            KeyPair::generate().map_err(|e| CertificateError::GenerationError(e.to_string()))?;

        let cert = params
            .self_signed(&key_pair)
            .map_err(|e| CertificateError::GenerationError(e.to_string()))?;

        Ok((cert.pem(), key_pair.serialize_pem()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_certificate() {
        let (cert_pem, key_pem) = ServerCertificate::create(&[]).unwrap();

        // Basic checks
        assert!(cert_pem.contains("BEGIN CERTIFICATE"));
        assert!(cert_pem.contains("END CERTIFICATE"));
        assert!(key_pem.contains("BEGIN PRIVATE KEY"));
        assert!(key_pem.contains("END PRIVATE KEY"));
    }

    #[test]
    fn test_san_includes_supplied_ips() {
        use x509_parser::pem::parse_x509_pem;
        use x509_parser::prelude::*;

        let ip: IpAddr = "192.168.1.20".parse().unwrap();
        let (cert_pem, _) = ServerCertificate::create(&[ip]).unwrap();

        let (_, pem) = parse_x509_pem(cert_pem.as_bytes()).unwrap();
        let (_, cert) = X509Certificate::from_der(&pem.contents).unwrap();
        let san = cert
            .subject_alternative_name()
            .unwrap()
            .expect("SAN extension present");

        let mut saw_localhost = false;
        let mut saw_ip = false;
        for name in &san.value.general_names {
            match name {
                GeneralName::DNSName(dns) => saw_localhost |= *dns == "localhost",
                GeneralName::IPAddress(bytes) => saw_ip |= *bytes == [192, 168, 1, 20],
                _ => {}
            }
        }
        assert!(saw_localhost);
        assert!(saw_ip);
    }
}
