// hawkBit target registration - trades a serial number for the
// per-device security token the OTA client authenticates with.

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::settings::Settings;

const DEVICE_DESCRIPTION: &str = "Automatic Alcohol Distilator";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TargetRequest {
    controller_id: String,
    name: String,
    description: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetResponse {
    security_token: String,
}

/// External device identifier: fixed tag plus the serial number as a
/// zero-padded 8-digit decimal.
pub fn controller_id(serial: u32) -> String {
    format!("AAD_{serial:08}")
}

/// Human-readable target name shown in the server UI (unpadded).
pub fn display_name(serial: u32) -> String {
    format!("AAD_{serial}")
}

/// `Authorization` header value for HTTP Basic authentication.
pub fn basic_auth(username: &str, password: &str) -> String {
    let encoded = BASE64.encode(format!("{username}:{password}"));
    format!("Basic {encoded}")
}

/// Registers the device with the management server and returns its
/// security token.
///
/// At-least-once, non-idempotent: every call creates a target record
/// server-side. Re-running provisioning for the same serial number
/// leaves duplicate registrations unless the server deduplicates by
/// controller id.
pub fn register_device(settings: &Settings) -> Result<String> {
    let url = settings.registration_url();
    let body = vec![TargetRequest {
        controller_id: controller_id(settings.serial_number),
        name: display_name(settings.serial_number),
        description: DEVICE_DESCRIPTION,
    }];
    debug!(%url, controller_id = %body[0].controller_id, "registering target");

    let client = reqwest::blocking::Client::builder()
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .post(&url)
        .header("Accept", "application/hal+json")
        .header(
            "Authorization",
            basic_auth(&settings.username, &settings.password),
        )
        .json(&body)
        .send()
        .with_context(|| format!("registration request to {url} failed"))?;

    let status = response.status();
    debug!(%status, "registration response");
    if !status.is_success() {
        bail!("management server rejected registration: HTTP {status}");
    }

    let mut targets: Vec<TargetResponse> = response
        .json()
        .context("could not read securityToken from registration response")?;
    if targets.is_empty() {
        bail!("registration response contained no targets");
    }
    Ok(targets.remove(0).security_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_id_is_zero_padded_to_eight_digits() {
        assert_eq!(controller_id(5), "AAD_00000005");
        assert_eq!(controller_id(0), "AAD_00000000");
        assert_eq!(controller_id(12345678), "AAD_12345678");
        // wider serials are not truncated
        assert_eq!(controller_id(123456789), "AAD_123456789");
    }

    #[test]
    fn test_display_name_is_unpadded() {
        assert_eq!(display_name(5), "AAD_5");
    }

    #[test]
    fn test_basic_auth_matches_reference_encoding() {
        assert_eq!(
            basic_auth("admin", "test12345678"),
            "Basic YWRtaW46dGVzdDEyMzQ1Njc4"
        );
    }

    #[test]
    fn test_request_body_uses_server_field_names() {
        let body = vec![TargetRequest {
            controller_id: controller_id(5),
            name: display_name(5),
            description: DEVICE_DESCRIPTION,
        }];
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"[{"controllerId":"AAD_00000005","name":"AAD_5","description":"Automatic Alcohol Distilator"}]"#
        );
    }

    #[test]
    fn test_response_token_extraction() {
        let raw = r#"[{"controllerId":"AAD_00000005","securityToken":"abc123","name":"AAD_5"}]"#;
        let targets: Vec<TargetResponse> = serde_json::from_str(raw).unwrap();
        assert_eq!(targets[0].security_token, "abc123");
    }

    #[test]
    fn test_response_without_token_is_a_parse_error() {
        let raw = r#"[{"controllerId":"AAD_00000005","name":"AAD_5"}]"#;
        let targets: Result<Vec<TargetResponse>, _> = serde_json::from_str(raw);
        assert!(targets.is_err());
    }
}
