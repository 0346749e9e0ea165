//! Wire formats of the roster and notification services.
//!
//! The roster service speaks Spanish field names; the notification
//! service expects camelCase.

use serde::{Deserialize, Serialize};

use crate::ports::{RosterRecord, WelcomeNotification};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterRecordDto {
    #[serde(rename = "nombre_completo", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "dni", default)]
    pub national_id: Option<String>,
    #[serde(rename = "id_externo_core", default)]
    pub external_id: Option<String>,
    #[serde(rename = "rol", default)]
    pub role: Option<String>,
}

impl From<RosterRecordDto> for RosterRecord {
    fn from(dto: RosterRecordDto) -> Self {
        Self {
            full_name: dto.full_name,
            email: dto.email,
            national_id: dto.national_id,
            external_id: dto.external_id,
            role: dto.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeRequestDto<'a> {
    pub recipient_email: &'a str,
    pub recipient_name: &'a str,
    pub temporary_password: &'a str,
}

impl<'a> From<&'a WelcomeNotification> for WelcomeRequestDto<'a> {
    fn from(n: &'a WelcomeNotification) -> Self {
        Self {
            recipient_email: &n.recipient_email,
            recipient_name: &n.recipient_name,
            temporary_password: &n.temporary_password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_roster_payload_with_missing_fields() {
        let body = r#"[
            {"nombre_completo": "Ana Pérez", "email": "ana@x.com", "dni": "1",
             "id_externo_core": "c-1", "rol": "alumno"},
            {"email": "b@x.com", "dni": "2"}
        ]"#;
        let records: Vec<RosterRecordDto> = serde_json::from_str(body).unwrap();
        let records: Vec<RosterRecord> = records.into_iter().map(Into::into).collect();

        assert_eq!(records[0].full_name.as_deref(), Some("Ana Pérez"));
        assert_eq!(records[0].external_id.as_deref(), Some("c-1"));
        assert_eq!(records[0].role.as_deref(), Some("alumno"));
        assert_eq!(records[1].full_name, None);
        assert_eq!(records[1].external_id, None);
    }

    #[test]
    fn welcome_request_uses_camel_case() {
        let n = WelcomeNotification {
            recipient_email: "a@x.com".into(),
            recipient_name: "A".into(),
            temporary_password: "deadbeef".into(),
        };
        let json = serde_json::to_value(WelcomeRequestDto::from(&n)).unwrap();
        assert_eq!(json["recipientEmail"], "a@x.com");
        assert_eq!(json["recipientName"], "A");
        assert_eq!(json["temporaryPassword"], "deadbeef");
    }
}
