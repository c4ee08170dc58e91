use crate::keys;

/// Payload exchanged between the paired devices. Unknown `kind` values are
/// ignored by receivers, so new message types stay backwards compatible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: i64,
    pub timestamp: i64,
}

impl BridgeMessage {
    pub fn readiness_update(score: i64, timestamp: i64) -> Self {
        Self {
            kind: keys::READINESS_UPDATE.to_string(),
            score,
            timestamp,
        }
    }

    pub fn is_readiness_update(&self) -> bool {
        self.kind == keys::READINESS_UPDATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_key() {
        let message = BridgeMessage::readiness_update(82, 1_755_900_000);
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"type\":\"readinessUpdate\""), "{json}");
        assert!(json.contains("\"score\":82"), "{json}");

        let back: BridgeMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
        assert!(back.is_readiness_update());
    }

    #[test]
    fn foreign_kinds_are_not_readiness() {
        let json = r#"{"type":"batteryLevel","score":0,"timestamp":0}"#;
        let message: BridgeMessage = serde_json::from_str(json).unwrap();
        assert!(!message.is_readiness_update());
    }

    #[test]
    fn non_integer_score_fails_to_parse() {
        let json = r#"{"type":"readinessUpdate","score":"high","timestamp":0}"#;
        assert!(serde_json::from_str::<BridgeMessage>(json).is_err());
    }
}
