//! obs-websocket v5 message types.
//!
//! Every frame is a JSON text message `{"op": <opcode>, "d": <payload>}`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// RPC version negotiated with the server.
pub const RPC_VERSION: u32 = 1;

/// Frame opcodes used by this client.
pub mod op {
    pub const HELLO: u8 = 0;
    pub const IDENTIFY: u8 = 1;
    pub const IDENTIFIED: u8 = 2;
    pub const EVENT: u8 = 5;
    pub const REQUEST: u8 = 6;
    pub const REQUEST_RESPONSE: u8 = 7;
}

/// Envelope for all frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub op: u8,
    pub d: serde_json::Value,
}

/// Authentication challenge sent in `Hello`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthChallenge {
    pub challenge: String,
    pub salt: String,
}

/// First message from the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    pub obs_web_socket_version: String,
    pub rpc_version: u32,
    #[serde(default)]
    pub authentication: Option<AuthChallenge>,
}

/// Client reply to `Hello`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    pub rpc_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    /// Bitmask of event categories; this client subscribes to none.
    pub event_subscriptions: u32,
}

/// Server confirmation that the session is ready.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identified {
    pub negotiated_rpc_version: u32,
}

/// A request to the server.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request<'a> {
    pub request_type: &'a str,
    pub request_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_data: Option<serde_json::Value>,
}

/// Outcome block of a request response.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestStatus {
    pub result: bool,
    pub code: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// The server's answer to a [`Request`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    pub request_type: String,
    pub request_id: String,
    pub request_status: RequestStatus,
    #[serde(default)]
    pub response_data: Option<serde_json::Value>,
}

/// One entry of `GetSceneList`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEntry {
    pub scene_name: String,
    /// Present from obs-websocket 5.4 on.
    #[serde(default)]
    pub scene_uuid: Option<String>,
}

/// `GetSceneList` response data.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneList {
    pub scenes: Vec<SceneEntry>,
}

/// `GetCurrentProgramScene` response data.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentProgramScene {
    pub current_program_scene_name: String,
    #[serde(default)]
    pub current_program_scene_uuid: Option<String>,
}

/// Computes the `Identify` authentication string:
/// `base64(sha256(base64(sha256(password + salt)) + challenge))`.
pub fn auth_response(password: &str, salt: &str, challenge: &str) -> String {
    let secret = BASE64.encode(Sha256::digest(format!("{password}{salt}")));
    BASE64.encode(Sha256::digest(format!("{secret}{challenge}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_matches_reference_vector() {
        let auth = auth_response(
            "supersecretpassword",
            "lM1GncleQOaCu9lT1yeUZhFYnqhsLLP1G5lAGo3ixaI=",
            "+IxH4CnCiqpX1rM9scsNynZzbOe4KhDeYcTNS3PDaeY=",
        );
        assert_eq!(auth, "1Ct943GAT+6YQUUX47Ia/ncufilbe6+oD6lY+5kaCu4=");
    }

    #[test]
    fn hello_with_and_without_auth() {
        let hello: Hello = serde_json::from_str(
            r#"{"obsWebSocketVersion":"5.5.2","rpcVersion":1,
                "authentication":{"challenge":"c","salt":"s"}}"#,
        )
        .unwrap();
        assert_eq!(hello.rpc_version, 1);
        assert_eq!(
            hello.authentication,
            Some(AuthChallenge {
                challenge: "c".into(),
                salt: "s".into()
            })
        );

        let hello: Hello =
            serde_json::from_str(r#"{"obsWebSocketVersion":"5.0.0","rpcVersion":1}"#).unwrap();
        assert!(hello.authentication.is_none());
    }

    #[test]
    fn identify_omits_missing_auth() {
        let identify = Identify {
            rpc_version: RPC_VERSION,
            authentication: None,
            event_subscriptions: 0,
        };
        let json = serde_json::to_value(&identify).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"rpcVersion": 1, "eventSubscriptions": 0})
        );
    }

    #[test]
    fn request_response_without_data() {
        let resp: RequestResponse = serde_json::from_str(
            r#"{"requestType":"SetCurrentProgramScene","requestId":"abc",
                "requestStatus":{"result":false,"code":600,"comment":"No source was found"}}"#,
        )
        .unwrap();
        assert!(!resp.request_status.result);
        assert_eq!(resp.request_status.code, 600);
        assert!(resp.response_data.is_none());
    }

    #[test]
    fn scene_list_tolerates_missing_uuid() {
        let list: SceneList = serde_json::from_str(
            r#"{"currentProgramSceneName":"A","scenes":[
                {"sceneIndex":1,"sceneName":"A"},
                {"sceneIndex":0,"sceneName":"B","sceneUuid":"u-b"}]}"#,
        )
        .unwrap();
        assert_eq!(list.scenes.len(), 2);
        assert!(list.scenes[0].scene_uuid.is_none());
        assert_eq!(list.scenes[1].scene_uuid.as_deref(), Some("u-b"));
    }
}
