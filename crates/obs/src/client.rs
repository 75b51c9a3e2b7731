//! Sequential obs-websocket connection.
//!
//! Requests are issued one at a time and the reply is read inline, skipping
//! any unrelated frames, so no background pumps are needed.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::ObsError;
use crate::protocol::{
    Frame, Hello, Identified, Identify, RPC_VERSION, Request, RequestResponse, auth_response, op,
};

/// Timeout for connecting and completing the handshake.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for a single request/response exchange.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An identified obs-websocket session.
pub struct ObsConnection {
    ws: WsStream,
}

impl ObsConnection {
    /// Connects to `url` and completes the Hello/Identify handshake.
    pub async fn connect(url: &str, password: Option<&str>) -> Result<Self, ObsError> {
        tokio::time::timeout(CONNECT_TIMEOUT, Self::handshake(url, password))
            .await
            .map_err(|_| ObsError::Timeout)?
    }

    async fn handshake(url: &str, password: Option<&str>) -> Result<Self, ObsError> {
        let (ws, _) = tokio_tungstenite::connect_async(url).await?;
        let mut conn = Self { ws };

        let hello: Hello = serde_json::from_value(conn.expect_op(op::HELLO).await?)?;
        tracing::debug!(
            version = %hello.obs_web_socket_version,
            rpc_version = hello.rpc_version,
            "received hello"
        );

        let authentication = match (&hello.authentication, password) {
            (Some(auth), Some(password)) => {
                Some(auth_response(password, &auth.salt, &auth.challenge))
            }
            (Some(_), None) => {
                return Err(ObsError::Handshake(
                    "server requires a password but none is configured".into(),
                ));
            }
            (None, _) => None,
        };

        let identify = Identify {
            rpc_version: RPC_VERSION,
            authentication,
            event_subscriptions: 0,
        };
        conn.send(op::IDENTIFY, &identify).await?;

        let identified: Identified = serde_json::from_value(conn.expect_op(op::IDENTIFIED).await?)?;
        tracing::info!(
            url,
            rpc_version = identified.negotiated_rpc_version,
            "connected to OBS"
        );

        Ok(conn)
    }

    /// Sends a request and returns its `responseData` (`Null` when absent).
    pub async fn request(
        &mut self,
        request_type: &str,
        request_data: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ObsError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let request = Request {
            request_type,
            request_id: &request_id,
            request_data,
        };
        self.send(op::REQUEST, &request).await?;

        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.wait_response(&request_id))
            .await
            .map_err(|_| ObsError::Timeout)??;

        if !response.request_status.result {
            return Err(ObsError::Request {
                request_type: response.request_type,
                code: response.request_status.code,
                comment: response.request_status.comment.unwrap_or_default(),
            });
        }

        Ok(response.response_data.unwrap_or(serde_json::Value::Null))
    }

    /// Sends a close frame. Errors are irrelevant at this point.
    pub async fn close(mut self) {
        let _ = self.ws.close(None).await;
    }

    async fn wait_response(&mut self, request_id: &str) -> Result<RequestResponse, ObsError> {
        loop {
            let frame = self.next_frame().await?;
            if frame.op != op::REQUEST_RESPONSE {
                continue;
            }
            let response: RequestResponse = serde_json::from_value(frame.d)?;
            if response.request_id == request_id {
                return Ok(response);
            }
            tracing::debug!(request_id = %response.request_id, "ignoring stale response");
        }
    }

    async fn expect_op(&mut self, opcode: u8) -> Result<serde_json::Value, ObsError> {
        let frame = self.next_frame().await?;
        if frame.op != opcode {
            return Err(ObsError::Handshake(format!(
                "expected opcode {opcode}, got {}",
                frame.op
            )));
        }
        Ok(frame.d)
    }

    async fn send<T: Serialize>(&mut self, opcode: u8, payload: &T) -> Result<(), ObsError> {
        let frame = Frame {
            op: opcode,
            d: serde_json::to_value(payload)?,
        };
        let json = serde_json::to_string(&frame)?;
        self.ws.send(Message::Text(json.into())).await?;
        Ok(())
    }

    /// Reads the next JSON frame, skipping control messages.
    async fn next_frame(&mut self) -> Result<Frame, ObsError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let frame: Frame = serde_json::from_str(text.as_str())?;
                    if frame.op == op::EVENT {
                        continue;
                    }
                    return Ok(frame);
                }
                Some(Ok(Message::Close(close))) => {
                    if let Some(close) = close {
                        tracing::warn!(
                            code = u16::from(close.code),
                            reason = %close.reason.as_str(),
                            "OBS closed the connection"
                        );
                    }
                    return Err(ObsError::Closed);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
                None => return Err(ObsError::Closed),
            }
        }
    }
}
