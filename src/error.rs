/**
* filename : error
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// recvWindow 밖의 timestamp 로 거절될 때 거래소가 돌려주는 오류 코드
pub const TIMESTAMP_OUTSIDE_RECV_WINDOW: i64 = -1021;

const RECV_WINDOW_PHRASE: &str = "outside of the recvwindow";

#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Venue(#[from] VenueError),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// 거래소 오류 코드. 숫자 또는 문자열로 내려올 수 있다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorCode {
    Numeric(i64),
    Text(String),
}

impl ErrorCode {
    /// JSON 값에서 오류 코드 추출
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(ErrorCode::Numeric),
            Value::String(s) => Some(ErrorCode::Text(s.clone())),
            _ => None,
        }
    }

    /// 숫자로 해석 가능한 경우 코드 값 반환 ("-1021" 같은 문자열 포함)
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ErrorCode::Numeric(code) => Some(*code),
            ErrorCode::Text(text) => text.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Numeric(code) => write!(f, "{}", code),
            ErrorCode::Text(text) => write!(f, "{}", text),
        }
    }
}

/// 거래소 오류의 복구 가능 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 서버 시간 재동기화 후 한 번 재시도할 수 있는 오류
    ClockSkew,
    /// 즉시 실패로 기록되는 오류
    Terminal,
}

/// 거래소가 주문을 거절했거나 요청이 거래소에 닿지 못한 경우
#[derive(Debug, Clone, PartialEq)]
pub struct VenueError {
    pub code: Option<ErrorCode>,
    pub message: String,
    /// 거래소가 돌려준 오류 본문 (있는 경우)
    pub body: Option<Value>,
}

impl VenueError {
    pub fn new(code: Option<ErrorCode>, message: impl Into<String>) -> Self {
        VenueError {
            code,
            message: message.into(),
            body: None,
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        Self::new(Some(ErrorCode::Numeric(code)), message)
    }

    pub fn without_code(message: impl Into<String>) -> Self {
        Self::new(None, message)
    }

    /// `{"code": -1021, "msg": "..."}` 형태의 오류 본문에서 생성
    pub fn from_body(body: Value) -> Self {
        let code = body.get("code").and_then(ErrorCode::from_value);
        let message = body
            .get("msg")
            .or_else(|| body.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());

        VenueError {
            code,
            message,
            body: Some(body),
        }
    }

    /// clock skew 오류 여부 판별.
    ///
    /// 구조화된 코드가 없거나 문자열로 내려오는 경우가 있어서 메시지도 함께 확인한다.
    pub fn kind(&self) -> FailureKind {
        let numeric_code = self.code.as_ref().and_then(ErrorCode::as_i64);
        let timestamp_code = TIMESTAMP_OUTSIDE_RECV_WINDOW.to_string();

        if numeric_code == Some(TIMESTAMP_OUTSIDE_RECV_WINDOW)
            || self.message.contains(&timestamp_code)
            || self.message.to_lowercase().contains(RECV_WINDOW_PHRASE)
        {
            FailureKind::ClockSkew
        } else {
            FailureKind::Terminal
        }
    }

    pub fn is_clock_skew(&self) -> bool {
        self.kind() == FailureKind::ClockSkew
    }
}

impl fmt::Display for VenueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "APIError(code={}): {}", code, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for VenueError {}
