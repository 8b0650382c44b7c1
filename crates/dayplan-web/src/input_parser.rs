#![forbid(unsafe_code)]

//! JSON parser for host-encoded touch signals.
//!
//! The JS shim serialises each DOM event it forwards as one object:
//!
//! ```json
//! {"kind":"touchstart","token":3,"touches":[{"id":0,"x":120,"y":480}]}
//! {"kind":"touchend","changed":[{"id":0,"x":64,"y":40}]}
//! {"kind":"dblclick","token":3}
//! ```
//!
//! [`parse_touch_event`] turns that into a [`TouchInput`] for
//! [`TouchAdapter::dispatch`](crate::touch::TouchAdapter::dispatch).
//! Feature-gated behind `input-parser`.

use dayplan_core::TokenId;
use serde::Deserialize;

use crate::touch::{TouchInput, TouchPoint};

/// Errors from parsing encoded touch JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TouchParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown event kind.
    UnknownKind(String),
}

impl core::fmt::Display for TouchParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownKind(kind) => write!(f, "unknown touch event kind: {kind}"),
        }
    }
}

impl std::error::Error for TouchParseError {}

#[derive(Debug, Deserialize)]
struct RawTouch {
    id: u32,
    x: i32,
    y: i32,
}

impl From<RawTouch> for TouchPoint {
    fn from(raw: RawTouch) -> Self {
        Self::new(raw.id, raw.x, raw.y)
    }
}

#[derive(Debug, Deserialize)]
struct RawInput {
    kind: String,
    #[serde(default)]
    token: Option<u32>,
    #[serde(default)]
    touches: Option<Vec<RawTouch>>,
    #[serde(default)]
    changed: Option<Vec<RawTouch>>,
}

/// Parse one encoded touch signal.
pub fn parse_touch_event(json: &str) -> Result<TouchInput, TouchParseError> {
    let raw: RawInput =
        serde_json::from_str(json).map_err(|e| TouchParseError::Json(e.to_string()))?;

    match raw.kind.as_str() {
        "touchstart" => Ok(TouchInput::Start {
            token: token(raw.token)?,
            touches: points(raw.touches, "touches")?,
        }),
        "touchmove" => Ok(TouchInput::Move {
            touches: points(raw.touches, "touches")?,
        }),
        "touchend" => Ok(TouchInput::End {
            changed_touches: points(raw.changed, "changed")?,
        }),
        // Blur and page hide abort the drag the same way.
        "touchcancel" | "blur" | "visibilityhidden" => Ok(TouchInput::Cancel),
        "dblclick" => Ok(TouchInput::DoubleClick {
            token: token(raw.token)?,
        }),
        other => Err(TouchParseError::UnknownKind(other.to_string())),
    }
}

fn token(raw: Option<u32>) -> Result<TokenId, TouchParseError> {
    raw.map(TokenId)
        .ok_or(TouchParseError::MissingField("token"))
}

fn points(
    raw: Option<Vec<RawTouch>>,
    field: &'static str,
) -> Result<Vec<TouchPoint>, TouchParseError> {
    raw.map(|list| list.into_iter().map(TouchPoint::from).collect())
        .ok_or(TouchParseError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn touchstart_parses_token_and_touches() {
        let input = parse_touch_event(
            r#"{"kind":"touchstart","token":3,"touches":[{"id":0,"x":120,"y":480}]}"#,
        )
        .expect("valid");
        assert_eq!(
            input,
            TouchInput::Start {
                token: TokenId(3),
                touches: vec![TouchPoint::new(0, 120, 480)],
            }
        );
    }

    #[test]
    fn touchend_reads_changed_touches() {
        let input =
            parse_touch_event(r#"{"kind":"touchend","changed":[{"id":2,"x":-4,"y":9}]}"#)
                .expect("valid");
        assert_eq!(
            input,
            TouchInput::End {
                changed_touches: vec![TouchPoint::new(2, -4, 9)],
            }
        );
    }

    #[test]
    fn interruptions_map_to_cancel() {
        for kind in ["touchcancel", "blur", "visibilityhidden"] {
            let json = format!(r#"{{"kind":"{kind}"}}"#);
            assert_eq!(parse_touch_event(&json), Ok(TouchInput::Cancel));
        }
    }

    #[test]
    fn missing_fields_are_reported() {
        assert_eq!(
            parse_touch_event(r#"{"kind":"dblclick"}"#),
            Err(TouchParseError::MissingField("token"))
        );
        assert_eq!(
            parse_touch_event(r#"{"kind":"touchmove"}"#),
            Err(TouchParseError::MissingField("touches"))
        );
        assert_eq!(
            parse_touch_event(r#"{"kind":"touchend","touches":[]}"#),
            Err(TouchParseError::MissingField("changed"))
        );
    }

    #[test]
    fn unknown_kind_and_bad_json() {
        assert_eq!(
            parse_touch_event(r#"{"kind":"wheel"}"#),
            Err(TouchParseError::UnknownKind("wheel".into()))
        );
        assert!(matches!(
            parse_touch_event("{not json"),
            Err(TouchParseError::Json(_))
        ));
    }
}
