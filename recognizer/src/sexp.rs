//! Line-oriented s-expression protocol: landmark frames in, gestures out.
//!
//! Frames look like `(:frame 12 :landmarks ((0 320 410) (1 290 395) ...))`,
//! each landmark `(id x y [z])`. `:landmarks nil` means no hand.

use lexpr::Value;

use crate::error::FrameError;
use crate::gesture::Classification;
use crate::hand::Landmark;
use crate::tracker::GestureEvent;

/// One decoded input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame number if the producer supplied one.
    pub number: Option<u64>,
    pub landmarks: Vec<Landmark>,
}

/// Decode one frame line.
pub fn parse_frame(raw: &str) -> Result<Frame, FrameError> {
    let value = lexpr::from_str(raw).map_err(|e| FrameError::Malformed(e.to_string()))?;

    let number = match get_value(&value, "frame") {
        None => None,
        Some(v) => Some(as_u64(v).ok_or_else(|| {
            FrameError::Malformed(":frame must be a non-negative integer".to_string())
        })?),
    };

    let list = get_value(&value, "landmarks").ok_or(FrameError::MissingKey { key: "landmarks" })?;
    let entries = list_items(list)
        .ok_or_else(|| FrameError::Malformed(":landmarks must be a list".to_string()))?;

    let landmarks = entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| parse_landmark(position, entry))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Frame { number, landmarks })
}

fn parse_landmark(position: usize, entry: &Value) -> Result<Landmark, FrameError> {
    let bad = |reason: &str| FrameError::BadLandmark {
        position,
        reason: reason.to_string(),
    };
    let fields = list_items(entry).ok_or_else(|| bad("expected (id x y [z])"))?;
    if fields.len() != 3 && fields.len() != 4 {
        return Err(bad("expected (id x y [z])"));
    }
    let id = as_u64(fields[0]).ok_or_else(|| bad("id must be a non-negative integer"))?;
    let coord = |i: usize| {
        as_number(fields[i])
            .map(|n| n as f32)
            .ok_or_else(|| bad("coordinates must be numbers"))
    };
    let mut landmark = Landmark::new(id as usize, coord(1)?, coord(2)?);
    if fields.len() == 4 {
        landmark = landmark.with_z(coord(3)?);
    }
    Ok(landmark)
}

// ── Output ─────────────────────────────────────────────────

/// Format a classification result.
pub fn format_classification(frame: u64, result: &Classification) -> String {
    let rule = result
        .rule
        .map(|r| format!(":{}", r.as_str()))
        .unwrap_or_else(|| "nil".to_string());
    format!(
        "(:type :gesture :frame {} :gesture :{} :rule {} :aux {})",
        frame,
        result.gesture.as_str(),
        rule,
        format_aux(result),
    )
}

fn format_aux(result: &Classification) -> String {
    if result.aux.is_empty() {
        return "nil".to_string();
    }
    let fields: Vec<String> = result
        .aux
        .iter()
        .map(|(key, value)| format!(":{} {:.3}", key.replace('_', "-"), value))
        .collect();
    format!("({})", fields.join(" "))
}

/// Format a per-frame error.
pub fn format_error(frame: u64, reason: &str) -> String {
    format!(
        "(:type :error :frame {} :reason \"{}\")",
        frame,
        escape_string(reason)
    )
}

/// Format a tracker event.
pub fn format_event(frame: u64, event: &GestureEvent) -> String {
    let mut s = format!(
        "(:type :event :event :{} :frame {} :gesture :{}",
        event.as_str(),
        frame,
        event.gesture().as_str(),
    );
    if let GestureEvent::Held { duration_ms, .. } = event {
        s.push_str(&format!(" :duration-ms {:.0}", duration_ms));
    }
    s.push(')');
    s
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ── Value helpers ──────────────────────────────────────────

/// Find the value following `:key` in a plist.
/// Handles both `Value::Keyword("key")` and `Value::Symbol(":key")` forms.
pub(crate) fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}

fn is_nil(value: &Value) -> bool {
    match value {
        Value::Null | Value::Nil => true,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

/// Items of a proper list; `nil` is the empty list.
fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            v if is_nil(v) => return Some(items),
            _ => return None,
        }
    }
}
