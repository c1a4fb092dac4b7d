/// Parsing of the server-sent event stream returned by Gradio's
/// `/call/<endpoint>/<event_id>` route.
use super::client::GradioError;

/// A single event from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: String,
    pub data: String,
}

/// Splits an SSE body into events.
///
/// Events are separated by blank lines. Multiple `data:` lines inside one event
/// are joined with `\n`. Comment lines (starting with `:`) and unknown fields
/// are ignored.
pub fn parse_events(body: &str) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    let mut event = String::new();
    let mut data: Vec<&str> = Vec::new();

    for line in body.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            flush_event(&mut events, &mut event, &mut data);
            continue;
        }
        if line.starts_with(':') {
            continue;
        }

        let (field, value) = match line.split_once(':') {
            Some((f, v)) => (f, v.strip_prefix(' ').unwrap_or(v)),
            None => (line, ""),
        };
        match field {
            "event" => event = value.to_string(),
            "data" => data.push(value),
            _ => {}
        }
    }
    flush_event(&mut events, &mut event, &mut data);

    events
}

fn flush_event(events: &mut Vec<ServerEvent>, event: &mut String, data: &mut Vec<&str>) {
    if event.is_empty() && data.is_empty() {
        return;
    }
    events.push(ServerEvent {
        event: std::mem::take(event),
        data: data.join("\n"),
    });
    data.clear();
}

/// Extracts the prediction result from an event stream.
///
/// Returns the `complete` event's data parsed as JSON. An `error` event becomes
/// `GradioError::Api`; a stream ending without either is a protocol error.
pub fn completion_data(body: &str) -> Result<serde_json::Value, GradioError> {
    for event in parse_events(body) {
        match event.event.as_str() {
            "complete" => {
                return serde_json::from_str(&event.data).map_err(GradioError::Serialization);
            }
            "error" => {
                return Err(GradioError::Api {
                    message: error_message(&event.data),
                });
            }
            _ => {}
        }
    }

    Err(GradioError::Protocol(
        "event stream ended without a result".to_string(),
    ))
}

/// Gradio sends `null` when the error is hidden, a JSON string, or an object
/// with a `message`/`error` field.
fn error_message(data: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(serde_json::Value::Null) => "the service reported an error".to_string(),
        Ok(serde_json::Value::String(s)) => s,
        Ok(value) => value
            .get("message")
            .or_else(|| value.get("error"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        Err(_) if data.trim().is_empty() => "the service reported an error".to_string(),
        Err(_) => data.to_string(),
    }
}

/// Returns the tag string held in the first element of a prediction result.
pub fn first_string(result: &serde_json::Value) -> Result<String, GradioError> {
    let first = result
        .as_array()
        .and_then(|items| items.first())
        .ok_or_else(|| GradioError::Protocol("prediction result is empty".to_string()))?;

    first.as_str().map(str::to_string).ok_or_else(|| {
        GradioError::Protocol(format!(
            "expected first result element to be a string, got {first}"
        ))
    })
}
