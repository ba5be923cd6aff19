use serde_json::{Map, Value};

use crate::common::{OcrError, ResultPayload};

use super::PromptVariant;

pub const NO_RESPONSE_MESSAGE: &str = "No response received from API";

pub fn parse_response(body: Option<&Value>, variant: PromptVariant) -> ResultPayload {
    let Some(body) = body else {
        log::warn!("Vision API returned an empty body");
        return ResultPayload::error(NO_RESPONSE_MESSAGE);
    };

    log::info!("Parsing API response");
    match message_content(body) {
        Ok(content) => match variant {
            PromptVariant::Text => {
                log::info!("Text extracted successfully");
                ResultPayload::extracted_text(content)
            }
            PromptVariant::Document => parse_document(content),
        },
        Err(err) => {
            log::warn!("Vision API response carried no usable content: {}", err);
            err.into_payload(Some(body))
        }
    }
}

/// Pulls `choices[0].message.content` out of a chat-completion body.
pub fn message_content(body: &Value) -> Result<&str, OcrError> {
    if let Some(error) = body.get("error") {
        return Err(OcrError::ProviderReported(error.clone()));
    }

    let choices = match body.get("choices") {
        None | Some(Value::Null) => return Err(OcrError::no_choices()),
        Some(Value::Array(choices)) if choices.is_empty() => return Err(OcrError::no_choices()),
        Some(Value::Array(choices)) => choices,
        Some(_) => return Err(OcrError::malformed_response("`choices` is not an array")),
    };

    let message = choices[0]
        .get("message")
        .ok_or_else(|| OcrError::malformed_response("first choice has no `message`"))?;

    match message.get("content") {
        Some(Value::String(content)) => Ok(content),
        None | Some(Value::Null) => Err(OcrError::malformed_response("message has no `content`")),
        Some(_) => Err(OcrError::malformed_response("message `content` is not a string")),
    }
}

/// Document replies are expected to hold a JSON object, possibly wrapped in
/// prose or a markdown fence. The object spans the first `{` to the last `}`.
pub fn parse_document(content: &str) -> ResultPayload {
    if let Some(fields) = embedded_object(content).or_else(|| decode_object(content)) {
        log::info!("Document fields extracted: {}", fields.len());
        return ResultPayload::StructuredFields(fields);
    }

    log::info!("Document reply is not JSON, returning raw text");
    ResultPayload::extracted_text(content)
}

fn embedded_object(content: &str) -> Option<Map<String, Value>> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if start >= end {
        return None;
    }
    decode_object(&content[start..=end])
}

fn decode_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(fields)) => Some(fields),
        Ok(_) => None,
        Err(err) => {
            log::debug!("Not a JSON object: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    fn to_json(payload: ResultPayload) -> Value {
        serde_json::to_value(payload).unwrap()
    }

    #[test]
    fn absent_body() {
        assert_eq!(
            to_json(parse_response(None, PromptVariant::Text)),
            json!({"error": "No response received from API"})
        );
    }

    #[test]
    fn plain_text_reply() {
        let body = reply("hello world");
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Text)),
            json!({"extracted_text": "hello world"})
        );
    }

    #[test]
    fn text_variant_never_decodes_json() {
        let body = reply("{\"name\":\"Jane\"}");
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Text)),
            json!({"extracted_text": "{\"name\":\"Jane\"}"})
        );
    }

    #[test]
    fn embedded_json_becomes_top_level_fields() {
        let body = reply("Here is the data: {\"name\":\"Jane\",\"id\":\"123\"}");
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Document)),
            json!({"name": "Jane", "id": "123"})
        );
    }

    #[test]
    fn fenced_json_is_unwrapped() {
        let body = reply("```json\n{\"document_type\": \"ID Card\", \"address\": {\"city\": \"Oslo\"}}\n```");
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Document)),
            json!({"document_type": "ID Card", "address": {"city": "Oslo"}})
        );
    }

    #[test]
    fn unparseable_document_falls_back_to_text() {
        for content in ["no structure here", "broken {\"name\": } tail", "} backwards {", "[1, 2, 3]"] {
            let body = reply(content);
            assert_eq!(
                to_json(parse_response(Some(&body), PromptVariant::Document)),
                json!({"extracted_text": content})
            );
        }
    }

    #[test]
    fn braces_in_surrounding_prose_defeat_the_heuristic() {
        let content = "{note} then {\"a\": 1}";
        let body = reply(content);
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Document)),
            json!({"extracted_text": content})
        );
    }

    #[test]
    fn empty_choices() {
        let body = json!({"choices": []});
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Text)),
            json!({"error": "No text could be extracted from the image", "original_response": {"choices": []}})
        );
    }

    #[test]
    fn missing_choices() {
        let body = json!({"id": "cmpl-1"});
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Document)),
            json!({"error": "No text could be extracted from the image", "original_response": {"id": "cmpl-1"}})
        );
    }

    #[test]
    fn provider_error_is_passed_through() {
        let body = json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}});
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Text)),
            json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}})
        );
    }

    #[test]
    fn malformed_choice_keeps_original_response() {
        let body = json!({"choices": [{"message": {"content": null}}]});
        assert_eq!(
            to_json(parse_response(Some(&body), PromptVariant::Text)),
            json!({
                "error": "Error parsing API response: message has no `content`",
                "original_response": {"choices": [{"message": {"content": null}}]}
            })
        );

        let body = json!({"choices": {"0": "x"}});
        let payload = parse_response(Some(&body), PromptVariant::Text);
        assert!(payload.is_error());
    }
}
