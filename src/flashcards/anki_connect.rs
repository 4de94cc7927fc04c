//! Host collection backed by a running Anki through the AnkiConnect add-on

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::collection::{CollectionError, HostCollection};
use super::models::{CardModel, FlashcardDraft};

pub const DEFAULT_ANKI_CONNECT_URL: &str = "http://localhost:8765";
const API_VERSION: u32 = 6;

type Result<T> = std::result::Result<T, CollectionError>;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    result: Option<T>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoteField {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NoteInfo {
    note_id: u64,
    fields: HashMap<String, NoteField>,
}

/// AnkiConnect client
///
/// Duplicate lookups search the field named `front_field` (default `Front`).
pub struct AnkiConnect {
    client: Client,
    url: String,
    front_field: String,
}

impl AnkiConnect {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            front_field: "Front".to_string(),
        }
    }

    pub fn with_front_field(mut self, field: impl Into<String>) -> Self {
        self.front_field = field.into();
        self
    }

    fn request<T: DeserializeOwned>(&self, action: &str, params: Option<Value>) -> Result<T> {
        let response: ApiResponse<T> = self
            .client
            .post(&self.url)
            .json(&request_body(action, params))
            .send()?
            .error_for_status()?
            .json()?;
        decode_response(action, response)
    }

    /// Names of every deck in the open collection
    pub fn deck_names(&self) -> Result<Vec<String>> {
        self.request("deckNames", None)
    }

    /// Names of every card model (note type)
    pub fn model_names(&self) -> Result<Vec<String>> {
        self.request("modelNames", None)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn set_ease(&self, note_id: u64, ease: i32) -> Result<()> {
        let cards: Vec<u64> =
            self.request("findCards", Some(json!({ "query": format!("nid:{}", note_id) })))?;
        let _: Vec<bool> = self.request("setEaseFactors", Some(ease_params(&cards, ease)))?;
        Ok(())
    }
}

impl Default for AnkiConnect {
    fn default() -> Self {
        Self::new(DEFAULT_ANKI_CONNECT_URL)
    }
}

impl HostCollection for AnkiConnect {
    /// AnkiConnect addresses decks by name
    type DeckId = String;
    type NoteId = u64;

    fn is_loaded(&self) -> bool {
        match self.request::<u32>("version", None) {
            Ok(version) => version >= API_VERSION,
            Err(e) => {
                log::warn!("AnkiConnect is not reachable at {}: {}", self.url, e);
                false
            }
        }
    }

    fn deck_id(&self, name: &str) -> Result<Option<String>> {
        let decks: HashMap<String, u64> = self.request("deckNamesAndIds", None)?;
        Ok(decks.contains_key(name).then(|| name.to_string()))
    }

    fn card_model(&self, name: &str) -> Result<Option<CardModel>> {
        let models = self.model_names()?;
        if !models.iter().any(|m| m == name) {
            return Ok(None);
        }

        let fields: Vec<String> =
            self.request("modelFieldNames", Some(json!({ "modelName": name })))?;
        Ok(Some(CardModel {
            name: name.to_string(),
            fields,
        }))
    }

    fn find_cards_by_front(&self, front: &str) -> Result<Vec<u64>> {
        let query = field_query(&self.front_field, front);
        let note_ids: Vec<u64> = self.request("findNotes", Some(json!({ "query": query })))?;
        if note_ids.is_empty() {
            return Ok(note_ids);
        }

        // Anki's field search ignores case, so confirm the exact value
        let notes: Vec<NoteInfo> = self.request("notesInfo", Some(json!({ "notes": note_ids })))?;
        Ok(exact_matches(notes, &self.front_field, front))
    }

    fn add_card(&self, model: &CardModel, draft: &FlashcardDraft, deck: &String) -> Result<u64> {
        let note = note_params(model, draft, deck)?;
        let note_id: u64 = self.request("addNote", Some(json!({ "note": note })))?;

        if let Some(ease) = draft.ease_factor {
            if let Err(e) = self.set_ease(note_id, ease) {
                log::warn!("Added note {} but could not set its ease: {}", note_id, e);
            }
        }

        Ok(note_id)
    }
}

fn decode_response<T>(action: &str, response: ApiResponse<T>) -> Result<T> {
    if let Some(error) = response.error {
        return Err(CollectionError::Api(format!("{}: {}", action, error)));
    }
    response
        .result
        .ok_or_else(|| CollectionError::Api(format!("{}: empty result", action)))
}

/// Ids of the notes whose `field` is exactly `value`
fn exact_matches(notes: Vec<NoteInfo>, field: &str, value: &str) -> Vec<u64> {
    notes
        .into_iter()
        .filter(|n| n.fields.get(field).map_or(false, |f| f.value == value))
        .map(|n| n.note_id)
        .collect()
}

/// The same ease for every card of a note
fn ease_params(cards: &[u64], ease: i32) -> Value {
    json!({ "cards": cards, "easeFactors": vec![ease; cards.len()] })
}

fn request_body(action: &str, params: Option<Value>) -> Value {
    let mut body = serde_json::Map::new();
    body.insert("action".to_string(), Value::String(action.to_string()));
    body.insert("version".to_string(), Value::Number(API_VERSION.into()));
    if let Some(params) = params {
        body.insert("params".to_string(), params);
    }
    Value::Object(body)
}

/// Search query matching `field` exactly, with Anki's wildcards escaped
fn field_query(field: &str, value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '*' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("\"{}:{}\"", field, escaped)
}

fn note_params(model: &CardModel, draft: &FlashcardDraft, deck: &str) -> Result<Value> {
    let (front, back) = match (model.front_field(), model.back_field()) {
        (Some(front), Some(back)) => (front, back),
        _ => {
            return Err(CollectionError::Rejected(format!(
                "card model {} needs a front and a back field",
                model.name
            )))
        }
    };

    let mut fields = serde_json::Map::new();
    fields.insert(front.to_string(), Value::String(draft.front.clone()));
    fields.insert(back.to_string(), Value::String(draft.back.clone()));

    Ok(json!({
        "deckName": deck,
        "modelName": model.name,
        "fields": fields,
        "tags": draft.tags,
        // duplicates are decided by the synthesizer
        "options": { "allowDuplicate": true },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body() {
        let body = request_body("findNotes", Some(json!({ "query": "deck:x" })));
        assert_eq!(body["action"], "findNotes");
        assert_eq!(body["version"], 6);
        assert_eq!(body["params"]["query"], "deck:x");

        let body = request_body("version", None);
        assert!(body.get("params").is_none());
    }

    #[test]
    fn test_field_query_escapes_wildcards() {
        assert_eq!(field_query("Front", "pick up"), "\"Front:pick up\"");
        assert_eq!(field_query("Front", "a*b_c"), "\"Front:a\\*b\\_c\"");
        assert_eq!(field_query("Front", "say \"hi\""), "\"Front:say \\\"hi\\\"\"");
    }

    #[test]
    fn test_note_params() {
        let draft = FlashcardDraft {
            front: "perro".to_string(),
            back: "dog".to_string(),
            ease_factor: Some(2500),
            tags: vec!["lute".to_string()],
        };
        let note = note_params(&CardModel::basic(), &draft, "Spanish").unwrap();

        assert_eq!(note["deckName"], "Spanish");
        assert_eq!(note["modelName"], "Basic");
        assert_eq!(note["fields"]["Front"], "perro");
        assert_eq!(note["fields"]["Back"], "dog");
        assert_eq!(note["tags"][0], "lute");
        assert_eq!(note["options"]["allowDuplicate"], true);
    }

    #[test]
    fn test_note_params_needs_two_fields() {
        let draft = FlashcardDraft {
            front: "perro".to_string(),
            back: "dog".to_string(),
            ease_factor: None,
            tags: Vec::new(),
        };
        let model = CardModel::new("Word only", &["Word"]);
        assert!(matches!(
            note_params(&model, &draft, "Default"),
            Err(CollectionError::Rejected(_))
        ));
    }

    #[test]
    fn test_decode_response() {
        let ok: ApiResponse<Vec<u64>> =
            serde_json::from_value(json!({ "result": [1, 2], "error": null })).unwrap();
        assert_eq!(decode_response("findNotes", ok).unwrap(), vec![1, 2]);

        let failed: ApiResponse<u64> = serde_json::from_value(
            json!({ "result": null, "error": "cannot create note because it is empty" }),
        )
        .unwrap();
        match decode_response("addNote", failed) {
            Err(CollectionError::Api(message)) => {
                assert_eq!(message, "addNote: cannot create note because it is empty")
            }
            other => panic!("expected an API error, got {:?}", other),
        }

        let empty: ApiResponse<u64> =
            serde_json::from_value(json!({ "result": null, "error": null })).unwrap();
        assert!(matches!(
            decode_response("addNote", empty),
            Err(CollectionError::Api(message)) if message == "addNote: empty result"
        ));
    }

    #[test]
    fn test_exact_matches_is_case_sensitive() {
        let notes: Vec<NoteInfo> = serde_json::from_value(json!([
            { "noteId": 1, "fields": { "Front": { "value": "Haus", "order": 0 } } },
            { "noteId": 2, "fields": { "Front": { "value": "haus", "order": 0 } } },
            { "noteId": 3, "fields": { "Word": { "value": "Haus", "order": 0 } } },
        ]))
        .unwrap();

        assert_eq!(exact_matches(notes, "Front", "Haus"), vec![1]);
    }

    #[test]
    fn test_ease_params() {
        let params = ease_params(&[10, 11], 2800);
        assert_eq!(params["cards"], json!([10, 11]));
        assert_eq!(params["easeFactors"], json!([2800, 2800]));
    }

    #[test]
    fn test_unreachable_server_is_not_loaded() {
        // port 9 (discard) is not an AnkiConnect server
        let anki = AnkiConnect::new("http://127.0.0.1:9");
        assert!(!anki.is_loaded());
    }
}
