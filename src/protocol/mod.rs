use serde_json::{json, Value};

use std::cell::RefCell;

use crate::model::criteria::FilterCriteria;
use crate::model::row::CurriculumRow;
use crate::services::config::{self, ClientConfig};
use crate::services::curriculum::{Confirmation, CurriculumMutator, ReqwestTransport};
use crate::services::filter;
use crate::services::view::{self, FilterControls, FilterEvent, RowDisplay};

mod command;
use command::Command;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload<'a>(req: &'a Value) -> &'a Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, message: impl Into<String>) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": message.into()
    })
    .to_string()
}

fn parse_rows_from_payload(payload: &Value) -> Result<Vec<CurriculumRow>, String> {
    let arr = payload
        .get("rows")
        .and_then(|v| v.as_array())
        .ok_or_else(|| "payload.rows must be an array".to_string())?;

    let mut rows: Vec<CurriculumRow> = Vec::with_capacity(arr.len());

    for (i, v) in arr.iter().cloned().enumerate() {
        match serde_json::from_value::<CurriculumRow>(v) {
            Ok(r) => rows.push(r),
            Err(e) => return Err(format!("invalid row at index {}: {}", i, e)),
        }
    }

    Ok(rows)
}

fn get_u64(payload: &Value, key: &str) -> Result<u64, String> {
    match payload.get(key) {
        None | Some(Value::Null) => Err(format!("payload.{key} is required")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("payload.{key} must be a non-negative integer")),
        Some(v) => v
            .as_u64()
            .ok_or_else(|| format!("payload.{key} must be a non-negative integer")),
    }
}

/// Control values as sent by the host. A missing or null key is an absent control.
struct PayloadControls<'a>(&'a Value);

impl PayloadControls<'_> {
    fn read(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl FilterControls for PayloadControls<'_> {
    fn search_text(&self) -> Option<String> {
        self.read("search").or_else(|| self.read("search_text"))
    }

    fn school_level(&self) -> Option<String> {
        self.read("school_level")
    }

    fn grade_level(&self) -> Option<String> {
        self.read("grade_level")
    }
}

struct VisibilityReport(Vec<bool>);

impl RowDisplay for VisibilityReport {
    fn set_visible(&mut self, index: usize, visible: bool) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = visible;
        }
    }
}

fn run_filter(payload: &Value) -> Result<Vec<bool>, String> {
    let rows = parse_rows_from_payload(payload)?;

    if let Some(criteria) = payload.get("criteria").filter(|v| !v.is_null()) {
        let criteria: FilterCriteria = serde_json::from_value(criteria.clone())
            .map_err(|e| format!("invalid payload.criteria: {e}"))?;
        return Ok(filter::filter(&criteria, &rows));
    }

    let event_str = payload
        .get("event")
        .and_then(|v| v.as_str())
        .unwrap_or("search_keyup");
    let event = FilterEvent::from(event_str);
    if event == FilterEvent::Unknown {
        return Err(format!("unknown filter event: {event_str}"));
    }

    static NO_CONTROLS: Value = Value::Null;
    let controls = PayloadControls(payload.get("controls").unwrap_or(&NO_CONTROLS));

    let mut report = VisibilityReport(vec![true; rows.len()]);
    view::on_filter_event(event, &controls, &rows, &mut report);
    Ok(report.0)
}

/// The host's answer to the removal prompt. Without an answer the removal
/// is declined and the prompt is kept so the host can ask it.
struct HostAnswer {
    confirmed: Option<bool>,
    unanswered_prompt: RefCell<Option<String>>,
}

impl Confirmation for HostAnswer {
    fn confirm(&self, prompt: &str) -> bool {
        match self.confirmed {
            Some(answer) => answer,
            None => {
                *self.unanswered_prompt.borrow_mut() = Some(prompt.to_string());
                false
            }
        }
    }
}

fn client_config(payload: &Value) -> ClientConfig {
    let mut cfg = config::load();
    if let Some(url) = payload.get("base_url").and_then(|v| v.as_str()) {
        if !url.trim().is_empty() {
            cfg.base_url = url.trim().to_string();
        }
    }
    cfg
}

/// Whether a request line waits on the curriculum server and should be
/// answered off the request loop.
pub fn runs_in_background(input: &str) -> bool {
    let Ok(req) = serde_json::from_str::<Value>(input) else {
        return false;
    };

    matches!(
        Command::from(get_cmd(&req)),
        Command::CurriculumAddSubject | Command::CurriculumRemoveSubject
    )
}

pub fn handle(input: &str) -> String {
    let req: Value = match serde_json::from_str(input) {
        Ok(v) => v,
        Err(_) => {
            return json!({
                "status": "error",
                "message": "invalid json"
            })
            .to_string();
        }
    };

    let id = get_id(&req);
    let payload = get_payload(&req);

    match Command::from(get_cmd(&req)) {
        Command::Ping => ok(id, json!({ "message": "curriculum-core alive" })),

        Command::CurriculumFilter => match run_filter(payload) {
            Ok(visible) => {
                let visible_count = visible.iter().filter(|v| **v).count();
                ok(
                    id,
                    json!({ "visible": visible, "visible_count": visible_count }),
                )
            }
            Err(e) => err(id, e),
        },

        Command::CurriculumAddSubject => {
            let curriculum_id = match get_u64(payload, "curriculum_id") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let subject_id = match get_u64(payload, "subject_id") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };

            let cfg = client_config(payload);
            let transport = match ReqwestTransport::new(&cfg.base_url, cfg.timeout_secs) {
                Ok(t) => t,
                Err(e) => return err(id, format!("{e:#}")),
            };

            let mut refreshed = false;
            CurriculumMutator::new(&transport, &cfg.confirm_prompt).add_subject(
                curriculum_id,
                subject_id,
                &mut || refreshed = true,
            );
            ok(id, json!({ "refreshed": refreshed }))
        }

        Command::CurriculumRemoveSubject => {
            let curriculum_id = match get_u64(payload, "curriculum_id") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let subject_id = match get_u64(payload, "subject_id") {
                Ok(v) => v,
                Err(e) => return err(id, e),
            };
            let answer = HostAnswer {
                confirmed: payload.get("confirmed").and_then(|v| v.as_bool()),
                unanswered_prompt: RefCell::new(None),
            };

            let cfg = client_config(payload);
            let transport = match ReqwestTransport::new(&cfg.base_url, cfg.timeout_secs) {
                Ok(t) => t,
                Err(e) => return err(id, format!("{e:#}")),
            };

            let mut refreshed = false;
            CurriculumMutator::new(&transport, &cfg.confirm_prompt).remove_subject(
                curriculum_id,
                subject_id,
                &answer,
                &mut || refreshed = true,
            );

            match answer.unanswered_prompt.into_inner() {
                Some(prompt) => ok(
                    id,
                    json!({ "refreshed": refreshed, "confirm_prompt": prompt }),
                ),
                None => ok(id, json!({ "refreshed": refreshed })),
            }
        }

        Command::ConfigGet => ok(id, json!({ "config": config::load() })),

        Command::ConfigSave => {
            let config_val = payload.get("config").cloned().unwrap_or(Value::Null);
            if config_val.is_null() {
                return err(id, "payload.config is required");
            }

            let cfg: ClientConfig = match serde_json::from_value(config_val) {
                Ok(v) => v,
                Err(e) => return err(id, format!("invalid payload.config: {e}")),
            };

            match config::save(cfg) {
                Ok(saved) => ok(id, json!({ "config": saved })),
                Err(e) => err(id, format!("{e:#}")),
            }
        }

        Command::Unknown => err(id, "unknown command"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(req: Value) -> Value {
        serde_json::from_str(&handle(&req.to_string())).expect("response is json")
    }

    fn rows() -> Value {
        json!([
            { "code": "MATH101", "name": "Algebra", "school": "high", "grade": "9" },
            { "code": "ENG050", "name": "Reading", "school": "middle", "grade": "7" },
            { "code": "SCI201", "name": "Biology", "school": "high", "grade": "10" }
        ])
    }

    #[test]
    fn ping_echoes_id() {
        let resp = call(json!({ "id": 7, "cmd": "ping" }));
        assert_eq!(resp["id"], 7);
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["message"], "curriculum-core alive");
    }

    #[test]
    fn invalid_json_and_unknown_command() {
        let resp: Value = serde_json::from_str(&handle("{nope")).expect("json");
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "invalid json");

        let resp = call(json!({ "id": "a", "cmd": "curriculum.rename" }));
        assert_eq!(resp["status"], "error");
        assert_eq!(resp["message"], "unknown command");
    }

    #[test]
    fn filter_with_controls() {
        let resp = call(json!({
            "id": 1,
            "cmd": "curriculum.filter",
            "payload": {
                "event": "school_level_changed",
                "controls": { "search": "", "school_level": "high", "grade_level": 9 },
                "rows": rows()
            }
        }));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["visible"], json!([true, false, false]));
        assert_eq!(resp["payload"]["visible_count"], 1);
    }

    #[test]
    fn filter_without_controls_shows_all() {
        let resp = call(json!({
            "id": 2,
            "cmd": "curriculum.filter",
            "payload": { "rows": rows() }
        }));
        assert_eq!(resp["payload"]["visible"], json!([true, true, true]));
    }

    #[test]
    fn filter_with_explicit_criteria() {
        let resp = call(json!({
            "id": 3,
            "cmd": "curriculum.filter",
            "payload": {
                "criteria": { "search_text": "BIO", "school_level": "", "grade_level": "" },
                "rows": rows()
            }
        }));
        assert_eq!(resp["payload"]["visible"], json!([false, false, true]));
    }

    #[test]
    fn filter_rejects_bad_input() {
        let resp = call(json!({
            "id": 4,
            "cmd": "curriculum.filter",
            "payload": { "controls": {} }
        }));
        assert_eq!(resp["message"], "payload.rows must be an array");

        let resp = call(json!({
            "id": 5,
            "cmd": "curriculum.filter",
            "payload": { "rows": [ { "code": 1 } ] }
        }));
        let msg = resp["message"].as_str().unwrap_or("");
        assert!(msg.starts_with("invalid row at index 0"), "{msg}");

        let resp = call(json!({
            "id": 6,
            "cmd": "curriculum.filter",
            "payload": { "event": "double_click", "rows": rows() }
        }));
        assert_eq!(resp["message"], "unknown filter event: double_click");
    }

    #[test]
    fn mutation_ids_are_validated() {
        let resp = call(json!({
            "id": 8,
            "cmd": "curriculum.add_subject",
            "payload": { "subject_id": 12 }
        }));
        assert_eq!(resp["message"], "payload.curriculum_id is required");

        let resp = call(json!({
            "id": 9,
            "cmd": "curriculum.remove_subject",
            "payload": { "curriculum_id": 5, "subject_id": -1 }
        }));
        assert_eq!(
            resp["message"],
            "payload.subject_id must be a non-negative integer"
        );
    }

    #[test]
    fn unconfirmed_removal_is_ok_without_refresh() {
        let resp = call(json!({
            "id": 10,
            "cmd": "curriculum.remove_subject",
            "payload": { "curriculum_id": "5", "subject_id": 12, "base_url": "http://127.0.0.1:1" }
        }));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["refreshed"], false);
        assert_eq!(
            resp["payload"]["confirm_prompt"],
            "Remove this subject from the curriculum?"
        );
    }

    #[test]
    fn declined_removal_has_no_prompt() {
        let resp = call(json!({
            "id": 13,
            "cmd": "curriculum.remove_subject",
            "payload": {
                "curriculum_id": 5,
                "subject_id": 12,
                "confirmed": false,
                "base_url": "http://127.0.0.1:1"
            }
        }));
        assert_eq!(resp["payload"]["refreshed"], false);
        assert!(resp["payload"].get("confirm_prompt").is_none());
    }

    #[test]
    fn only_mutations_run_in_background() {
        assert!(runs_in_background(
            r#"{"id":1,"cmd":"curriculum.add_subject","payload":{}}"#
        ));
        assert!(runs_in_background(
            r#"{"id":2,"cmd":"curriculum.remove_subject"}"#
        ));
        assert!(!runs_in_background(r#"{"id":3,"cmd":"curriculum.filter"}"#));
        assert!(!runs_in_background(r#"{"id":4,"cmd":"config.save"}"#));
        assert!(!runs_in_background("{nope"));
    }

    #[test]
    fn unreachable_server_is_ok_without_refresh() {
        let resp = call(json!({
            "id": 11,
            "cmd": "curriculum.add_subject",
            "payload": { "curriculum_id": 5, "subject_id": 12, "base_url": "http://127.0.0.1:1" }
        }));
        assert_eq!(resp["status"], "ok");
        assert_eq!(resp["payload"]["refreshed"], false);
    }

    #[test]
    fn config_save_requires_config() {
        let resp = call(json!({ "id": 12, "cmd": "config.save", "payload": {} }));
        assert_eq!(resp["message"], "payload.config is required");
    }
}
