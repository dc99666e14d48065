#![no_main]

use libfuzzer_sys::fuzz_target;
use smc_compose::ComposeEvent;
use smc_compose_core::{parse_entity_records, SavedThread, WorkposContact};

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);
    if let Ok(event) = serde_json::from_str::<ComposeEvent>(&raw) {
        assert!(event.action_name().starts_with("COMPOSE_"));
    }

    let Ok(content) = serde_json::from_str::<serde_json::Value>(&raw) else {
        return;
    };
    if let Ok(records) = parse_entity_records(&content) {
        for record in &records {
            let _ = record.identifier_named("Injured Worker");
        }
    }
    let _ = WorkposContact::from_content(&content);
    if let Ok(thread) = serde_json::from_value::<SavedThread>(content) {
        if let Some(draft) = thread.draft() {
            assert!(draft.is_draft);
        }
    }
});
