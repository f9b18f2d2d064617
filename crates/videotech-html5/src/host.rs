//! Host controller forwarding canonical notifications to a JS callback

use serde::Serialize;
use videotech_core::{EventKind, EventPayload, HostController};
use wasm_bindgen::prelude::*;

/// Calls `callback(kind, payload)` for every notification.
///
/// `kind` is the canonical name (`"PLAY"`, `"TIME_UPDATE"`, ...) and
/// `payload` a plain object or `undefined`.
pub struct JsHost {
    callback: js_sys::Function,
}

impl JsHost {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

impl HostController for JsHost {
    fn notify(&self, kind: EventKind, payload: Option<&EventPayload>) {
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let payload = match payload.map(|p| p.serialize(&serializer)).transpose() {
            Ok(value) => value.unwrap_or(JsValue::UNDEFINED),
            Err(err) => {
                web_sys::console::warn_1(&format!("[videotech] payload for {kind} not serializable: {err}").into());
                JsValue::UNDEFINED
            }
        };

        if let Err(err) = self
            .callback
            .call2(&JsValue::NULL, &JsValue::from_str(kind.as_str()), &payload)
        {
            web_sys::console::error_2(&format!("[videotech] host callback threw on {kind}").into(), &err);
        }
    }
}
