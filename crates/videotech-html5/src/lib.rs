//! Videotech HTML5 - browser `<video>` technology for WebAssembly
//!
//! Provides the HTML5 implementation of the videotech adapter contract:
//! - `<video>` backend with native event listeners
//! - Capability descriptor (`html5`, `m3u8` + `mp4` by default)
//! - Per-session control surface for the host player
//!
//! ## Integration
//!
//! ```javascript
//! import init, { Html5Technology } from '@videotech/html5';
//!
//! await init();
//! const tech = new Html5Technology();
//! const player = tech.create(container, 'https://cdn.example.com/master.m3u8', 'main',
//!     (kind, payload) => console.log(kind, payload), { width: '100%' });
//! player.play();
//! ```

use std::rc::Rc;

use videotech_core::{
    downgrade_host, FactoryConfig, PlaybackControl, SessionId, StyleMap, VideoFactory, VideoWrapper,
};
use wasm_bindgen::prelude::*;

mod backend;
mod host;

pub use backend::{snapshot, Html5Backend, Html5Provider};
pub use host::JsHost;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&format!("[videotech] HTML5 technology v{} initialized", videotech_core::VERSION).into());
}

/// Library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn style_from_js(style: JsValue) -> Result<StyleMap, JsValue> {
    if style.is_undefined() || style.is_null() {
        return Ok(StyleMap::new());
    }
    serde_wasm_bindgen::from_value(style).map_err(js_error)
}

/// The HTML5 video technology
#[wasm_bindgen]
pub struct Html5Technology {
    factory: VideoFactory<Html5Provider>,
}

#[wasm_bindgen]
impl Html5Technology {
    /// Create the technology, optionally from a JSON factory config
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<Html5Technology, JsValue> {
        let config = match config_json {
            Some(json) => FactoryConfig::from_json(&json).map_err(js_error)?,
            None => FactoryConfig::default(),
        };
        let factory = VideoFactory::new(Html5Provider, config).map_err(js_error)?;
        Ok(Self { factory })
    }

    /// Capability descriptor as a plain object
    #[wasm_bindgen(getter)]
    pub fn capabilities(&self) -> Result<JsValue, JsValue> {
        let caps = videotech_core::VideoTechnology::capability(&self.factory);
        serde_wasm_bindgen::to_value(&caps).map_err(js_error)
    }

    /// Build a `<video>` inside `container` and return its player
    #[wasm_bindgen]
    pub fn create(
        &self,
        container: web_sys::Element,
        stream_url: &str,
        session_id: Option<String>,
        on_event: js_sys::Function,
        style: JsValue,
    ) -> Result<Html5Player, JsValue> {
        let style = style_from_js(style)?;
        let id = session_id.map(SessionId::from).unwrap_or_else(SessionId::generate);
        let host = Rc::new(JsHost::new(on_event));

        let wrapper = self
            .factory
            .create(&container, stream_url, id, downgrade_host(&host), &style)
            .map_err(js_error)?;
        Ok(Html5Player { wrapper, _host: host })
    }

    /// Retire the technology. Players already created keep working.
    #[wasm_bindgen]
    pub fn destroy(&self) {
        self.factory.destroy();
    }
}

/// One playback session on a `<video>` element
#[wasm_bindgen]
pub struct Html5Player {
    wrapper: VideoWrapper<Html5Backend>,
    /// Sessions only hold the host weakly
    _host: Rc<JsHost>,
}

#[wasm_bindgen]
impl Html5Player {
    #[wasm_bindgen(getter)]
    pub fn session_id(&self) -> String {
        self.wrapper.id().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        self.wrapper.state().to_string()
    }

    #[wasm_bindgen]
    pub fn set_video_url(&self, url: &str) -> bool {
        self.wrapper.set_video_url(url)
    }

    #[wasm_bindgen]
    pub fn load(&self, rewind: bool) {
        self.wrapper.load(rewind);
    }

    #[wasm_bindgen]
    pub fn play(&self) {
        self.wrapper.play();
    }

    #[wasm_bindgen]
    pub fn pause(&self) {
        self.wrapper.pause();
    }

    #[wasm_bindgen]
    pub fn seek(&self, time: f64) {
        self.wrapper.seek(time);
    }

    #[wasm_bindgen]
    pub fn set_volume(&self, volume: f64) {
        self.wrapper.set_volume(volume);
    }

    #[wasm_bindgen]
    pub fn apply_css(&self, style: JsValue) -> Result<(), JsValue> {
        let style = style_from_js(style)?;
        self.wrapper.apply_css(&style);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn can_seek(&self) -> bool {
        self.wrapper.can_seek()
    }

    #[wasm_bindgen(setter)]
    pub fn set_can_seek(&self, allowed: bool) {
        self.wrapper.set_can_seek(allowed);
    }

    /// Detach listeners and remove the `<video>` element
    #[wasm_bindgen]
    pub fn destroy(&self) {
        self.wrapper.destroy();
    }
}
