//! HTML5 backend - a browser `<video>` element behind the media backend contract
//!
//! Native listeners are wrapped in `Closure`s attached to the element. The
//! closures are owned here so they can be detached one by one; dropping an
//! attached closure would leave a dangling callback in the page.

use std::collections::BTreeMap;

use videotech_core::{
    BackendProvider, Error, EventChannel, ListenerId, MediaBackend, MediaSnapshot, NativeEvent,
    NativeListener, Result, StyleMap, TimeRange,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlVideoElement, TimeRanges};

struct Attached {
    event: String,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

/// Backend handle owning one `<video>` element
pub struct Html5Backend {
    video: HtmlVideoElement,
    next_id: u64,
    listeners: BTreeMap<ListenerId, Attached>,
}

impl Html5Backend {
    pub fn new(video: HtmlVideoElement) -> Self {
        Self {
            video,
            next_id: 0,
            listeners: BTreeMap::new(),
        }
    }

    pub fn element(&self) -> &HtmlVideoElement {
        &self.video
    }

    fn detach(&self, attached: &Attached) {
        if let Err(err) = self
            .video
            .remove_event_listener_with_callback(&attached.event, attached.closure.as_ref().unchecked_ref())
        {
            web_sys::console::warn_2(&"[videotech] removeEventListener failed".into(), &err);
        }
    }
}

/// Read the element state the translator needs
pub fn snapshot(video: &HtmlVideoElement) -> MediaSnapshot {
    let src = video.src();
    let fullscreen = web_sys::window()
        .and_then(|w| w.document())
        .map(|d| d.fullscreen_element().is_some());

    MediaSnapshot {
        src: (!src.is_empty()).then_some(src),
        error_code: video.error().map(|e| i32::from(e.code())),
        volume: Some(video.volume()),
        current_time: Some(video.current_time()),
        duration: Some(video.duration()),
        buffered_end: last_range(&video.buffered()).map(|r| r.end),
        seekable: last_range(&video.seekable()).map(|r| TimeRange {
            start: first_start(&video.seekable()).unwrap_or(r.start),
            end: r.end,
        }),
        paused: Some(video.paused()),
        fullscreen,
    }
}

fn last_range(ranges: &TimeRanges) -> Option<TimeRange> {
    let last = ranges.length().checked_sub(1)?;
    Some(TimeRange {
        start: ranges.start(last).ok()?,
        end: ranges.end(last).ok()?,
    })
}

fn first_start(ranges: &TimeRanges) -> Option<f64> {
    if ranges.length() == 0 {
        return None;
    }
    ranges.start(0).ok()
}

impl EventChannel for Html5Backend {
    fn subscribe(&mut self, event: &str, listener: NativeListener) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);

        let video = self.video.clone();
        let name = event.to_string();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            listener(&NativeEvent::new(name.as_str(), snapshot(&video)));
        });

        if let Err(err) = self
            .video
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        {
            web_sys::console::warn_2(&format!("[videotech] addEventListener({event}) failed").into(), &err);
        }
        self.listeners.insert(
            id,
            Attached {
                event: event.to_string(),
                closure,
            },
        );
        id
    }

    fn unsubscribe(&mut self, event: &str, id: ListenerId) -> bool {
        if !self.listeners.get(&id).is_some_and(|a| a.event == event) {
            return false;
        }
        if let Some(attached) = self.listeners.remove(&id) {
            self.detach(&attached);
        }
        true
    }
}

impl MediaBackend for Html5Backend {
    fn set_source(&mut self, url: &str) -> bool {
        if url.is_empty() {
            // Clearing src alone keeps the old resource; load() drops it
            let _ = self.video.remove_attribute("src");
            self.video.load();
            return false;
        }
        self.video.set_src(url);
        true
    }

    fn source(&self) -> Option<String> {
        let src = self.video.src();
        (!src.is_empty()).then_some(src)
    }

    fn load(&mut self) {
        self.video.load();
    }

    fn play(&mut self) {
        // Rejections (autoplay policy) surface as native events, not here
        if let Err(err) = self.video.play() {
            web_sys::console::warn_2(&"[videotech] play() failed".into(), &err);
        }
    }

    fn pause(&mut self) {
        if let Err(err) = self.video.pause() {
            web_sys::console::warn_2(&"[videotech] pause() failed".into(), &err);
        }
    }

    fn seek(&mut self, time: f64) {
        self.video.set_current_time(time);
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn set_volume(&mut self, volume: f64) {
        self.video.set_volume(volume);
    }

    fn apply_style(&mut self, style: &StyleMap) {
        let declaration = self.video.style();
        for (property, value) in style {
            if declaration.set_property(property, value).is_err() {
                web_sys::console::warn_1(&format!("[videotech] invalid style {property}: {value}").into());
            }
        }
    }

    fn release(&mut self) {
        for attached in std::mem::take(&mut self.listeners).into_values() {
            self.detach(&attached);
        }
        self.video.remove();
    }
}

/// Creates `<video>` elements inside a host-provided container
#[derive(Debug, Clone, Default)]
pub struct Html5Provider;

impl BackendProvider for Html5Provider {
    type Container = Element;
    type Backend = Html5Backend;

    fn build(&self, container: &Element, stream_url: &str, _encoding: &str) -> Result<Html5Backend> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| Error::backend("no document available"))?;
        let video: HtmlVideoElement = document
            .create_element("video")
            .map_err(|e| Error::backend(format!("create <video> failed: {e:?}")))?
            .dyn_into()
            .map_err(|_| Error::backend("created element is not a <video>"))?;

        video.set_preload("auto");
        // Native controls stay off; the host draws its own chrome
        video.set_controls(false);
        let _ = video.set_attribute("playsinline", "");
        video.set_src(stream_url);

        container
            .append_child(&video)
            .map_err(|e| Error::backend(format!("append <video> failed: {e:?}")))?;
        Ok(Html5Backend::new(video))
    }
}
