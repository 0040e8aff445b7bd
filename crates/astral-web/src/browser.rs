#![forbid(unsafe_code)]

use astral_core::diagnostics::LOG_TARGET;
use astral_layout::environment::PORTRAIT_QUERY;
use astral_layout::{Environment, LayoutEngine, WindowSize};
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget, Window};

use crate::error::WebError;
use crate::signal::OrientationSignal;

type Listener = Closure<dyn FnMut(Event)>;

fn js_error(operation: &'static str, value: &JsValue) -> WebError {
    WebError::Js {
        operation,
        message: value.as_string().unwrap_or_else(|| format!("{value:?}")),
    }
}

/// [`Environment`] backed by the global `window`.
#[derive(Debug, Clone)]
pub struct BrowserEnvironment {
    window: Window,
}

impl BrowserEnvironment {
    pub fn new() -> Result<Self, WebError> {
        web_sys::window()
            .map(Self::from_window)
            .ok_or(WebError::NoWindow)
    }

    #[must_use]
    pub fn from_window(window: Window) -> Self {
        Self { window }
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    /// `window.screen.orientation`, if the engine exposes it.
    fn screen_orientation(&self) -> Option<JsValue> {
        let screen = self.window.screen().ok()?;
        let value = Reflect::get(&screen, &JsValue::from_str("orientation")).ok()?;
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }
}

impl Environment for BrowserEnvironment {
    fn window_size(&self) -> WindowSize {
        let dimension =
            |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        WindowSize::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn screen_orientation_type(&self) -> Option<String> {
        let orientation = self.screen_orientation()?;
        Reflect::get(&orientation, &JsValue::from_str("type"))
            .ok()?
            .as_string()
    }

    fn matches_portrait_query(&self) -> Option<bool> {
        self.window
            .match_media(PORTRAIT_QUERY)
            .ok()
            .flatten()
            .map(|list| list.matches())
    }
}

struct Registration {
    target: EventTarget,
    event: &'static str,
    callback: Listener,
}

/// DOM listeners installed by [`attach`]. Dropping the guard removes them.
pub struct ListenerGuard {
    registrations: Vec<Registration>,
    signal: OrientationSignal,
}

impl ListenerGuard {
    /// Source used for orientation change events.
    #[must_use]
    pub fn orientation_signal(&self) -> OrientationSignal {
        self.signal
    }

    fn listen(
        &mut self,
        target: EventTarget,
        event: &'static str,
        callback: Listener,
    ) -> Result<(), WebError> {
        target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|err| js_error("addEventListener", &err))?;
        self.registrations.push(Registration {
            target,
            event,
            callback,
        });
        Ok(())
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        for reg in self.registrations.drain(..) {
            let _ = reg
                .target
                .remove_event_listener_with_callback(reg.event, reg.callback.as_ref().unchecked_ref());
        }
    }
}

impl std::fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let events: Vec<&str> = self.registrations.iter().map(|reg| reg.event).collect();
        f.debug_struct("ListenerGuard")
            .field("events", &events)
            .field("signal", &self.signal)
            .finish()
    }
}

/// Forward `resize` and orientation `change` events to `engine`.
///
/// Orientation changes come from `screen.orientation` when available, else
/// from the `(orientation: portrait)` media query list. If neither exists only
/// resize events are forwarded.
pub fn attach(engine: &LayoutEngine<BrowserEnvironment>) -> Result<ListenerGuard, WebError> {
    let env = engine.environment();
    let orientation_target = env
        .screen_orientation()
        .and_then(|value| value.dyn_into::<EventTarget>().ok());
    let media_query = env.window.match_media(PORTRAIT_QUERY).ok().flatten();
    let signal = OrientationSignal::select(orientation_target.is_some(), media_query.is_some());

    let mut guard = ListenerGuard {
        registrations: Vec::new(),
        signal,
    };

    let on_resize = engine.clone();
    guard.listen(
        env.window.clone().into(),
        "resize",
        Listener::new(move |_: Event| on_resize.notify_resize()),
    )?;

    let target: Option<EventTarget> = match signal {
        OrientationSignal::ScreenOrientation => orientation_target,
        OrientationSignal::MediaQuery => media_query.map(Into::into),
        OrientationSignal::Unavailable => None,
    };
    if let (Some(target), Some(event)) = (target, signal.event_name()) {
        let on_orientation = engine.clone();
        guard.listen(
            target,
            event,
            Listener::new(move |_: Event| {
                if let Err(err) = on_orientation.notify_orientation_change() {
                    tracing::warn!(target: LOG_TARGET, error = %err, "orientation change ignored");
                }
            }),
        )?;
    }

    tracing::debug!(target: LOG_TARGET, ?signal, "layout engine attached to window");
    Ok(guard)
}
