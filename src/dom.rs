//! Thin browser bindings. Every handle here releases what it registered when
//! dropped, and every missing capability degrades instead of failing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, AddEventListenerOptions, Element, Event, EventTarget, HtmlElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollToOptions,
};

use crate::logging::Logger;
use crate::scroll::{ScrollAnimation, ScrollSample};
use crate::section_spy::ScrollPlan;
use crate::teardown::Registration;

pub fn report_missing(logger: Logger, capability: &str) {
    logger.debug("capability_missing", serde_json::json!({ "capability": capability }));
}

fn window_has(name: &str) -> bool {
    window()
        .map(|win| Reflect::has(&win, &JsValue::from_str(name)).unwrap_or(false))
        .unwrap_or(false)
}

type ListenerParts = (EventTarget, &'static str, Closure<dyn FnMut(Event)>);

fn remove_listener((target, event, callback): ListenerParts) {
    let _ = target.remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
}

/// Passive event listener, removed on drop or by an explicit `remove`.
pub struct ListenerGuard {
    registration: Registration<ListenerParts>,
}

impl ListenerGuard {
    pub fn passive(target: &EventTarget, event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        let options = AddEventListenerOptions::new();
        options.set_passive(true);

        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                callback.as_ref().unchecked_ref(),
                &options,
            )
            .ok()?;

        Some(Self {
            registration: Registration::new((target.clone(), event, callback), remove_listener),
        })
    }

    pub fn on_window(event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
        let target: EventTarget = window()?.into();
        Self::passive(&target, event, handler)
    }

    pub fn on_document(event: &'static str, handler: impl FnMut(Event) + 'static) -> Option<Self> {
        let target: EventTarget = window()?.document()?.into();
        Self::passive(&target, event, handler)
    }

    /// Safe to call repeatedly; only the first call detaches.
    pub fn remove(&mut self) {
        self.registration.release();
    }
}

type ObserverParts = (IntersectionObserver, Closure<dyn FnMut(Array, IntersectionObserver)>);

fn disconnect_observer((observer, _callback): ObserverParts) {
    observer.disconnect();
}

pub struct IntersectionGuard {
    registration: Registration<ObserverParts>,
}

impl IntersectionGuard {
    pub fn disconnect(&mut self) {
        self.registration.release();
    }
}

/// Observes `targets`, handing each entry to `on_entry`. `None` when the
/// browser has no `IntersectionObserver` or construction fails.
pub fn observe_intersections(
    targets: &[Element],
    thresholds: &[f64],
    root_margin: &str,
    logger: Logger,
    mut on_entry: impl FnMut(&IntersectionObserverEntry, &IntersectionObserver) + 'static,
) -> Option<IntersectionGuard> {
    if !window_has("IntersectionObserver") {
        report_missing(logger, "IntersectionObserver");
        return None;
    }

    let callback = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
        move |entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                    on_entry(&entry, &observer);
                }
            }
        },
    );

    let threshold_values: Array = thresholds.iter().map(|value| JsValue::from_f64(*value)).collect();
    let options = IntersectionObserverInit::new();
    options.set_root_margin(root_margin);
    options.set_threshold(&threshold_values);

    let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options).ok()?;
    for target in targets {
        observer.observe(target);
    }

    Some(IntersectionGuard {
        registration: Registration::new((observer, callback), disconnect_observer),
    })
}

type FrameParts = (i32, Closure<dyn FnMut(f64)>);

fn cancel_frame((id, callback): FrameParts) {
    if let Some(win) = window() {
        let _ = win.cancel_animation_frame(id);
    }
    // The frame may still be running this callback.
    spawn_local(async move { drop(callback) });
}

/// One pending `requestAnimationFrame` callback. Dropping it cancels the frame
/// and frees the callback.
pub struct FrameRequest {
    registration: Registration<FrameParts>,
}

impl FrameRequest {
    pub fn cancel(mut self) {
        self.registration.release();
    }
}

pub fn request_frame(callback: impl FnOnce(f64) + 'static) -> Option<FrameRequest> {
    let callback = Closure::once(callback);
    let id = window()?.request_animation_frame(callback.as_ref().unchecked_ref()).ok()?;
    Some(FrameRequest {
        registration: Registration::new((id, callback), cancel_frame),
    })
}

type PendingFrame = Rc<RefCell<Option<FrameRequest>>>;

/// Calls `step` every frame until it returns `false` or the loop is dropped.
pub struct FrameLoop {
    stopped: Rc<Cell<bool>>,
    pending: PendingFrame,
}

impl FrameLoop {
    pub fn start(step: impl FnMut(f64) -> bool + 'static) -> Self {
        let frame_loop = Self {
            stopped: Rc::new(Cell::new(false)),
            pending: Rc::default(),
        };
        schedule_frame(
            Rc::clone(&frame_loop.stopped),
            Rc::clone(&frame_loop.pending),
            Box::new(step),
        );
        frame_loop
    }
}

fn schedule_frame(stopped: Rc<Cell<bool>>, pending: PendingFrame, mut step: Box<dyn FnMut(f64) -> bool>) {
    let next_pending = Rc::clone(&pending);
    let next_stopped = Rc::clone(&stopped);

    let request = request_frame(move |timestamp| {
        next_pending.borrow_mut().take();
        if next_stopped.get() {
            return;
        }
        if step(timestamp) && !next_stopped.get() {
            schedule_frame(next_stopped, next_pending, step);
        }
    });

    *pending.borrow_mut() = request;
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stopped.set(true);
        self.pending.borrow_mut().take();
    }
}

/// Pending idle-time callback; dropping it cancels the callback.
pub enum IdleHandle {
    Idle {
        id: JsValue,
        _callback: Closure<dyn FnMut()>,
    },
    Timer(Timeout),
}

impl Drop for IdleHandle {
    fn drop(&mut self) {
        if let Self::Idle { id, .. } = self {
            let Some(win) = window() else {
                return;
            };
            if let Ok(cancel) = Reflect::get(&win, &JsValue::from_str("cancelIdleCallback")) {
                if let Some(cancel) = cancel.dyn_ref::<Function>() {
                    let _ = cancel.call1(&win, id);
                }
            }
        }
    }
}

/// Runs `callback` when the browser is idle, or after `fallback_delay` when
/// `requestIdleCallback` is unavailable.
pub fn on_idle(fallback_delay: Duration, logger: Logger, callback: impl FnOnce() + 'static) -> IdleHandle {
    let slot: Rc<Cell<Option<Box<dyn FnOnce()>>>> = Rc::new(Cell::new(Some(Box::new(callback))));
    let fire = |slot: &Rc<Cell<Option<Box<dyn FnOnce()>>>>| {
        if let Some(callback) = slot.take() {
            callback();
        }
    };

    let request_idle = window().and_then(|win| {
        let request = Reflect::get(&win, &JsValue::from_str("requestIdleCallback")).ok()?;
        let request = request.dyn_into::<Function>().ok()?;
        Some((win, request))
    });

    match request_idle {
        Some((win, request)) => {
            let idle_slot = Rc::clone(&slot);
            let idle_callback = Closure::<dyn FnMut()>::new(move || fire(&idle_slot));
            if let Ok(id) = request.call1(&win, idle_callback.as_ref().unchecked_ref()) {
                return IdleHandle::Idle {
                    id,
                    _callback: idle_callback,
                };
            }
        }
        None => report_missing(logger, "requestIdleCallback"),
    }

    IdleHandle::Timer(Timeout::new(duration_millis(fallback_delay), move || fire(&slot)))
}

pub fn duration_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

pub fn scroll_sample() -> Option<ScrollSample> {
    let win = window()?;
    let document_height = win
        .document()
        .and_then(|document| document.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0);

    Some(ScrollSample {
        scroll_offset_px: win.scroll_y().unwrap_or(0.0),
        document_height_px: document_height,
        viewport_height_px: win.inner_height().ok().and_then(|value| value.as_f64()).unwrap_or(0.0),
        viewport_width_px: viewport_width(),
    })
}

pub fn viewport_width() -> f64 {
    window()
        .and_then(|win| win.inner_width().ok())
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0)
}

pub fn element_by_id(id: &str) -> Option<Element> {
    window()?.document()?.get_element_by_id(id)
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

fn supports_smooth_scroll() -> bool {
    window()
        .and_then(|win| win.document())
        .and_then(|document| document.document_element())
        .and_then(|root| root.dyn_into::<HtmlElement>().ok())
        .map(|root| Reflect::has(&root.style(), &JsValue::from_str("scrollBehavior")).unwrap_or(false))
        .unwrap_or(false)
}

/// Scrolls so `element` sits `offset_px` below the top, then records the
/// section in the URL fragment without a second jump. Returns the frame
/// loop driving the manual fallback, if one was needed.
pub fn section_top(id: &str) -> Option<f64> {
    element_by_id(id).map(|element| element.get_bounding_client_rect().top())
}

pub fn scroll_y() -> f64 {
    window().and_then(|win| win.scroll_y().ok()).unwrap_or(0.0)
}

pub fn smooth_scroll_to(plan: ScrollPlan, logger: Logger) -> Option<FrameLoop> {
    let win = window()?;

    let animation = if supports_smooth_scroll() {
        let options = ScrollToOptions::new();
        options.set_top(plan.to_px);
        options.set_behavior(ScrollBehavior::Smooth);
        win.scroll_to_with_scroll_to_options(&options);
        None
    } else {
        report_missing(logger, "scroll-behavior");
        let mut animation = ScrollAnimation::new(plan.from_px, plan.to_px);
        let scroll_window = win.clone();
        Some(FrameLoop::start(move |timestamp| {
            let (position, done) = animation.step(timestamp);
            scroll_window.scroll_to_with_x_and_y(0.0, position);
            !done
        }))
    };

    if let Ok(history) = win.history() {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(&plan.fragment));
    }

    animation
}
