//! Yew hooks wiring the platform-independent state machines to the browser.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Element, Event, EventTarget, MouseEvent};
use yew::prelude::*;

use crate::config::RuntimeConfig;
use crate::cursor::{CursorState, INTERACTIVE_SELECTOR};
use crate::dom::{self, FrameLoop, FrameRequest, IdleHandle, ListenerGuard};
use crate::logging::Logger;
use crate::preload::{self, MilestoneLatch, PreloadScheduler, IDLE_BUNDLES, MILESTONE_BUNDLES};
use crate::reveal::{CounterAnimation, ItemAnimation, RevealPhase, RevealSchedule};
use crate::scroll::{ScrollSnapshot, ScrollTracker};
use crate::section_spy::{plan_scroll, responsive_offset, SectionRegistry, SpyConfig, SPY_THRESHOLDS};
use crate::viewport::{ObserverAction, ObserverOptions, VisibilityState};

/// Shared runtime services, provided once at the app root.
#[derive(Clone)]
pub struct Services {
    pub config: Rc<RuntimeConfig>,
    pub logger: Logger,
    pub preload: PreloadScheduler,
}

impl Services {
    pub fn new(config: RuntimeConfig) -> Self {
        let logger = config.logger();
        Self {
            config: Rc::new(config),
            logger,
            preload: PreloadScheduler::new(logger),
        }
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config)
    }
}

#[hook]
pub fn use_services() -> Services {
    use_context::<Services>().unwrap_or_else(|| Services::new(RuntimeConfig::default()))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visibility {
    pub is_visible: bool,
    /// `false` when the browser cannot observe intersections; callers
    /// render their static state instead of animating.
    pub is_supported: bool,
}

#[derive(Clone, PartialEq)]
pub struct ViewportHandle {
    pub node_ref: NodeRef,
    pub visibility: Visibility,
}

/// Creates the target ref and watches it.
#[hook]
pub fn use_viewport(options: ObserverOptions) -> ViewportHandle {
    let node_ref = use_node_ref();
    let visibility = use_visibility(node_ref.clone(), options);
    ViewportHandle { node_ref, visibility }
}

/// Watches a ref the caller already owns.
#[hook]
pub fn use_viewport_of(node_ref: &NodeRef, options: ObserverOptions) -> Visibility {
    use_visibility(node_ref.clone(), options)
}

#[hook]
fn use_visibility(node_ref: NodeRef, options: ObserverOptions) -> Visibility {
    let logger = use_services().logger;
    let visibility = use_state_eq(|| Visibility {
        is_visible: false,
        is_supported: true,
    });

    {
        let visibility = visibility.clone();
        use_effect_with(options, move |options| {
            let mut state = VisibilityState::new(options);
            let setter = visibility.setter();

            let element = node_ref.cast::<Element>();
            let guard = element.clone().and_then(|element| {
                dom::observe_intersections(
                    &[element],
                    &[options.threshold()],
                    options.root_margin(),
                    logger,
                    move |entry, observer| {
                        if state.is_frozen() {
                            return;
                        }
                        let action = state.apply(entry.is_intersecting(), entry.intersection_ratio());
                        setter.set(Visibility {
                            is_visible: state.is_visible(),
                            is_supported: true,
                        });
                        if action == ObserverAction::Disconnect {
                            observer.disconnect();
                        }
                    },
                )
            });

            if element.is_some() && guard.is_none() {
                visibility.set(Visibility {
                    is_visible: false,
                    is_supported: false,
                });
            }

            move || drop(guard)
        });
    }

    *visibility
}

/// Frame-coalesced scroll position, progress and threshold flag.
#[hook]
pub fn use_scroll_tracker() -> ScrollSnapshot {
    let snapshot = use_state_eq(ScrollSnapshot::default);

    {
        let setter = snapshot.setter();
        use_effect_with((), move |_| {
            let tracker = Rc::new(RefCell::new(ScrollTracker::new()));
            let pending: Rc<RefCell<Option<FrameRequest>>> = Rc::default();

            let sample = {
                let tracker = Rc::clone(&tracker);
                let pending = Rc::clone(&pending);
                Rc::new(move || {
                    let Some(sample) = dom::scroll_sample() else {
                        return;
                    };
                    if !tracker.borrow_mut().record(sample) {
                        return;
                    }

                    let frame_tracker = Rc::clone(&tracker);
                    let frame_pending = Rc::clone(&pending);
                    let setter = setter.clone();
                    let request = dom::request_frame(move |_| {
                        frame_pending.borrow_mut().take();
                        if let Some(snapshot) = frame_tracker.borrow_mut().commit_frame() {
                            setter.set(snapshot);
                        }
                    });

                    if request.is_none() {
                        tracker.borrow_mut().cancel_frame();
                    }
                    *pending.borrow_mut() = request;
                })
            };

            sample();
            let on_scroll = {
                let sample = Rc::clone(&sample);
                ListenerGuard::on_window("scroll", move |_| sample())
            };
            let on_resize = {
                let sample = Rc::clone(&sample);
                ListenerGuard::on_window("resize", move |_| sample())
            };

            move || {
                drop(on_scroll);
                drop(on_resize);
                if let Some(request) = pending.borrow_mut().take() {
                    request.cancel();
                }
                tracker.borrow_mut().cancel_frame();
            }
        });
    }

    *snapshot
}

#[derive(Clone, PartialEq)]
pub struct SectionSpyHandle {
    pub active_section_id: String,
    pub scroll: ScrollSnapshot,
    pub scroll_to_section: Callback<String>,
}

#[hook]
pub fn use_section_spy(section_ids: Vec<String>, config: SpyConfig) -> SectionSpyHandle {
    let logger = use_services().logger;
    let scroll = use_scroll_tracker();
    let active = use_state_eq(|| section_ids.first().cloned().unwrap_or_default());
    let scroll_animation = use_mut_ref(|| None::<FrameLoop>);

    {
        let setter = active.setter();
        let root_margin = config.root_margin.clone();
        use_effect_with((section_ids, root_margin), move |(section_ids, root_margin)| {
            let registry = Rc::new(RefCell::new(SectionRegistry::new(section_ids.iter().cloned())));
            let elements: Vec<Element> = section_ids.iter().filter_map(|id| dom::element_by_id(id)).collect();

            let guard = if elements.is_empty() {
                None
            } else {
                dom::observe_intersections(&elements, &SPY_THRESHOLDS, root_margin, logger, move |entry, _| {
                    let id = entry.target().id();
                    if let Some(next) =
                        registry
                            .borrow_mut()
                            .observe(&id, entry.is_intersecting(), entry.intersection_ratio())
                    {
                        setter.set(next.to_string());
                    }
                })
            };

            move || drop(guard)
        });
    }

    let scroll_to_section = {
        let scroll_animation = scroll_animation.clone();
        use_callback(config.base_offset_px, move |section_id: String, base_offset_px| {
            let offset = responsive_offset(*base_offset_px, dom::viewport_width());
            let Some(plan) = plan_scroll(&section_id, dom::section_top(&section_id), dom::scroll_y(), offset) else {
                return;
            };
            *scroll_animation.borrow_mut() = dom::smooth_scroll_to(plan, logger);
        })
    };

    SectionSpyHandle {
        active_section_id: (*active).clone(),
        scroll,
        scroll_to_section,
    }
}

pub enum RevealAction {
    Trigger,
    Reveal(usize),
    Cancel,
}

impl Reducible for RevealSchedule {
    type Action = RevealAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            RevealAction::Trigger => {
                next.trigger();
            }
            RevealAction::Reveal(index) => next.reveal(index),
            RevealAction::Cancel => next.cancel(),
        }

        if next == *self {
            self
        } else {
            Rc::new(next)
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct RevealView {
    schedule: RevealSchedule,
    is_static: bool,
}

impl RevealView {
    pub fn item_animation(&self, index: usize) -> ItemAnimation {
        if self.is_static {
            ItemAnimation::SHOWN
        } else {
            self.schedule.item_animation(index)
        }
    }

    pub fn item_style(&self, index: usize) -> String {
        self.item_animation(index).style()
    }
}

/// Reveals `item_count` items one `stagger` apart once `trigger` turns
/// visible. Teardown clears pending timers and cancels the cascade.
#[hook]
pub fn use_staggered_reveal(item_count: usize, stagger: Duration, trigger: Visibility) -> RevealView {
    let schedule = use_reducer_eq(|| RevealSchedule::new(item_count, stagger));
    let timers = use_mut_ref(Vec::<Timeout>::new);

    {
        let schedule = schedule.clone();
        let timers = timers.clone();
        use_effect_with(trigger.is_visible, move |is_visible| {
            let dispatcher = schedule.dispatcher();
            let started = *is_visible && schedule.phase() == RevealPhase::Idle;
            if started {
                dispatcher.dispatch(RevealAction::Trigger);

                let mut pending = timers.borrow_mut();
                for index in 0..schedule.item_count() {
                    let dispatcher = dispatcher.clone();
                    pending.push(Timeout::new(dom::duration_millis(schedule.delay_for(index)), move || {
                        dispatcher.dispatch(RevealAction::Reveal(index));
                    }));
                }
            }

            move || {
                timers.borrow_mut().clear();
                if started {
                    dispatcher.dispatch(RevealAction::Cancel);
                }
            }
        });
    }

    RevealView {
        schedule: (*schedule).clone(),
        is_static: !trigger.is_supported,
    }
}

/// Counts up to `target` once `trigger` is visible.
#[hook]
pub fn use_counter(target: f64, duration: Duration, trigger: Visibility) -> f64 {
    let value = use_state_eq(|| 0.0_f64);
    let animation = use_mut_ref(|| None::<FrameLoop>);

    {
        let value = value.clone();
        use_effect_with((trigger.is_visible, target), move |(is_visible, target)| {
            if *is_visible {
                let mut counter = CounterAnimation::new(*value, *target, duration);
                let setter = value.setter();
                *animation.borrow_mut() = Some(FrameLoop::start(move |timestamp| {
                    let (current, done) = counter.step(timestamp);
                    setter.set(current);
                    !done
                }));
            }

            move || {
                animation.borrow_mut().take();
            }
        });
    }

    if trigger.is_supported {
        *value
    } else {
        target
    }
}

fn spawn_preloads(scheduler: &PreloadScheduler, bundles: &[&'static str]) {
    for &bundle in bundles {
        let load = scheduler.preload(bundle, move || preload::fetch_bundle(bundle.to_string()));
        spawn_local(async move {
            let _ = load.await;
        });
    }
}

/// Idle-time and scroll-milestone preloading for the deferred bundles.
#[hook]
pub fn use_preload_schedule() {
    let services = use_services();

    use_effect_with((), move |_| {
        let Services {
            config,
            logger,
            preload: scheduler,
        } = services;

        let idle: IdleHandle = {
            let scheduler = scheduler.clone();
            dom::on_idle(config.idle_fallback_delay, logger, move || {
                spawn_preloads(&scheduler, &IDLE_BUNDLES);
            })
        };

        let latch = Rc::new(RefCell::new(MilestoneLatch::default()));
        let debounce: Rc<RefCell<Option<Timeout>>> = Rc::default();
        let listener: Rc<RefCell<Option<ListenerGuard>>> = Rc::default();
        let debounce_ms = dom::duration_millis(config.milestone_debounce);

        let on_scroll = {
            let debounce = Rc::clone(&debounce);
            let listener = Rc::downgrade(&listener);
            move |_: Event| {
                let latch = Rc::clone(&latch);
                let scheduler = scheduler.clone();
                let listener = listener.clone();
                let check = Timeout::new(debounce_ms, move || {
                    let Some(sample) = dom::scroll_sample() else {
                        return;
                    };
                    let progress = ScrollSnapshot::from_sample(&sample).progress_fraction;
                    if !latch.borrow_mut().observe(progress) {
                        return;
                    }

                    logger.info(
                        "preload_milestone_reached",
                        serde_json::json!({ "progress": progress }),
                    );
                    spawn_preloads(&scheduler, &MILESTONE_BUNDLES);
                    if let Some(listener) = listener.upgrade() {
                        listener.borrow_mut().take();
                    }
                });
                *debounce.borrow_mut() = Some(check);
            }
        };
        *listener.borrow_mut() = ListenerGuard::on_window("scroll", on_scroll);

        move || {
            drop(idle);
            listener.borrow_mut().take();
            debounce.borrow_mut().take();
        }
    });
}

pub enum CursorAction {
    Move {
        x: f64,
        y: f64,
        over_interactive: bool,
        now_ms: f64,
    },
    Prune(f64),
    Leave,
}

impl Reducible for CursorState {
    type Action = CursorAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            CursorAction::Move {
                x,
                y,
                over_interactive,
                now_ms,
            } => next.on_move(x, y, over_interactive, now_ms),
            CursorAction::Prune(now_ms) => {
                if !next.prune(now_ms) {
                    return self;
                }
            }
            CursorAction::Leave => next.on_leave(),
        }
        Rc::new(next)
    }
}

pub type CursorHandle = UseReducerHandle<CursorState>;

const TRAIL_PRUNE_INTERVAL_MS: u32 = 100;

/// Feeds pointer movement into the app-owned cursor store until unmount.
#[hook]
pub fn use_cursor_listeners(cursor: &CursorHandle) {
    let dispatcher = cursor.dispatcher();

    use_effect_with((), move |_| {
        let on_move = {
            let dispatcher = dispatcher.clone();
            ListenerGuard::on_document("mousemove", move |event: Event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let over_interactive = event
                    .target()
                    .and_then(|target| target.dyn_into::<Element>().ok())
                    .and_then(|element| element.closest(INTERACTIVE_SELECTOR).ok().flatten())
                    .is_some();

                dispatcher.dispatch(CursorAction::Move {
                    x: f64::from(mouse.client_x()),
                    y: f64::from(mouse.client_y()),
                    over_interactive,
                    now_ms: dom::now_ms(),
                });
            })
        };

        let on_leave = {
            let dispatcher = dispatcher.clone();
            web_sys::window()
                .and_then(|win| win.document())
                .and_then(|document| document.document_element())
                .and_then(|root| {
                    let target: EventTarget = root.into();
                    ListenerGuard::passive(&target, "mouseleave", move |_| dispatcher.dispatch(CursorAction::Leave))
                })
        };

        let pruner = Interval::new(TRAIL_PRUNE_INTERVAL_MS, move || {
            dispatcher.dispatch(CursorAction::Prune(dom::now_ms()));
        });

        move || {
            drop(on_move);
            drop(on_leave);
            drop(pruner);
        }
    });
}
