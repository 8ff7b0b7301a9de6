//! Shared engine cell, DOM event listeners and the event pump.
//!
//! Media element events are queued and delivered one at a time. A notification that
//! arrives while the engine is already borrowed (a command in flight) stays queued and is
//! delivered by whoever holds the borrow once it is released.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use duoplay_core::{Config, Role, SyncEngine, TransportEvent};
use js_sys::Function;
use log::{trace, warn};
use serde_wasm_bindgen as swb;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsError, JsValue};
use web_sys::{Event, HtmlMediaElement};

use crate::transport::{WebTransport, MEDIA_EVENTS};

pub type WebEngine = SyncEngine<WebTransport, WebTransport>;

struct DomListener {
    target: HtmlMediaElement,
    name: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

pub struct Host {
    engine: RefCell<WebEngine>,
    queue: RefCell<VecDeque<(Role, TransportEvent)>>,
    on_change: RefCell<Option<Function>>,
    listeners: RefCell<Vec<DomListener>>,
    max_iterations: usize,
}

impl Host {
    pub fn new(cfg: Config, video: HtmlMediaElement, audio: HtmlMediaElement) -> Rc<Self> {
        let max_iterations = cfg.max_pump_iterations;
        Rc::new_cyclic(|weak: &Weak<Host>| {
            let primary = WebTransport::new(Role::Primary, video, weak.clone());
            let secondary = WebTransport::new(Role::Secondary, audio, weak.clone());
            Host {
                engine: RefCell::new(SyncEngine::new(cfg, primary, secondary)),
                queue: RefCell::new(VecDeque::new()),
                on_change: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
                max_iterations,
            }
        })
    }

    /// Subscribe to the media events of `element` on behalf of `role`.
    pub fn attach(self: &Rc<Self>, role: Role, element: &HtmlMediaElement) -> Result<(), JsValue> {
        for name in MEDIA_EVENTS {
            let Some(event) = TransportEvent::from_dom_name(name) else {
                continue;
            };
            let host = Rc::downgrade(self);
            let callback = Closure::wrap(Box::new(move |_event: Event| {
                if let Some(host) = host.upgrade() {
                    host.deliver(role, event.clone());
                }
            }) as Box<dyn FnMut(_)>);
            element.add_event_listener_with_callback(name, callback.as_ref().unchecked_ref())?;
            self.listeners.borrow_mut().push(DomListener {
                target: element.clone(),
                name,
                callback,
            });
        }
        Ok(())
    }

    pub fn set_on_change(&self, listener: Option<Function>) {
        *self.on_change.borrow_mut() = listener;
    }

    /// Queue a transport notification and deliver whatever can be delivered now.
    pub fn deliver(&self, role: Role, event: TransportEvent) {
        self.queue.borrow_mut().push_back((role, event));
        self.pump();
    }

    /// Run a command against the engine, then deliver anything queued meanwhile.
    pub fn command<R>(&self, f: impl FnOnce(&mut WebEngine) -> R) -> Result<R, JsError> {
        let result = {
            let mut engine = self
                .engine
                .try_borrow_mut()
                .map_err(|_| JsError::new("engine is busy"))?;
            f(&mut engine)
        };
        self.pump();
        Ok(result)
    }

    /// Read engine state; `R::default()` while a command is in flight.
    pub fn read<R: Default>(&self, f: impl FnOnce(&WebEngine) -> R) -> R {
        self.engine
            .try_borrow()
            .map(|engine| f(&engine))
            .unwrap_or_default()
    }

    fn pump(&self) {
        {
            let Ok(mut engine) = self.engine.try_borrow_mut() else {
                return;
            };
            let mut delivered = 0;
            loop {
                let next = self.queue.borrow_mut().pop_front();
                let Some((role, event)) = next else {
                    break;
                };
                if delivered == self.max_iterations {
                    let dropped = self.queue.borrow().len() + 1;
                    warn!("event pump hit {delivered} deliveries; dropping {dropped} events");
                    self.queue.borrow_mut().clear();
                    break;
                }
                trace!("deliver {event:?} to {}", role.name());
                engine.handle_event(role, event);
                delivered += 1;
            }
        }
        self.flush();
    }

    /// Hand queued engine events to the `on_change` listener.
    fn flush(&self) {
        let events = match self.engine.try_borrow_mut() {
            Ok(mut engine) => engine.drain_events(),
            Err(_) => return,
        };
        if events.is_empty() {
            return;
        }
        // The listener may call straight back into the player.
        let Some(listener) = self.on_change.borrow().clone() else {
            return;
        };
        for event in events {
            match swb::to_value(&event) {
                Ok(value) => {
                    if let Err(err) = listener.call1(&JsValue::NULL, &value) {
                        warn!("on_change listener threw on {}: {err:?}", event.name());
                    }
                }
                Err(err) => warn!("serializing {}: {err}", event.name()),
            }
        }
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        for listener in self.listeners.get_mut().drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.name,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
    }
}
