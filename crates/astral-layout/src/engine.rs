#![forbid(unsafe_code)]

//! The layout engine: active breakpoint table, environment queries and
//! event-driven rule re-evaluation.
//!
//! # Design
//!
//! [`LayoutEngine<E>`] is a cheaply clonable handle (`Rc` inside) over an
//! [`Environment`], the active [`BreakpointTable`], and an
//! [`EventBus<LayoutEvent>`]. The host calls [`notify_resize`] and
//! [`notify_orientation_change`] from its own event dispatch; those publish on
//! [`RESIZE_TOPIC`] and [`ORIENTATION_TOPIC`], and every registered rule
//! re-evaluates.
//!
//! Rule handlers hold only a `Weak` reference to the engine's shared state, so
//! a registered rule never keeps a dropped engine alive.
//!
//! # Invariants
//!
//! 1. `configure` swaps the whole table at once; labels are always derived
//!    from the table that classification uses.
//! 2. A rule runs exactly one of its actions per evaluation, or none if the
//!    evaluation failed.
//! 3. The engine holds no borrow of its table while running predicates or
//!    actions, so those may query or reconfigure the engine.
//!
//! [`notify_resize`]: LayoutEngine::notify_resize
//! [`notify_orientation_change`]: LayoutEngine::notify_orientation_change

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use astral_core::{Callback, DebugLog, EventBus};

use crate::breakpoint::{Breakpoint, BreakpointLabels, BreakpointTable, WindowSize};
use crate::condition::{Condition, Rule};
use crate::config::LayoutConfig;
use crate::environment::{Environment, Orientation, resolve_orientation};
use crate::error::{LayoutError, Result};

/// Component name used in debug output.
pub const COMPONENT: &str = "Astral.layout";

/// Topic carrying [`LayoutEvent::Resize`].
pub const RESIZE_TOPIC: &str = "astral.layout.resize";

/// Topic carrying [`LayoutEvent::OrientationChange`].
pub const ORIENTATION_TOPIC: &str = "astral.layout.orientation";

/// Payload published by the engine's notification entry points.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// The viewport changed size. `breakpoint` is `None` if the active table
    /// has no entry for `size`.
    Resize {
        size: WindowSize,
        breakpoint: Option<Breakpoint>,
    },
    OrientationChange(Orientation),
}

struct EngineInner<E> {
    env: E,
    table: RefCell<BreakpointTable>,
    bus: EventBus<LayoutEvent>,
    debug: DebugLog,
}

impl<E: Environment> EngineInner<E> {
    fn breakpoint_from_label(&self, label: &str) -> Result<Breakpoint> {
        self.table
            .borrow()
            .get(label)
            .copied()
            .ok_or_else(|| LayoutError::NoBreakpointForLabel {
                label: label.to_owned(),
            })
    }

    /// Evaluate `rule` against the live window size and fire its action.
    fn run_rule(&self, rule: &Rule) -> Result<bool> {
        let size = self.env.window_size();
        let lookup = |label: &str| self.breakpoint_from_label(label);
        let matched = rule.matches(size, &lookup, &self.debug)?;
        self.debug
            .log(|| format!("Rule evaluated at {size}: matched = {matched}"));
        rule.fire(matched);
        Ok(matched)
    }
}

/// Breakpoint classification, orientation queries and responsive rules over
/// an environment `E`.
///
/// Cloning creates a new handle to the **same** engine.
pub struct LayoutEngine<E> {
    inner: Rc<EngineInner<E>>,
}

impl<E> Clone for LayoutEngine<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for LayoutEngine<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("env", &self.inner.env)
            .field("table", &self.inner.table.borrow())
            .field("bus", &self.inner.bus)
            .finish()
    }
}

impl<E: Environment + 'static> LayoutEngine<E> {
    /// Engine over `env` with the standard table and a private bus.
    #[must_use]
    pub fn new(env: E) -> Self {
        Self::with_bus(env, EventBus::new())
    }

    /// Engine over `env` publishing on a shared `bus`.
    #[must_use]
    pub fn with_bus(env: E, bus: EventBus<LayoutEvent>) -> Self {
        Self {
            inner: Rc::new(EngineInner {
                env,
                table: RefCell::new(BreakpointTable::standard()),
                bus,
                debug: DebugLog::new(COMPONENT),
            }),
        }
    }

    #[must_use]
    pub fn environment(&self) -> &E {
        &self.inner.env
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus<LayoutEvent> {
        &self.inner.bus
    }

    /// Replace the active breakpoint table.
    ///
    /// Fails with [`LayoutError::InvalidConfiguration`] if `config` carries no
    /// table. An empty table is accepted.
    pub fn configure(&self, config: LayoutConfig) -> Result<()> {
        let table = config.into_table()?;
        self.inner.debug.log(|| {
            let labels: Vec<&str> = table.iter().map(|(label, _)| label).collect();
            format!("Configured breakpoints: {labels:?}")
        });
        *self.inner.table.borrow_mut() = table;
        Ok(())
    }

    /// Parse `text` as a [`LayoutConfig`] and apply it.
    pub fn configure_json(&self, text: &str) -> Result<()> {
        self.configure(LayoutConfig::from_json(text)?)
    }

    /// Labels of the active table, in table order.
    #[must_use]
    pub fn breakpoint_labels(&self) -> BreakpointLabels {
        self.inner.table.borrow().labels()
    }

    /// Snapshot of the active table.
    #[must_use]
    pub fn breakpoints(&self) -> BreakpointTable {
        self.inner.table.borrow().clone()
    }

    pub fn breakpoint_from_label(&self, label: &str) -> Result<Breakpoint> {
        self.inner.breakpoint_from_label(label)
    }

    /// First breakpoint, in table order, containing `size`.
    pub fn breakpoint(&self, size: WindowSize) -> Result<Breakpoint> {
        self.classify(size).map(|(_, bp)| bp)
    }

    /// Like [`breakpoint`](Self::breakpoint), also returning the label.
    pub fn classify(&self, size: WindowSize) -> Result<(String, Breakpoint)> {
        self.inner
            .table
            .borrow()
            .classify(size)
            .map(|(label, bp)| (label.to_owned(), *bp))
            .ok_or(LayoutError::NoBreakpointForSize {
                width: size.width,
                height: size.height,
            })
    }

    #[must_use]
    pub fn window_size(&self) -> WindowSize {
        self.inner.env.window_size()
    }

    /// Breakpoint of the current window size.
    pub fn current_breakpoint(&self) -> Result<Breakpoint> {
        self.breakpoint(self.window_size())
    }

    pub fn orientation(&self) -> Result<Orientation> {
        resolve_orientation(&self.inner.env)
    }

    /// Run `on_success` or `on_fail` now and after every resize or
    /// orientation change, depending on whether `conditions` hold.
    ///
    /// See [`apply`](Self::apply).
    pub fn apply_if(
        &self,
        on_success: impl Fn() + 'static,
        on_fail: impl Fn() + 'static,
        conditions: Vec<Condition>,
        all_required: bool,
    ) -> Result<RuleHandle> {
        self.apply(
            Rule::new(conditions, all_required)
                .on_success(on_success)
                .on_fail(on_fail),
        )
    }

    /// Register `rule`.
    ///
    /// Fails with [`LayoutError::MissingConditions`] before anything runs if
    /// the rule has no conditions or no success action. Otherwise the rule is
    /// evaluated once immediately; a lookup failure there propagates and the
    /// rule is not registered. On success the rule is subscribed to both the
    /// resize and orientation topics until the returned handle is cancelled.
    pub fn apply(&self, rule: Rule) -> Result<RuleHandle> {
        if !rule.is_runnable() {
            return Err(LayoutError::MissingConditions);
        }
        let rule = Rc::new(rule);
        self.inner.run_rule(&rule)?;

        let last_error = Rc::new(RefCell::new(None));
        let handler = rule_handler(Rc::downgrade(&self.inner), rule, Rc::clone(&last_error));
        self.inner.bus.subscribe(RESIZE_TOPIC, &handler);
        self.inner.bus.subscribe(ORIENTATION_TOPIC, &handler);
        self.inner.debug.log(|| "Rule registered".to_string());

        Ok(RuleHandle {
            bus: self.inner.bus.clone(),
            handler,
            active: Cell::new(true),
            last_error,
        })
    }

    /// Host hook: the viewport was resized.
    pub fn notify_resize(&self) {
        let size = self.window_size();
        let breakpoint = self.breakpoint(size).ok();
        self.inner
            .debug
            .log(|| format!("Resize to {size}, breakpoint: {breakpoint:?}"));
        self.inner
            .bus
            .publish(RESIZE_TOPIC, &LayoutEvent::Resize { size, breakpoint });
    }

    /// Host hook: the orientation changed. Fails without publishing if no
    /// orientation source is available.
    pub fn notify_orientation_change(&self) -> Result<Orientation> {
        let orientation = self.orientation()?;
        self.inner
            .debug
            .log(|| format!("Orientation changed to {orientation}"));
        self.inner.bus.publish(
            ORIENTATION_TOPIC,
            &LayoutEvent::OrientationChange(orientation),
        );
        Ok(orientation)
    }

    pub fn set_debug_mode(&self, enabled: bool) {
        self.inner.debug.set_enabled(enabled);
    }
}

fn rule_handler<E: Environment + 'static>(
    engine: Weak<EngineInner<E>>,
    rule: Rc<Rule>,
    last_error: Rc<RefCell<Option<LayoutError>>>,
) -> Callback<LayoutEvent> {
    Callback::new(move |_event: &LayoutEvent| {
        let Some(engine) = engine.upgrade() else {
            return;
        };
        let outcome = engine.run_rule(&rule);
        match outcome {
            Ok(_) => *last_error.borrow_mut() = None,
            Err(err) => {
                tracing::warn!(
                    target: astral_core::diagnostics::LOG_TARGET,
                    component = COMPONENT,
                    error = %err,
                    "rule re-evaluation failed"
                );
                *last_error.borrow_mut() = Some(err);
            }
        }
    })
}

/// Registration of a rule with a [`LayoutEngine`].
///
/// Dropping the handle does **not** unregister the rule; call
/// [`cancel`](Self::cancel) to stop re-evaluation.
pub struct RuleHandle {
    bus: EventBus<LayoutEvent>,
    handler: Callback<LayoutEvent>,
    active: Cell<bool>,
    last_error: Rc<RefCell<Option<LayoutError>>>,
}

impl RuleHandle {
    /// Stop re-evaluating the rule on future events. Idempotent.
    pub fn cancel(&self) {
        if self.active.replace(false) {
            self.bus.unsubscribe(RESIZE_TOPIC, &self.handler);
            self.bus.unsubscribe(ORIENTATION_TOPIC, &self.handler);
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Error from the most recent event-driven evaluation, cleared by the
    /// next successful one.
    #[must_use]
    pub fn last_error(&self) -> Option<LayoutError> {
        self.last_error.borrow().clone()
    }
}

impl fmt::Debug for RuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleHandle")
            .field("active", &self.active.get())
            .field("last_error", &self.last_error.borrow())
            .finish()
    }
}
