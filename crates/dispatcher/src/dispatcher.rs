//! Dispatcher - event registry and synchronous fan-out to loggers

use contracts::{Event, EventKind, EventKinds, LogsConfig, SimContext};
use tracing::{debug, error, info, instrument};

use crate::error::DispatchError;
use crate::logger::{Activation, Logger, LoggerId, LoggerState};
use crate::metrics::{DispatchMetrics, MetricsSnapshot};

struct Installed {
    logger: Box<dyn Logger>,
    state: LoggerState,
    subscribed: EventKinds,
}

/// Registry of installed loggers and the `post_event` entry point
///
/// Loggers are installed and registered during startup only. Once the first
/// event has been delivered (or `seal` was called) the registry is read-only.
pub struct Dispatcher {
    loggers: Vec<Installed>,
    /// Kind index -> subscribers in registration order
    registry: [Vec<LoggerId>; EventKind::COUNT],
    /// Bitwise OR of all registered kinds
    registered: EventKinds,
    sealed: bool,
    closed: bool,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            loggers: Vec::new(),
            registry: Default::default(),
            registered: EventKinds::NONE,
            sealed: false,
            closed: false,
            metrics: DispatchMetrics::new(),
        }
    }

    /// Add a logger to the installed list
    ///
    /// No subscription happens here; see `init_all` / `register_events`.
    pub fn install(&mut self, logger: Box<dyn Logger>) -> Result<LoggerId, DispatchError> {
        if self.sealed {
            return Err(DispatchError::RegistrationClosed {
                logger: logger.name().to_string(),
            });
        }
        let id = LoggerId(self.loggers.len());
        debug!(logger = logger.name(), id = %id, "Logger installed");
        self.loggers.push(Installed {
            logger,
            state: LoggerState::Unconfigured,
            subscribed: EventKinds::NONE,
        });
        Ok(id)
    }

    /// Subscribe `id` to every kind in `kinds`
    ///
    /// # Errors
    /// - registration already closed
    /// - a kind the logger has no handler for
    /// - a (logger, kind) pair registered twice
    pub fn register_events(&mut self, id: LoggerId, kinds: EventKinds) -> Result<(), DispatchError> {
        let installed = self
            .loggers
            .get_mut(id.0)
            .ok_or(DispatchError::UnknownLogger(id.0))?;
        let name = installed.logger.name();

        if self.sealed {
            return Err(DispatchError::RegistrationClosed {
                logger: name.to_string(),
            });
        }

        let handles = installed.logger.handles();
        if !handles.contains_all(kinds) {
            return Err(DispatchError::UnhandledKind {
                logger: name.to_string(),
                kinds,
                handles,
            });
        }

        if let Some(kind) = (installed.subscribed & kinds).iter().next() {
            return Err(DispatchError::DuplicateRegistration {
                logger: name.to_string(),
                kind,
            });
        }

        for kind in kinds.iter() {
            self.registry[kind.index()].push(id);
        }
        installed.subscribed |= kinds;
        self.registered |= kinds;

        debug!(logger = name, kinds = %kinds, "Logger registered");
        Ok(())
    }

    /// Run `init` on every installed logger, in installation order
    ///
    /// Enabled loggers are registered for exactly the kinds they handle.
    /// The first failure aborts startup.
    #[instrument(name = "dispatcher_init_all", skip_all, fields(loggers = self.loggers.len()))]
    pub fn init_all(&mut self, sim: &SimContext, config: &LogsConfig) -> Result<(), DispatchError> {
        for index in 0..self.loggers.len() {
            let id = LoggerId(index);
            let (activation, handles) = {
                let installed = &mut self.loggers[index];
                if installed.state != LoggerState::Unconfigured {
                    continue;
                }
                let activation = installed.logger.init(sim, config)?;
                installed.state = match activation {
                    Activation::Disabled => LoggerState::Disabled,
                    Activation::Enabled => LoggerState::Enabled,
                };
                (activation, installed.logger.handles())
            };

            match activation {
                Activation::Enabled => self.register_events(id, handles)?,
                Activation::Disabled => {
                    debug!(logger = self.loggers[index].logger.name(), "Logger disabled")
                }
            }
        }

        info!(
            enabled = self.enabled_count(),
            registered = %self.registered,
            "Loggers initialized"
        );
        Ok(())
    }

    /// Close registration; later install/register calls fail
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Deliver `event` to every logger registered for its kind
    ///
    /// Kinds nobody registered for return after a single mask test. Every
    /// subscriber is invoked even if an earlier one fails; the first failure
    /// is returned.
    #[inline]
    pub fn post_event(&mut self, event: &Event<'_>) -> Result<(), DispatchError> {
        self.metrics.inc_posted_count();
        let kind = event.kind();
        if !self.registered.contains(kind) {
            self.metrics.inc_filtered_count();
            return Ok(());
        }
        self.deliver(kind, event)
    }

    fn deliver(&mut self, kind: EventKind, event: &Event<'_>) -> Result<(), DispatchError> {
        self.sealed = true;
        self.metrics.inc_lookup_count();

        let Self {
            loggers,
            registry,
            metrics,
            ..
        } = self;

        let mut first_error = None;
        for id in &registry[kind.index()] {
            let installed = &mut loggers[id.0];
            match installed.logger.handle(event) {
                Ok(()) => metrics.inc_delivered_count(),
                Err(e) => {
                    metrics.inc_failure_count();
                    error!(
                        logger = installed.logger.name(),
                        kind = %kind,
                        timestep = event.timestep(),
                        error = %e,
                        "Handler failed"
                    );
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close every enabled logger, in reverse installation order
    ///
    /// Idempotent. All loggers are closed even if one fails; the first
    /// failure is returned.
    #[instrument(name = "dispatcher_close", skip(self))]
    pub fn close(&mut self) -> Result<(), DispatchError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sealed = true;

        let mut first_error = None;
        for installed in self.loggers.iter_mut().rev() {
            if installed.state != LoggerState::Enabled {
                continue;
            }
            installed.state = LoggerState::Closed;
            if let Err(e) = installed.logger.close() {
                error!(logger = installed.logger.name(), error = %e, "Close failed");
                first_error.get_or_insert(e);
            }
        }

        debug!(metrics = ?self.metrics.snapshot(), "Dispatcher closed");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Aggregate mask of every registered kind
    pub fn registered_kinds(&self) -> EventKinds {
        self.registered
    }

    /// Subscribers of `kind`, in delivery order
    pub fn subscribers(&self, kind: EventKind) -> &[LoggerId] {
        &self.registry[kind.index()]
    }

    pub fn logger_name(&self, id: LoggerId) -> Option<&'static str> {
        self.loggers.get(id.0).map(|i| i.logger.name())
    }

    pub fn logger_state(&self, id: LoggerId) -> Option<LoggerState> {
        self.loggers.get(id.0).map(|i| i.state)
    }

    /// Installed loggers in installation order
    pub fn installed(&self) -> impl Iterator<Item = (LoggerId, &'static str, LoggerState)> + '_ {
        self.loggers
            .iter()
            .enumerate()
            .map(|(i, inst)| (LoggerId(i), inst.logger.name(), inst.state))
    }

    pub fn installed_count(&self) -> usize {
        self.loggers.len()
    }

    pub fn enabled_count(&self) -> usize {
        self.loggers
            .iter()
            .filter(|i| i.state == LoggerState::Enabled)
            .count()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(error = %e, "Dispatcher close failed on drop");
        }
    }
}
