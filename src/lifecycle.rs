//! Engine instance lifecycle
//!
//! Owns the single engine instance bound to a host region. Creation happens
//! once; a failed creation leaves the lifecycle inert for good. Teardown
//! unregisters the notification callback before the instance is destroyed.

use dpi::PhysicalSize;

use crate::engine::{
    configure_runtime, Engine, EngineError, EngineMessage, NotificationCallback, RuntimeConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// No creation attempted yet
    Pending,
    Active,
    /// Creation failed; nothing will ever be sent
    Inert,
    TornDown,
}

pub struct EngineLifecycle<E: Engine> {
    engine: Option<E>,
    state: LifecycleState,
    error: Option<EngineError>,
    config: RuntimeConfig,
}

impl<E: Engine> EngineLifecycle<E> {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            engine: None,
            state: LifecycleState::Pending,
            error: None,
            config,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The creation failure, if creation failed
    pub fn error(&self) -> Option<&EngineError> {
        self.error.as_ref()
    }

    /// The engine, while one is alive
    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    /// Create the engine instance for a region of the given size.
    ///
    /// Does nothing unless this is the first call. Returns `true` if an
    /// instance was created by this call.
    pub fn initialize<F>(
        &mut self,
        region: PhysicalSize<u32>,
        create: F,
        callback: NotificationCallback,
    ) -> bool
    where
        F: FnOnce(&RuntimeConfig) -> Result<E, EngineError>,
    {
        if self.state != LifecycleState::Pending {
            return false;
        }

        if !configure_runtime::<E>(&self.config) {
            tracing::debug!("Engine runtime already configured, keeping existing options");
        }

        let mut engine = match create(&self.config) {
            Ok(engine) => engine,
            Err(e) => {
                tracing::error!("Failed to create engine instance: {}", e);
                self.error = Some(e);
                self.state = LifecycleState::Inert;
                return false;
            }
        };

        engine.set_notification_callback(Some(callback));
        engine.send(EngineMessage::Create {
            backend: self.config.backend,
            transparent: self.config.transparent,
        });
        if region.width > 0 && region.height > 0 {
            engine.send(EngineMessage::Size {
                width: region.width,
                height: region.height,
            });
        }

        self.engine = Some(engine);
        self.state = LifecycleState::Active;
        tracing::info!(width = region.width, height = region.height, "Engine instance created");
        true
    }

    /// Deliver a message if an engine is alive.
    pub fn send(&mut self, message: EngineMessage) {
        if let Some(engine) = &mut self.engine {
            // Fire-and-forget: the engine's status is not acted on
            let _ = engine.send(message);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.send(EngineMessage::Size { width, height });
    }

    /// Unregister the callback, then destroy the instance.
    ///
    /// Returns `false` when there was nothing left to tear down.
    pub fn teardown(&mut self) -> bool {
        let Some(mut engine) = self.engine.take() else {
            if self.state == LifecycleState::Pending {
                self.state = LifecycleState::TornDown;
            }
            return false;
        };

        engine.set_notification_callback(None);
        engine.send(EngineMessage::Destroy);
        drop(engine);

        self.state = LifecycleState::TornDown;
        tracing::info!("Engine instance destroyed");
        true
    }
}

impl<E: Engine> Drop for EngineLifecycle<E> {
    fn drop(&mut self) {
        self.teardown();
    }
}
