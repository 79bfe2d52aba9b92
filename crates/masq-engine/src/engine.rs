//! Translation engine
//!
//! Receives host notifications (base device changed, base device deleted,
//! command against a masquerade device) and turns them into calls on the
//! host capability traits.

use std::sync::Arc;

use masq_core::{
    states, ActionInvoker, ActionProps, Binding, BindingKind, Command, CommandRoute, DeviceAction,
    DeviceId, DeviceLookup, DeviceSnapshot, DimmerBinding, SensorBinding, SpeedAction,
    SprinklerAction, StateReporter, StateUpdate, ValueSensorBinding,
};
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::error::{EngineError, EngineResult};
use crate::registry::BindingRegistry;
use crate::{format, matcher, presenter, scale};

/// Effect of processing one event or command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Host calls were made
    Applied,
    /// The watched value did not change
    Unchanged,
    /// Skipped without touching the host
    Dropped,
}

/// Mirrors base devices onto masquerade devices
pub struct TranslationEngine {
    registry: BindingRegistry,
    devices: Arc<dyn DeviceLookup>,
    actions: Arc<dyn ActionInvoker>,
    reporter: Arc<dyn StateReporter>,
}

impl TranslationEngine {
    /// Create an engine over separate capability implementations
    pub fn new(
        devices: Arc<dyn DeviceLookup>,
        actions: Arc<dyn ActionInvoker>,
        reporter: Arc<dyn StateReporter>,
    ) -> Self {
        Self {
            registry: BindingRegistry::new(),
            devices,
            actions,
            reporter,
        }
    }

    /// Create an engine over one host implementing every capability
    pub fn with_host<H>(host: Arc<H>) -> Self
    where
        H: DeviceLookup + ActionInvoker + StateReporter + 'static,
    {
        Self::new(host.clone(), host.clone(), host)
    }

    /// Bound masquerade devices
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Bind a masquerade device and sync it with its base device
    ///
    /// A failed initial sync is logged; the binding stays bound.
    #[instrument(skip(self, binding), fields(masquerade_id = %binding.masquerade_id, base_device_id = %binding.base_device_id))]
    pub fn register(&self, binding: Binding) -> EngineResult<Outcome> {
        let masquerade_id = binding.masquerade_id;
        let base_device_id = binding.base_device_id;
        self.registry.insert(binding.clone())?;

        let snapshot = match self.devices.device(base_device_id) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(%masquerade_id, %base_device_id, error = %e, "Initial sync skipped");
                return Ok(Outcome::Dropped);
            }
        };

        match self.translate(&binding, None, &snapshot) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.log_failure(masquerade_id, &e);
                Ok(Outcome::Dropped)
            }
        }
    }

    /// Unbind a masquerade device
    #[instrument(skip(self), fields(masquerade_id = %masquerade_id))]
    pub fn unregister(&self, masquerade_id: DeviceId) -> EngineResult<Binding> {
        self.registry
            .remove(masquerade_id)
            .map_err(|_| EngineError::NotRegistered(masquerade_id))
    }

    /// Fan a base device change out to every binding mirroring it
    ///
    /// Returns the number of bindings that reported new state. Failures are
    /// logged per binding and never stop the fan-out.
    #[instrument(skip(self, old, new), fields(base_device_id = %new.id))]
    pub fn on_upstream_change(&self, old: Option<&DeviceSnapshot>, new: &DeviceSnapshot) -> usize {
        let mut applied = 0;
        for binding in self.registry.bindings_for_base(new.id) {
            match self.translate(&binding, old, new) {
                Ok(Outcome::Applied) => applied += 1,
                Ok(_) => {}
                Err(e) => self.log_failure(binding.masquerade_id, &e),
            }
        }
        applied
    }

    /// Process a base device change for a single masquerade device
    pub fn sync_binding(
        &self,
        masquerade_id: DeviceId,
        old: Option<&DeviceSnapshot>,
        new: &DeviceSnapshot,
    ) -> EngineResult<Outcome> {
        let binding = self
            .registry
            .get(masquerade_id)
            .ok_or(EngineError::NotRegistered(masquerade_id))?;
        self.translate(&binding, old, new)
    }

    /// Unbind and disable every masquerade device of a deleted base device
    ///
    /// Returns the affected masquerade ids in ascending order.
    #[instrument(skip(self), fields(base_device_id = %base_device_id))]
    pub fn on_upstream_deleted(&self, base_device_id: DeviceId) -> Vec<DeviceId> {
        let mut disabled = Vec::new();
        for binding in self.registry.bindings_for_base(base_device_id) {
            let masquerade_id = binding.masquerade_id;
            if let Err(e) = self.registry.remove(masquerade_id) {
                debug!(%masquerade_id, error = %e, "Binding already removed");
                continue;
            }

            debug!(%masquerade_id, name = %binding.name, "Disabling masquerade device");
            if let Err(e) = self.reporter.set_enabled(masquerade_id, false) {
                warn!(%masquerade_id, error = %e, "Failed to disable masquerade device");
            }
            disabled.push(masquerade_id);
        }
        disabled
    }

    /// Translate a command against a masquerade device
    #[instrument(skip(self), fields(masquerade_id = %masquerade_id, command = %command))]
    pub fn on_command(&self, masquerade_id: DeviceId, command: Command) -> EngineResult<Outcome> {
        let result = self.dispatch(masquerade_id, command);
        if let Err(e) = &result {
            self.log_failure(masquerade_id, e);
        }
        result
    }

    fn dispatch(&self, masquerade_id: DeviceId, command: Command) -> EngineResult<Outcome> {
        let binding = self
            .registry
            .get(masquerade_id)
            .ok_or(EngineError::NotRegistered(masquerade_id))?;
        let base = binding.base_device_id;

        match (&binding.kind, command) {
            (BindingKind::Dimmer(dimmer), Command::Device(action)) => {
                self.dimmer_command(&binding, dimmer, action)
            }
            (BindingKind::SpeedControl(speed), Command::Speed(SpeedAction::SetSpeedIndex(index))) => {
                let level = index.saturating_mul(speed.scale_factor);
                debug!(%masquerade_id, base_device_id = %base, index, level, "Setting speed");
                self.actions.set_brightness(base, level)?;
                Ok(Outcome::Applied)
            }
            (BindingKind::Sprinkler, Command::Sprinkler(SprinklerAction::ZoneOn)) => {
                self.actions.turn_on(base)?;
                Ok(Outcome::Applied)
            }
            (BindingKind::Sprinkler, Command::Sprinkler(SprinklerAction::AllZonesOff)) => {
                self.actions.turn_off(base)?;
                Ok(Outcome::Applied)
            }
            (kind, command) => Err(EngineError::UnsupportedCommand {
                device: masquerade_id,
                kind: kind.type_id(),
                command,
            }),
        }
    }

    fn dimmer_command(
        &self,
        binding: &Binding,
        dimmer: &DimmerBinding,
        action: DeviceAction,
    ) -> EngineResult<Outcome> {
        let masquerade_id = binding.masquerade_id;
        let base = binding.base_device_id;

        if matches!(action, DeviceAction::Toggle | DeviceAction::RequestStatus) {
            return Err(EngineError::UnsupportedCommand {
                device: masquerade_id,
                kind: binding.kind.type_id(),
                command: Command::Device(action),
            });
        }

        let (plugin_id, action_id, value_field) = match &dimmer.route {
            CommandRoute::Standard => {
                match action {
                    DeviceAction::TurnOn => self.actions.turn_on(base)?,
                    DeviceAction::SetBrightness(level) if level > 0 => self.actions.turn_on(base)?,
                    _ => self.actions.turn_off(base)?,
                }
                return Ok(Outcome::Applied);
            }
            CommandRoute::Action {
                plugin_id,
                action_id,
                value_field,
            } => (plugin_id, action_id, value_field.as_deref()),
        };

        if !self.devices.plugin_enabled(plugin_id)? {
            warn!(%masquerade_id, plugin_id = %plugin_id, "Base plugin disabled, command dropped");
            return Ok(Outcome::Dropped);
        }

        let value = match action {
            DeviceAction::TurnOn => value_field.map(|_| dimmer.state_scale.high.to_string()),
            DeviceAction::TurnOff => value_field.map(|_| dimmer.state_scale.low.to_string()),
            DeviceAction::SetBrightness(level) => {
                if value_field.is_none() {
                    warn!(%masquerade_id, action_id = %action_id, "No value field configured, brightness command dropped");
                    return Ok(Outcome::Dropped);
                }
                let raw = scale::to_upstream(level, &dimmer.action_scale)?;
                Some(format::render(raw, &dimmer.value_format)?)
            }
            DeviceAction::Toggle | DeviceAction::RequestStatus => None,
        };

        let mut props = ActionProps::new();
        if let (Some(field), Some(value)) = (value_field, value) {
            props.insert(field.to_string(), value);
        }

        debug!(
            %masquerade_id,
            base_device_id = %base,
            plugin_id = %plugin_id,
            action_id = %action_id,
            ?props,
            "Executing plugin action"
        );
        self.actions.execute_action(plugin_id, action_id, base, props)?;
        Ok(Outcome::Applied)
    }

    fn translate(
        &self,
        binding: &Binding,
        old: Option<&DeviceSnapshot>,
        new: &DeviceSnapshot,
    ) -> EngineResult<Outcome> {
        match &binding.kind {
            BindingKind::Sensor(sensor) => self.translate_sensor(binding, sensor, old, new),
            BindingKind::ValueSensor(value) => self.translate_value(binding, value, old, new),
            BindingKind::Dimmer(dimmer) => self.translate_dimmer(binding, dimmer, old, new),
            BindingKind::SpeedControl(_) => {
                let Some(level) = changed(new, "brightness", old.and_then(|o| o.brightness), new.brightness)? else {
                    return Ok(Outcome::Unchanged);
                };
                debug!(masquerade_id = %binding.masquerade_id, level, "Speed level changed");
                self.reporter.update_state(
                    binding.masquerade_id,
                    StateUpdate::new(states::SPEED_LEVEL, level),
                )?;
                Ok(Outcome::Applied)
            }
            BindingKind::Sprinkler => {
                let Some(on) = changed(new, "onState", old.and_then(|o| o.on_state), new.on_state)? else {
                    return Ok(Outcome::Unchanged);
                };
                let zone = if on { 1 } else { 0 };
                debug!(masquerade_id = %binding.masquerade_id, zone, "Active zone changed");
                self.reporter.update_state(
                    binding.masquerade_id,
                    StateUpdate::new(states::ACTIVE_ZONE, zone),
                )?;
                Ok(Outcome::Applied)
            }
        }
    }

    fn translate_sensor(
        &self,
        binding: &Binding,
        sensor: &SensorBinding,
        old: Option<&DeviceSnapshot>,
        new: &DeviceSnapshot,
    ) -> EngineResult<Outcome> {
        let Some(value) = watched_value(&sensor.watched_state_key, old, new)? else {
            return Ok(Outcome::Unchanged);
        };

        let text = matcher::state_text(value);
        let matched = matcher::is_match(
            &text,
            &sensor.match_rule.match_string,
            sensor.match_rule.reverse,
        );
        let image = presenter::present_sensor(&sensor.subtype, matched)?;

        debug!(
            masquerade_id = %binding.masquerade_id,
            state = %text,
            matched,
            "Sensor state changed"
        );
        self.reporter.update_state(
            binding.masquerade_id,
            StateUpdate::new(states::ON_OFF_STATE, matched),
        )?;
        self.reporter.update_image(binding.masquerade_id, image)?;
        Ok(Outcome::Applied)
    }

    fn translate_value(
        &self,
        binding: &Binding,
        sensor: &ValueSensorBinding,
        old: Option<&DeviceSnapshot>,
        new: &DeviceSnapshot,
    ) -> EngineResult<Outcome> {
        let Some(value) = watched_value(&sensor.watched_state_key, old, new)? else {
            return Ok(Outcome::Unchanged);
        };

        let presentation = presenter::present_value(&sensor.subtype)?;
        let number = parse_float(value).unwrap_or_else(|| {
            debug!(masquerade_id = %binding.masquerade_id, %value, "Non-numeric sensor value, using 0");
            0.0
        });

        debug!(masquerade_id = %binding.masquerade_id, value = number, subtype = %sensor.subtype, "Sensor value changed");
        self.reporter
            .update_image(binding.masquerade_id, presentation.image)?;
        self.reporter
            .update_state(binding.masquerade_id, presentation.state_update(number))?;
        Ok(Outcome::Applied)
    }

    fn translate_dimmer(
        &self,
        binding: &Binding,
        dimmer: &DimmerBinding,
        old: Option<&DeviceSnapshot>,
        new: &DeviceSnapshot,
    ) -> EngineResult<Outcome> {
        let Some(value) = watched_value(&dimmer.watched_state_key, old, new)? else {
            return Ok(Outcome::Unchanged);
        };

        let raw = parse_int(value).unwrap_or_else(|| {
            debug!(masquerade_id = %binding.masquerade_id, %value, "Non-numeric level, using 0");
            0
        });
        let scaled = scale::to_downstream(raw, &dimmer.state_scale)?;
        if let Some(clamp) = scaled.clamped {
            warn!(
                masquerade_id = %binding.masquerade_id,
                raw,
                low = dimmer.state_scale.low,
                high = dimmer.state_scale.high,
                ?clamp,
                "Level outside configured range, clamped"
            );
        }

        debug!(masquerade_id = %binding.masquerade_id, raw, level = scaled.value, "Dimmer level changed");
        self.reporter.update_state(
            binding.masquerade_id,
            StateUpdate::new(states::BRIGHTNESS_LEVEL, scaled.value),
        )?;
        Ok(Outcome::Applied)
    }

    fn log_failure(&self, masquerade_id: DeviceId, e: &EngineError) {
        if e.is_config() {
            error!(%masquerade_id, error = %e, "Masquerade device misconfigured");
        } else {
            warn!(%masquerade_id, error = %e, "Event dropped");
        }
    }
}

impl std::fmt::Debug for TranslationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationEngine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

/// The watched state value if it changed
fn watched_value<'a>(
    key: &str,
    old: Option<&DeviceSnapshot>,
    new: &'a DeviceSnapshot,
) -> EngineResult<Option<&'a Value>> {
    let value = new.state(key).ok_or_else(|| EngineError::MissingState {
        device: new.id,
        key: key.to_string(),
    })?;

    if old.and_then(|o| o.state(key)).is_some_and(|prev| same_value(prev, value)) {
        return Ok(None);
    }
    Ok(Some(value))
}

/// Equality with numbers compared by value, so `1` and `1.0` are the same
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// A built-in property value if it changed
fn changed<T: Copy + PartialEq>(
    new: &DeviceSnapshot,
    key: &str,
    old_value: Option<T>,
    new_value: Option<T>,
) -> EngineResult<Option<T>> {
    let value = new_value.ok_or_else(|| EngineError::MissingState {
        device: new.id,
        key: key.to_string(),
    })?;

    if old_value == Some(value) {
        return Ok(None);
    }
    Ok(Some(value))
}

fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        }
        _ => None,
    }
}
