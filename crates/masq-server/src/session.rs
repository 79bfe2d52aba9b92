//! Host session: an in-memory host, the engine, and the events driving them

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use masq_config::MasqueradeConfig;
use masq_core::{Command, DeviceId, DeviceSnapshot};
use masq_engine::{Outcome, TranslationEngine};
use masq_host::{MemoryHost, ReportedDevice};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// One line of input
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// A device changed; the snapshot replaces the previous one
    DeviceUpdated { device: DeviceSnapshot },
    /// A device was deleted from the host
    DeviceDeleted { device_id: DeviceId },
    /// A command against a masquerade device
    Command {
        masquerade_id: DeviceId,
        command: Command,
    },
    /// A masquerade device stopped communicating
    Unregister { masquerade_id: DeviceId },
}

/// The host and engine for one run
pub struct Session {
    host: Arc<MemoryHost>,
    engine: TranslationEngine,
}

impl Session {
    /// Seed the host from the configuration and register every binding
    pub fn from_config(config: &MasqueradeConfig) -> Result<Self> {
        let host = Arc::new(MemoryHost::new());
        for plugin in &config.plugins {
            host.set_plugin(plugin.id.clone(), plugin.enabled);
        }
        for device in &config.devices {
            host.apply_snapshot(device.clone());
        }

        let engine = TranslationEngine::with_host(host.clone());
        let bindings = config.bindings().context("Invalid masquerade device")?;
        for binding in bindings {
            let name = binding.name.clone();
            engine
                .register(binding)
                .with_context(|| format!("Failed to register '{}'", name))?;
        }

        info!(
            plugins = config.plugins.len(),
            devices = config.devices.len(),
            bindings = engine.registry().len(),
            "Session ready"
        );
        Ok(Self { host, engine })
    }

    /// Process one event to completion
    pub fn handle(&self, event: HostEvent) {
        debug!(?event, "Handling host event");
        match event {
            HostEvent::DeviceUpdated { device } => {
                let previous = self.host.apply_snapshot(device.clone());
                let applied = self.engine.on_upstream_change(previous.as_ref(), &device);
                debug!(device_id = %device.id, applied, "Device updated");
            }
            HostEvent::DeviceDeleted { device_id } => {
                self.host.remove_device(device_id);
                let disabled = self.engine.on_upstream_deleted(device_id);
                if !disabled.is_empty() {
                    info!(%device_id, ?disabled, "Base device deleted, masquerade devices disabled");
                }
            }
            HostEvent::Command {
                masquerade_id,
                command,
            } => {
                self.command(masquerade_id, command);
            }
            HostEvent::Unregister { masquerade_id } => {
                if let Err(e) = self.engine.unregister(masquerade_id) {
                    warn!(%masquerade_id, error = %e, "Unregister ignored");
                }
            }
        }
    }

    /// Dispatch a command, returning the outcome when it was not rejected
    ///
    /// Rejections are logged by the engine.
    pub fn command(&self, masquerade_id: DeviceId, command: Command) -> Option<Outcome> {
        let outcome = self.engine.on_command(masquerade_id, command).ok()?;
        debug!(%masquerade_id, %command, ?outcome, "Command handled");
        Some(outcome)
    }

    /// Parse and process one input line; blank lines are skipped
    pub fn handle_line(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => self.handle(event),
            Err(e) => warn!(error = %e, line, "Skipping malformed event"),
        }
    }

    /// Everything reported on masquerade devices so far
    pub fn reports(&self) -> BTreeMap<DeviceId, ReportedDevice> {
        self.host.reports()
    }

    pub fn host(&self) -> &MemoryHost {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use masq_core::{DeviceAction, StateImage};
    use masq_host::Invocation;
    use serde_json::json;
    use std::path::Path;

    const CONFIG: &str = r#"
plugins:
  - id: com.example.zwave
devices:
  - id: 101
    name: Hall Motion
    states: { motion: "false" }
  - id: 102
    name: Fan
    plugin_id: com.example.zwave
    states: { level: 0 }
bindings:
  - id: 900
    name: Hall Motion Sensor
    type: masqSensor
    props:
      baseDevice: 101
      masqState: motion
      masqSensorSubtype: MotionSensor
      matchString: "true"
  - id: 901
    name: Fan Dimmer
    type: masqDimmer
    props:
      baseDevice: 102
      masqState: level
      lowLimitState: 0
      highLimitState: 255
      devicePlugin: com.example.zwave
      masqAction: setLevel
      masqValueField: level
"#;

    fn session() -> Session {
        let config = masq_config::load_config_str(CONFIG, Path::new("test.yaml")).unwrap();
        Session::from_config(&config).unwrap()
    }

    #[test]
    fn test_parse_events() {
        let event: HostEvent =
            serde_json::from_str(r#"{"event":"device_deleted","device_id":101}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::DeviceDeleted {
                device_id: DeviceId::new(101)
            }
        );

        let event: HostEvent = serde_json::from_str(
            r#"{"event":"command","masquerade_id":901,"command":{"family":"device","action":{"type":"set_brightness","value":75}}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            HostEvent::Command {
                masquerade_id: DeviceId::new(901),
                command: Command::Device(DeviceAction::SetBrightness(75)),
            }
        );
    }

    #[test]
    fn test_initial_sync_on_startup() {
        let session = session();
        assert_eq!(
            session.host().state(DeviceId::new(900), "onOffState"),
            Some(json!(false))
        );
        assert_eq!(
            session.host().state(DeviceId::new(901), "brightnessLevel"),
            Some(json!(0))
        );
    }

    #[test]
    fn test_device_updated_line() {
        let session = session();
        session.handle_line(
            r#"{"event":"device_updated","device":{"id":101,"name":"Hall Motion","states":{"motion":"true"}}}"#,
        );

        assert_eq!(
            session.host().state(DeviceId::new(900), "onOffState"),
            Some(json!(true))
        );
        assert_eq!(
            session.host().image(DeviceId::new(900)),
            Some(StateImage::MotionSensorTripped)
        );
    }

    #[test]
    fn test_command_line() {
        let session = session();
        session.handle_line(
            r#"{"event":"command","masquerade_id":901,"command":{"family":"device","action":{"type":"set_brightness","value":50}}}"#,
        );

        assert_eq!(session.host().invocations().len(), 1);
        assert!(matches!(
            &session.host().invocations()[0],
            Invocation::ExecuteAction { props, .. } if props.get("level").map(String::as_str) == Some("50")
        ));
    }

    #[test]
    fn test_command_outcomes() {
        let session = session();
        let brightness = Command::Device(DeviceAction::SetBrightness(50));

        assert_eq!(
            session.command(DeviceId::new(901), brightness),
            Some(Outcome::Applied)
        );

        session.host().set_plugin("com.example.zwave", false);
        assert_eq!(
            session.command(DeviceId::new(901), brightness),
            Some(Outcome::Dropped)
        );

        assert_eq!(session.command(DeviceId::new(999), brightness), None);
        assert_eq!(
            session.command(DeviceId::new(900), Command::Device(DeviceAction::TurnOn)),
            None
        );
        assert_eq!(session.host().invocations().len(), 1);
    }

    #[test]
    fn test_deleted_line() {
        let session = session();
        session.handle_line(r#"{"event":"device_deleted","device_id":101}"#);

        assert!(!session.host().enabled(DeviceId::new(900)));
        assert!(session.host().enabled(DeviceId::new(901)));
    }

    #[test]
    fn test_malformed_and_blank_lines_skipped() {
        let session = session();
        let before = session.reports();

        session.handle_line("");
        session.handle_line("not json");
        session.handle_line(r#"{"event":"reboot"}"#);
        session.handle_line(r#"{"event":"unregister","masquerade_id":12345}"#);

        assert_eq!(session.reports(), before);
    }

    #[test]
    fn test_invalid_binding_fails_startup() {
        let config = masq_config::load_config_str(
            "bindings:\n  - id: 900\n    name: Broken\n    type: masqSensor\n    props: {}\n",
            Path::new("test.yaml"),
        )
        .unwrap();

        let err = Session::from_config(&config).err().unwrap();
        assert!(format!("{:#}", err).contains("Broken"));
    }
}
