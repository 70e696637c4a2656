use crate::{
    cache::CacheEntity,
    connection::notification::{DeviceDescriptor, PortDescriptor, ProfileDescriptor},
};

/// Selectable port on a cached device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePort {
    /// Port identifier.
    pub name: String,
    /// Human-readable label.
    pub description: String,
    /// Server-assigned priority.
    pub priority: u32,
    /// Whether the port is currently usable.
    pub available: bool,
}

impl From<&PortDescriptor> for DevicePort {
    fn from(port: &PortDescriptor) -> Self {
        Self {
            name: port.name.clone(),
            description: port.description.clone(),
            priority: port.priority,
            available: port.available,
        }
    }
}

/// Selectable profile on a cached device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Profile identifier.
    pub name: String,
    /// Human-readable label.
    pub description: String,
    /// Server-assigned priority.
    pub priority: u32,
}

impl From<&ProfileDescriptor> for DeviceProfile {
    fn from(profile: &ProfileDescriptor) -> Self {
        Self {
            name: profile.name.clone(),
            description: profile.description.clone(),
            priority: profile.priority,
        }
    }
}

/// Physical device mirrored from the server.
#[derive(Debug, Clone)]
pub struct Device {
    index: u32,
    name: String,
    /// Human-readable label, mutable across updates.
    pub description: String,
    /// Ports offered by the device.
    pub ports: Vec<DevicePort>,
    /// Name of the active port, if any.
    pub active_port: Option<String>,
    /// Profiles offered by the device.
    pub profiles: Vec<DeviceProfile>,
    /// Name of the active profile, if any.
    pub active_profile: Option<String>,
}

impl Device {
    /// Server-assigned index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Device name, stable across updates.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currently active port, resolved against the port list.
    pub fn current_port(&self) -> Option<&DevicePort> {
        let active = self.active_port.as_deref()?;
        self.ports.iter().find(|port| port.name == active)
    }

    /// Currently active profile, resolved against the profile list.
    pub fn current_profile(&self) -> Option<&DeviceProfile> {
        let active = self.active_profile.as_deref()?;
        self.profiles.iter().find(|profile| profile.name == active)
    }
}

impl CacheEntity for Device {
    type Payload = DeviceDescriptor;

    fn create(index: u32, payload: &DeviceDescriptor) -> Self {
        let mut device = Self {
            index,
            name: payload.name.clone(),
            description: String::new(),
            ports: Vec::new(),
            active_port: None,
            profiles: Vec::new(),
            active_profile: None,
        };
        device.apply(payload);
        device
    }

    fn apply(&mut self, payload: &DeviceDescriptor) {
        self.description = payload.description.clone();
        self.ports = payload.ports.iter().map(DevicePort::from).collect();
        self.active_port = payload.active_port.clone();
        self.profiles = payload.profiles.iter().map(DeviceProfile::from).collect();
        self.active_profile = payload.active_profile.clone();
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::notification::DeviceDescriptor;

    fn descriptor() -> DeviceDescriptor {
        DeviceDescriptor {
            index: 4,
            name: "hda-intel".to_owned(),
            description: "Built-in Audio".to_owned(),
            ports: vec![PortDescriptor {
                name: "analog-output".to_owned(),
                description: "Line Out".to_owned(),
                priority: 100,
                available: true,
            }],
            active_port: Some("analog-output".to_owned()),
            profiles: vec![ProfileDescriptor {
                name: "output:stereo".to_owned(),
                description: "Analog Stereo Output".to_owned(),
                priority: 60,
            }],
            active_profile: Some("output:stereo".to_owned()),
        }
    }

    #[test]
    fn resolves_active_port_and_profile() {
        let device = Device::create(4, &descriptor());

        assert_eq!(device.current_port().map(|p| p.priority), Some(100));
        assert_eq!(
            device.current_profile().map(|p| p.name.as_str()),
            Some("output:stereo")
        );
    }

    #[test]
    fn apply_replaces_mutable_fields_only() {
        let mut device = Device::create(4, &descriptor());
        let mut update = descriptor();
        update.description = "Docked Audio".to_owned();
        update.active_port = None;

        device.apply(&update);

        assert_eq!(device.name(), "hda-intel");
        assert_eq!(device.description, "Docked Audio");
        assert!(device.current_port().is_none());
    }
}
