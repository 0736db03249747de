//! Delivery policy configuration
//!
//! Read either from the MTA's RON configuration:
//! ```ron
//! policy: (
//!     soft_bounce: true,
//!     notify_classes: [Resource, Software, Protocol],
//! )
//! ```
//! or from the parameter registry via [`PolicyConfig::from_parameters`].

use std::str::FromStr;

use ferry_common::{
    ConfigError,
    config::{self, ParameterSource},
};
use serde::{Deserialize, Serialize};

/// Problem classes the postmaster can ask to be notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotifyClass {
    Bounce,
    Delay,
    Policy,
    Protocol,
    Resource,
    Software,
}

impl FromStr for NotifyClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bounce" => Ok(Self::Bounce),
            "delay" => Ok(Self::Delay),
            "policy" => Ok(Self::Policy),
            "protocol" => Ok(Self::Protocol),
            "resource" => Ok(Self::Resource),
            "software" => Ok(Self::Software),
            other => Err(format!("unknown notification class {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Turn would-be bounces into deferrals, so nothing is returned to the
    /// sender while a configuration change is being tested.
    ///
    /// Default: false
    #[serde(default)]
    pub soft_bounce: bool,

    /// Which problem classes are reported to the postmaster.
    ///
    /// Default: `[Resource, Software]`
    #[serde(default = "defaults::notify_classes")]
    pub notify_classes: Vec<NotifyClass>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            soft_bounce: false,
            notify_classes: defaults::notify_classes(),
        }
    }
}

impl PolicyConfig {
    pub const SOFT_BOUNCE: &'static str = "soft_bounce";
    pub const NOTIFY_CLASSES: &'static str = "notify_classes";

    /// Build the configuration from the parameter registry, falling back to
    /// defaults for parameters it does not know.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when a parameter cannot be
    /// interpreted.
    pub fn from_parameters(source: &impl ParameterSource) -> Result<Self, ConfigError> {
        let soft_bounce = config::get_bool(source, Self::SOFT_BOUNCE, false)?;

        let notify_classes = match config::get_list(source, Self::NOTIFY_CLASSES) {
            None => defaults::notify_classes(),
            Some(names) => names
                .iter()
                .map(|name| {
                    name.parse::<NotifyClass>().map_err(|reason: String| ConfigError::InvalidValue {
                        name: Self::NOTIFY_CLASSES.to_string(),
                        value: name.clone(),
                        reason,
                    })
                })
                .collect::<Result<_, _>>()?,
        };

        Ok(Self {
            soft_bounce,
            notify_classes,
        })
    }

    #[must_use]
    pub fn notifies(&self, class: NotifyClass) -> bool {
        self.notify_classes.contains(&class)
    }
}

mod defaults {
    use super::NotifyClass;

    pub fn notify_classes() -> Vec<NotifyClass> {
        vec![NotifyClass::Resource, NotifyClass::Software]
    }
}
