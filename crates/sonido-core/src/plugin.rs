//! Plug-in and parameter descriptors produced by the Plug-in Catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// A 4-character fourcc code: plug-in type, subtype, or manufacturer.
///
/// The host registry identifies a plug-in by the triple of these codes
/// (see [`PluginHandle`]); each code is exactly 4 ASCII bytes, the same
/// convention Audio Unit component descriptions use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// Build a fourcc from exactly 4 ASCII bytes.
    pub fn new(code: &str) -> Result<Self, HostError> {
        let bytes = code.as_bytes();
        if bytes.len() != 4 || !bytes.is_ascii() {
            return Err(HostError::InvalidPluginHandle {
                handle: code.to_string(),
            });
        }
        let mut arr = [0u8; 4];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// The 4 raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", std::str::from_utf8(&self.0).unwrap_or("????"))
    }
}

impl FromStr for FourCc {
    type Err = HostError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FourCc {
    type Error = HostError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<FourCc> for String {
    fn from(value: FourCc) -> Self {
        value.to_string()
    }
}

/// The triple `(type, subtype, manufacturer)` that uniquely identifies a
/// plug-in in the host registry and is the handle used to instantiate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginHandle {
    /// Component type code, e.g. `aufx` for an effect.
    pub plugin_type: FourCc,
    /// Component subtype code, manufacturer-assigned.
    pub subtype: FourCc,
    /// Manufacturer code.
    pub manufacturer: FourCc,
}

impl fmt::Display for PluginHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.plugin_type, self.subtype, self.manufacturer)
    }
}

impl FromStr for PluginHandle {
    type Err = HostError;

    /// Parses the `load-plugin` command argument: three 4-char codes
    /// joined with `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let (Some(t), Some(st), Some(m), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(HostError::InvalidPluginHandle {
                handle: s.to_string(),
            });
        };
        Ok(Self {
            plugin_type: FourCc::new(t)?,
            subtype: FourCc::new(st)?,
            manufacturer: FourCc::new(m)?,
        })
    }
}

impl PluginHandle {
    /// Serializes to the `type:subtype:manufacturer` form used on the wire
    /// and in `AudioConfig::plugin_handle`'s serde representation.
    #[must_use]
    pub fn to_key(self) -> String {
        self.to_string()
    }
}

impl Serialize for PluginHandle {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PluginHandle {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The AudioUnit-style component type codes this host recognizes when
/// filtering the registry to effect-capable plug-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuType {
    /// `aufx` — audio effect, the only type the catalog enumerates.
    Effect,
    /// `aumu` — software instrument.
    Instrument,
    /// `augn` — signal generator.
    Generator,
    /// `aump` — MIDI processor.
    MidiProcessor,
    /// `aumf` — music effect (effect that also accepts MIDI).
    MusicEffect,
    /// `aumx` — mixer.
    Mixer,
    /// `aupn` — panner.
    Panner,
    /// `auol` — offline effect.
    OfflineEffect,
    /// `aufc` — format converter.
    FormatConverter,
    /// `auou` — output unit.
    Output,
}

impl AuType {
    /// The fourcc code for this component type.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            AuType::Effect => "aufx",
            AuType::Instrument => "aumu",
            AuType::Generator => "augn",
            AuType::MidiProcessor => "aump",
            AuType::MusicEffect => "aumf",
            AuType::Mixer => "aumx",
            AuType::Panner => "aupn",
            AuType::OfflineEffect => "auol",
            AuType::FormatConverter => "aufc",
            AuType::Output => "auou",
        }
    }
}

/// The unit a parameter's value is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamUnit {
    /// No particular unit.
    Generic,
    /// On/off.
    Boolean,
    /// Drawn from an ordered enumeration; see [`ParameterDescriptor::indexed_values`].
    Indexed,
    /// Frequency in Hz.
    Hertz,
    /// Decibels.
    Decibels,
    /// 0-100 percent.
    Percent,
    /// Time in seconds.
    Seconds,
}

/// Where a parameter's [`ParameterDescriptor::indexed_values`] strings came
/// from, preserved for diagnostic and determinism purposes (§4.2 step 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexedValuesSource {
    /// The plug-in's native value-strings array.
    ValueStrings,
    /// Fell back to the plug-in's factory-preset names.
    FactoryPresets,
    /// No value strings were recoverable; only the integer range is known.
    NoneFound,
}

/// A single controllable parameter exposed by a hosted plug-in.
///
/// Only included in a [`PluginDescriptor`] when writable or ramp-capable —
/// the catalog discards read-only metering parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDescriptor {
    /// Opaque 64-bit address used to address this parameter on the plug-in.
    pub address: u64,
    /// Stable string identifier.
    pub identifier: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Unit this parameter's value is expressed in.
    pub unit: ParamUnit,
    /// Minimum value.
    pub min_value: f32,
    /// Maximum value.
    pub max_value: f32,
    /// Default value.
    pub default_value: f32,
    /// Current value at introspection time.
    pub current_value: f32,
    /// Whether a host can write to this parameter.
    pub is_writable: bool,
    /// Whether the plug-in supports sample-accurate ramping of this value.
    pub can_ramp: bool,
    /// The plug-in's raw native flag bits, preserved for diagnostics.
    pub raw_flags: u32,
    /// Ordered list of display strings for an [`ParamUnit::Indexed`] parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed_values: Option<Vec<String>>,
    /// Where `indexed_values` came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexed_values_source: Option<IndexedValuesSource>,
}

impl ParameterDescriptor {
    /// True if `min_value <= default_value <= max_value` and
    /// `min_value <= current_value <= max_value` (§8 invariant 5).
    #[must_use]
    pub fn values_in_range(&self) -> bool {
        (self.min_value..=self.max_value).contains(&self.default_value)
            && (self.min_value..=self.max_value).contains(&self.current_value)
    }

    /// Whether this parameter should be retained in a catalog entry
    /// (§4.2 step 5: discard unless writable or ramp-capable).
    #[must_use]
    pub fn is_controllable(&self) -> bool {
        self.is_writable || self.can_ramp
    }
}

/// Full description of a discovered plug-in, as produced by the Plug-in
/// Catalog's introspection algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginDescriptor {
    /// Component type code, e.g. `aufx`.
    #[serde(rename = "type")]
    pub plugin_type: FourCc,
    /// Component subtype code.
    pub subtype: FourCc,
    /// Manufacturer code, serialized as `manufacturerID` per the wire format.
    #[serde(rename = "manufacturerID")]
    pub manufacturer: FourCc,
    /// Human-readable display name, serialized as `name`.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Controllable parameters; never empty for a descriptor the catalog
    /// actually emits (§4.2 step 7).
    pub parameters: Vec<ParameterDescriptor>,
}

impl PluginDescriptor {
    /// This descriptor's handle, the key used to instantiate it.
    #[must_use]
    pub fn handle(&self) -> PluginHandle {
        PluginHandle {
            plugin_type: self.plugin_type,
            subtype: self.subtype,
            manufacturer: self.manufacturer,
        }
    }
}

/// Display-name keywords that, when matched case-insensitively, permit
/// falling back to factory-preset names for an indexed parameter's value
/// strings (§4.2 step 6b). Order is irrelevant; membership is all that
/// matters.
pub const INDEXED_FALLBACK_KEYWORDS: [&str; 9] = [
    "preset", "patch", "sound", "bank", "program", "model", "amp", "cab", "scene",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourcc_rejects_wrong_length() {
        assert!(FourCc::new("abc").is_err());
        assert!(FourCc::new("abcde").is_err());
        assert!(FourCc::new("aufx").is_ok());
    }

    #[test]
    fn plugin_handle_parses_colon_separated_triple() {
        let h: PluginHandle = "aufx:dist:acme".parse().unwrap();
        assert_eq!(h.to_string(), "aufx:dist:acme");
    }

    #[test]
    fn plugin_handle_rejects_malformed_input() {
        assert!("aufx:dist".parse::<PluginHandle>().is_err());
        assert!("aufx:dist:acme:extra".parse::<PluginHandle>().is_err());
        assert!("aufx:di:acme".parse::<PluginHandle>().is_err());
    }

    fn param(min: f32, max: f32, default: f32, current: f32) -> ParameterDescriptor {
        ParameterDescriptor {
            address: 1,
            identifier: "gain".into(),
            display_name: "Gain".into(),
            unit: ParamUnit::Decibels,
            min_value: min,
            max_value: max,
            default_value: default,
            current_value: current,
            is_writable: true,
            can_ramp: true,
            raw_flags: 0,
            indexed_values: None,
            indexed_values_source: None,
        }
    }

    #[test]
    fn values_in_range_checked_independently() {
        assert!(param(0.0, 10.0, 5.0, 5.0).values_in_range());
        assert!(!param(0.0, 10.0, 11.0, 5.0).values_in_range());
        assert!(!param(0.0, 10.0, 5.0, -1.0).values_in_range());
    }

    #[test]
    fn non_writable_non_ramping_param_is_not_controllable() {
        let mut p = param(0.0, 1.0, 0.0, 0.0);
        p.is_writable = false;
        p.can_ramp = false;
        assert!(!p.is_controllable());
    }

    #[test]
    fn plugin_descriptor_serializes_expected_camel_case_fields() {
        let desc = PluginDescriptor {
            plugin_type: FourCc::new("aufx").unwrap(),
            subtype: FourCc::new("dist").unwrap(),
            manufacturer: FourCc::new("acme").unwrap(),
            display_name: "Crunch".into(),
            parameters: vec![param(0.0, 1.0, 0.5, 0.5)],
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["name"], "Crunch");
        assert_eq!(json["manufacturerID"], "acme");
        assert_eq!(json["type"], "aufx");
        assert_eq!(json["parameters"][0]["displayName"], "Gain");
        assert!(json["parameters"][0].get("indexedValues").is_none());
    }
}
