// Client events and their wire representation
use crate::component::ComponentId;
use crate::{KickboardError, Result};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Event name sent once by a client after the page has loaded
pub const INITIALIZE: &str = "INITIALIZE";

/// Identifies one event of one component, written `"{component}#{name}"` on the wire
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub component: ComponentId,
    pub name: String,
}

impl EventKey {
    pub fn new(component: ComponentId, name: impl Into<String>) -> Self {
        Self {
            component,
            name: name.into(),
        }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.component, self.name)
    }
}

impl FromStr for EventKey {
    type Err = KickboardError;

    fn from_str(s: &str) -> Result<Self> {
        let (id, name) = s
            .split_once('#')
            .ok_or_else(|| KickboardError::InvalidEvent(s.to_string()))?;
        let id: u32 = id
            .parse()
            .map_err(|_| KickboardError::InvalidEvent(s.to_string()))?;
        if name.is_empty() {
            return Err(KickboardError::InvalidEvent(s.to_string()));
        }
        Ok(Self::new(ComponentId(id), name))
    }
}

/// Raw data attached to an inbound event
#[derive(Clone, Debug, PartialEq, Default)]
pub enum EventPayload {
    /// MessagePack document produced by the client widget
    Packed(Vec<u8>),
    /// Named fields sent as-is (layout updates)
    Fields(Map<String, Value>),
    #[default]
    Empty,
}

impl EventPayload {
    /// Unpack into a JSON value
    pub fn unpack(self) -> std::result::Result<Value, rmp_serde::decode::Error> {
        match self {
            EventPayload::Packed(bytes) => rmp_serde::from_slice::<Value>(&bytes),
            EventPayload::Fields(fields) => Ok(Value::Object(fields)),
            EventPayload::Empty => Ok(Value::Null),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum FrameData {
    Packed(Vec<u8>),
    Fields(Map<String, Value>),
}

/// Inbound text frame: `{"event": "3#change", "data": [..msgpack bytes..]}`
#[derive(Clone, Debug, Deserialize)]
pub struct ClientFrame {
    pub event: String,
    #[serde(default)]
    data: Option<FrameData>,
}

impl ClientFrame {
    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Binary frame: MessagePack map `{"event": str, "data": bin}`
    pub fn parse_packed(bytes: &[u8]) -> Result<Self> {
        let frame: PackedFrame =
            rmp_serde::from_slice(bytes).map_err(|e| KickboardError::MalformedFrame(e.to_string()))?;
        Ok(Self {
            event: frame.event,
            data: frame.data.map(|bytes| FrameData::Packed(bytes.0)),
        })
    }

    pub fn is_initialize(&self) -> bool {
        self.event == INITIALIZE
    }

    pub fn payload(&self) -> EventPayload {
        match &self.data {
            Some(FrameData::Packed(bytes)) => EventPayload::Packed(bytes.clone()),
            Some(FrameData::Fields(fields)) => EventPayload::Fields(fields.clone()),
            None => EventPayload::Empty,
        }
    }
}

#[derive(Deserialize)]
struct PackedFrame {
    event: String,
    #[serde(default)]
    data: Option<RawBytes>,
}

/// MessagePack `bin` (or an array of bytes from older clients)
struct RawBytes(Vec<u8>);

impl<'de> Deserialize<'de> for RawBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RawBytesVisitor;

        impl<'de> Visitor<'de> for RawBytesVisitor {
            type Value = RawBytes;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a byte buffer")
            }

            fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<RawBytes, E> {
                Ok(RawBytes(v.to_vec()))
            }

            fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<RawBytes, E> {
                Ok(RawBytes(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<RawBytes, A::Error> {
                let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(b) = seq.next_element::<u8>()? {
                    bytes.push(b);
                }
                Ok(RawBytes(bytes))
            }
        }

        deserializer.deserialize_byte_buf(RawBytesVisitor)
    }
}

/// Outbound message pushed to every connected client
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServerMessage {
    /// `"{component}#{action}"`, e.g. `"4#all"`
    pub event: String,
    pub data: Value,
}

impl ServerMessage {
    pub fn new(component: ComponentId, action: &str, data: Value) -> Self {
        Self {
            event: format!("{}#{}", component, action),
            data,
        }
    }
}
