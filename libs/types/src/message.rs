//! Per-direction message property bag
//!
//! One `Message` represents a single request or response travelling
//! through the pipeline. Interceptors communicate exclusively through
//! its shared state: string-keyed properties, typed content slots, and
//! protocol headers. Nothing is passed between interceptors by return
//! value.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::exchange::Exchange;

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Which way the message is travelling relative to this endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Inbound,
    Outbound,
}

/// A protocol header carried alongside the message body
///
/// Headers keep insertion order; duplicate names are allowed, matching
/// wire protocols that permit repeated headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Mutable state for one request or response
///
/// Owned by exactly one in-flight invocation at a time. Contents are
/// typed slots keyed by `TypeId` (e.g. the raw XML string, a parsed
/// fault); properties are string-keyed values for loosely-coupled
/// interceptor coordination.
pub struct Message {
    id: u64,
    direction: Direction,
    properties: HashMap<String, Box<dyn Any + Send>>,
    contents: HashMap<TypeId, Box<dyn Any + Send>>,
    headers: Vec<Header>,
    encoding: Option<String>,
    exchange: Option<Exchange>,
}

impl Message {
    fn new(direction: Direction) -> Self {
        Self {
            id: NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed),
            direction,
            properties: HashMap::new(),
            contents: HashMap::new(),
            headers: Vec::new(),
            encoding: None,
            exchange: None,
        }
    }

    /// Create a message for the receive side of the pipeline
    pub fn inbound() -> Self {
        Self::new(Direction::Inbound)
    }

    /// Create a message for the send side of the pipeline
    pub fn outbound() -> Self {
        Self::new(Direction::Outbound)
    }

    /// Process-unique message id, for correlation in logs
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_outbound(&self) -> bool {
        self.direction == Direction::Outbound
    }

    // --- properties ---

    /// Store a property, replacing any previous value under the key
    pub fn set_property<T: Any + Send>(&mut self, key: impl Into<String>, value: T) {
        self.properties.insert(key.into(), Box::new(value));
    }

    /// Read a property, `None` if absent or of a different type
    pub fn property<T: Any>(&self, key: &str) -> Option<&T> {
        self.properties.get(key)?.downcast_ref::<T>()
    }

    pub fn property_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.properties.get_mut(key)?.downcast_mut::<T>()
    }

    /// Remove and return a property if it has the requested type
    pub fn take_property<T: Any>(&mut self, key: &str) -> Option<T> {
        if self.properties.get(key)?.downcast_ref::<T>().is_none() {
            return None;
        }
        let boxed = self.properties.remove(key)?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    // --- typed content slots ---

    /// Store content in the slot for its type, replacing prior content
    pub fn set_content<T: Any + Send>(&mut self, value: T) {
        self.contents.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn content<T: Any>(&self) -> Option<&T> {
        self.contents.get(&TypeId::of::<T>())?.downcast_ref::<T>()
    }

    pub fn content_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.contents
            .get_mut(&TypeId::of::<T>())?
            .downcast_mut::<T>()
    }

    /// Remove and return the content slot for `T`
    pub fn take_content<T: Any>(&mut self) -> Option<T> {
        let boxed = self.contents.remove(&TypeId::of::<T>())?;
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    pub fn has_content<T: Any>(&self) -> bool {
        self.contents.contains_key(&TypeId::of::<T>())
    }

    // --- headers & encoding ---

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push(Header::new(name, value));
    }

    /// First header value with the given name (case-sensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name == name)
            .map(|h| h.value.as_str())
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn set_headers(&mut self, headers: Vec<Header>) {
        self.headers = headers;
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.encoding = Some(encoding.into());
    }

    // --- exchange attachment ---

    /// The exchange this message belongs to, if attached
    pub fn exchange(&self) -> Option<&Exchange> {
        self.exchange.as_ref()
    }

    pub fn set_exchange(&mut self, exchange: Exchange) {
        self.exchange = Some(exchange);
    }

    /// Detach and return the exchange handle
    ///
    /// Used when parking a message in an exchange slot: a parked message
    /// never holds a handle back to the exchange that stores it.
    pub fn detach_exchange(&mut self) -> Option<Exchange> {
        self.exchange.take()
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("id", &self.id)
            .field("direction", &self.direction)
            .field("properties", &self.properties.len())
            .field("contents", &self.contents.len())
            .field("headers", &self.headers.len())
            .field("encoding", &self.encoding)
            .field("attached", &self.exchange.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_properties_are_typed() {
        let mut msg = Message::inbound();
        msg.set_property("count", 3usize);

        assert_eq!(msg.property::<usize>("count"), Some(&3));
        // Wrong type reads as absent, never panics
        assert_eq!(msg.property::<String>("count"), None);

        *msg.property_mut::<usize>("count").unwrap() = 5;
        assert_eq!(msg.take_property::<usize>("count"), Some(5));
        assert!(!msg.has_property("count"));
    }

    #[test]
    fn test_take_property_wrong_type_leaves_value() {
        let mut msg = Message::inbound();
        msg.set_property("k", "v".to_string());
        assert_eq!(msg.take_property::<usize>("k"), None);
        assert_eq!(msg.property::<String>("k"), Some(&"v".to_string()));
    }

    #[test]
    fn test_content_slots_keyed_by_type() {
        let mut msg = Message::outbound();
        msg.set_content::<String>("<xml/>".into());
        msg.set_content::<Vec<u8>>(vec![1, 2, 3]);

        assert_eq!(msg.content::<String>().unwrap(), "<xml/>");
        assert_eq!(msg.content::<Vec<u8>>().unwrap(), &[1, 2, 3]);

        msg.set_content::<String>("<replaced/>".into());
        assert_eq!(msg.content::<String>().unwrap(), "<replaced/>");

        assert_eq!(msg.take_content::<Vec<u8>>(), Some(vec![1, 2, 3]));
        assert!(!msg.has_content::<Vec<u8>>());
    }

    #[test]
    fn test_headers_keep_order_and_duplicates() {
        let mut msg = Message::inbound();
        msg.add_header("Via", "a");
        msg.add_header("Content-Type", "text/xml");
        msg.add_header("Via", "b");

        assert_eq!(msg.header("Via"), Some("a"));
        assert_eq!(msg.headers().len(), 3);
        assert_eq!(msg.headers()[2].value, "b");
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = Message::inbound();
        let b = Message::inbound();
        assert_ne!(a.id(), b.id());
    }
}
