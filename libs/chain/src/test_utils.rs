//! Shared fakes for chain tests
//!
//! Used by this crate's unit tests and by downstream integration
//! tests, so they live in the library rather than under #[cfg(test)].

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use types::{Direction, Fault, Message};

use crate::binding::Binding;
use crate::{Flow, Interceptor};

/// Shared, ordered record of interceptor invocations
///
/// Entries are `"<id>:message"` / `"<id>:fault"` in call order.
#[derive(Clone, Default)]
pub struct ExecutionLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, id: &str, event: &str) {
        self.entries.lock().unwrap().push(format!("{id}:{event}"));
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

enum MessageBehavior {
    Continue,
    Pause,
    Suspend,
    Fail(Fault),
    Panic(String),
}

/// Scriptable interceptor recording every call into an `ExecutionLog`
pub struct TestInterceptor {
    id: String,
    phase: String,
    before: Vec<String>,
    after: Vec<String>,
    log: ExecutionLog,
    on_message: MessageBehavior,
    fail_on_fault: bool,
    panic_on_fault: bool,
}

impl TestInterceptor {
    pub fn new(id: impl Into<String>, phase: impl Into<String>, log: &ExecutionLog) -> Self {
        Self {
            id: id.into(),
            phase: phase.into(),
            before: Vec::new(),
            after: Vec::new(),
            log: log.clone(),
            on_message: MessageBehavior::Continue,
            fail_on_fault: false,
            panic_on_fault: false,
        }
    }

    pub fn before<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.before = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn after<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.after = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Fail `handle_message` with the given fault
    pub fn failing(mut self, fault: Fault) -> Self {
        self.on_message = MessageBehavior::Fail(fault);
        self
    }

    /// Panic inside `handle_message`
    pub fn panicking(mut self, text: impl Into<String>) -> Self {
        self.on_message = MessageBehavior::Panic(text.into());
        self
    }

    /// Return `Flow::Pause` from `handle_message`
    pub fn pausing(mut self) -> Self {
        self.on_message = MessageBehavior::Pause;
        self
    }

    /// Return `Flow::Suspend` from `handle_message`
    pub fn suspending(mut self) -> Self {
        self.on_message = MessageBehavior::Suspend;
        self
    }

    /// Fail `handle_fault` (secondary failure during unwind)
    pub fn failing_on_fault(mut self) -> Self {
        self.fail_on_fault = true;
        self
    }

    /// Panic inside `handle_fault`
    pub fn panicking_on_fault(mut self) -> Self {
        self.panic_on_fault = true;
        self
    }

    pub fn arc(self) -> Arc<dyn Interceptor> {
        Arc::new(self)
    }
}

impl Interceptor for TestInterceptor {
    fn id(&self) -> &str {
        &self.id
    }

    fn phase(&self) -> &str {
        &self.phase
    }

    fn before(&self) -> Vec<String> {
        self.before.clone()
    }

    fn after(&self) -> Vec<String> {
        self.after.clone()
    }

    fn handle_message(&self, _message: &mut Message) -> Result<Flow, Fault> {
        self.log.record(&self.id, "message");
        match &self.on_message {
            MessageBehavior::Continue => Ok(Flow::Continue),
            MessageBehavior::Pause => Ok(Flow::Pause),
            MessageBehavior::Suspend => Ok(Flow::Suspend),
            MessageBehavior::Fail(fault) => Err(fault.clone()),
            MessageBehavior::Panic(text) => panic!("{}", text),
        }
    }

    fn handle_fault(&self, _message: &mut Message) -> Result<(), Fault> {
        self.log.record(&self.id, "fault");
        if self.panic_on_fault {
            panic!("handle_fault panic in {}", self.id);
        }
        if self.fail_on_fault {
            return Err(Fault::server(format!("cleanup failed in {}", self.id)));
        }
        Ok(())
    }
}

/// Binding fake with fixed fault interceptor sets
pub struct StaticBinding {
    name: String,
    out_fault: Vec<Arc<dyn Interceptor>>,
    in_fault: Vec<Arc<dyn Interceptor>>,
    created: AtomicUsize,
}

impl StaticBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            out_fault: Vec::new(),
            in_fault: Vec::new(),
            created: AtomicUsize::new(0),
        }
    }

    pub fn with_out_fault_interceptors(mut self, interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        self.out_fault = interceptors;
        self
    }

    pub fn with_in_fault_interceptors(mut self, interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        self.in_fault = interceptors;
        self
    }

    /// How many fresh messages the initiator requested
    pub fn created_messages(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

impl Binding for StaticBinding {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_message(&self, direction: Direction) -> Message {
        self.created.fetch_add(1, Ordering::Relaxed);
        match direction {
            Direction::Inbound => Message::inbound(),
            Direction::Outbound => Message::outbound(),
        }
    }

    fn out_fault_interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        self.out_fault.clone()
    }

    fn in_fault_interceptors(&self) -> Vec<Arc<dyn Interceptor>> {
        self.in_fault.clone()
    }
}

/// Conduit fake collecting everything sent through it
#[derive(Default)]
pub struct CollectorConduit {
    sent: Arc<Mutex<Vec<String>>>,
}

impl CollectorConduit {
    pub fn new() -> Self {
        Self::default()
    }

    /// XML payloads observed on the wire, in send order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl crate::binding::Conduit for CollectorConduit {
    fn name(&self) -> &str {
        "collector-conduit"
    }

    fn send(&self, message: &mut Message) -> Result<(), Fault> {
        let payload = message
            .content::<String>()
            .cloned()
            .ok_or_else(|| Fault::server("no serialized content to send"))?;
        self.sent.lock().unwrap().push(payload);
        Ok(())
    }
}
