//! Phase-ordered chain execution state machine
//!
//! Interceptors are partitioned by phase and ordered by the phase
//! registry; within a phase, declared before/after constraints are
//! resolved by a stable topological sort at build time. Execution
//! tracks a cursor that never advances past an interceptor whose
//! `handle_message` failed; on abort the chain walks backwards over the
//! interceptors that ran, invoking `handle_fault` on each.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use phase::PhaseRegistry;
use tracing::{debug, warn};
use types::{Fault, Message};

use crate::error::ChainError;
use crate::{Flow, Interceptor};

/// Lifecycle of one chain instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Ready,
    Running,
    Paused,
    Suspended,
    Complete,
    Aborted,
}

impl std::fmt::Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ChainState::Ready => "ready",
            ChainState::Running => "running",
            ChainState::Paused => "paused",
            ChainState::Suspended => "suspended",
            ChainState::Complete => "complete",
            ChainState::Aborted => "aborted",
        };
        write!(f, "{name}")
    }
}

/// How one `execute`/`resume` call ended
#[derive(Debug)]
pub enum Outcome {
    /// Every interceptor ran; the chain is terminal until reset
    Completed,
    /// An interceptor asked to pause; continue with `resume()`
    Paused,
    /// An interceptor handed control back to the transport; a later
    /// `resume()`, possibly on another thread, continues the chain
    Suspended,
    /// An interceptor failed; the unwind already ran
    Aborted(Fault),
}

struct Node {
    interceptor: Arc<dyn Interceptor>,
    insertion: usize,
}

/// Ordered interceptor chain for one message
///
/// Built from a `PhaseRegistry` ladder; `add()` rejects unknown phases
/// and constraint cycles at assembly time so nothing fails during a
/// run for configuration reasons.
pub struct PhaseInterceptorChain {
    registry: PhaseRegistry,
    buckets: Vec<Vec<Node>>,
    order: Vec<Arc<dyn Interceptor>>,
    next_insertion: usize,
    cursor: usize,
    state: ChainState,
}

impl PhaseInterceptorChain {
    pub fn new(registry: PhaseRegistry) -> Self {
        let buckets = (0..registry.phases().len()).map(|_| Vec::new()).collect();
        Self {
            registry,
            buckets,
            order: Vec::new(),
            next_insertion: 0,
            cursor: 0,
            state: ChainState::Ready,
        }
    }

    /// Register an interceptor in its declared phase
    ///
    /// Fails fast on an unknown phase, a duplicate id within the phase,
    /// or a before/after constraint cycle. The chain is left unchanged
    /// on error.
    pub fn add(&mut self, interceptor: Arc<dyn Interceptor>) -> Result<(), ChainError> {
        if self.state != ChainState::Ready {
            return Err(ChainError::Sealed {
                state: self.state.to_string(),
            });
        }

        let phase_name = interceptor.phase().to_string();
        let bucket_index =
            self.registry
                .index_of(&phase_name)
                .ok_or_else(|| ChainError::UnknownPhase {
                    interceptor: interceptor.id().to_string(),
                    phase: phase_name.clone(),
                })?;

        let bucket = &self.buckets[bucket_index];
        if bucket.iter().any(|n| n.interceptor.id() == interceptor.id()) {
            return Err(ChainError::DuplicateInterceptor {
                id: interceptor.id().to_string(),
                phase: phase_name,
            });
        }

        let mut candidate: Vec<Node> = bucket
            .iter()
            .map(|n| Node {
                interceptor: n.interceptor.clone(),
                insertion: n.insertion,
            })
            .collect();
        candidate.push(Node {
            interceptor,
            insertion: self.next_insertion,
        });

        let sorted = sort_phase_bucket(&phase_name, candidate)?;
        self.buckets[bucket_index] = sorted;
        self.next_insertion += 1;
        self.rebuild_order();
        Ok(())
    }

    /// Register several interceptors, stopping at the first error
    pub fn add_all<I>(&mut self, interceptors: I) -> Result<(), ChainError>
    where
        I: IntoIterator<Item = Arc<dyn Interceptor>>,
    {
        for interceptor in interceptors {
            self.add(interceptor)?;
        }
        Ok(())
    }

    fn rebuild_order(&mut self) {
        self.order = self
            .buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|n| n.interceptor.clone()))
            .collect();
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Index of the next interceptor to run
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Interceptor ids in execution order, for diagnostics and tests
    pub fn ids(&self) -> Vec<String> {
        self.order.iter().map(|i| i.id().to_string()).collect()
    }

    /// Drive the chain forward from the cursor
    ///
    /// Returns the outcome of this drive; a fault is reported as
    /// `Outcome::Aborted`, never as `Err` — `Err` is reserved for
    /// driving the chain in an illegal state.
    pub fn execute(&mut self, message: &mut Message) -> Result<Outcome, ChainError> {
        match self.state {
            ChainState::Ready | ChainState::Paused | ChainState::Suspended => {
                Ok(self.run(message))
            }
            ChainState::Complete => Err(ChainError::AlreadyComplete),
            ChainState::Aborted => Err(ChainError::AlreadyAborted),
            ChainState::Running => unreachable!("chain is not reentrant"),
        }
    }

    /// Continue a parked chain from its recorded cursor
    ///
    /// The chain tolerates being resumed by a different thread than the
    /// one that suspended it; no interceptor runs twice.
    pub fn resume(&mut self, message: &mut Message) -> Result<Outcome, ChainError> {
        match self.state {
            ChainState::Paused | ChainState::Suspended => Ok(self.run(message)),
            state => Err(ChainError::NotSuspended {
                state: state.to_string(),
            }),
        }
    }

    /// Rewind the cursor so the chain can be driven again
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.state = ChainState::Ready;
    }

    fn run(&mut self, message: &mut Message) -> Outcome {
        self.state = ChainState::Running;

        while self.cursor < self.order.len() {
            let interceptor = self.order[self.cursor].clone();
            let call = catch_unwind(AssertUnwindSafe(|| interceptor.handle_message(message)));

            match call {
                Ok(Ok(Flow::Continue)) => {
                    self.cursor += 1;
                }
                Ok(Ok(Flow::Pause)) => {
                    self.cursor += 1;
                    self.state = ChainState::Paused;
                    debug!(
                        interceptor = interceptor.id(),
                        cursor = self.cursor,
                        "chain paused"
                    );
                    return Outcome::Paused;
                }
                Ok(Ok(Flow::Suspend)) => {
                    self.cursor += 1;
                    self.state = ChainState::Suspended;
                    debug!(
                        interceptor = interceptor.id(),
                        cursor = self.cursor,
                        "chain suspended"
                    );
                    return Outcome::Suspended;
                }
                Ok(Err(fault)) => {
                    return self.abort(message, interceptor.id(), fault);
                }
                Err(payload) => {
                    let fault = Fault::server(panic_text(payload));
                    return self.abort(message, interceptor.id(), fault);
                }
            }
        }

        self.state = ChainState::Complete;
        Outcome::Completed
    }

    /// Stop forward execution and unwind the interceptors that ran
    ///
    /// The cursor stays on the failing interceptor: it is excluded from
    /// the unwind, which covers indices `cursor-1 .. 0` in that order.
    /// Secondary failures are logged and never interrupt the walk.
    fn abort(&mut self, message: &mut Message, failed_id: &str, fault: Fault) -> Outcome {
        self.state = ChainState::Aborted;
        warn!(
            interceptor = failed_id,
            fault = %fault,
            "chain aborted, unwinding {} interceptor(s)",
            self.cursor
        );

        message.set_content::<Fault>(fault.clone());

        for index in (0..self.cursor).rev() {
            let interceptor = self.order[index].clone();
            let call = catch_unwind(AssertUnwindSafe(|| interceptor.handle_fault(message)));
            match call {
                Ok(Ok(())) => {}
                Ok(Err(secondary)) => {
                    warn!(
                        interceptor = interceptor.id(),
                        error = %secondary,
                        "handle_fault failed during unwind, continuing"
                    );
                }
                Err(payload) => {
                    warn!(
                        interceptor = interceptor.id(),
                        panic = %panic_text(payload),
                        "handle_fault panicked during unwind, continuing"
                    );
                }
            }
        }

        Outcome::Aborted(fault)
    }
}

impl std::fmt::Debug for PhaseInterceptorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseInterceptorChain")
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("interceptors", &self.ids())
            .finish()
    }
}

/// Stable topological sort of one phase bucket
///
/// Edges come from each interceptor's before/after declarations;
/// references to ids not present in the bucket are inert. Ties are
/// broken by insertion order, so unconstrained interceptors keep the
/// order they were registered in.
fn sort_phase_bucket(phase: &str, nodes: Vec<Node>) -> Result<Vec<Node>, ChainError> {
    let n = nodes.len();
    let index_of_id: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.interceptor.id().to_string(), i))
        .collect();

    // successors[a] holds b when a must run before b
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut indegree = vec![0usize; n];

    for (i, node) in nodes.iter().enumerate() {
        for peer in node.interceptor.before() {
            if let Some(&j) = index_of_id.get(&peer) {
                if j != i {
                    successors[i].push(j);
                    indegree[j] += 1;
                }
            }
        }
        for peer in node.interceptor.after() {
            if let Some(&j) = index_of_id.get(&peer) {
                if j != i {
                    successors[j].push(i);
                    indegree[i] += 1;
                }
            }
        }
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| indegree[i] == 0).collect();
    let mut emitted: Vec<usize> = Vec::with_capacity(n);

    while !ready.is_empty() {
        let pick = ready
            .iter()
            .enumerate()
            .min_by_key(|(_, &i)| nodes[i].insertion)
            .map(|(pos, _)| pos)
            .unwrap_or(0);
        let i = ready.swap_remove(pick);
        emitted.push(i);
        for &j in &successors[i] {
            indegree[j] -= 1;
            if indegree[j] == 0 {
                ready.push(j);
            }
        }
    }

    if emitted.len() != n {
        let mut ids: Vec<String> = (0..n)
            .filter(|i| !emitted.contains(i))
            .map(|i| nodes[i].interceptor.id().to_string())
            .collect();
        ids.sort();
        return Err(ChainError::ConstraintCycle {
            phase: phase.to_string(),
            ids,
        });
    }

    let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();
    Ok(emitted
        .into_iter()
        .map(|i| slots[i].take().expect("each index emitted once"))
        .collect())
}

fn panic_text(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "interceptor panicked".to_string()
    }
}
