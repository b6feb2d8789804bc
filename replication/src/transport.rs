//! Per-connection byte transport.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// An ordered message transport for one connection.
///
/// Sends are fire-and-forget; delivery is the transport's business.
pub trait Transport {
    /// Returns `false` while the transport cannot accept another message.
    fn is_ready(&self) -> bool;

    /// Sends one message.
    fn send(&mut self, bytes: &[u8], reliable: bool);

    /// Returns every message received since the last call, in order.
    fn receive(&mut self) -> Vec<Vec<u8>>;
}

#[derive(Debug, Default)]
struct Link {
    queue: VecDeque<Vec<u8>>,
    history: Vec<Vec<u8>>,
}

/// In-process transport connecting two endpoints.
///
/// Clones share the same endpoint, so a test can keep a handle after handing
/// the transport to a channel. A send budget simulates back-pressure.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    outgoing: Rc<RefCell<Link>>,
    incoming: Rc<RefCell<Link>>,
    budget: Rc<Cell<Option<usize>>>,
}

impl MemoryTransport {
    /// Creates two connected endpoints.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let a_to_b = Rc::new(RefCell::new(Link::default()));
        let b_to_a = Rc::new(RefCell::new(Link::default()));
        let a = Self {
            outgoing: Rc::clone(&a_to_b),
            incoming: Rc::clone(&b_to_a),
            budget: Rc::new(Cell::new(None)),
        };
        let b = Self {
            outgoing: b_to_a,
            incoming: a_to_b,
            budget: Rc::new(Cell::new(None)),
        };
        (a, b)
    }

    /// Limits how many more messages this endpoint accepts; `None` lifts it.
    pub fn set_send_budget(&self, budget: Option<usize>) {
        self.budget.set(budget);
    }

    /// Every message this endpoint has sent, in order.
    #[must_use]
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.outgoing.borrow().history.clone()
    }

    /// Messages sent but not yet received by the other endpoint.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.outgoing.borrow().queue.len()
    }
}

impl Transport for MemoryTransport {
    fn is_ready(&self) -> bool {
        self.budget.get() != Some(0)
    }

    fn send(&mut self, bytes: &[u8], _reliable: bool) {
        if let Some(budget) = self.budget.get() {
            self.budget.set(Some(budget.saturating_sub(1)));
        }
        let mut link = self.outgoing.borrow_mut();
        link.queue.push_back(bytes.to_vec());
        link.history.push(bytes.to_vec());
    }

    fn receive(&mut self) -> Vec<Vec<u8>> {
        self.incoming.borrow_mut().queue.drain(..).collect()
    }
}
