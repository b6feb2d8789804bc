#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use codec::LocalGuidTable;
use replication::{
    CallArgs, Invocable, LocalCall, MemoryTransport, NetMode, ObjectModel, PeerId,
    ReplicationConfig, Replicator,
};
use schema::{ObjectRef, PropertySet, TypedValue};

pub type SharedGuids = Rc<RefCell<LocalGuidTable>>;

#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub name: String,
    pub raw: Vec<u8>,
    pub typed: Option<Vec<TypedValue>>,
    pub origin: Option<PeerId>,
}

#[derive(Debug, Default)]
pub struct TestActor {
    pub replicated: bool,
    pub owner: Option<PeerId>,
    pub calls: Vec<Received>,
    pub replicated_count: usize,
    pub changed: Vec<Vec<String>>,
}

impl Invocable for TestActor {
    fn invoke(&mut self, call: &LocalCall<'_>) {
        let (raw, typed) = match &call.args {
            CallArgs::Raw(bytes) => (bytes.to_vec(), None),
            CallArgs::Typed(args) => (Vec::new(), Some(args.clone())),
        };
        self.calls.push(Received {
            name: call.name.to_owned(),
            raw,
            typed,
            origin: call.origin,
        });
    }

    fn on_replicated(&mut self) {
        self.replicated_count += 1;
    }

    fn on_properties_changed(&mut self, names: &[String]) {
        self.changed.push(names.to_vec());
    }
}

#[derive(Debug, Default)]
pub struct TestWorld {
    pub actors: HashMap<ObjectRef, TestActor>,
    pub opened: Vec<PeerId>,
    pub closed: Vec<PeerId>,
}

impl TestWorld {
    pub fn spawn(&mut self, object: ObjectRef, replicated: bool, owner: Option<PeerId>) {
        self.actors.insert(
            object,
            TestActor {
                replicated,
                owner,
                ..TestActor::default()
            },
        );
    }

    pub fn actor(&self, object: ObjectRef) -> &TestActor {
        &self.actors[&object]
    }

    pub fn call_names(&self, object: ObjectRef) -> Vec<&str> {
        self.actor(object)
            .calls
            .iter()
            .map(|call| call.name.as_str())
            .collect()
    }
}

impl ObjectModel for TestWorld {
    fn is_valid(&self, object: ObjectRef) -> bool {
        self.actors.contains_key(&object)
    }

    fn is_replicated(&self, object: ObjectRef) -> bool {
        self.actors.get(&object).is_some_and(|actor| actor.replicated)
    }

    fn owner_of(&self, object: ObjectRef) -> Option<PeerId> {
        self.actors.get(&object).and_then(|actor| actor.owner)
    }

    fn invocable(&mut self, object: ObjectRef) -> Option<&mut dyn Invocable> {
        self.actors
            .get_mut(&object)
            .map(|actor| actor as &mut dyn Invocable)
    }

    fn on_channel_open(&mut self, peer: PeerId) {
        self.opened.push(peer);
    }

    fn on_channel_close(&mut self, peer: PeerId) {
        self.closed.push(peer);
    }
}

/// One machine of an in-process session.
pub struct Machine {
    pub replicator: Replicator,
    pub world: TestWorld,
    /// This machine's end of each channel, keyed by peer.
    pub links: HashMap<PeerId, MemoryTransport>,
}

impl Machine {
    pub fn new(mode: NetMode, guids: &SharedGuids) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            replicator: Replicator::new(mode, ReplicationConfig::for_testing())
                .with_guid_cache(Rc::clone(guids)),
            world: TestWorld::default(),
            links: HashMap::new(),
        }
    }

    pub fn tick(&mut self, now: Duration) {
        self.replicator.tick(&mut self.world, now);
    }

    pub fn register(&mut self, object: ObjectRef, properties: PropertySet) {
        self.replicator
            .register_properties(&mut self.world, object, properties)
            .unwrap();
    }

    pub fn begin_play(&mut self, object: ObjectRef) {
        self.replicator
            .note_begin_play(&mut self.world, object)
            .unwrap();
    }

    pub fn sent_to(&self, peer: PeerId) -> Vec<Vec<u8>> {
        self.links[&peer].sent()
    }
}

/// A host and clients sharing one guid cache.
pub struct Session {
    pub guids: SharedGuids,
    pub host: Machine,
    pub clients: Vec<Machine>,
}

impl Session {
    pub fn new() -> Self {
        let guids = SharedGuids::default();
        let host = Machine::new(NetMode::Host, &guids);
        Self {
            guids,
            host,
            clients: Vec::new(),
        }
    }

    /// Connects a new client and returns its index in `clients`.
    pub fn connect(&mut self) -> usize {
        let (host_end, client_end) = MemoryTransport::pair();
        let peer = self
            .host
            .replicator
            .open_client_channel(&mut self.host.world, host_end.clone())
            .unwrap();
        self.host.links.insert(peer, host_end);

        let mut client = Machine::new(NetMode::Client, &self.guids);
        client
            .replicator
            .open_host_channel(&mut client.world, client_end.clone())
            .unwrap();
        client.links.insert(PeerId::HOST, client_end);
        self.clients.push(client);
        self.clients.len() - 1
    }

    /// Spawns the same actor on every machine.
    pub fn spawn(&mut self, object: ObjectRef, replicated: bool, owner: Option<PeerId>) {
        self.host.world.spawn(object, replicated, owner);
        for client in &mut self.clients {
            client.world.spawn(object, replicated, owner);
        }
    }

    /// Host first, then clients in order.
    pub fn tick(&mut self, now: Duration) {
        self.host.tick(now);
        for client in &mut self.clients {
            client.tick(now);
        }
    }

    /// Clients first, so their sends reach the host in the same round.
    pub fn tick_upstream(&mut self, now: Duration) {
        for client in &mut self.clients {
            client.tick(now);
        }
        self.host.tick(now);
        for client in &mut self.clients {
            client.tick(now);
        }
    }
}

pub fn layout() -> PropertySet {
    let mut set = PropertySet::new();
    set.add_property("hp", TypedValue::Int(100)).unwrap();
    set.add_property("name", TypedValue::from("bob")).unwrap();
    set
}
