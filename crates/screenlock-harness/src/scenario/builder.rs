//! Scenario builder API.
//!
//! Provides a declarative API for constructing scenario tests that enforce
//! the Oracle Pattern.

use screenlock_core::LockConfig;
use screenlock_proto::{ClientId, ObjectId, Request, SurfaceId, VisibilityMode};
use screenlock_server::{LockServer, ServerConfig};

use crate::{
    RecordingCompositor, RecordingSeat,
    scenario::{OracleFn, World},
};

type MakeRequest = Box<dyn FnOnce(ClientId) -> Request>;

enum Step {
    /// Request issued by a named client
    Client { actor: String, label: String, make: MakeRequest },
    /// Request with no acting client
    Host { label: String, request: Request },
}

/// Scenario builder.
///
/// Add clients and seats, then the requests in the order they happen. Must
/// call `.oracle()` to get a [`RunnableScenario`].
pub struct Scenario {
    name: String,
    config: LockConfig,
    clients: Vec<String>,
    seats: Vec<RecordingSeat>,
    steps: Vec<Step>,
}

impl Scenario {
    /// Create a new scenario with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: LockConfig::default(),
            clients: Vec::new(),
            seats: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Use custom capacity limits.
    pub fn config(mut self, config: LockConfig) -> Self {
        self.config = config;
        self
    }

    /// Add a named client.
    pub fn client(mut self, name: impl Into<String>) -> Self {
        self.clients.push(name.into());
        self
    }

    /// Add a seat. Without any, the scenario runs with one unfocused seat.
    pub fn seat(mut self, seat: RecordingSeat) -> Self {
        self.seats.push(seat);
        self
    }

    /// Issue an arbitrary request as `actor`.
    pub fn request(
        mut self,
        actor: impl Into<String>,
        label: impl Into<String>,
        make: impl FnOnce(ClientId) -> Request + 'static,
    ) -> Self {
        self.steps.push(Step::Client {
            actor: actor.into(),
            label: label.into(),
            make: Box::new(make),
        });
        self
    }

    /// Bind the control global as object `id`.
    pub fn bind(self, actor: &str, id: u32) -> Self {
        self.request(actor, format!("bind {id}"), move |client| Request::BindControl {
            client,
            id: ObjectId(id),
        })
    }

    /// Destroy control object `control`.
    pub fn unbind(self, actor: &str, control: u32) -> Self {
        self.request(actor, format!("unbind {control}"), move |client| Request::DestroyControl {
            client,
            control: ObjectId(control),
        })
    }

    /// Request a lock through `control`, creating lock object `lock`.
    pub fn lock(self, actor: &str, control: u32, lock: u32) -> Self {
        self.request(actor, format!("lock {control} {lock}"), move |client| {
            Request::RequestLock { client, control: ObjectId(control), id: ObjectId(lock) }
        })
    }

    /// Unlock through `lock`.
    pub fn unlock(self, actor: &str, lock: u32) -> Self {
        self.request(actor, format!("unlock {lock}"), move |client| Request::Unlock {
            client,
            lock: ObjectId(lock),
        })
    }

    /// Mark the session behind `lock` persistent.
    pub fn persist(self, actor: &str, lock: u32) -> Self {
        self.request(actor, format!("persist {lock}"), move |client| Request::SetPersistent {
            client,
            lock: ObjectId(lock),
        })
    }

    /// Mark the session behind `lock` temporary.
    pub fn temporary(self, actor: &str, lock: u32) -> Self {
        self.request(actor, format!("temporary {lock}"), move |client| Request::SetTemporary {
            client,
            lock: ObjectId(lock),
        })
    }

    /// Destroy lock object `lock`.
    pub fn destroy_lock(self, actor: &str, lock: u32) -> Self {
        self.request(actor, format!("destroy-lock {lock}"), move |client| Request::DestroyLock {
            client,
            lock: ObjectId(lock),
        })
    }

    /// Create a surface owned by `actor`.
    pub fn surface(self, actor: &str, surface: u64) -> Self {
        self.request(actor, format!("surface {surface}"), move |client| Request::SurfaceCreated {
            client,
            surface: SurfaceId(surface),
        })
    }

    /// Destroy a surface.
    pub fn destroy_surface(mut self, surface: u64) -> Self {
        self.steps.push(Step::Host {
            label: format!("surface-destroyed {surface}"),
            request: Request::SurfaceDestroyed { surface: SurfaceId(surface) },
        });
        self
    }

    /// Create visibility object `id` for `surface`.
    pub fn get_visibility(self, actor: &str, id: u32, surface: u64) -> Self {
        self.request(actor, format!("get-visibility {id} {surface}"), move |client| {
            Request::GetVisibility { client, id: ObjectId(id), surface: SurfaceId(surface) }
        })
    }

    /// Change the level of visibility object `visibility`.
    pub fn set_visibility(self, actor: &str, visibility: u32, mode: u32) -> Self {
        self.request(actor, format!("set-visibility {visibility} {mode}"), move |client| {
            Request::SetVisibility {
                client,
                visibility: ObjectId(visibility),
                mode: VisibilityMode(mode),
            }
        })
    }

    /// Destroy visibility object `visibility`.
    pub fn destroy_visibility(self, actor: &str, visibility: u32) -> Self {
        self.request(actor, format!("destroy-visibility {visibility}"), move |client| {
            Request::DestroyVisibility { client, visibility: ObjectId(visibility) }
        })
    }

    /// Drop `actor`'s connection.
    pub fn crash(self, actor: &str) -> Self {
        self.request(actor, "disconnect", |client| Request::Disconnect { client })
    }

    /// Set the oracle function and return a runnable scenario.
    ///
    /// The oracle is mandatory - you cannot run a scenario without
    /// verification.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle function that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Every step runs in order whether or not the server accepts it; the
    /// outcomes are kept in the [`World`] for the oracle.
    ///
    /// # Errors
    ///
    /// A step names an unknown client, or the oracle fails.
    pub fn run(self) -> Result<(), String> {
        let Scenario { name, config, clients, mut seats, steps } = self.scenario;

        if seats.is_empty() {
            seats.push(RecordingSeat::default());
        }
        let config = ServerConfig { lock: config, ..ServerConfig::default() };
        let server = LockServer::new(&config, RecordingCompositor::with_seats(seats));
        let mut world = World::new(server);

        for client in clients {
            world.add_client(client);
        }

        for step in steps {
            match step {
                Step::Client { actor, label, make } => {
                    let client = world
                        .client(&actor)
                        .ok_or_else(|| format!("Scenario '{name}': unknown client {actor}"))?;
                    let result = world.server_mut().dispatch(make(client));
                    world.record(format!("{actor}: {label}"), result);
                },
                Step::Host { label, request } => {
                    let result = world.server_mut().dispatch(request);
                    world.record(label, result);
                },
            }
        }

        (self.oracle)(&world).map_err(|err| format!("Scenario '{name}': {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::oracle;

    #[test]
    fn scenario_requires_oracle() {
        // This should compile - oracle provided
        let _scenario = Scenario::new("test").client("locker").oracle(oracle::check(|_world| Ok(())));

        // This should NOT compile - no oracle
        // let scenario = Scenario::new("test").client("locker");
        // scenario.run(); // ERROR: no method `run` on type `Scenario`
    }

    #[test]
    fn unknown_client_fails_run() {
        let result = Scenario::new("typo").client("locker").bind("lcoker", 1).oracle(oracle::check(
            |_world| Ok(()),
        ));

        let err = result.run().unwrap_err();
        assert!(err.contains("unknown client lcoker"), "{err}");
    }

    #[test]
    fn rejected_steps_are_recorded() {
        Scenario::new("double bind")
            .client("shell")
            .bind("shell", 1)
            .bind("shell", 1)
            .oracle(oracle::check(|world| {
                let rejected: Vec<_> = world.rejections().map(|o| o.step.as_str()).collect();
                if rejected != ["shell: bind 1"] {
                    return Err(format!("unexpected rejections {rejected:?}"));
                }
                Ok(())
            }))
            .run()
            .unwrap();
    }
}
