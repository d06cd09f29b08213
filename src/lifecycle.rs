//! Test lifecycle hooks and the bridge that drives snapshot state from them.
//!
//! A host runner exposes [`HookRegistry`]; the [`LifecycleBridge`] registers
//! itself there so every test start resets the ordinal space before the test
//! body runs. The bridge only observes: test bodies, their arguments, and
//! their outcomes pass through untouched.
use crate::error::{Result, SnapshotError};
use crate::state::SnapshotState;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

/// Snapshot state shared between the bridge and the code running comparisons.
pub type SharedState = Rc<RefCell<SnapshotState>>;

pub fn shared_state() -> SharedState {
    Rc::new(RefCell::new(SnapshotState::new()))
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum TestOutcome {
    Passed,
    Failed(String),
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }
}

/// Callbacks a host runner fires around each test.
pub trait TestHooks {
    /// Called synchronously before the test body with the full test name.
    fn before_test(&mut self, full_name: &str) -> Result<()>;

    fn after_test(&mut self, _full_name: &str, _outcome: &TestOutcome) -> Result<()> {
        Ok(())
    }
}

/// Registration point a host runner offers for [`TestHooks`].
pub trait HookRegistry {
    fn register_hooks(&mut self, hooks: Box<dyn TestHooks>);
}

/// Test hooks that reset the shared [`SnapshotState`] around every test.
pub struct LifecycleBridge {
    state: SharedState,
}

impl LifecycleBridge {
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    /// Register a bridge for `state` with `registry`.
    pub fn install<R>(registry: &mut R, state: SharedState)
    where
        R: HookRegistry + ?Sized,
    {
        registry.register_hooks(Box::new(Self::new(state)));
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut SnapshotState) -> Result<T>) -> Result<T> {
        let mut state = self.state.try_borrow_mut().map_err(|_| {
            SnapshotError::InvalidLifecycle(
                "snapshot state is borrowed while a lifecycle event fired".to_string(),
            )
        })?;
        f(&mut state)
    }
}

impl TestHooks for LifecycleBridge {
    fn before_test(&mut self, full_name: &str) -> Result<()> {
        self.with_state(|state| state.on_test_start(full_name))
    }

    fn after_test(&mut self, _full_name: &str, _outcome: &TestOutcome) -> Result<()> {
        self.with_state(|state| state.on_test_end())
    }
}

type TestBody = Box<dyn FnMut() -> anyhow::Result<()>>;

struct TestCase {
    full_name: String,
    body: TestBody,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub full_name: String,
    pub outcome: TestOutcome,
}

/// Minimal sequential host runner.
///
/// Tests run in registration order. Hooks fire before and after each body in
/// the order they were registered; a hook error aborts the run.
#[derive(Default)]
pub struct Suite {
    hooks: Vec<Box<dyn TestHooks>>,
    tests: Vec<TestCase>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_test<F>(&mut self, full_name: impl Into<String>, body: F)
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        self.tests.push(TestCase {
            full_name: full_name.into(),
            body: Box::new(body),
        });
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    pub fn run(&mut self) -> Result<Vec<TestReport>> {
        let mut reports = Vec::with_capacity(self.tests.len());
        for test in &mut self.tests {
            for hooks in &mut self.hooks {
                hooks.before_test(&test.full_name)?;
            }
            let outcome = match (test.body)() {
                Ok(()) => TestOutcome::Passed,
                Err(err) => TestOutcome::Failed(format!("{err:#}")),
            };
            for hooks in &mut self.hooks {
                hooks.after_test(&test.full_name, &outcome)?;
            }
            tracing::debug!(test = %test.full_name, passed = outcome.passed(), "test finished");
            reports.push(TestReport {
                full_name: test.full_name.clone(),
                outcome,
            });
        }
        Ok(reports)
    }
}

impl HookRegistry for Suite {
    fn register_hooks(&mut self, hooks: Box<dyn TestHooks>) {
        self.hooks.push(hooks);
    }
}
