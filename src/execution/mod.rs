//! Agent coordination and plan execution
//!
//! The coordinator owns the fixed capability -> agent registry and runs a
//! plan as a dependency graph with a ready queue:
//! Pending -> Ready (all deps Done) -> Running -> Done | Failed
//!
//! Declaration order only decides dispatch order among ready steps, never
//! correctness. At most `max_workers` steps run at once and each agent runs
//! at most one step at a time.

use crate::automation::{StepExecutor, StepRequest};
use crate::Result;
use crate::models::{
    Agent, AgentStatus, Capability, ExecutionPlan, ExecutionResult, ExecutionStep, StepResult,
};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::{Id, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

pub const ERR_AGENT_NOT_FOUND: &str = "agent not found";
pub const ERR_CANCELLED: &str = "cancelled";
pub const ERR_DEPENDENCY_FAILED: &str = "dependency failed";
pub const ERR_TIMEOUT: &str = "timeout";
pub const ERR_STEP_ABORTED: &str = "step aborted";

/// Default step timeout
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(2);

/// Default bound on concurrently running steps
pub const DEFAULT_MAX_WORKERS: usize = 4;

type Registry = Arc<RwLock<HashMap<Capability, Agent>>>;

/// Executes plans against the capability agents
pub struct AgentCoordinator {
    agents: Registry,
    agent_locks: HashMap<Capability, Arc<Mutex<()>>>,
    executor: Arc<dyn StepExecutor>,
    step_timeout: Duration,
    max_workers: usize,
}

impl AgentCoordinator {
    /// Coordinator with the standard four agents
    pub fn new(executor: Arc<dyn StepExecutor>) -> Self {
        Self::with_agents(executor, default_agents())
    }

    /// Coordinator over an explicit agent set (one agent per capability; later entries win)
    pub fn with_agents(executor: Arc<dyn StepExecutor>, agents: Vec<Agent>) -> Self {
        let agent_locks = agents
            .iter()
            .map(|a| (a.capability, Arc::new(Mutex::new(()))))
            .collect();
        let registry = agents.into_iter().map(|a| (a.capability, a)).collect();

        Self {
            agents: Arc::new(RwLock::new(registry)),
            agent_locks,
            executor,
            step_timeout: DEFAULT_STEP_TIMEOUT,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Snapshot of every agent, sorted by id
    pub async fn agents(&self) -> Vec<Agent> {
        let registry = self.agents.read().await;
        let mut all: Vec<Agent> = registry.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub async fn agent_status(&self, agent_id: &str) -> Option<AgentStatus> {
        let registry = self.agents.read().await;
        registry.values().find(|a| a.id == agent_id).map(|a| a.status)
    }

    /// Execute a plan. The step graph is re-checked first, so a malformed
    /// plan fails with `InvalidPlan` before any step starts. Every step
    /// appears exactly once in the results, in declaration order.
    pub async fn execute(&self, plan: &ExecutionPlan, deadline: Option<Instant>) -> Result<ExecutionResult> {
        plan.validate()?;

        let mut schedule = Schedule::new(&plan.steps);
        let mut join_set: JoinSet<(usize, StepResult)> = JoinSet::new();
        let mut in_flight: HashMap<Id, usize> = HashMap::new();
        let mut busy: HashSet<Capability> = HashSet::new();
        let mut cancelled = false;

        info!(
            command_id = %plan.command_id,
            step_count = plan.steps.len(),
            "Starting plan execution"
        );

        loop {
            if !cancelled && deadline.is_some_and(|at| Instant::now() >= at) {
                cancelled = true;
            }
            if cancelled {
                schedule.cancel_unstarted();
            } else {
                self.dispatch(plan, &mut schedule, &mut join_set, &mut in_flight, &mut busy)
                    .await;
            }

            if join_set.is_empty() {
                break;
            }

            let joined = match deadline.filter(|_| !cancelled) {
                Some(at) => tokio::select! {
                    joined = join_set.join_next() => joined,
                    _ = tokio::time::sleep_until(at) => {
                        warn!(command_id = %plan.command_id, "Deadline reached - cancelling unstarted steps");
                        cancelled = true;
                        continue;
                    }
                },
                None => join_set.join_next().await,
            };

            match joined {
                Some(Ok((index, result))) => {
                    in_flight.retain(|_, i| *i != index);
                    busy.remove(&plan.steps[index].required_capability);
                    schedule.complete(index, result);
                }
                Some(Err(e)) => {
                    error!(command_id = %plan.command_id, error = %e, "Step task aborted");

                    if let Some(index) = in_flight.remove(&e.id()) {
                        let step = &plan.steps[index];
                        busy.remove(&step.required_capability);
                        set_status(&self.agents, step.required_capability, AgentStatus::Error).await;
                        schedule.complete(index, StepResult::failed(&step.id, None, ERR_STEP_ABORTED));
                    }
                }
                None => break,
            }
        }

        let results = schedule.into_results();
        let success = results.iter().all(|r| r.success);

        info!(
            command_id = %plan.command_id,
            success,
            failed = results.iter().filter(|r| !r.success).count(),
            "Plan execution completed"
        );

        Ok(ExecutionResult { success, results })
    }

    /// Start every ready step whose agent is free, up to the worker bound.
    async fn dispatch(
        &self,
        plan: &ExecutionPlan,
        schedule: &mut Schedule,
        join_set: &mut JoinSet<(usize, StepResult)>,
        in_flight: &mut HashMap<Id, usize>,
        busy: &mut HashSet<Capability>,
    ) {
        let mut deferred = VecDeque::new();

        while let Some(index) = schedule.ready.pop_front() {
            let step = &plan.steps[index];
            let capability = step.required_capability;

            let agent = {
                let registry = self.agents.read().await;
                registry.get(&capability).cloned()
            };

            let Some(agent) = agent else {
                warn!(step_id = %step.id, %capability, "No agent for capability");
                schedule.complete(index, StepResult::failed(&step.id, None, ERR_AGENT_NOT_FOUND));
                continue;
            };

            if busy.contains(&capability) || join_set.len() >= self.max_workers {
                deferred.push_back(index);
                continue;
            }

            busy.insert(capability);
            schedule.mark_running(index);

            debug!(step_id = %step.id, agent_id = %agent.id, "Dispatching step");

            let lock = self
                .agent_locks
                .get(&capability)
                .cloned()
                .unwrap_or_else(|| Arc::new(Mutex::new(())));

            let handle = join_set.spawn(run_step(
                index,
                step.clone(),
                agent.id,
                Arc::clone(&self.agents),
                lock,
                Arc::clone(&self.executor),
                self.step_timeout,
            ));
            in_flight.insert(handle.id(), index);
        }

        schedule.ready = deferred;
    }
}

/// Run one step on its agent: idle -> busy -> idle (error on executor failure)
async fn run_step(
    index: usize,
    step: ExecutionStep,
    agent_id: String,
    registry: Registry,
    lock: Arc<Mutex<()>>,
    executor: Arc<dyn StepExecutor>,
    timeout: Duration,
) -> (usize, StepResult) {
    // Serializes this agent across concurrently processed commands.
    let _guard = lock.lock().await;
    set_status(&registry, step.required_capability, AgentStatus::Busy).await;

    let start = std::time::Instant::now();
    let action = step
        .params
        .get("action")
        .and_then(|v| v.as_str())
        .unwrap_or(step.description.as_str())
        .to_string();
    let request = StepRequest {
        action,
        params: step.params.clone(),
    };

    let (result, status) = match tokio::time::timeout(timeout, executor.execute(&request)).await {
        Ok(Ok(outcome)) => {
            let error = if outcome.success {
                None
            } else {
                Some(outcome.message.clone().unwrap_or_else(|| "step failed".to_string()))
            };
            let output = outcome.data.or_else(|| outcome.message.map(serde_json::Value::String));

            (
                StepResult {
                    step_id: step.id.clone(),
                    agent_id: Some(agent_id.clone()),
                    success: error.is_none(),
                    output,
                    error,
                    duration_ms: 0,
                },
                AgentStatus::Idle,
            )
        }
        Ok(Err(e)) => {
            warn!(step_id = %step.id, error = %e, "Step executor failed");
            (
                StepResult::failed(&step.id, Some(agent_id.clone()), &e.to_string()),
                AgentStatus::Error,
            )
        }
        Err(_) => {
            warn!(step_id = %step.id, timeout_ms = timeout.as_millis() as u64, "Step timed out");
            (
                StepResult::failed(&step.id, Some(agent_id.clone()), ERR_TIMEOUT),
                AgentStatus::Error,
            )
        }
    };

    set_status(&registry, step.required_capability, status).await;

    let result = StepResult {
        duration_ms: start.elapsed().as_millis() as u64,
        ..result
    };

    debug!(step_id = %step.id, agent_id = %agent_id, success = result.success, "Step finished");

    (index, result)
}

async fn set_status(registry: &Registry, capability: Capability, status: AgentStatus) {
    let mut agents = registry.write().await;
    if let Some(agent) = agents.get_mut(&capability) {
        agent.status = status;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepState {
    Pending,
    Ready,
    Running,
    Done,
    Failed,
}

/// Ready-queue bookkeeping for one plan (Kahn's algorithm)
struct Schedule {
    states: Vec<StepState>,
    remaining_deps: Vec<usize>,
    dependents: Vec<Vec<usize>>,
    results: Vec<Option<StepResult>>,
    step_ids: Vec<String>,
    ready: VecDeque<usize>,
}

impl Schedule {
    fn new(steps: &[ExecutionStep]) -> Self {
        let index_of: HashMap<&str, usize> = steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();

        let mut dependents = vec![Vec::new(); steps.len()];
        let mut remaining_deps = vec![0; steps.len()];

        for (i, step) in steps.iter().enumerate() {
            for dep in &step.dependencies {
                if let Some(&d) = index_of.get(dep.as_str()) {
                    dependents[d].push(i);
                    remaining_deps[i] += 1;
                }
            }
        }

        let mut states = vec![StepState::Pending; steps.len()];
        let mut ready = VecDeque::new();
        for (i, deps) in remaining_deps.iter().enumerate() {
            if *deps == 0 {
                states[i] = StepState::Ready;
                ready.push_back(i);
            }
        }

        Self {
            states,
            remaining_deps,
            dependents,
            results: vec![None; steps.len()],
            step_ids: steps.iter().map(|s| s.id.clone()).collect(),
            ready,
        }
    }

    fn mark_running(&mut self, index: usize) {
        self.states[index] = StepState::Running;
    }

    fn complete(&mut self, index: usize, result: StepResult) {
        let success = result.success;
        self.results[index] = Some(result);

        if !success {
            self.states[index] = StepState::Failed;
            self.fail_dependents(index);
            return;
        }

        self.states[index] = StepState::Done;

        let mut newly_ready = Vec::new();
        for &dependent in &self.dependents[index] {
            self.remaining_deps[dependent] -= 1;
            if self.remaining_deps[dependent] == 0 && self.states[dependent] == StepState::Pending {
                self.states[dependent] = StepState::Ready;
                newly_ready.push(dependent);
            }
        }

        // Keep the ready queue in declaration order.
        self.ready.extend(newly_ready);
        self.ready.make_contiguous().sort_unstable();
    }

    /// Transitively mark dependents of a failed step; none of them can have started.
    fn fail_dependents(&mut self, index: usize) {
        let mut stack = self.dependents[index].clone();

        while let Some(i) = stack.pop() {
            if self.states[i] != StepState::Pending {
                continue;
            }
            self.states[i] = StepState::Failed;
            self.results[i] = Some(StepResult::failed(&self.step_ids[i], None, ERR_DEPENDENCY_FAILED));
            stack.extend(self.dependents[i].iter().copied());
        }
    }

    /// Abandon every step that has not started; running steps finish normally.
    fn cancel_unstarted(&mut self) {
        self.ready.clear();

        for i in 0..self.states.len() {
            if matches!(self.states[i], StepState::Pending | StepState::Ready) {
                self.states[i] = StepState::Failed;
                self.results[i] = Some(StepResult::failed(&self.step_ids[i], None, ERR_CANCELLED));
            }
        }
    }

    fn into_results(self) -> Vec<StepResult> {
        self.results
            .into_iter()
            .zip(self.step_ids)
            .map(|(result, id)| {
                result.unwrap_or_else(|| StepResult::failed(&id, None, "step did not complete"))
            })
            .collect()
    }
}

fn agent(id: &str, name: &str, capability: Capability, priority: u8) -> Agent {
    Agent {
        id: id.to_string(),
        name: name.to_string(),
        capability,
        status: AgentStatus::Idle,
        priority,
    }
}

/// The fixed agent pool
pub fn default_agents() -> Vec<Agent> {
    vec![
        agent("file-agent", "File Operations Agent", Capability::FileOperations, 1),
        agent("app-agent", "Application Control Agent", Capability::AppControl, 1),
        agent("system-agent", "System Queries Agent", Capability::SystemQueries, 2),
        agent("voice-agent", "Voice System Agent", Capability::VoiceIo, 1),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automation::{SimulatedExecutor, StepOutcome};
    use crate::error::AssistantError;
    use crate::models::{Priority, RiskLevel};
    use std::collections::BTreeSet;

    /// Records start/finish events and fails or stalls selected actions
    struct RecordingExecutor {
        events: std::sync::Mutex<Vec<String>>,
        fail: Vec<&'static str>,
        stall: Vec<&'static str>,
        panic: Vec<&'static str>,
        delay: Duration,
    }

    impl RecordingExecutor {
        fn new() -> Self {
            Self {
                events: std::sync::Mutex::new(Vec::new()),
                fail: vec![],
                stall: vec![],
                panic: vec![],
                delay: Duration::from_millis(5),
            }
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl StepExecutor for RecordingExecutor {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn execute(&self, request: &StepRequest) -> crate::Result<StepOutcome> {
            self.events.lock().unwrap().push(format!("start:{}", request.action));

            if self.panic.contains(&request.action.as_str()) {
                panic!("executor crashed on {}", request.action);
            }
            if self.stall.contains(&request.action.as_str()) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            tokio::time::sleep(self.delay).await;

            self.events.lock().unwrap().push(format!("end:{}", request.action));

            if self.fail.contains(&request.action.as_str()) {
                return Err(AssistantError::StepFailed(request.action.clone()));
            }

            Ok(StepOutcome {
                success: true,
                message: Some(format!("Executed: {}", request.action)),
                data: None,
            })
        }
    }

    fn step(id: &str, capability: Capability, deps: &[&str]) -> ExecutionStep {
        ExecutionStep {
            id: id.to_string(),
            description: format!("Run {}", id),
            required_capability: capability,
            dependencies: deps.iter().map(|d| d.to_string()).collect::<BTreeSet<_>>(),
            risk_level: RiskLevel::Low,
            params: serde_json::json!({ "action": id }),
        }
    }

    fn plan(steps: Vec<ExecutionStep>) -> ExecutionPlan {
        ExecutionPlan::new("cmd_test", steps, Priority::Low).unwrap()
    }

    #[tokio::test]
    async fn test_dependent_chain_runs_in_order() {
        let executor = Arc::new(RecordingExecutor::new());
        let coordinator = AgentCoordinator::new(executor.clone());

        let plan = plan(vec![
            step("locate", Capability::AppControl, &[]),
            step("control", Capability::AppControl, &["locate"]),
        ]);

        let result = coordinator.execute(&plan, None).await.unwrap();

        assert!(result.success);
        assert_eq!(result.results.len(), 2);
        assert_eq!(
            executor.events(),
            vec!["start:locate", "end:locate", "start:control", "end:control"]
        );
        assert_eq!(result.results[0].agent_id.as_deref(), Some("app-agent"));
        assert_eq!(coordinator.agent_status("app-agent").await, Some(AgentStatus::Idle));
    }

    #[tokio::test]
    async fn test_missing_agent_does_not_halt_plan() {
        let agents: Vec<Agent> = default_agents()
            .into_iter()
            .filter(|a| a.capability != Capability::VoiceIo)
            .collect();
        let coordinator = AgentCoordinator::with_agents(Arc::new(SimulatedExecutor::default()), agents);

        let plan = plan(vec![
            step("speak", Capability::VoiceIo, &[]),
            step("query", Capability::SystemQueries, &[]),
            step("after_speak", Capability::SystemQueries, &["speak"]),
        ]);

        let result = coordinator.execute(&plan, None).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.results[0].error.as_deref(), Some(ERR_AGENT_NOT_FOUND));
        assert!(result.results[1].success);
        assert_eq!(result.results[2].error.as_deref(), Some(ERR_DEPENDENCY_FAILED));
    }

    #[tokio::test]
    async fn test_dependency_never_starts_before_completion() {
        let executor = Arc::new(RecordingExecutor::new());
        let coordinator = AgentCoordinator::new(executor.clone());

        // Diamond: a -> (b, c) -> d, spread over different agents.
        let plan = plan(vec![
            step("a", Capability::FileOperations, &[]),
            step("b", Capability::AppControl, &["a"]),
            step("c", Capability::SystemQueries, &["a"]),
            step("d", Capability::VoiceIo, &["b", "c"]),
        ]);

        let result = coordinator.execute(&plan, None).await.unwrap();
        assert!(result.success);

        let events = executor.events();
        let pos = |e: &str| events.iter().position(|x| x == e).unwrap();
        assert!(pos("end:a") < pos("start:b"));
        assert!(pos("end:a") < pos("start:c"));
        assert!(pos("end:b") < pos("start:d"));
        assert!(pos("end:c") < pos("start:d"));
        assert_eq!(events.len(), 8);
    }

    #[tokio::test]
    async fn test_independent_steps_on_distinct_agents_overlap() {
        let executor = Arc::new(RecordingExecutor::new());
        let coordinator = AgentCoordinator::new(executor.clone());

        let plan = plan(vec![
            step("x", Capability::FileOperations, &[]),
            step("y", Capability::AppControl, &[]),
        ]);

        coordinator.execute(&plan, None).await.unwrap();

        let events = executor.events();
        // Both start before either finishes.
        assert!(events[0].starts_with("start:"));
        assert!(events[1].starts_with("start:"));
    }

    #[tokio::test]
    async fn test_one_step_per_agent_at_a_time() {
        let executor = Arc::new(RecordingExecutor::new());
        let coordinator = AgentCoordinator::new(executor.clone());

        let plan = plan(vec![
            step("first", Capability::FileOperations, &[]),
            step("second", Capability::FileOperations, &[]),
        ]);

        let result = coordinator.execute(&plan, None).await.unwrap();
        assert!(result.success);
        assert_eq!(
            executor.events(),
            vec!["start:first", "end:first", "start:second", "end:second"]
        );
    }

    #[tokio::test]
    async fn test_executor_error_marks_agent_and_skips_dependents() {
        let mut executor = RecordingExecutor::new();
        executor.fail = vec!["a"];
        let coordinator = AgentCoordinator::new(Arc::new(executor));

        let plan = plan(vec![
            step("a", Capability::FileOperations, &[]),
            step("b", Capability::FileOperations, &["a"]),
        ]);

        let result = coordinator.execute(&plan, None).await.unwrap();

        assert!(!result.success);
        assert!(!result.results[0].success);
        assert_eq!(result.results[1].error.as_deref(), Some(ERR_DEPENDENCY_FAILED));
        assert_eq!(coordinator.agent_status("file-agent").await, Some(AgentStatus::Error));
    }

    #[tokio::test]
    async fn test_step_timeout() {
        let mut executor = RecordingExecutor::new();
        executor.stall = vec!["slow"];
        let coordinator =
            AgentCoordinator::new(Arc::new(executor)).with_step_timeout(Duration::from_millis(20));

        let plan = plan(vec![step("slow", Capability::SystemQueries, &[])]);
        let result = coordinator.execute(&plan, None).await.unwrap();

        assert_eq!(result.results[0].error.as_deref(), Some(ERR_TIMEOUT));
    }

    #[tokio::test]
    async fn test_deadline_cancels_unstarted_steps() {
        let mut executor = RecordingExecutor::new();
        executor.delay = Duration::from_millis(100);
        let executor = Arc::new(executor);
        let coordinator = AgentCoordinator::new(executor.clone());

        let plan = plan(vec![
            step("running", Capability::FileOperations, &[]),
            step("waiting", Capability::FileOperations, &["running"]),
        ]);

        let deadline = Instant::now() + Duration::from_millis(20);
        let result = coordinator.execute(&plan, Some(deadline)).await.unwrap();

        // The running step is allowed to finish.
        assert!(result.results[0].success);
        assert_eq!(result.results[1].error.as_deref(), Some(ERR_CANCELLED));
        assert!(!result.success);
        assert!(!executor.events().contains(&"start:waiting".to_string()));
    }

    #[tokio::test]
    async fn test_empty_plan_succeeds() {
        let coordinator = AgentCoordinator::new(Arc::new(SimulatedExecutor::default()));
        let result = coordinator.execute(&plan(vec![]), None).await.unwrap();

        assert!(result.success);
        assert!(result.results.is_empty());
    }

    #[tokio::test]
    async fn test_unvalidated_plans_rejected_before_execution() {
        let executor = Arc::new(RecordingExecutor::new());
        let coordinator = AgentCoordinator::new(executor.clone());

        let ghost: ExecutionPlan = serde_json::from_value(serde_json::json!({
            "command_id": "cmd_ghost",
            "steps": [{
                "id": "a",
                "description": "Run a",
                "required_capability": "system_queries",
                "dependencies": ["ghost"],
                "risk_level": "low"
            }],
            "estimated_duration_ms": 500,
            "required_approvals": [],
            "parallelizable": false,
            "priority": "low"
        }))
        .unwrap();
        let result = coordinator.execute(&ghost, None).await;
        assert!(matches!(result, Err(AssistantError::InvalidPlan(_))));

        let cyclic = ExecutionPlan {
            command_id: "cmd_cycle".to_string(),
            steps: vec![
                step("a", Capability::FileOperations, &["b"]),
                step("b", Capability::AppControl, &["a"]),
            ],
            estimated_duration_ms: 1000,
            required_approvals: vec![],
            parallelizable: false,
            priority: Priority::Low,
        };
        let result = coordinator.execute(&cyclic, None).await;
        assert!(matches!(result, Err(AssistantError::InvalidPlan(_))));

        assert!(executor.events().is_empty());
    }

    #[tokio::test]
    async fn test_panicking_step_fails_and_skips_dependents() {
        let mut executor = RecordingExecutor::new();
        executor.panic = vec!["boom"];
        let coordinator = AgentCoordinator::new(Arc::new(executor));

        let crashing = plan(vec![
            step("boom", Capability::FileOperations, &[]),
            step("after", Capability::AppControl, &["boom"]),
            step("other", Capability::SystemQueries, &[]),
        ]);

        let result = coordinator.execute(&crashing, None).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.results[0].error.as_deref(), Some(ERR_STEP_ABORTED));
        assert_eq!(result.results[1].error.as_deref(), Some(ERR_DEPENDENCY_FAILED));
        assert!(result.results[2].success);
        assert_eq!(coordinator.agent_status("file-agent").await, Some(AgentStatus::Error));

        // The file agent is free again for the next plan.
        let next = coordinator
            .execute(&plan(vec![step("again", Capability::FileOperations, &[])]), None)
            .await
            .unwrap();
        assert!(next.success);
    }

    #[tokio::test]
    async fn test_default_registry() {
        let coordinator = AgentCoordinator::new(Arc::new(SimulatedExecutor::default()));
        let agents = coordinator.agents().await;

        assert_eq!(agents.len(), 4);
        assert!(agents.iter().all(|a| a.status == AgentStatus::Idle));
        assert_eq!(coordinator.agent_status("nobody").await, None);
    }
}
