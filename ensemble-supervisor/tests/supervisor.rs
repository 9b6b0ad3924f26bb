use async_trait::async_trait;
use ensemble_core::test_utils::{FnAgent, ScriptedAgent};
use ensemble_core::{
    Agent, AgentExecutor, AgentSpec, Blackboard, BoxError, ChatMemory, ChatMessage, ParamSpec,
    REQUEST_KEY,
};
use ensemble_memory::SessionMemory;
use ensemble_supervisor::{
    CompletionError, PlanDecision, Planner, ResponseScores, Scorer, Supervisor, SupervisorError,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// --- Scripted seams ---

type Histories = Arc<Mutex<Vec<Vec<ChatMessage>>>>;

/// Replays queued decisions and records every history it was shown.
struct ScriptedPlanner {
    decisions: Mutex<VecDeque<PlanDecision>>,
    histories: Histories,
}

impl ScriptedPlanner {
    fn replying(decisions: impl IntoIterator<Item = PlanDecision>) -> Self {
        Self {
            decisions: Mutex::new(decisions.into_iter().collect()),
            histories: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn histories(&self) -> Histories {
        Arc::clone(&self.histories)
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    async fn plan(&self, history: &[ChatMessage]) -> Result<PlanDecision, CompletionError> {
        self.histories.lock().unwrap().push(history.to_vec());
        self.decisions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CompletionError::RequestFailed("no scripted decision left".into()))
    }
}

type Comparisons = Arc<Mutex<Vec<(String, String, String)>>>;

/// Returns fixed grades and records every comparison it was asked for.
struct ScriptedScorer {
    scores: ResponseScores,
    comparisons: Comparisons,
}

impl ScriptedScorer {
    fn grading(incumbent: f64, candidate: f64) -> Self {
        Self {
            scores: ResponseScores {
                incumbent,
                candidate,
            },
            comparisons: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn comparisons(&self) -> Comparisons {
        Arc::clone(&self.comparisons)
    }
}

#[async_trait]
impl Scorer for ScriptedScorer {
    async fn score(
        &self,
        request: &str,
        incumbent: &str,
        candidate: &str,
    ) -> Result<ResponseScores, CompletionError> {
        self.comparisons
            .lock()
            .unwrap()
            .push((request.into(), incumbent.into(), candidate.into()));
        Ok(self.scores)
    }
}

fn score_style_executor() -> AgentExecutor {
    let spec = AgentSpec::simple("scoreStyle", "grades the style of a story")
        .with_param(ParamSpec::text("story"))
        .with_output("styleScore");
    AgentExecutor::new(spec, ScriptedAgent::replying([json!(4), json!(9)]))
}

fn edit_story_executor(revision: &str) -> AgentExecutor {
    let spec = AgentSpec::simple("editStory", "rewrites a story for style")
        .with_param(ParamSpec::text("story"))
        .with_output("story");
    AgentExecutor::new(spec, ScriptedAgent::replying([json!(revision)]))
}

// --- The plan/invoke cycle ---

#[tokio::test]
async fn three_cycles_then_done_returns_the_last_response() {
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("scoreStyle").with_argument("story", "draft one"),
        PlanDecision::invoke("editStory"),
        PlanDecision::invoke("scoreStyle"),
        PlanDecision::done(),
    ]);
    let histories = planner.histories();
    let sessions = Arc::new(SessionMemory::new());
    let supervisor = Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0))
        .register(score_style_executor())
        .register(edit_story_executor("draft two"))
        .session_store(Arc::clone(&sessions))
        .output_key("finalStory")
        .build();

    let board = Blackboard::new();
    board.write(REQUEST_KEY, "write a comedy story");
    let answer = supervisor.execute(&board).await.unwrap();

    assert_eq!(answer, "9");
    assert_eq!(board.read("finalStory"), Some(json!("9")));
    assert_eq!(board.invocations_for("scoreStyle").len(), 2);
    assert_eq!(board.invocations_for("editStory").len(), 1);
    // The editor rewrote the shared story between the two gradings.
    assert_eq!(board.read("story"), Some(json!("draft two")));

    // The first plan prompt carried the request and the agent catalog.
    let histories = histories.lock().unwrap();
    let opening = &histories[0][0].text;
    assert!(opening.contains("User request: write a comedy story"));
    assert!(opening.contains("{editStory: rewrites a story for style, [story]}"));
    assert!(opening.contains("{scoreStyle: grades the style of a story, [story]}"));
    assert!(opening.contains("Last response: (none)"));

    // The planning session was evicted once the run ended.
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn later_prompts_carry_the_last_response() {
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("editStory").with_argument("story", "draft"),
        PlanDecision::done(),
    ]);
    let histories = planner.histories();
    let supervisor = Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0))
        .register(edit_story_executor("a better draft"))
        .build();

    supervisor.run("improve my story").await.unwrap();

    let histories = histories.lock().unwrap();
    let second_prompt = &histories[1].last().unwrap().text;
    assert!(second_prompt.contains("Last response: a better draft"));
}

#[tokio::test]
async fn planner_arguments_land_on_the_board() {
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("editStory")
            .with_argument("story", "draft")
            .with_argument("tone", "dry"),
        PlanDecision::done(),
    ]);
    let supervisor = Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0))
        .register(edit_story_executor("edited"))
        .build();

    let board = Blackboard::new();
    board.write(REQUEST_KEY, "improve my story");
    supervisor.execute(&board).await.unwrap();

    assert_eq!(board.read("tone"), Some(json!("dry")));
}

#[tokio::test]
async fn planning_an_unknown_agent_is_fatal() {
    let planner = ScriptedPlanner::replying([PlanDecision::invoke("ghost")]);
    let supervisor =
        Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0)).build();

    let err = supervisor.run("anything").await.unwrap_err();
    assert!(matches!(err, SupervisorError::Invoke(_)));
    assert_eq!(err.to_string(), "unknown agent: ghost");
}

// --- Termination ---

#[tokio::test]
async fn immediate_done_without_candidate_returns_nothing() {
    let scorer = ScriptedScorer::grading(0.0, 10.0);
    let comparisons = scorer.comparisons();
    let planner = ScriptedPlanner::replying([PlanDecision::done()]);
    let supervisor = Supervisor::builder(planner, scorer).build();

    let answer = supervisor.run("anything").await.unwrap();
    assert_eq!(answer, "");
    // No candidate was proposed, so nothing was scored.
    assert!(comparisons.lock().unwrap().is_empty());
}

#[tokio::test]
async fn the_cycle_ceiling_ends_the_run_with_the_last_response() {
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("editStory").with_argument("story", "draft"),
        PlanDecision::invoke("editStory"),
        PlanDecision::invoke("editStory"),
    ]);
    let histories = planner.histories();
    let spec = AgentSpec::simple("editStory", "rewrites a story for style")
        .with_param(ParamSpec::text("story"))
        .with_output("story");
    let executor = AgentExecutor::new(
        spec,
        ScriptedAgent::replying([json!("pass one"), json!("pass two"), json!("pass three")]),
    );
    let supervisor = Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0))
        .register(executor)
        .max_invocations(2)
        .build();

    let board = Blackboard::new();
    board.write(REQUEST_KEY, "improve my story");
    let answer = supervisor.execute(&board).await.unwrap();

    assert_eq!(answer, "pass two");
    assert_eq!(board.invocations_for("editStory").len(), 2);
    assert_eq!(histories.lock().unwrap().len(), 2);
}

// --- Candidate arbitration ---

#[tokio::test]
async fn a_strictly_better_candidate_replaces_the_best_response() {
    let scorer = ScriptedScorer::grading(5.0, 8.0);
    let comparisons = scorer.comparisons();
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("editStory").with_argument("story", "draft"),
        PlanDecision::done_with("a polished final"),
    ]);
    let supervisor = Supervisor::builder(planner, scorer)
        .register(edit_story_executor("a rough pass"))
        .build();

    let answer = supervisor.run("polish my story").await.unwrap();
    assert_eq!(answer, "a polished final");

    let comparisons = comparisons.lock().unwrap();
    assert_eq!(
        comparisons[0],
        (
            "polish my story".to_string(),
            "a rough pass".to_string(),
            "a polished final".to_string(),
        )
    );
}

#[tokio::test]
async fn tied_grades_keep_the_incumbent() {
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("editStory").with_argument("story", "draft"),
        PlanDecision::done_with("a challenger"),
    ]);
    let supervisor = Supervisor::builder(planner, ScriptedScorer::grading(7.0, 7.0))
        .register(edit_story_executor("a rough pass"))
        .build();

    let answer = supervisor.run("polish my story").await.unwrap();
    assert_eq!(answer, "a rough pass");
}

// --- Session memory ---

/// Adopts an injected log and holds a dialogue in it during the call.
struct DialogueAgent {
    injected: Arc<Mutex<Option<Arc<dyn ChatMemory>>>>,
}

impl DialogueAgent {
    fn new() -> (Self, Arc<Mutex<Option<Arc<dyn ChatMemory>>>>) {
        let injected = Arc::new(Mutex::new(None));
        (
            Self {
                injected: Arc::clone(&injected),
            },
            injected,
        )
    }
}

#[async_trait]
impl Agent for DialogueAgent {
    async fn call(&self, _arguments: Vec<Value>) -> Result<Value, BoxError> {
        if let Some(log) = self.injected.lock().unwrap().as_ref() {
            log.append(ChatMessage::user("summarize the brief"));
            log.append(ChatMessage::assistant("the brief, summarized"));
        }
        Ok(json!("the brief, summarized"))
    }

    fn inject_memory(&self, memory: Arc<dyn ChatMemory>) -> bool {
        *self.injected.lock().unwrap() = Some(memory);
        true
    }
}

#[tokio::test]
async fn a_stateful_agents_dialogue_is_folded_into_the_session() {
    let (agent, injected) = DialogueAgent::new();
    let spec = AgentSpec::simple("summarizer", "summarizes the brief")
        .with_param(ParamSpec::text("brief"));
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("summarizer").with_argument("brief", "a long brief"),
        PlanDecision::done(),
    ]);
    let histories = planner.histories();
    let supervisor = Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0))
        .register(AgentExecutor::new(spec, agent))
        .build();

    supervisor.run("summarize this").await.unwrap();

    // Second consult: plan prompt, decision, the folded dialogue, new prompt.
    let histories = histories.lock().unwrap();
    let second = &histories[1];
    assert_eq!(second.len(), 5);
    assert_eq!(second[2].text, "summarize the brief");
    assert_eq!(second[3].text, "the brief, summarized");

    // The injected log was cleared after folding.
    let injected = injected.lock().unwrap();
    assert!(injected.as_ref().unwrap().messages().is_empty());
}

#[tokio::test]
async fn a_plain_agents_exchange_is_synthesized_into_the_session() {
    let spec = AgentSpec::simple("stamper", "stamps documents")
        .with_param(ParamSpec::text("kind"));
    let executor = AgentExecutor::new(spec, ScriptedAgent::replying([json!("stamped")]));
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("stamper").with_argument("kind", "legal"),
        PlanDecision::done(),
    ]);
    let histories = planner.histories();
    let supervisor = Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0))
        .register(executor)
        .build();

    supervisor.run("file the papers").await.unwrap();

    let histories = histories.lock().unwrap();
    let second = &histories[1];
    assert_eq!(second[2].text, r#"stamps documents using {"kind":"legal"}"#);
    assert!(second[3].text.starts_with("stamped with state {"));
    assert!(second[3].text.contains(r#""kind":"legal""#));
    assert!(second[3].text.contains(r#""request":"file the papers""#));
}

// --- Composition ---

#[tokio::test]
async fn a_supervisor_runs_as_a_step_on_an_outer_board() {
    let echo_spec = AgentSpec::simple("echo", "answers the request")
        .with_param(ParamSpec::text("request"));
    let echo = FnAgent::new(|args| {
        let request = args[0].as_str().unwrap_or_default();
        Ok(json!(format!("echoed: {request}")))
    });
    let planner = ScriptedPlanner::replying([
        PlanDecision::invoke("echo"),
        PlanDecision::done(),
    ]);
    let inner = Supervisor::builder(planner, ScriptedScorer::grading(0.0, 0.0))
        .register(AgentExecutor::new(echo_spec, echo))
        .output_key("verdict")
        .build();

    let panel = inner.into_executor("panel", "answers by committee");
    let board = Blackboard::new();
    board.write(REQUEST_KEY, "hello");

    let answer = panel.invoke(&board).await.unwrap();
    assert_eq!(answer, json!("echoed: hello"));
    // The inner run worked the outer board in place.
    assert_eq!(board.read("verdict"), Some(json!("echoed: hello")));
    assert_eq!(board.invocations_for("echo").len(), 1);
    assert_eq!(board.invocations_for("panel").len(), 1);
}
