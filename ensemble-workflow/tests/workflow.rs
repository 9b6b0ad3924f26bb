use ensemble_core::test_utils::ScriptedAgent;
use ensemble_core::{AgentExecutor, AgentSpec, Blackboard, ParamSpec};
use ensemble_workflow::{LoopAgent, SequenceAgent};
use serde_json::{json, Value};

fn creative_writer() -> AgentExecutor {
    let spec = AgentSpec::simple("creativeWriter", "writes a story about a topic")
        .with_param(ParamSpec::text("topic"))
        .with_output("story");
    AgentExecutor::new(spec, ScriptedAgent::replying([json!("a dragon tale")]))
}

fn style_scorer(scores: impl IntoIterator<Item = Value>) -> AgentExecutor {
    let spec = AgentSpec::simple("styleScorer", "grades how well the story fits the style")
        .with_param(ParamSpec::text("story"))
        .with_param(ParamSpec::text("style"))
        .with_output("score");
    AgentExecutor::new(spec, ScriptedAgent::replying(scores))
}

fn style_editor(revisions: impl IntoIterator<Item = Value>) -> AgentExecutor {
    let spec = AgentSpec::simple("styleEditor", "rewrites the story in the requested style")
        .with_param(ParamSpec::text("story"))
        .with_param(ParamSpec::text("style"))
        .with_output("story");
    AgentExecutor::new(spec, ScriptedAgent::replying(revisions))
}

fn scored_well(board: &Blackboard) -> bool {
    board.read_or("score", json!(0.0)).as_f64().unwrap_or(0.0) >= 0.8
}

// --- Sequences ---

#[tokio::test]
async fn a_sequence_runs_its_steps_in_order_over_one_board() {
    let sequence = SequenceAgent::new()
        .step(creative_writer())
        .step(style_editor([json!("a funnier dragon tale")]));

    let board = Blackboard::new();
    board.write("topic", "dragons and wizards");
    board.write("style", "comedy");
    let answer = sequence.run_on(&board).await.unwrap();

    // No output key, so the result is the last step's response.
    assert_eq!(answer, json!("a funnier dragon tale"));
    assert_eq!(board.read("story"), Some(json!("a funnier dragon tale")));
    assert_eq!(board.invocations_for("creativeWriter").len(), 1);
    assert_eq!(board.invocations_for("styleEditor").len(), 1);
}

#[tokio::test]
async fn an_output_key_reads_the_result_from_state() {
    let sequence = SequenceAgent::new()
        .step(creative_writer())
        .step(style_scorer([json!(0.4)]))
        .output_key("story");

    let board = Blackboard::new();
    board.write("topic", "dragons and wizards");
    board.write("style", "comedy");
    let answer = sequence.run_on(&board).await.unwrap();

    // The scorer answered last, but the sequence is bound to `story`.
    assert_eq!(answer, json!("a dragon tale"));
}

// --- Loops ---

#[tokio::test]
async fn a_loop_stops_the_moment_the_exit_condition_holds() {
    let review = LoopAgent::until(scored_well)
        .step(style_scorer([json!(0.2), json!(0.6), json!(0.9)]))
        .step(style_editor([json!("edit one"), json!("edit two")]))
        .max_iterations(5);

    let board = Blackboard::new();
    board.write("story", "a dragon tale");
    board.write("style", "comedy");
    let answer = review.run_on(&board).await.unwrap();

    assert_eq!(answer, json!(0.9));
    // The third grading satisfied the condition mid-pass, so the editor
    // never ran a third time.
    assert_eq!(board.invocations_for("styleScorer").len(), 3);
    assert_eq!(board.invocations_for("styleEditor").len(), 2);
    assert_eq!(board.read("story"), Some(json!("edit two")));
}

#[tokio::test]
async fn a_loop_gives_up_after_max_iterations() {
    let review = LoopAgent::until(|_| false)
        .step(style_editor([
            json!("pass one"),
            json!("pass two"),
            json!("pass three"),
        ]))
        .max_iterations(3);

    let board = Blackboard::new();
    board.write("story", "a dragon tale");
    board.write("style", "comedy");
    let answer = review.run_on(&board).await.unwrap();

    assert_eq!(answer, json!("pass three"));
    assert_eq!(board.invocations_for("styleEditor").len(), 3);
}

// --- Nesting ---

#[tokio::test]
async fn a_loop_nests_inside_a_sequence() {
    let review = LoopAgent::until(scored_well)
        .step(style_scorer([json!(0.2), json!(0.6), json!(0.9)]))
        .step(style_editor([json!("edit one"), json!("edit two")]))
        .max_iterations(5);

    let styled_writer = SequenceAgent::new()
        .step(creative_writer())
        .step(review.into_executor("styleReviewLoop", "reworks the story until it scores well"))
        .output_key("story");
    let pipeline = styled_writer.into_executor("styledWriter", "writes a story in a style");

    let board = Blackboard::new();
    board.write("topic", "dragons and wizards");
    board.write("style", "comedy");
    let answer = pipeline.invoke(&board).await.unwrap();

    assert_eq!(answer, json!("edit two"));
    assert_eq!(board.read("score"), Some(json!(0.9)));
    // Every nested run worked the one outer board.
    assert_eq!(board.invocations_for("creativeWriter").len(), 1);
    assert_eq!(board.invocations_for("styleScorer").len(), 3);
    assert_eq!(board.invocations_for("styleReviewLoop").len(), 1);
    assert_eq!(board.invocations_for("styledWriter").len(), 1);
}
