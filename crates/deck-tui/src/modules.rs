//! The built-in curriculum.
//!
//! A module is either an outline (slides with optional worked-example
//! variants per slide) or a simulation (a scripted agent session played
//! back by the sequencer).

use deck_types::{Step, StepKind};

/// One teaching module.
pub struct Module {
    pub id: &'static str,
    pub title: &'static str,
    pub kind: ModuleKind,
}

pub enum ModuleKind {
    Outline { steps: Vec<OutlineStep> },
    Simulation { script: Vec<Step> },
}

/// One slide in an outline module.
pub struct OutlineStep {
    pub heading: &'static str,
    pub body: &'static str,
    /// Worked-example variants the viewer can cycle through on this slide.
    pub queries: Vec<&'static str>,
}

impl Module {
    /// Number of outline steps, or 1 for simulations (a single screen).
    pub fn total_steps(&self) -> usize {
        match &self.kind {
            ModuleKind::Outline { steps } => steps.len(),
            ModuleKind::Simulation { .. } => 1,
        }
    }
}

/// Returns the built-in curriculum, in presentation order.
pub fn curriculum() -> Vec<Module> {
    vec![
        Module {
            id: "agent-loop",
            title: "Anatomy of an agent loop",
            kind: ModuleKind::Simulation {
                script: agent_loop_script(),
            },
        },
        Module {
            id: "prompt-patterns",
            title: "Prompt patterns",
            kind: ModuleKind::Outline {
                steps: prompt_pattern_steps(),
            },
        },
        Module {
            id: "reading-traces",
            title: "Reading execution traces",
            kind: ModuleKind::Outline {
                steps: reading_trace_steps(),
            },
        },
    ]
}

fn agent_loop_script() -> Vec<Step> {
    vec![
        Step::new(
            "al-01",
            StepKind::UserInput,
            "user",
            "Why is checkout latency spiking since yesterday's deploy?",
            800,
        ),
        Step::new(
            "al-02",
            StepKind::Thinking,
            "agent",
            "Latency regressions after a deploy usually point at a new query \
             or a removed cache. Start with the slow query log.",
            1400,
        ),
        Step::new(
            "al-03",
            StepKind::ToolCall,
            "agent",
            "sql: SELECT query, mean_ms FROM slow_log WHERE captured_at > now() - interval '1 day' ORDER BY mean_ms DESC LIMIT 5",
            1000,
        ),
        Step::new(
            "al-04",
            StepKind::ToolResult,
            "tool",
            "1 row: SELECT * FROM cart_items WHERE session_id = $1 (mean 840ms, was 12ms)",
            900,
        ),
        Step::new(
            "al-05",
            StepKind::Reasoning,
            "agent",
            "840ms for a point lookup means the index is gone. Check the \
             migration that shipped with the deploy.",
            1400,
        ),
        Step::new(
            "al-06",
            StepKind::ToolCall,
            "agent",
            "bash: git show --stat HEAD -- migrations/",
            800,
        ),
        Step::new(
            "al-07",
            StepKind::ToolResult,
            "tool",
            "migrations/0142_rebuild_cart_items.sql | 38 ++++---- (drops and recreates cart_items without ix_cart_items_session)",
            900,
        ),
        Step::new(
            "al-08",
            StepKind::AgentMessage,
            "agent",
            "Found it: migration 0142 rebuilt cart_items and dropped \
             ix_cart_items_session, so every cart read is now a sequential scan.",
            1600,
        ),
        Step::new(
            "al-09",
            StepKind::FinalResponse,
            "agent",
            "The latency spike comes from migration 0142 dropping the \
             session_id index on cart_items. Recreate it with CREATE INDEX \
             CONCURRENTLY and latency will return to baseline.",
            2000,
        ),
    ]
}

fn prompt_pattern_steps() -> Vec<OutlineStep> {
    vec![
        OutlineStep {
            heading: "Be concrete about the output",
            body: "Vague asks get vague answers. Name the artifact you want: \
                   a diff, a table, a one-paragraph summary. The model plans \
                   backwards from the output shape.",
            queries: vec![
                "\"Summarize this incident\" vs \"Write a 3-bullet incident summary for the on-call handoff\"",
                "\"Fix the bug\" vs \"Produce a unified diff that makes test_checkout_total pass\"",
            ],
        },
        OutlineStep {
            heading: "Show, don't describe",
            body: "One worked example in the prompt beats three paragraphs of \
                   instructions. Examples pin down format, tone and edge-case \
                   handling all at once.",
            queries: vec![
                "Classification prompt with two labeled examples per class",
                "Extraction prompt showing one filled-in JSON record",
                "Rewrite prompt pairing a 'before' and an 'after'",
            ],
        },
        OutlineStep {
            heading: "Give the model an out",
            body: "Force-choice prompts produce confident nonsense at the \
                   boundaries. Always provide an explicit escape hatch: \
                   'answer unknown if the context does not say'.",
            queries: vec![
                "QA prompt with an 'unanswerable' label in the schema",
            ],
        },
        OutlineStep {
            heading: "Decompose before you delegate",
            body: "A task the model fails at in one shot often succeeds as a \
                   chain of smaller prompts with checkable intermediate \
                   results. Decomposition is debuggability.",
            queries: vec![],
        },
    ]
}

fn reading_trace_steps() -> Vec<OutlineStep> {
    vec![
        OutlineStep {
            heading: "Follow the tool boundary",
            body: "Every agent mistake is visible at a tool boundary: either \
                   the wrong call was made, or the right result was misread. \
                   Read call/result pairs, not prose.",
            queries: vec![],
        },
        OutlineStep {
            heading: "Thinking is a claim, not evidence",
            body: "Reasoning text tells you what the agent believed, not what \
                   was true. Verify each belief against the tool results that \
                   preceded it.",
            queries: vec![
                "Trace where the agent asserts a file exists that a prior listing did not contain",
            ],
        },
        OutlineStep {
            heading: "Find the first divergence",
            body: "Bad final answers are usually caused many steps earlier. \
                   Walk the trace forward and mark the first step whose \
                   output you would not have produced yourself.",
            queries: vec![],
        },
    ]
}
