//! Scenario runner – execute scripted invocations from YAML files.

use crate::commands::CommandRegistry;
use crate::context::DispatchContext;
use crate::tokens::{tokenize, tokenize_partial};
use crate::types::*;

/// Load a scenario from a YAML string.
pub fn load_scenario(yaml: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse scenario YAML: {}", e))
}

/// Execute a scenario and return the overall result.
pub fn run_scenario(
    scenario: &Scenario,
    ctx: &DispatchContext,
    registry: &CommandRegistry,
) -> ScenarioResult {
    let mut step_results = Vec::new();
    let mut overall = Status::Pass;

    for (i, step) in scenario.steps.iter().enumerate() {
        let result = match step {
            ScenarioStep::Run {
                run,
                identity,
                expect_status,
            } => {
                let who = Identity::new(identity.as_deref().unwrap_or(&scenario.identity));
                let r = registry.execute(&scenario.command, ctx, &who, &tokenize(run));
                let passed = r.status == *expect_status;
                if !passed {
                    tracing::warn!(
                        step = i,
                        expected = %expect_status,
                        actual = %r.status,
                        "scenario step status mismatch"
                    );
                }
                StepResult {
                    step: i,
                    line: run.clone(),
                    passed,
                    dispatch: Some(r),
                    completions: None,
                }
            }
            ScenarioStep::Complete {
                complete,
                identity,
                expect,
            } => {
                let who = Identity::new(identity.as_deref().unwrap_or(&scenario.identity));
                let got =
                    registry.complete(&scenario.command, ctx, &who, &tokenize_partial(complete));
                let passed = expect.as_ref().map_or(true, |e| *e == got);
                if !passed {
                    tracing::warn!(step = i, ?expect, actual = ?got, "scenario completion mismatch");
                }
                StepResult {
                    step: i,
                    line: complete.clone(),
                    passed,
                    dispatch: None,
                    completions: Some(got),
                }
            }
        };
        if !result.passed {
            overall = Status::Error;
        }
        step_results.push(result);
    }

    ScenarioResult {
        name: scenario.name.clone(),
        overall_status: overall,
        step_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ActionNode, GroupNode};
    use crate::parameter::Parameter;

    fn registry() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        reg.register(
            "shop",
            GroupNode::new("shop", "", "shop").child(
                ActionNode::new("give", "", "shop")
                    .param(Parameter::int("amount"))
                    .on_execute(|_| {}),
            ),
        );
        reg
    }

    #[test]
    fn test_parse_scenario() {
        let yaml = r#"
name: basic test
command: shop
steps:
  - run: "give 5"
    expect_status: pass
  - complete: "gi"
    expect: ["give"]
"#;
        let s = load_scenario(yaml).expect("should parse");
        assert_eq!(s.name, Some("basic test".into()));
        assert_eq!(s.identity, "CONSOLE");
        assert_eq!(s.steps.len(), 2);
        assert!(matches!(s.steps[1], ScenarioStep::Complete { .. }));
    }

    #[test]
    fn test_run_scenario() {
        let yaml = r#"
command: shop
steps:
  - run: "give 5"
  - run: "give five"
    expect_status: error
  - complete: "g"
    expect: ["give", "help"]
"#;
        let scenario = load_scenario(yaml).unwrap();
        let ctx = DispatchContext::default_headless();
        let result = run_scenario(&scenario, &ctx, &registry());
        assert_eq!(result.overall_status, Status::Pass);
        assert_eq!(result.step_results.len(), 3);
    }

    #[test]
    fn test_mismatch_fails_scenario() {
        let yaml = r#"
command: shop
steps:
  - run: "take 5"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let ctx = DispatchContext::default_headless();
        let result = run_scenario(&scenario, &ctx, &registry());
        assert_eq!(result.overall_status, Status::Error);
        assert!(!result.step_results[0].passed);
    }
}
