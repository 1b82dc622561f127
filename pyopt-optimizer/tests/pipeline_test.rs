//! Pipeline configuration, iteration and error propagation

use pyopt_core::ast::{Expr, Module, Stmt};
use pyopt_core::Error;
use pyopt_optimizer::passes::OptimizationPass;
use pyopt_optimizer::{
    ExplanationLog, OptimizationConfig, OptimizationLevel, OptimizationPipeline, Rule,
};

fn print(arg: Expr) -> Stmt {
    Stmt::expr(Expr::call(Expr::name("print"), vec![arg]))
}

/// a = 1; b = a; c = b  -- each removal exposes the previous assignment
fn assignment_chain() -> Module {
    Module::new(vec![
        Stmt::assign(Expr::name("a"), Expr::int(1)),
        Stmt::assign(Expr::name("b"), Expr::name("a")),
        Stmt::assign(Expr::name("c"), Expr::name("b")),
    ])
}

fn pipeline(level: OptimizationLevel) -> OptimizationPipeline {
    OptimizationPipeline::new(OptimizationConfig::for_level(level))
}

#[test]
fn test_standard_is_single_pass() {
    let optimized = pipeline(OptimizationLevel::Standard)
        .optimize(assignment_chain())
        .unwrap();

    assert_eq!(
        optimized.module.body,
        vec![
            Stmt::assign(Expr::name("a"), Expr::int(1)),
            Stmt::assign(Expr::name("b"), Expr::name("a")),
        ]
    );
    assert_eq!(optimized.explanations.len(), 1);
    assert_eq!(optimized.stats.iterations, 1);
}

#[test]
fn test_aggressive_repeats_until_nothing_changes() {
    let optimized = pipeline(OptimizationLevel::Aggressive)
        .optimize(assignment_chain())
        .unwrap();

    assert_eq!(optimized.module.body, vec![Stmt::pass()]);
    assert_eq!(
        optimized.explanations.messages().collect::<Vec<_>>(),
        vec![
            "Removed unused variable assignment: 'c'",
            "Removed unused variable assignment: 'b'",
            "Removed unused variable assignment: 'a'",
        ]
    );
    // three productive runs plus the one that found nothing
    assert_eq!(optimized.stats.iterations, 4);
    assert_eq!(optimized.stats.assignments_removed, 3);
}

#[test]
fn test_aggressive_is_bounded_by_max_iterations() {
    let config = OptimizationConfig {
        max_iterations: 2,
        ..OptimizationConfig::for_level(OptimizationLevel::Aggressive)
    };
    let optimized = OptimizationPipeline::new(config)
        .optimize(assignment_chain())
        .unwrap();

    assert_eq!(optimized.stats.iterations, 2);
    assert_eq!(
        optimized.module.body,
        vec![Stmt::assign(Expr::name("a"), Expr::int(1))]
    );
}

#[test]
fn test_basic_keeps_unused_assignments() {
    let module = Module::new(vec![
        Stmt::assign(Expr::name("x"), Expr::int(1)),
        Stmt::assign(Expr::name("y"), Expr::name("y")),
    ]);
    let optimized = pipeline(OptimizationLevel::Basic).optimize(module).unwrap();

    assert_eq!(
        optimized.module.body,
        vec![Stmt::assign(Expr::name("x"), Expr::int(1))]
    );
    assert_eq!(optimized.explanations.count(Rule::SelfAssignment), 1);
    assert_eq!(optimized.explanations.count(Rule::UnusedVariable), 0);
}

#[test]
fn test_level_none_changes_nothing() {
    let module = Module::new(vec![Stmt::assign(Expr::name("x"), Expr::name("x"))]);
    let optimized = pipeline(OptimizationLevel::None)
        .optimize(module.clone())
        .unwrap();

    assert_eq!(optimized.module, module);
    assert!(optimized.explanations.is_empty());
    assert_eq!(optimized.stats.iterations, 0);
}

#[test]
fn test_malformed_input_is_rejected() {
    let module = Module::new(vec![Stmt::for_loop(
        Expr::name("i"),
        Expr::name("xs"),
        vec![],
    )]);
    let err = pipeline(OptimizationLevel::Standard)
        .optimize(module)
        .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::MalformedInput(message)) => assert!(message.contains("empty body")),
        other => panic!("expected malformed input, got {other:?}"),
    }
}

#[test]
fn test_stats_are_kept_on_the_pipeline() {
    let mut pipeline = pipeline(OptimizationLevel::Standard);
    let module = Module::new(vec![
        Stmt::assign(Expr::name("x"), Expr::name("x")),
        print(Expr::name("y")),
    ]);
    let optimized = pipeline.optimize(module).unwrap();

    assert_eq!(pipeline.stats(), &optimized.stats);
    assert_eq!(optimized.stats.rewrites_applied, 1);
    // Assign + 2 names, Expr + Call + 2 names  ->  Expr + Call + 2 names
    assert_eq!(optimized.stats.nodes_before, 7);
    assert_eq!(optimized.stats.nodes_after, 4);
}

struct Tagger;

impl OptimizationPass for Tagger {
    fn name(&self) -> &str {
        "Tagger"
    }

    fn run(&mut self, module: Module, log: &mut ExplanationLog) -> anyhow::Result<Module> {
        let mut body = module.body;
        if body.iter().all(|stmt| !stmt.is_pass()) {
            body.push(Stmt::pass());
            log.push(pyopt_optimizer::Explanation::new(
                Rule::ConstantFolding,
                "tagged",
                None,
            ));
        }
        Ok(Module::new(body))
    }
}

#[test]
fn test_custom_pass_runs_after_configured_passes() {
    let mut pipeline = pipeline(OptimizationLevel::Basic);
    pipeline.add_pass(Box::new(Tagger));

    let module = Module::new(vec![print(Expr::name("x"))]);
    let optimized = pipeline.optimize(module).unwrap();
    assert_eq!(optimized.module.body, vec![print(Expr::name("x")), Stmt::pass()]);
    assert_eq!(optimized.explanations.joined(), "tagged");

    pipeline.clear_passes();
    let optimized = pipeline.optimize(Module::new(vec![print(Expr::name("x"))])).unwrap();
    assert!(optimized.explanations.is_empty());
}
