//! Rules command implementation

use pyopt_optimizer::{OptimizationConfig, Rule};

/// One line per rule, marking the ones `config` disables
pub fn render_rules(config: &OptimizationConfig) -> String {
    let rules = config.rule_set();
    let width = Rule::ALL.iter().map(|rule| rule.name().len()).max().unwrap_or(0);

    Rule::ALL
        .iter()
        .map(|rule| {
            let mark = if rules.is_enabled(*rule) { "x" } else { " " };
            format!("[{mark}] {:<width$}  {}", rule.name(), rule.description())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn list_rules(config: &OptimizationConfig) {
    println!("{}", render_rules(config));
}
