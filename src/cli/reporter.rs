// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::constraints::Violation;
use crate::geometry::{GeometryFactory, MaterialCache};
use crate::scene::Scene;
use crate::schema::Severity;
use colored::*;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Summarise a built scene
    pub fn report_scene<G: GeometryFactory, M: MaterialCache>(
        file: &str,
        scene: &Scene<G, M>,
        duration: Duration,
    ) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Built:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        for path in scene.template_paths() {
            let leaves = scene
                .leaf_paths()
                .filter(|p| p.starts_with(path) && p[path.len()..].starts_with('.'))
                .count();
            println!("  {} {} ({} leaves)", "▸".bright_blue(), path.cyan(), leaves);
        }

        println!(
            "  {} {}",
            "Objects:".bright_black(),
            scene.object_count().to_string().cyan()
        );
        println!(
            "  {} {}",
            "Leaves:".bright_black(),
            scene.leaf_count().to_string().cyan()
        );

        let bounds = scene.bounding_box();
        if !bounds.is_empty() {
            let size = bounds.size();
            println!(
                "  {} {:.3} x {:.3} x {:.3}",
                "Extent:".bright_black(),
                size.x,
                size.y,
                size.z
            );
        }

        let stats = scene.evaluator().cache_stats();
        println!(
            "  {} {} formulas, {:.1}% hit rate",
            "Cache:".bright_black(),
            stats.parsed_formulas,
            stats.hit_rate()
        );
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );

        for (path, violations) in scene.all_violations() {
            Self::report_violations(path, violations);
        }
        println!("{}", "━".repeat(80).bright_black());
    }

    pub fn report_violations(path: &str, violations: &[Violation]) {
        if violations.is_empty() {
            println!("{} {} {}", "✅".green(), path.cyan(), "all constraints hold".green());
            return;
        }

        println!("\n{} {}", "Constraints:".bold(), path.cyan());
        for v in violations {
            let label = match v.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow().bold(),
                Severity::Info => "info".bright_blue(),
            };
            println!(
                "  {} {} {}",
                label,
                format!("{}.{}:", v.category, v.rule).bright_black(),
                v.message
            );
        }
    }

    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    pub fn success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    /// Format duration for display
    pub fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(
            Reporter::format_duration(Duration::from_micros(500)),
            "500µs"
        );
        assert_eq!(
            Reporter::format_duration(Duration::from_millis(5)),
            "5.00ms"
        );
        assert_eq!(Reporter::format_duration(Duration::from_secs(2)), "2.00s");
    }
}
