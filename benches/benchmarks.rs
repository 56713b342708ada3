//! Performance benchmarks for Briefwright.
//!
//! This module contains benchmarks for:
//! - Answer validation per field kind
//! - Question planning over partially filled briefs
//! - Markdown brief parsing
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use briefwright::brief::{field, parse_brief, render_template, validate, BriefDocument, FieldValue, RawValue, FIELDS};
use briefwright::session::planner;

// ============================================================================
// Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    /// Fill the template with a plausible answer for every field.
    pub fn filled_brief() -> String {
        let mut md = render_template();
        for entry in FIELDS.iter() {
            let answer = match entry.key {
                "num_developers" => "3",
                "targetPlatform" => "web",
                "theme" => "dark",
                "coreFeatures" | "apiIntegrations" | "exclusions" | "comparableApps" => {
                    "- first item\n- second item\n- third item"
                }
                _ => "A reasonably detailed answer for this field",
            };
            let start = md.find(&format!("### {}", entry.label)).unwrap();
            let answer_at = start + md[start..].find("**Answer:**").unwrap();
            let line_end = answer_at + md[answer_at..].find('\n').unwrap();
            md = format!("{}**Answer:** {answer}{}", &md[..answer_at], &md[line_end..]);
        }
        md
    }

    /// A brief with the first `n` fields answered.
    pub fn partial_brief(n: usize) -> BriefDocument {
        let mut brief = BriefDocument::new();
        for entry in FIELDS.iter().take(n) {
            brief.insert(entry.key, FieldValue::Text("answered".to_string()));
        }
        brief
    }
}

// ============================================================================
// Validation Benchmarks
// ============================================================================

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    let cases = [
        ("short_text", "appName", RawValue::from("Acme Invoicing")),
        ("long_text", "problemSolved", RawValue::from("x".repeat(3000))),
        ("string_list", "coreFeatures", RawValue::from("a, b; c\n- d\n* e, A, B")),
        ("number", "num_developers", RawValue::from("12")),
        ("enum", "targetPlatform", RawValue::from("Cross-Platform")),
    ];

    for (name, key, raw) in cases {
        let Some(entry) = field(key) else { continue };
        group.bench_with_input(BenchmarkId::from_parameter(name), &raw, |b, raw| {
            b.iter(|| validate(black_box(entry), black_box(raw)));
        });
    }

    group.finish();
}

// ============================================================================
// Planner Benchmarks
// ============================================================================

fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");

    for answered in [0, 8, 16] {
        let brief = fixtures::partial_brief(answered);
        group.bench_with_input(BenchmarkId::new("next", answered), &brief, |b, brief| {
            b.iter(|| planner::next(black_box(brief)));
        });
        group.bench_with_input(BenchmarkId::new("remaining", answered), &brief, |b, brief| {
            b.iter(|| planner::remaining(black_box(brief)));
        });
    }

    group.finish();
}

// ============================================================================
// Parser Benchmarks
// ============================================================================

fn bench_parse_brief(c: &mut Criterion) {
    let md = fixtures::filled_brief();

    let mut group = c.benchmark_group("parse_brief");
    group.throughput(Throughput::Bytes(md.len() as u64));
    group.bench_function("filled_template", |b| {
        b.iter(|| parse_brief(black_box(&md)));
    });
    group.finish();
}

criterion_group!(benches, bench_validation, bench_planner, bench_parse_brief);
criterion_main!(benches);
