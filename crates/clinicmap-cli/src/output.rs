//! Human-readable rendering of validation results for stdout.

use clinicmap_validator::{
    CorrectionAction, PrecisionBreakdown, StateAnalysis, ValidationReport, ValidationResult,
};

const TOP_ISSUES: usize = 10;
const TOP_STATES: usize = 15;

pub(crate) fn print_summary(report: &ValidationReport, precision_threshold_m: f64) {
    let s = &report.summary;
    println!("{}", "=".repeat(60));
    println!("VALIDATION SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total locations validated:    {}", s.total);
    println!("Passing locations:            {}", s.validated);
    println!("Locations needing correction: {}", s.needs_correction);
    println!(
        "Precision issues (>{precision_threshold_m}m):    {}",
        s.precision_issues
    );
    println!("Average confidence score:     {}%", s.average_confidence);
}

pub(crate) fn print_precision(breakdown: &PrecisionBreakdown, precision_threshold_m: f64) {
    println!();
    println!("PRECISION BREAKDOWN");
    println!(
        "  ultra-high (<={precision_threshold_m}m): {} locations",
        breakdown.ultra_high
    );
    println!("  high (<=50m):        {} locations", breakdown.high);
    println!("  low (>50m):          {} locations", breakdown.low);
}

pub(crate) fn print_top_issues(report: &ValidationReport) {
    if report.issues.is_empty() {
        return;
    }
    println!();
    println!("TOP ISSUES REQUIRING CORRECTION");
    println!("{}", "-".repeat(60));
    for (index, issue) in report.issues.iter().take(TOP_ISSUES).enumerate() {
        println!("{}. {}", index + 1, issue.name);
        print_result_details(issue);
        println!();
    }
}

pub(crate) fn print_state_analysis(analysis: &[StateAnalysis]) {
    if analysis.is_empty() {
        return;
    }
    println!();
    println!("STATE-BY-STATE PRECISION");
    println!("{}", "-".repeat(60));
    for state in analysis.iter().take(TOP_STATES) {
        println!(
            "{:<20} | {:<5} total | {:<5} precise | {:>5.1}% | {}% confidence",
            state.state,
            state.total,
            state.high_precision,
            state.precision_rate,
            state.average_confidence
        );
    }
}

pub(crate) fn print_recommendations(report: &ValidationReport) {
    if report.recommendations.is_empty() {
        return;
    }
    println!();
    println!("RECOMMENDATIONS");
    println!("{}", "-".repeat(60));
    for (index, rec) in report.recommendations.iter().enumerate() {
        println!("{}. {rec}", index + 1);
    }
}

pub(crate) fn print_result_details(result: &ValidationResult) {
    println!("   id:         {}", result.record_id);
    println!("   address:    {}", result.address);
    println!("   confidence: {}%", result.confidence_score);
    if let Some(distance) = result.distance_error_m {
        println!("   distance:   {distance:.0}m");
    }
    if !result.issues.is_empty() {
        println!("   issues:     {}", result.issues.join(", "));
    }
}

pub(crate) fn describe_action(action: &CorrectionAction) -> String {
    match action {
        CorrectionAction::Relocate {
            record_id,
            latitude,
            longitude,
            distance_m,
        } => {
            let moved = distance_m.map_or_else(String::new, |d| format!(" ({d:.0}m)"));
            format!("relocate {record_id} -> {latitude:.6}, {longitude:.6}{moved}")
        }
        CorrectionAction::Delete { record_id, reason } => format!("delete   {record_id}: {reason}"),
        CorrectionAction::Review { record_id, reason } => format!("review   {record_id}: {reason}"),
    }
}
