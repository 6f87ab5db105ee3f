use std::fmt::Write;

use crate::aggregate::SubjectSummary;
use crate::render::{RenderTree, TeacherSection};

pub fn build_report(tree: &RenderTree, subjects: &[SubjectSummary]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Teacher Feedback Report");
    let _ = writeln!(output);

    let sections = match tree {
        RenderTree::Empty(empty) => {
            let _ = writeln!(output, "## {}", empty.title);
            let _ = writeln!(output, "{}", empty.message);
            let _ = writeln!(output, "_{}_", empty.call_to_action);
            return output;
        }
        RenderTree::Teachers { sections } => sections,
    };

    let _ = writeln!(output, "## Subject Mix");
    if subjects.is_empty() {
        let _ = writeln!(output, "No subjects recorded.");
    } else {
        for summary in subjects {
            let _ = writeln!(
                output,
                "- {}: {} (avg satisfaction {:.1})",
                summary.subject,
                crate::render::review_count_label(summary.count),
                summary.average_satisfaction
            );
        }
    }

    for section in sections {
        let _ = writeln!(output);
        write_section(&mut output, section);
    }

    output
}

fn write_section(output: &mut String, section: &TeacherSection) {
    let _ = writeln!(output, "## [{}] {}", section.initials, section.teacher_name);
    let _ = writeln!(
        output,
        "{} | {} {}",
        section.review_count_label, section.stars, section.average_label
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "| Category | Average | Bar |");
    let _ = writeln!(output, "| --- | --- | --- |");
    for bar in &section.performance {
        let _ = writeln!(
            output,
            "| {} | {} | {:.1}% |",
            bar.label, bar.value_label, bar.width_percent
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "### Reviews");
    for card in &section.feedback {
        let _ = writeln!(
            output,
            "- {} {}/5 {} {} on {} ({}): \"{}\"",
            card.subject,
            card.overall.rating,
            card.overall.emoji,
            card.overall.sentiment,
            card.posted_at,
            card.short_id,
            card.comments
        );
        let pills: Vec<String> = card
            .pills
            .iter()
            .map(|pill| format!("{} {}", pill.label, pill.rating_label))
            .collect();
        let _ = writeln!(output, "  - {}", pills.join(", "));
    }
}
