//! Console output formatter for council runs

use colored::Colorize;
use council_application::use_cases::views::{MemberAnswerView, ReviewView};
use council_application::{CallStatus, RunView, SynthesisView};
use council_domain::{OutputFormat, RunSummary};

/// Formats council runs for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    pub fn render(view: &RunView, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(view),
            OutputFormat::Final => Self::format_final_only(view),
            OutputFormat::Json => Self::format_json(view),
        }
    }

    /// Format every stage of a run
    pub fn format(view: &RunView) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Council Run"));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Run:".cyan().bold(), view.request_id));
        output.push_str(&format!("{} {}\n", "Status:".cyan().bold(), view.status));
        output.push_str(&format!(
            "{} {}\n\n",
            "Query:".cyan().bold(),
            view.query
        ));

        output.push_str(&Self::section_header("Stage 1: Answers"));
        for answer in &view.stage1.answers {
            output.push_str(&Self::format_answer(answer));
        }

        if !view.stage2.reviews.is_empty() {
            output.push_str(&Self::section_header("Stage 2: Peer Review"));
            for review in &view.stage2.reviews {
                output.push_str(&Self::format_review(review));
            }

            output.push_str(&format!("\n{}\n", "Aggregated Ranking:".cyan().bold()));
            for (place, entry) in view.stage2.aggregated_ranking.iter().enumerate() {
                output.push_str(&format!(
                    "  {}. {} ({} pts)\n",
                    place + 1,
                    entry.anon_id.bold(),
                    entry.score
                ));
            }
        }

        output.push_str(&Self::section_header("Stage 3: Synthesis"));
        match &view.stage3 {
            SynthesisView::Pending => {
                output.push_str(&format!("\n{}\n", "Not run yet".dimmed()));
            }
            SynthesisView::Ok {
                final_answer,
                rationale,
                used_signals,
                ..
            } => {
                output.push_str(&format!("\n{}\n", final_answer));
                if !rationale.is_empty() {
                    output.push_str(&format!("\n{} {}\n", "Rationale:".cyan().bold(), rationale));
                }
                Self::push_list(&mut output, "Top Ranked:", &used_signals.top_ranked);
                Self::push_list(&mut output, "Disagreements:", &used_signals.disagreements);
                Self::push_list(&mut output, "Notes:", &used_signals.notes);
            }
            SynthesisView::Error { error } => {
                output.push_str(&format!("\n{} {}\n", "Error:".red().bold(), error));
            }
        }

        output.push_str(&Self::footer());
        output
    }

    /// Format as JSON
    pub fn format_json(view: &RunView) -> String {
        serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final answer only (concise output)
    pub fn format_final_only(view: &RunView) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Council Conclusion ===".cyan().bold()
        ));
        output.push_str(&format!("{} {}\n\n", "Q:".bold(), view.query));

        let answered = view
            .stage1
            .answers
            .iter()
            .filter(|a| a.status == CallStatus::Ok)
            .count();
        output.push_str(&format!(
            "{} {}/{}\n\n",
            "Members answered:".dimmed(),
            answered,
            view.stage1.answers.len()
        ));

        match &view.stage3 {
            SynthesisView::Ok { final_answer, .. } => output.push_str(final_answer),
            SynthesisView::Error { error } => {
                output.push_str(&format!("{} {}", "Synthesis failed:".red().bold(), error))
            }
            SynthesisView::Pending => {
                output.push_str(&format!("{}", "No synthesis for this run".yellow()))
            }
        }
        output.push('\n');
        output
    }

    /// One line per stored run
    pub fn format_run_list(runs: &[RunSummary]) -> String {
        if runs.is_empty() {
            return format!("{}\n", "No runs stored".dimmed());
        }
        runs.iter()
            .map(|run| {
                format!(
                    "{}  {}  {}\n",
                    run.request_id.bold(),
                    run.created_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
                    run.query
                )
            })
            .collect()
    }

    fn format_answer(answer: &MemberAnswerView) -> String {
        match answer.status {
            CallStatus::Ok => format!(
                "\n{}\n{}\n",
                format!("── {} ({}) ──", answer.anon_id, answer.member_url)
                    .yellow()
                    .bold(),
                answer.answer_text
            ),
            CallStatus::Error => format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", answer.member_url).red().bold(),
                answer.error.as_deref().unwrap_or("Unknown")
            ),
        }
    }

    fn format_review(review: &ReviewView) -> String {
        match review.status {
            CallStatus::Ok => {
                let mut out = format!(
                    "\n{} {} (confidence {:.2})\n",
                    "──".yellow(),
                    review.reviewer_url.to_string().yellow().bold(),
                    review.confidence.unwrap_or_default()
                );
                if let Some(rankings) = &review.rankings {
                    out.push_str(&format!("  Ranking: {}\n", rankings.join(" > ")));
                }
                for (label, critique) in review.critiques.iter().flatten() {
                    out.push_str(&Self::indent(&format!("{}: {}", label, critique), "  "));
                    out.push('\n');
                }
                out
            }
            CallStatus::Error => format!(
                "\n{}\nError: {}\n",
                format!("── {} ──", review.reviewer_url).red().bold(),
                review.error.as_deref().unwrap_or("Unknown")
            ),
        }
    }

    fn push_list(output: &mut String, title: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        output.push_str(&format!("\n{}\n", title.cyan().bold()));
        for item in items {
            output.push_str(&format!("  * {}\n", item));
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use council_application::use_cases::views::{Stage1View, Stage2View};
    use council_domain::{BackendId, RankingEntry, RunStatus, UsedSignals};

    fn view(stage3: SynthesisView) -> RunView {
        RunView {
            request_id: "r1".to_string(),
            query: "why?".to_string(),
            created_at: Utc::now(),
            status: RunStatus::Stage2Done,
            stage1: Stage1View {
                answers: vec![
                    MemberAnswerView {
                        anon_id: "A".to_string(),
                        answer_text: "because".to_string(),
                        member_url: BackendId::parse("http://m1").unwrap(),
                        latency_ms: Some(3),
                        token_usage: None,
                        status: CallStatus::Ok,
                        error: None,
                    },
                    MemberAnswerView {
                        anon_id: String::new(),
                        answer_text: String::new(),
                        member_url: BackendId::parse("http://m2").unwrap(),
                        latency_ms: None,
                        token_usage: None,
                        status: CallStatus::Error,
                        error: Some("HTTP 500".to_string()),
                    },
                ],
            },
            stage2: Stage2View {
                reviews: vec![],
                aggregated_ranking: vec![RankingEntry::new("A", 0)],
            },
            stage3,
        }
    }

    #[test]
    fn test_full_format_lists_failures() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::render(&view(SynthesisView::Pending), OutputFormat::Full);
        assert!(text.contains("because"));
        assert!(text.contains("Error: HTTP 500"));
        assert!(text.contains("Not run yet"));
    }

    #[test]
    fn test_final_only_shows_answer() {
        colored::control::set_override(false);
        let stage3 = SynthesisView::Ok {
            final_answer: "the answer".to_string(),
            rationale: String::new(),
            used_signals: UsedSignals::default(),
            latency_ms: None,
            token_usage: None,
        };
        let text = ConsoleFormatter::render(&view(stage3), OutputFormat::Final);
        assert!(text.contains("Members answered: 1/2"));
        assert!(text.trim_end().ends_with("the answer"));
    }

    #[test]
    fn test_json_is_run_view() {
        let text = ConsoleFormatter::render(&view(SynthesisView::Pending), OutputFormat::Json);
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["stage3"]["status"], "pending");
        assert_eq!(json["status"], "stage2_done");
    }
}
