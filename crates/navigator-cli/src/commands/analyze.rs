use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::time::Instant;

use navigator::analysis::ResumeAnalysis;
use navigator::analytics::ResumeAnalysisMetrics;

use crate::commands::session::{build_session, build_tracker};
use crate::configuration::CliConfig;
use crate::prompt::cliclack::CliclackPrompt;

pub async fn execute(config: &CliConfig, resume: &Path, job: &Path) -> Result<()> {
    let resume_text = fs::read_to_string(resume)
        .with_context(|| format!("Failed to read resume {}", resume.display()))?;
    let job_text = fs::read_to_string(job)
        .with_context(|| format!("Failed to read job description {}", job.display()))?;
    let analysis = ResumeAnalysis::new(resume_text, job_text)?;

    let tracker = build_tracker(config)?;
    tracker.track_page_view("one_shot").await;

    let prompt = Box::new(CliclackPrompt::new());
    let mut session = build_session(config, prompt, tracker.clone(), None).await?;

    let started = Instant::now();
    let response = session.headless_start(&analysis.question()).await?;

    tracker
        .track_resume_analysis(ResumeAnalysisMetrics {
            match_score: match_score(&response.message.content).unwrap_or(0.0),
            skills_found: 0,
            skills_missing: 0,
            analysis_time: started.elapsed().as_millis() as u64,
        })
        .await;
    Ok(())
}

lazy_static! {
    static ref MATCH_SCORE: Regex =
        Regex::new(r"(?i)match[^\n]*?(\d{1,3}(?:\.\d+)?)\s*%").expect("match score pattern is valid");
}

/// First percentage mentioned on a line about the match
fn match_score(answer: &str) -> Option<f32> {
    let score: f32 = MATCH_SCORE.captures(answer)?.get(1)?.as_str().parse().ok()?;
    (0.0..=100.0).contains(&score).then_some(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_score_from_answer() {
        let answer = "## Summary\n1. **Match percentage score:** 72%\n2. Skills: Rust, SQL (100% coverage)";
        assert_eq!(match_score(answer), Some(72.0));
    }

    #[test]
    fn test_match_score_reuses_pattern() {
        let answers = ["Match: 10%", "match rate 55.5 %", "Overall MATCH 100%"];
        let scores: Vec<Option<f32>> = answers.iter().map(|a| match_score(a)).collect();
        assert_eq!(scores, vec![Some(10.0), Some(55.5), Some(100.0)]);
        assert_eq!(match_score("Match: 10%"), Some(10.0));
    }

    #[test]
    fn test_match_score_missing() {
        assert_eq!(match_score("No score given, but 50% of skills overlap"), None);
        assert_eq!(match_score("Match score: 250%"), None);
    }
}
