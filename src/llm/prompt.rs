//! Coaching prompt construction
//!
//! Turns the validated sample and prompt context into the system and user
//! messages sent upstream. Numbers are rendered the way runners read them:
//! km with two decimals, `m:ss` pace, `h:mm:ss` durations.

use std::fmt::Write;

use crate::types::{PromptContext, TelemetrySample, TrainingGoal};

const SYSTEM_PROMPT: &str = "You are an expert AI running coach providing real-time guidance during runs. \
Give concise, motivational coaching messages (1-2 sentences max) based on the runner's current performance data.

Key guidelines:
- Be encouraging and specific to their current situation
- Mention pace, heart rate, or distance when relevant
- Keep messages under 50 words
- Focus on form, breathing, pacing, or mental strategies
- Be supportive but honest about performance";

/// System prompt, with the runner's goal appended when known.
pub fn build_system_prompt(goal: Option<&TrainingGoal>) -> String {
    let mut prompt = SYSTEM_PROMPT.to_string();
    if let Some(goal) = goal {
        let _ = write!(
            prompt,
            "\n\nRunner's Training Goal: {} in {} on {}. Tailor advice to help them achieve this specific goal.",
            goal.race_type,
            format_time(goal.target_time),
            goal.race_date
        );
    }
    prompt
}

/// User prompt describing the current state of the run.
pub fn build_user_prompt(sample: &TelemetrySample, ctx: &PromptContext) -> String {
    let mut prompt = format!(
        "Current run status:\n- Distance: {:.2}km\n- Duration: {}\n- Average pace: {}/km",
        sample.distance / 1000.0,
        format_time(sample.duration_ms / 1000),
        format_pace(sample.avg_pace)
    );

    if let Some(hr) = sample.avg_heart_rate {
        let _ = write!(prompt, "\n- Heart rate: {hr} bpm");
    }

    if let Some(speed) = ctx.current_speed {
        let _ = write!(prompt, "\n- Current speed: {:.1} km/h", speed * 3.6);
    }

    if let Some(interval) = &ctx.interval {
        let _ = write!(
            prompt,
            "\n- Recent interval pace: {}/km",
            format_pace(interval.last_interval_pace)
        );
        if let Some(pattern) = interval.pace_pattern.as_deref().filter(|p| !p.is_empty()) {
            let _ = write!(prompt, "\n- Pace trend: {pattern}");
        }
    }

    prompt.push_str("\n\nProvide a motivational coaching message based on this data.");
    prompt
}

/// `h:mm:ss` above an hour, `m:ss` otherwise.
pub fn format_time(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Seconds-per-km as `m:ss`, rounded to the nearest second.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_pace(secs_per_km: f64) -> String {
    let total = if secs_per_km.is_finite() && secs_per_km > 0.0 {
        secs_per_km.round() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntervalData;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            device_id: "d1".to_string(),
            distance: 2450.0,
            duration_ms: 780_500,
            avg_pace: 318.4,
            avg_heart_rate: Some(152),
            model: None,
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(780), "13:00");
        assert_eq!(format_time(5_405), "1:30:05");
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(318.4), "5:18");
        assert_eq!(format_pace(299.6), "5:00");
        assert_eq!(format_pace(59.0), "0:59");
    }

    #[test]
    fn test_user_prompt_minimal() {
        let mut s = sample();
        s.avg_heart_rate = None;
        let prompt = build_user_prompt(&s, &PromptContext::default());
        assert!(prompt.starts_with("Current run status:\n- Distance: 2.45km\n- Duration: 13:00\n- Average pace: 5:18/km"));
        assert!(!prompt.contains("Heart rate"));
        assert!(!prompt.contains("Current speed"));
        assert!(prompt.ends_with("Provide a motivational coaching message based on this data."));
    }

    #[test]
    fn test_user_prompt_full_context() {
        let ctx = PromptContext {
            current_speed: Some(3.2),
            interval: Some(IntervalData {
                last_interval_distance: 500.0,
                last_interval_time: 150_000,
                last_interval_pace: 300.0,
                recent_paces: vec![310.0, 300.0],
                pace_pattern: Some("speeding_up".to_string()),
            }),
            training_goal: None,
        };
        let prompt = build_user_prompt(&sample(), &ctx);
        assert!(prompt.contains("- Heart rate: 152 bpm"));
        assert!(prompt.contains("- Current speed: 11.5 km/h"));
        assert!(prompt.contains("- Recent interval pace: 5:00/km"));
        assert!(prompt.contains("- Pace trend: speeding_up"));
    }

    #[test]
    fn test_system_prompt_with_goal() {
        let goal = TrainingGoal {
            race_type: "half_marathon".to_string(),
            target_time: 6_300,
            race_date: "2025-10-12".to_string(),
        };
        let prompt = build_system_prompt(Some(&goal));
        assert!(prompt.contains("Runner's Training Goal: half_marathon in 1:45:00 on 2025-10-12."));
        assert!(!build_system_prompt(None).contains("Training Goal"));
    }
}
