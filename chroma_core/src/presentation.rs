//! Presentation Contract - Severity and Trust Lookup Tables
//!
//! Fixed mappings external presentation adapters use to render conflicts
//! and trust without reimplementing detection or scoring:
//! - `ConflictSeverity` → badge/overlay styling (color, pulse, outline, audio)
//! - `AgentTrustScore.final_score` bucket → 3D aura parameters
//!
//! Pure lookups over frozen values; this engine draws nothing itself.

use crate::chroma_rules::ConflictSeverity;
use serde::Serialize;

/// Rendering parameters for one conflict severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictStyle {
    pub color: &'static str,
    pub pulse_speed_ms: u32,
    pub outline_width: f32,
    pub audio_cue: Option<&'static str>,
}

/// 3D aura parameters for one trust bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuraStyle {
    pub aura_intensity: f32,
    pub glow_color: &'static str,
    pub suggestion_volume: f32,
    pub presence_scale: f32,
}

/// Badge/overlay styling for a conflict severity.
pub const fn conflict_style(severity: ConflictSeverity) -> ConflictStyle {
    match severity {
        ConflictSeverity::Info => ConflictStyle {
            color: "#64d2ff",
            pulse_speed_ms: 1500,
            outline_width: 1.0,
            audio_cue: None,
        },
        ConflictSeverity::Warning => ConflictStyle {
            color: "#ff9f0a",
            pulse_speed_ms: 800,
            outline_width: 2.0,
            audio_cue: Some("chime"),
        },
        ConflictSeverity::Critical => ConflictStyle {
            color: "#ff453a",
            pulse_speed_ms: 300,
            outline_width: 3.0,
            audio_cue: Some("alert"),
        },
    }
}

/// Aura parameters for a trust score, bucketed `>=80 / >=60 / >=40 / <40`.
pub fn aura_style(final_score: f64) -> AuraStyle {
    if final_score >= 80.0 {
        AuraStyle {
            aura_intensity: 1.0,
            glow_color: "#7cf29c",
            suggestion_volume: 1.0,
            presence_scale: 1.0,
        }
    } else if final_score >= 60.0 {
        AuraStyle {
            aura_intensity: 0.75,
            glow_color: "#ffd60a",
            suggestion_volume: 0.8,
            presence_scale: 0.95,
        }
    } else if final_score >= 40.0 {
        AuraStyle {
            aura_intensity: 0.5,
            glow_color: "#ff9f0a",
            suggestion_volume: 0.5,
            presence_scale: 0.9,
        }
    } else {
        AuraStyle {
            aura_intensity: 0.25,
            glow_color: "#ff453a",
            suggestion_volume: 0.2,
            presence_scale: 0.85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_styles_escalate() {
        let info = conflict_style(ConflictSeverity::Info);
        let warning = conflict_style(ConflictSeverity::Warning);
        let critical = conflict_style(ConflictSeverity::Critical);

        // Heavier severities pulse faster and draw thicker outlines
        assert!(critical.pulse_speed_ms < warning.pulse_speed_ms);
        assert!(warning.pulse_speed_ms < info.pulse_speed_ms);
        assert!(critical.outline_width > warning.outline_width);
        assert!(info.audio_cue.is_none());
        assert_eq!(critical.audio_cue, Some("alert"));
    }

    #[test]
    fn test_aura_bucket_boundaries() {
        assert_eq!(aura_style(100.0).aura_intensity, 1.0);
        assert_eq!(aura_style(80.0).aura_intensity, 1.0);
        assert_eq!(aura_style(79.9).aura_intensity, 0.75);
        assert_eq!(aura_style(60.0).aura_intensity, 0.75);
        assert_eq!(aura_style(40.0).aura_intensity, 0.5);
        assert_eq!(aura_style(39.9).aura_intensity, 0.25);
        assert_eq!(aura_style(0.0).aura_intensity, 0.25);
    }
}
