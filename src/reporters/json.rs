//! JSON reporter
//!
//! Outputs report records as pretty-printed JSON, the shape the race and
//! timeline visualizations read.

use anyhow::Result;
use serde::Serialize;

/// Render any report record as JSON
pub fn render<T: Serialize + ?Sized>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Render as compact JSON (single line)
pub fn render_compact<T: Serialize + ?Sized>(report: &T) -> Result<String> {
    Ok(serde_json::to_string(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_json_render_race_shape() {
        let report = test_report();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");

        assert_eq!(parsed["config"]["topN"], 30);
        assert_eq!(parsed["config"]["totalFrames"], 1);
        assert_eq!(parsed["summary"]["dateRange"]["start"], "2021-03-01");
        assert_eq!(parsed["summary"]["totalFilesTracked"], 2);
        assert_eq!(parsed["categories"]["service"]["color"], "#22c55e");

        let frame = &parsed["frames"][0];
        assert_eq!(frame["totalFiles"], 1);
        assert_eq!(frame["activity"]["commitsInWindow"], 6);
        assert_eq!(frame["files"][0]["file"], "js/services/api.js");
        assert_eq!(frame["files"][0]["status"], "active");

        assert_eq!(parsed["milestones"][0]["type"], "service_layer");
        assert!(parsed["milestones"][0].get("hash").is_none());
        assert_eq!(parsed["graveyard"][0]["deleted"], "2021-02-01");
    }

    #[test]
    fn test_json_render_compact() {
        let report = test_report();
        let json_str = render_compact(&report).expect("render compact JSON");
        assert!(!json_str.contains('\n'));
        let _: serde_json::Value = serde_json::from_str(&json_str).expect("parse compact JSON");
    }

    #[test]
    fn test_json_empty_collections() {
        let mut report = test_report();
        report.frames.clear();
        report.milestones.clear();
        let json_str = render(&report).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["frames"].as_array().expect("frames array").len(), 0);
    }
}
