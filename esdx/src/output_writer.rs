//! Output writing: renders an apex's admit set to the `.esd` file pair (and,
//! optionally, a JSON sibling) described in the external-interfaces section.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use esdx_core::config::OutputConfig;
use esdx_core::engine::ApexResult;
use esdx_core::output::{render_esd, render_json};

/// Write the stable `.<apex>.esd`, the timestamped `.<apex>_YYYY-MM_DD_HH-MM.esd`,
/// and (if `output.json` is set) a `.<apex>.json` file into `output.directory`.
pub fn write_apex_outputs(result: &ApexResult, output: &OutputConfig) -> Result<()> {
    let dir = PathBuf::from(&output.directory);
    fs::create_dir_all(&dir).with_context(|| format!("creating output directory {}", dir.display()))?;

    let apex = result.apex.as_str();
    let rendered = render_esd(&result.admitted);

    let stable_path = dir.join(format!(".{apex}.esd"));
    fs::write(&stable_path, &rendered)
        .with_context(|| format!("writing {}", stable_path.display()))?;

    let timestamp = Local::now().format("%Y-%m_%d_%H-%M").to_string();
    let timestamped_path = dir.join(format!(".{apex}_{timestamp}.esd"));
    fs::write(&timestamped_path, &rendered)
        .with_context(|| format!("writing {}", timestamped_path.display()))?;

    if output.json {
        let json_path = dir.join(format!(".{apex}.json"));
        let json = render_json(&result.admitted).context("rendering json output")?;
        fs::write(&json_path, json).with_context(|| format!("writing {}", json_path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use esdx_core::types::{Apex, ResolvedName};

    #[test]
    fn writes_stable_and_timestamped_files() {
        let tmp = std::env::temp_dir().join(format!("esdx-test-output-{}", std::process::id()));
        let result = ApexResult {
            apex: Apex::new("example.test"),
            admitted: vec![ResolvedName::new("www.example.test", vec!["1.2.3.4".parse().unwrap()])],
            dns_query_errors: 0,
        };
        let output = OutputConfig {
            directory: tmp.to_string_lossy().to_string(),
            json: true,
        };

        write_apex_outputs(&result, &output).unwrap();

        let stable = tmp.join(".example.test.esd");
        assert!(stable.exists());
        let contents = fs::read_to_string(&stable).unwrap();
        assert!(contents.contains("www.example.test"));
        assert!(contents.contains("1.2.3.4"));

        let json_path = tmp.join(".example.test.json");
        assert!(json_path.exists());

        let entries: Vec<_> = fs::read_dir(&tmp).unwrap().collect();
        assert!(entries.len() >= 3);

        let _ = fs::remove_dir_all(&tmp);
    }
}
