//! Local profile scan - discover stale user profiles on this machine.

use crate::action::{parse_cim_date, powershell};
use chrono::Utc;
use fanout::{Batch, Identity, IdentitySource, SourceError};
use serde::Deserialize;

/// Enumerates non-special, unloaded local profiles that have not been used
/// within the age threshold, yielding their SIDs.
///
/// This is only a discovery pass: the profile action re-checks every SID
/// before removing anything, so a profile that gets loaded between scan
/// and run is still safe.
pub struct ProfileScan {
    max_age_days: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CimProfile {
    #[serde(rename = "SID")]
    sid: String,
    #[serde(default)]
    loaded: bool,
    #[serde(default)]
    last_use_time: Option<String>,
}

impl ProfileScan {
    pub fn new(max_age_days: i64) -> Self {
        Self { max_age_days }
    }

    fn is_stale(&self, profile: &CimProfile) -> bool {
        if profile.loaded {
            return false;
        }
        match profile.last_use_time.as_deref().and_then(parse_cim_date) {
            Some(last_use) => {
                let cutoff = Utc::now() - chrono::Duration::days(self.max_age_days);
                last_use < cutoff
            }
            // No usable timestamp: leave it for a human to look at.
            None => false,
        }
    }
}

impl IdentitySource for ProfileScan {
    fn load(&self) -> Result<Batch, SourceError> {
        let script = "ConvertTo-Json @(Get-CimInstance Win32_UserProfile | \
                      Where-Object { -not $_.Special } | \
                      Select-Object SID,Loaded,LastUseTime)";

        let output = powershell(script)
            .map_err(|e| SourceError::lookup(format!("profile scan failed: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::lookup(format!(
                "profile scan failed: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let profiles: Vec<CimProfile> = serde_json::from_str(stdout.trim())
            .map_err(|e| SourceError::format(format!("unexpected profile scan output: {e}")))?;

        let identities: Vec<Identity> = profiles
            .iter()
            .filter(|p| self.is_stale(p))
            .map(|p| Identity::new(p.sid.clone()))
            .collect();

        log::info!(
            "profile scan: {} of {} profiles stale (>{} days unused)",
            identities.len(),
            profiles.len(),
            self.max_age_days
        );
        Ok(Batch::new(identities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(loaded: bool, last_use: Option<&str>) -> CimProfile {
        CimProfile {
            sid: "S-1-5-21-1-2-3-1001".to_string(),
            loaded,
            last_use_time: last_use.map(ToString::to_string),
        }
    }

    #[test]
    fn old_unloaded_profile_is_stale() {
        let scan = ProfileScan::new(90);
        // Well in the past.
        assert!(scan.is_stale(&profile(false, Some("/Date(946684800000)/"))));
    }

    #[test]
    fn loaded_profile_is_never_stale() {
        let scan = ProfileScan::new(90);
        assert!(!scan.is_stale(&profile(true, Some("/Date(946684800000)/"))));
    }

    #[test]
    fn recent_profile_is_not_stale() {
        let scan = ProfileScan::new(90);
        let recent = format!("/Date({})/", Utc::now().timestamp_millis());
        assert!(!scan.is_stale(&profile(false, Some(&recent))));
    }

    #[test]
    fn missing_timestamp_is_not_stale() {
        let scan = ProfileScan::new(90);
        assert!(!scan.is_stale(&profile(false, None)));
        assert!(!scan.is_stale(&profile(false, Some("garbage"))));
    }

    #[test]
    fn parses_cim_profile_json() {
        let body = r#"[
            {"SID": "S-1-5-21-1-2-3-1001", "Loaded": false,
             "LastUseTime": "\/Date(1600000000000)\/"},
            {"SID": "S-1-5-21-1-2-3-1002", "Loaded": true, "LastUseTime": null}
        ]"#;
        let profiles: Vec<CimProfile> = serde_json::from_str(body).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].sid, "S-1-5-21-1-2-3-1001");
        assert!(!profiles[0].loaded);
        assert!(profiles[1].loaded);
    }
}
