//! Profile action - remove one stale local user profile by SID.

use super::{parse_cim_date, powershell};
use anyhow::{Result, bail};
use chrono::Utc;
use fanout::{ApplyOutcome, Identity, RemoteAction};
use serde::Deserialize;

/// Well-known SIDs that must never be deleted, whatever the config says.
const BUILTIN_EXCLUSIONS: &[&str] = &[
    "S-1-5-18", // LocalSystem
    "S-1-5-19", // LocalService
    "S-1-5-20", // NetworkService
];

/// Removes a local user profile unless it is excluded, loaded, special, or
/// has been used within the age threshold.
pub struct ProfileAction {
    exclude: Vec<String>,
    max_age_days: i64,
}

#[derive(Deserialize)]
struct CimProfile {
    #[serde(rename = "Special", default)]
    special: bool,
    #[serde(rename = "Loaded", default)]
    loaded: bool,
    #[serde(rename = "LastUseTime", default)]
    last_use_time: Option<String>,
}

/// A SID is `S-1-` followed by dash-separated decimal subauthorities.
fn is_valid_sid(sid: &str) -> bool {
    sid.starts_with("S-1-")
        && sid.len() > 4
        && sid[2..].split('-').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())
        })
}

impl ProfileAction {
    pub fn new(exclude: Vec<String>, max_age_days: i64) -> Self {
        Self {
            exclude,
            max_age_days,
        }
    }

    fn is_excluded(&self, sid: &str) -> bool {
        BUILTIN_EXCLUSIONS
            .iter()
            .any(|e| e.eq_ignore_ascii_case(sid))
            || self.exclude.iter().any(|e| e.eq_ignore_ascii_case(sid))
    }

    fn query(&self, sid: &str) -> Result<Option<CimProfile>> {
        let script = format!(
            "Get-CimInstance Win32_UserProfile -Filter \"SID='{sid}'\" | \
             Select-Object Special,Loaded,LastUseTime | ConvertTo-Json"
        );
        let output = powershell(&script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("profile query for {sid} failed: {}", stderr.trim());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let profile: CimProfile = serde_json::from_str(trimmed)
            .map_err(|e| anyhow::anyhow!("unexpected profile query output for {sid}: {e}"))?;
        Ok(Some(profile))
    }

    fn remove(&self, sid: &str) -> Result<()> {
        let script = format!(
            "Get-CimInstance Win32_UserProfile -Filter \"SID='{sid}'\" | Remove-CimInstance"
        );
        let output = powershell(&script)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("profile removal for {sid} failed: {}", stderr.trim());
        }
        Ok(())
    }
}

impl RemoteAction for ProfileAction {
    fn describe(&self) -> String {
        "Remove stale profile".to_string()
    }

    fn apply(&self, identity: &Identity) -> Result<ApplyOutcome> {
        let sid = identity.as_str().trim();

        // The SID is interpolated into a CIM filter; accept nothing but the
        // S-1-x-y... shape.
        if !is_valid_sid(sid) {
            bail!("'{sid}' is not a valid SID");
        }
        if self.is_excluded(sid) {
            return Ok(ApplyOutcome::skipped("excluded"));
        }

        let profile = match self.query(sid)? {
            Some(profile) => profile,
            // Already gone: removing again would be a no-op anyway.
            None => return Ok(ApplyOutcome::skipped("not present")),
        };

        if profile.special {
            return Ok(ApplyOutcome::skipped("system profile"));
        }
        if profile.loaded {
            return Ok(ApplyOutcome::skipped("profile is loaded"));
        }
        if let Some(last_use) = profile.last_use_time.as_deref().and_then(parse_cim_date) {
            let cutoff = Utc::now() - chrono::Duration::days(self.max_age_days);
            if last_use >= cutoff {
                return Ok(ApplyOutcome::skipped(format!(
                    "used within {} days",
                    self.max_age_days
                )));
            }
        }

        self.remove(sid)?;
        Ok(ApplyOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sid_validation() {
        assert!(is_valid_sid("S-1-5-21-3623811015-3361044348-30300820-1013"));
        assert!(is_valid_sid("S-1-5-18"));
        assert!(!is_valid_sid("S-1-"));
        assert!(!is_valid_sid("Administrator"));
        assert!(!is_valid_sid("S-1-5-21'; $(bad)"));
    }

    #[test]
    fn builtin_sids_are_always_excluded() {
        let action = ProfileAction::new(vec![], 90);
        assert!(action.is_excluded("S-1-5-18"));
        assert!(action.is_excluded("s-1-5-20"));
        assert!(!action.is_excluded("S-1-5-21-1-2-3-1001"));
    }

    #[test]
    fn configured_exclusions_apply() {
        let action = ProfileAction::new(vec!["S-1-5-21-1-2-3-500".to_string()], 90);
        assert!(action.is_excluded("S-1-5-21-1-2-3-500"));
    }

    #[test]
    fn parses_single_profile_json() {
        let body = r#"{"Special": false, "Loaded": false,
                       "LastUseTime": "\/Date(1600000000000)\/"}"#;
        let profile: CimProfile = serde_json::from_str(body).unwrap();
        assert!(!profile.special);
        assert!(!profile.loaded);
        assert!(parse_cim_date(profile.last_use_time.as_deref().unwrap()).is_some());
    }
}
